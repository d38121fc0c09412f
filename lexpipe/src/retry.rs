//! Retry combinator with deterministic exponential backoff.
//!
//! Each stage carries its own policy so a flaky network-bound stage can
//! retry aggressively without re-running already-completed deterministic
//! work. Backoff is deterministic (no jitter): the delay before retry `k`
//! is `min(base * 2^k, cap)`, which bounds worst-case added latency under
//! unreliable external services.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Deterministic exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Self::DEFAULT_BASE,
            cap: Self::DEFAULT_CAP,
        }
    }
}

impl Backoff {
    /// Default base delay unit of one second.
    pub const DEFAULT_BASE: Duration = Duration::from_secs(1);
    /// Default delay cap of thirty seconds.
    pub const DEFAULT_CAP: Duration = Duration::from_secs(30);

    /// Creates a backoff schedule with the given base unit and cap.
    #[must_use]
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Returns the delay before retry `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        // 2^attempt saturates well before overflow for any realistic policy.
        let factor = 1u64 << attempt.min(32);
        Duration::from_millis(base_ms.saturating_mul(factor)).min(self.cap)
    }
}

/// Per-stage retry policy: bounded retries over a backoff schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt.
    retry_count: u32,
    /// Backoff schedule between attempts.
    backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a policy allowing `retry_count` retries after the first attempt.
    #[must_use]
    pub fn new(retry_count: u32, backoff: Backoff) -> Self {
        Self {
            retry_count,
            backoff,
        }
    }

    /// Total attempts the policy will make (`retry_count + 1`).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.retry_count + 1
    }

    /// Executes `operation` with bounded retry and exponential backoff.
    ///
    /// The returned outcome always carries the 1-based attempt count and
    /// the duration of the final attempt, whether it succeeded or failed.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, mut operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts();
        let mut total_backoff = Duration::ZERO;
        let mut attempt = 1u32;

        loop {
            let started = Instant::now();
            match operation().await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                        attempt_duration: started.elapsed(),
                        total_backoff,
                    };
                }
                Err(e) => {
                    let attempt_duration = started.elapsed();
                    if attempt >= max_attempts {
                        tracing::warn!(
                            operation = op_name,
                            attempts = attempt,
                            error = %e,
                            "Retries exhausted"
                        );
                        return RetryOutcome {
                            result: Err(e),
                            attempts: attempt,
                            attempt_duration,
                            total_backoff,
                        };
                    }

                    let delay = self.backoff.delay(attempt);
                    tracing::debug!(
                        operation = op_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                    total_backoff += delay;
                    attempt += 1;
                }
            }
        }
    }
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// The final result: the first success, or the last error at exhaustion.
    pub result: Result<T, E>,
    /// 1-based attempt count at success or exhaustion.
    pub attempts: u32,
    /// Duration of the final attempt only (excludes backoff sleeps).
    pub attempt_duration: Duration,
    /// Total time spent sleeping between attempts.
    pub total_backoff: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_capped_at_thirty_seconds() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(5), Duration::from_secs(30));
        assert_eq!(backoff.delay(20), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_custom_base() {
        let backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(50));
        assert_eq!(backoff.delay(1), Duration::from_millis(20));
        assert_eq!(backoff.delay(2), Duration::from_millis(40));
        assert_eq!(backoff.delay(3), Duration::from_millis(50));
    }

    #[test]
    fn test_max_attempts() {
        let policy = RetryPolicy::new(3, Backoff::default());
        assert_eq!(policy.max_attempts(), 4);
    }

    #[tokio::test]
    async fn test_run_success_first_try() {
        let policy = RetryPolicy::new(3, Backoff::default());
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let outcome: RetryOutcome<i32, String> = policy
            .run("test", || {
                let c = calls_ref.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(outcome.result, Ok(42));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.total_backoff, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_success_after_failures() {
        let policy = RetryPolicy::new(3, Backoff::default());
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let outcome: RetryOutcome<i32, String> = policy
            .run("test", || {
                let c = calls_ref.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(outcome.result, Ok(7));
        assert_eq!(outcome.attempts, 3);
        // Backoff before retries 1 and 2: 2s + 4s.
        assert_eq!(outcome.total_backoff, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhaustion_attempt_count_and_backoff_sum() {
        let policy = RetryPolicy::new(3, Backoff::default());
        let started = Instant::now();

        let outcome: RetryOutcome<(), String> = policy
            .run("test", || async { Err("permanent".to_string()) })
            .await;

        assert!(outcome.result.is_err());
        assert_eq!(outcome.attempts, 4);
        // sum(min(2^k, 30)) for k in 1..=3
        assert_eq!(outcome.total_backoff, Duration::from_secs(2 + 4 + 8));
        assert!(started.elapsed() >= Duration::from_secs(14));
    }

    #[tokio::test]
    async fn test_run_zero_retries_fails_immediately() {
        let policy = RetryPolicy::new(0, Backoff::default());
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let outcome: RetryOutcome<(), String> = policy
            .run("test", || {
                let c = calls_ref.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("nope".to_string())
                }
            })
            .await;

        assert!(outcome.result.is_err());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
