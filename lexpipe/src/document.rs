//! Document input type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A legal document submitted for processing.
///
/// Immutable once accepted into the pipeline. The id is optional at
/// submission time; the processor generates one if the caller omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Caller-supplied document id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Raw document text.
    pub content: String,
    /// Optional document type (e.g., "contract", "opinion", "filing").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Opaque caller metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Creates a new document from raw content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            document_id: None,
            content: content.into(),
            document_type: None,
            metadata: HashMap::new(),
        }
    }

    /// Sets the document id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    /// Sets the document type.
    #[must_use]
    pub fn with_document_type(mut self, kind: impl Into<String>) -> Self {
        self.document_type = Some(kind.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the content length in characters.
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Checks the content against the configured length bounds.
    ///
    /// Returns the content length on success, or a descriptive message.
    pub(crate) fn check_content(&self, min: usize, max: usize) -> Result<usize, String> {
        if self.content.trim().is_empty() {
            return Err("document content is empty".to_string());
        }
        let len = self.content_len();
        if len < min {
            return Err(format!(
                "document content is too short: {len} characters (minimum {min})"
            ));
        }
        if len > max {
            return Err(format!(
                "document content is too long: {len} characters (maximum {max})"
            ));
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_builder() {
        let doc = Document::new("In the matter of Smith v. Jones...")
            .with_id("doc-001")
            .with_document_type("opinion")
            .with_metadata_entry("court", serde_json::json!("9th Circuit"));

        assert_eq!(doc.document_id.as_deref(), Some("doc-001"));
        assert_eq!(doc.document_type.as_deref(), Some("opinion"));
        assert_eq!(doc.metadata.len(), 1);
    }

    #[test]
    fn test_content_len_counts_chars() {
        let doc = Document::new("café");
        assert_eq!(doc.content_len(), 4);
    }

    #[test]
    fn test_check_content_bounds() {
        assert!(Document::new("").check_content(10, 100).unwrap_err().contains("empty"));
        assert!(Document::new("   ").check_content(10, 100).unwrap_err().contains("empty"));
        assert!(Document::new("short").check_content(10, 100).unwrap_err().contains("too short"));
        assert!(Document::new("x".repeat(101)).check_content(10, 100).unwrap_err().contains("too long"));
        assert_eq!(Document::new("long enough text").check_content(10, 100), Ok(16));
    }

    #[test]
    fn test_document_serialization_skips_empty_fields() {
        let doc = Document::new("some text");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("document_id"));
        assert!(!json.contains("metadata"));
    }
}
