//! Content source — the boundary between the service and the headless CMS.
//!
//! Everything that talks to Prismic goes through a [`ContentSource`]. Route
//! handlers hold it as `Arc<dyn ContentSource>`, so a fixture-backed
//! [`MemorySource`] can stand in for the live API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::slices::Slice;

pub mod memory;
pub mod prismic;

pub use memory::MemorySource;
pub use prismic::PrismicClient;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("document not found: {doc_type} {key}")]
    NotFound { doc_type: String, key: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("repository has no master ref")]
    NoMasterRef,

    #[error("malformed document {id}: {reason}")]
    Malformed { id: String, reason: String },
}

impl CmsError {
    pub fn not_found(doc_type: &str, key: &str) -> Self {
        CmsError::NotFound {
            doc_type: doc_type.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }

    /// The CMS rejected the query itself (4xx other than rate limiting),
    /// e.g. a uid predicate against a singleton type.
    pub fn is_rejected_query(&self) -> bool {
        matches!(self, CmsError::Api { status, .. } if (400..500).contains(status) && *status != 429)
    }

    /// Transport failures, rate limits and 5xx responses may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            CmsError::Http(_) => true,
            CmsError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A published CMS document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Parses the document's slice zone. A document without `slices` has an
    /// empty zone.
    pub fn slices(&self) -> Result<Vec<Slice>, CmsError> {
        match self.data.get("slices") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(zone) => {
                serde_json::from_value(zone.clone()).map_err(|e| CmsError::Malformed {
                    id: self.id.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// A string field from `data`, if present and non-empty.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A list field from `data`; anything else reads as empty.
    pub fn list(&self, field: &str) -> Vec<Value> {
        self.data
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Read access to published documents.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the single document of a singleton type (e.g. `homepage`).
    async fn get_single(&self, doc_type: &str) -> Result<Document, CmsError>;

    /// Fetches a document of a repeatable type by its UID.
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError>;

    /// Fetches every document of a type.
    async fn get_all_by_type(&self, doc_type: &str) -> Result<Vec<Document>, CmsError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_document(data: Value) -> Document {
        serde_json::from_value(json!({
            "id": "XyZ1",
            "uid": "program",
            "type": "program",
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn test_slices_parsed_in_order() {
        let doc = make_document(json!({
            "slices": [
                { "slice_type": "herotext", "primary": {} },
                { "slice_type": "graphic", "primary": { "position": "center" } }
            ]
        }));

        let slices = doc.slices().unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].slice_type, "herotext");
        assert_eq!(slices[1].position(), Some("center"));
    }

    #[test]
    fn test_missing_slices_is_empty() {
        assert!(make_document(json!({})).slices().unwrap().is_empty());
        assert!(make_document(json!({ "slices": null }))
            .slices()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_malformed_slices() {
        let doc = make_document(json!({ "slices": [{ "primary": {} }] }));
        assert!(matches!(doc.slices(), Err(CmsError::Malformed { .. })));
    }

    #[test]
    fn test_error_classification() {
        let api = |status| CmsError::Api {
            status,
            message: String::new(),
        };

        assert!(api(400).is_rejected_query());
        assert!(api(404).is_rejected_query());
        assert!(!api(429).is_rejected_query());
        assert!(!api(502).is_rejected_query());

        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!CmsError::NoMasterRef.is_retryable());
        assert!(!CmsError::not_found("about", "x").is_rejected_query());
    }

    #[test]
    fn test_text_and_list_accessors() {
        let doc = make_document(json!({
            "meta_title": "",
            "meta_description": "Robots",
            "header_navigation": [{ "label": "Program" }],
            "footer_navigation": "oops",
        }));

        assert_eq!(doc.text("meta_title"), None);
        assert_eq!(doc.text("meta_description"), Some("Robots"));
        assert_eq!(doc.list("header_navigation").len(), 1);
        assert!(doc.list("footer_navigation").is_empty());
    }
}
