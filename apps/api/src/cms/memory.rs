//! Fixture-backed content source for local development and tests.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{CmsError, ContentSource, Document};

/// Serves documents from memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<Document>,
}

impl MemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Loads a JSON array of documents.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content fixtures at {}", path.display()))?;
        let documents: Vec<Document> = serde_json::from_str(&raw)
            .with_context(|| format!("Content fixtures at {} are not valid", path.display()))?;
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    fn of_type<'a>(&'a self, doc_type: &'a str) -> impl Iterator<Item = &'a Document> + 'a {
        self.documents.iter().filter(move |d| d.doc_type == doc_type)
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn get_single(&self, doc_type: &str) -> Result<Document, CmsError> {
        self.of_type(doc_type)
            .next()
            .cloned()
            .ok_or_else(|| CmsError::not_found(doc_type, "(single)"))
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError> {
        self.of_type(doc_type)
            .find(|d| d.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| CmsError::not_found(doc_type, uid))
    }

    async fn get_all_by_type(&self, doc_type: &str) -> Result<Vec<Document>, CmsError> {
        Ok(self.of_type(doc_type).cloned().collect())
    }
}
