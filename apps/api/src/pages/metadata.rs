//! SEO metadata for page documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cms::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenGraphImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub images: Vec<OpenGraphImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub open_graph: OpenGraph,
}

/// Site-wide fallbacks for documents without their own meta fields.
#[derive(Debug, Clone)]
pub struct SiteDefaults {
    pub title: String,
    pub description: String,
}

impl PageMetadata {
    /// Metadata for a page with no document behind it.
    pub fn defaults(site: &SiteDefaults) -> Self {
        Self::build(site.title.clone(), site.description.clone(), Vec::new())
    }

    /// Reads `meta_title`, `meta_description` and `meta_image.url`, falling
    /// back to the site defaults for empty or missing values.
    pub fn from_document(doc: &Document, site: &SiteDefaults) -> Self {
        let title = doc.text("meta_title").unwrap_or(&site.title).to_string();
        let description = doc
            .text("meta_description")
            .unwrap_or(&site.description)
            .to_string();
        let images = doc
            .data
            .get("meta_image")
            .and_then(|image| image.get("url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(|url| vec![OpenGraphImage { url: url.to_string() }])
            .unwrap_or_default();

        Self::build(title, description, images)
    }

    fn build(title: String, description: String, images: Vec<OpenGraphImage>) -> Self {
        Self {
            open_graph: OpenGraph {
                title: title.clone(),
                description: description.clone(),
                images,
            },
            title,
            description,
        }
    }
}
