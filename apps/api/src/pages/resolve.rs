//! Document lookup for page routes.

use serde::Serialize;
use tracing::{debug, warn};

use crate::cms::{CmsError, ContentSource, Document};
use crate::errors::AppError;

/// Custom types that can back a `/{uid}` page, in lookup order.
pub const PAGE_TYPES: [&str; 3] = ["program", "about", "settings"];

/// Singleton type backing the site root.
pub const HOMEPAGE_TYPE: &str = "homepage";

const MAX_UID_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageParam {
    pub uid: String,
}

/// Rejects UIDs that could never name a document.
pub fn validate_uid(uid: &str) -> Result<(), AppError> {
    let len = uid.chars().count();
    if len == 0 || len > MAX_UID_LEN {
        return Err(AppError::Validation(format!(
            "uid must be 1-{MAX_UID_LEN} characters"
        )));
    }
    if !uid
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AppError::Validation(format!(
            "uid '{uid}' contains unsupported characters"
        )));
    }
    Ok(())
}

/// Finds the page document for `uid`, trying each page type in order.
///
/// Returns `Ok(None)` when no type has the uid. A type that rejects the
/// query (4xx, e.g. a singleton without uids) is skipped like a miss;
/// transport errors and 5xx abort the lookup.
pub async fn find_page(source: &dyn ContentSource, uid: &str) -> Result<Option<Document>, CmsError> {
    for doc_type in PAGE_TYPES {
        match source.get_by_uid(doc_type, uid).await {
            Ok(doc) => {
                debug!("Resolved page '{uid}' as {doc_type}");
                return Ok(Some(doc));
            }
            Err(e) if e.is_not_found() => continue,
            Err(e) if e.is_rejected_query() => {
                warn!("Skipping {doc_type} for page '{uid}': {e}");
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Lists the uid of every page document. Types that fail to load are skipped.
pub async fn list_page_params(source: &dyn ContentSource) -> Vec<PageParam> {
    let mut params = Vec::new();
    for doc_type in PAGE_TYPES {
        match source.get_all_by_type(doc_type).await {
            Ok(docs) => params.extend(
                docs.into_iter()
                    .filter_map(|d| d.uid)
                    .map(|uid| PageParam { uid }),
            ),
            Err(e) => warn!("Skipping page type {doc_type}: {e}"),
        }
    }
    params
}
