//! Site navigation, read from the settings singleton.
//!
//! Always answers 200: the header and footer degrade to empty link lists when
//! settings are missing, with an `error` string for the front end's console.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::cms::{CmsError, ContentSource, Document};
use crate::state::AppState;

/// Settings singletons, in lookup order.
pub const SETTINGS_TYPES: [&str; 2] = ["settings_werobot", "settings"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub header_navigation: Vec<Value>,
    pub footer_navigation: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NavigationResponse {
    fn from_settings(doc: &Document) -> Self {
        Self {
            header_navigation: doc.list("header_navigation"),
            footer_navigation: doc.list("footer_navigation"),
            error: None,
        }
    }

    fn empty(error: String) -> Self {
        Self {
            header_navigation: Vec::new(),
            footer_navigation: Vec::new(),
            error: Some(error),
        }
    }
}

/// Finds the first settings singleton that exists.
async fn find_settings(source: &dyn ContentSource) -> Result<Option<Document>, CmsError> {
    for doc_type in SETTINGS_TYPES {
        match source.get_single(doc_type).await {
            Ok(doc) => {
                info!("Found {doc_type} document");
                return Ok(Some(doc));
            }
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

pub async fn load_navigation(source: &dyn ContentSource) -> NavigationResponse {
    match find_settings(source).await {
        Ok(Some(doc)) => {
            let nav = NavigationResponse::from_settings(&doc);
            info!(
                "Navigation data: {} header items, {} footer items",
                nav.header_navigation.len(),
                nav.footer_navigation.len()
            );
            nav
        }
        Ok(None) => {
            error!(
                "Settings document not found. Tried: {}",
                SETTINGS_TYPES.join(" and ")
            );
            NavigationResponse::empty(
                "Settings document not found. Make sure it exists and is published.".to_string(),
            )
        }
        Err(e) => {
            error!("Error fetching navigation: {e}");
            NavigationResponse::empty(e.to_string())
        }
    }
}

/// GET /api/v1/navigation
pub async fn handle_navigation(State(state): State<AppState>) -> Json<NavigationResponse> {
    Json(load_navigation(state.content.as_ref()).await)
}
