use axum::{
    extract::{Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::cache::Lookup;
use crate::cms::Document;
use crate::errors::AppError;
use crate::pages::metadata::PageMetadata;
use crate::pages::plan::PagePlan;
use crate::pages::resolve::{find_page, list_page_params, validate_uid, PageParam, HOMEPAGE_TYPE};
use crate::state::AppState;

/// GET /api/v1/homepage
pub async fn handle_homepage(State(state): State<AppState>) -> Result<Json<PagePlan>, AppError> {
    let cache_key = "homepage";
    let generation = match cached::<PagePlan>(&state, cache_key).await {
        Cached::Hit(plan) => return Ok(Json(plan)),
        Cached::Miss { generation } => generation,
    };

    let doc = state.content.get_single(HOMEPAGE_TYPE).await?;
    let plan = build_plan(&state, &doc)?;
    store(&state, generation, cache_key, &plan).await;
    Ok(Json(plan))
}

/// GET /api/v1/pages/:uid
pub async fn handle_get_page(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<PagePlan>, AppError> {
    validate_uid(&uid)?;

    let cache_key = format!("uid:{uid}");
    let generation = match cached::<PagePlan>(&state, &cache_key).await {
        Cached::Hit(plan) => return Ok(Json(plan)),
        Cached::Miss { generation } => generation,
    };

    let doc = find_page(state.content.as_ref(), &uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No page with uid '{uid}'")))?;
    let plan = build_plan(&state, &doc)?;
    store(&state, generation, &cache_key, &plan).await;
    Ok(Json(plan))
}

/// GET /api/v1/pages/:uid/metadata
pub async fn handle_page_metadata(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<PageMetadata>, AppError> {
    validate_uid(&uid)?;

    let site = state.config.site_defaults();
    let metadata = match find_page(state.content.as_ref(), &uid).await {
        Ok(Some(doc)) => PageMetadata::from_document(&doc, &site),
        Ok(None) => PageMetadata::defaults(&site),
        Err(e) => {
            warn!("Metadata lookup for '{uid}' failed, using defaults: {e}");
            PageMetadata::defaults(&site)
        }
    };
    Ok(Json(metadata))
}

/// GET /api/v1/pages
pub async fn handle_list_pages(State(state): State<AppState>) -> Json<Vec<PageParam>> {
    let params = list_page_params(state.content.as_ref()).await;
    info!("Listed {} page params", params.len());
    Json(params)
}

/// A slice zone that cannot be parsed renders as "not found", the same as a
/// missing page.
fn build_plan(state: &AppState, doc: &Document) -> Result<PagePlan, AppError> {
    PagePlan::build(doc, &state.config.site_defaults()).map_err(|e| {
        warn!("Cannot plan document {}: {e}", doc.id);
        AppError::NotFound(format!("Page '{}' could not be rendered", doc.id))
    })
}

enum Cached<T> {
    Hit(T),
    /// `generation` is the cache generation the miss was read under, or
    /// `None` when there is no usable cache (nothing gets written back).
    Miss { generation: Option<u64> },
}

async fn cached<T: DeserializeOwned>(state: &AppState, key: &str) -> Cached<T> {
    let Some(cache) = state.cache.as_ref() else {
        return Cached::Miss { generation: None };
    };
    match cache.lookup(key).await {
        Ok(Lookup {
            hit: Some(value), ..
        }) => Cached::Hit(value),
        Ok(Lookup { generation, .. }) => Cached::Miss {
            generation: Some(generation),
        },
        Err(e) => {
            warn!("Page cache read failed for {key}: {e}");
            Cached::Miss { generation: None }
        }
    }
}

async fn store<T: Serialize>(state: &AppState, generation: Option<u64>, key: &str, value: &T) {
    let (Some(cache), Some(generation)) = (&state.cache, generation) else {
        return;
    };
    if let Err(e) = cache.put(generation, key, value).await {
        warn!("Page cache write failed for {key}: {e}");
    }
}
