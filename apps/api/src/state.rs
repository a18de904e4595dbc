use std::sync::Arc;

use crate::cache::PageCache;
use crate::cms::ContentSource;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Prismic in production, fixtures in local development and tests.
    pub content: Arc<dyn ContentSource>,
    /// Absent when `REDIS_URL` is unset; pages are then always fetched fresh.
    pub cache: Option<PageCache>,
    pub config: Config,
}
