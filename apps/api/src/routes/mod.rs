pub mod health;
pub mod revalidate;

use axum::{
    routing::{get, post},
    Router,
};

use crate::navigation;
use crate::pages::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page plans
        .route("/api/v1/homepage", get(handlers::handle_homepage))
        .route("/api/v1/pages", get(handlers::handle_list_pages))
        .route("/api/v1/pages/:uid", get(handlers::handle_get_page))
        .route(
            "/api/v1/pages/:uid/metadata",
            get(handlers::handle_page_metadata),
        )
        // Site chrome
        .route("/api/v1/navigation", get(navigation::handle_navigation))
        .route("/api/v1/revalidate", post(revalidate::handle_revalidate))
        .with_state(state)
}
