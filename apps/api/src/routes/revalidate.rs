use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

/// POST /api/v1/revalidate
/// Drops every cached page plan so the next request refetches from the CMS.
pub async fn handle_revalidate(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(cache) = &state.cache {
        match cache.revalidate().await {
            Ok(generation) => info!("Page cache revalidated (generation {generation})"),
            Err(e) => {
                error!("Page cache revalidation failed: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Error revalidating cache",
                        "message": e.to_string()
                    })),
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(json!({
            "revalidated": true,
            "now": chrono::Utc::now().timestamp_millis(),
            "message": "Cache revalidated successfully"
        })),
    )
}
