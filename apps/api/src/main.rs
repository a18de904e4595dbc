mod cache;
mod cms;
mod config;
mod errors;
mod navigation;
mod pages;
mod routes;
mod slices;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{PageCache, RedisStore};
use crate::cms::{ContentSource, MemorySource, PrismicClient};
use crate::config::{Config, ContentBackend};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing content source)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Werobot API v{}", env!("CARGO_PKG_VERSION"));

    let content = build_content_source(&config)?;

    // Page cache is optional; without Redis every request goes to the CMS
    let cache = match &config.redis_url {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => {
                info!(
                    "Redis page cache connected (ttl {}s)",
                    config.page_cache_ttl_secs
                );
                Some(PageCache::new(Arc::new(store), config.page_cache_ttl_secs))
            }
            Err(e) => {
                warn!("Redis unavailable, page cache disabled: {e}");
                None
            }
        },
        None => {
            warn!("REDIS_URL not set, page cache disabled");
            None
        }
    };

    let state = AppState {
        content,
        cache,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_content_source(config: &Config) -> Result<Arc<dyn ContentSource>> {
    match &config.content {
        ContentBackend::Prismic {
            endpoint,
            access_token,
        } => {
            let client = PrismicClient::new(endpoint.clone(), access_token.clone())?;
            info!("Prismic client initialized ({})", client.endpoint());
            Ok(Arc::new(client))
        }
        ContentBackend::Fixtures(path) => {
            let source = MemorySource::from_file(path)?;
            info!(
                "Serving {} fixture documents from {}",
                source.len(),
                path.display()
            );
            Ok(Arc::new(source))
        }
    }
}
