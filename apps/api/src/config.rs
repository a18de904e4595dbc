use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::cms::prismic::repository_endpoint;
use crate::pages::metadata::SiteDefaults;

/// Where page content comes from.
#[derive(Debug, Clone)]
pub enum ContentBackend {
    /// Live Prismic repository at this API endpoint.
    Prismic {
        endpoint: String,
        access_token: Option<String>,
    },
    /// JSON fixture file of documents.
    Fixtures(PathBuf),
}

/// Application configuration loaded from environment variables.
/// Fails at startup if no content backend is configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub content: ContentBackend,
    pub redis_url: Option<String>,
    pub page_cache_ttl_secs: u64,
    pub site_title: String,
    pub site_description: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            content: content_backend()?,
            redis_url: optional_env("REDIS_URL"),
            page_cache_ttl_secs: optional_env("PAGE_CACHE_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("PAGE_CACHE_TTL_SECS must be a whole number of seconds")?
                .unwrap_or(300),
            site_title: optional_env("SITE_TITLE").unwrap_or_else(|| "Werobot".to_string()),
            site_description: optional_env("SITE_DESCRIPTION")
                .unwrap_or_else(|| "Werobot 2026".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn site_defaults(&self) -> SiteDefaults {
        SiteDefaults {
            title: self.site_title.clone(),
            description: self.site_description.clone(),
        }
    }
}

fn content_backend() -> Result<ContentBackend> {
    if let Some(path) = optional_env("CONTENT_FIXTURES") {
        return Ok(ContentBackend::Fixtures(PathBuf::from(path)));
    }

    let endpoint = match (
        optional_env("PRISMIC_API_ENDPOINT"),
        optional_env("PRISMIC_REPOSITORY"),
    ) {
        (Some(endpoint), _) => endpoint,
        (None, Some(repository)) => repository_endpoint(&repository),
        (None, None) => bail!(
            "No content source configured: set PRISMIC_REPOSITORY (or PRISMIC_API_ENDPOINT), \
             or CONTENT_FIXTURES for local fixtures"
        ),
    };

    Ok(ContentBackend::Prismic {
        endpoint,
        access_token: optional_env("PRISMIC_ACCESS_TOKEN"),
    })
}

/// Reads an env var, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
