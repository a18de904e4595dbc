//! Prismic REST API v2 client — the only code that talks to the CMS over HTTP.
//!
//! Every query first resolves the repository's master ref, then hits the
//! documents search endpoint with a predicate. Rate limits and 5xx responses
//! are retried with exponential backoff.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CmsError, ContentSource, Document};

const PAGE_SIZE: u32 = 100;
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 250;

#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default = "first_page")]
    total_pages: u32,
    results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct PrismicErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    pub fn new(endpoint: String, access_token: Option<String>) -> Result<Self, CmsError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET with retry on 429, 5xx, and transport errors.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CmsError> {
        let mut attempt = 0;
        loop {
            match self.get_json_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    // 250ms, 500ms
                    let delay =
                        std::time::Duration::from_millis(BACKOFF_BASE_MS * (1 << (attempt - 1)));
                    warn!(
                        "Prismic request attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json_once<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CmsError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PrismicErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(CmsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn master_ref(&self) -> Result<String, CmsError> {
        let info: ApiInfo = self.get_json(&self.endpoint, &[]).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::NoMasterRef)
    }

    async fn search_page(
        &self,
        reference: &str,
        predicate: &str,
        page: u32,
    ) -> Result<SearchResponse, CmsError> {
        let url = format!("{}/documents/search", self.endpoint);
        let query = [
            ("ref", reference.to_string()),
            ("q", predicate.to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        let response: SearchResponse = self.get_json(&url, &query).await?;
        debug!(
            "Prismic search {} page {}/{}: {} results",
            predicate,
            response.page,
            response.total_pages,
            response.results.len()
        );
        Ok(response)
    }

    async fn first(&self, predicate: &str) -> Result<Option<Document>, CmsError> {
        let reference = self.master_ref().await?;
        let response = self.search_page(&reference, predicate, 1).await?;
        Ok(response.results.into_iter().next())
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn get_single(&self, doc_type: &str) -> Result<Document, CmsError> {
        self.first(&type_predicate(doc_type))
            .await?
            .ok_or_else(|| CmsError::not_found(doc_type, "(single)"))
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError> {
        self.first(&uid_predicate(doc_type, uid))
            .await?
            .ok_or_else(|| CmsError::not_found(doc_type, uid))
    }

    async fn get_all_by_type(&self, doc_type: &str) -> Result<Vec<Document>, CmsError> {
        let reference = self.master_ref().await?;
        let predicate = type_predicate(doc_type);

        let mut documents = Vec::new();
        let mut page = 1;
        loop {
            let response = self.search_page(&reference, &predicate, page).await?;
            documents.extend(response.results);
            if response.page >= response.total_pages {
                break;
            }
            page = response.page + 1;
        }
        Ok(documents)
    }
}

/// Default API endpoint for a Prismic repository name.
pub fn repository_endpoint(repository: &str) -> String {
    format!("https://{repository}.cdn.prismic.io/api/v2")
}

fn type_predicate(doc_type: &str) -> String {
    format!("[[at(document.type, \"{}\")]]", escape(doc_type))
}

fn uid_predicate(doc_type: &str, uid: &str) -> String {
    format!("[[at(my.{}.uid, \"{}\")]]", doc_type, escape(uid))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_endpoint() {
        assert_eq!(
            repository_endpoint("werobot"),
            "https://werobot.cdn.prismic.io/api/v2"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = PrismicClient::new("https://example.test/api/v2/".into(), None).unwrap();
        assert_eq!(client.endpoint(), "https://example.test/api/v2");
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            type_predicate("homepage"),
            r#"[[at(document.type, "homepage")]]"#
        );
        assert_eq!(
            uid_predicate("program", "day-one"),
            r#"[[at(my.program.uid, "day-one")]]"#
        );
    }

    #[test]
    fn test_predicate_escapes_quotes() {
        assert_eq!(
            uid_predicate("about", r#"a"b\c"#),
            r#"[[at(my.about.uid, "a\"b\\c")]]"#
        );
    }

    #[test]
    fn test_master_ref_shape() {
        let info: ApiInfo = serde_json::from_value(json!({
            "refs": [
                { "id": "preview", "ref": "Zp-1", "label": "Preview", "isMasterRef": false },
                { "id": "master", "ref": "Zm-9", "label": "Master", "isMasterRef": true }
            ]
        }))
        .unwrap();

        let master = info.refs.into_iter().find(|r| r.is_master_ref).unwrap();
        assert_eq!(master.reference, "Zm-9");
    }

    #[test]
    fn test_search_response_shape() {
        let response: SearchResponse = serde_json::from_value(json!({
            "page": 1,
            "results_per_page": 100,
            "total_pages": 2,
            "results": [
                { "id": "A1", "uid": "about", "type": "about", "data": { "slices": [] } }
            ]
        }))
        .unwrap();

        assert_eq!(response.total_pages, 2);
        assert_eq!(response.results[0].uid.as_deref(), Some("about"));
    }
}
