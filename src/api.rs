use crate::data::BookPage;
use async_trait::async_trait;
use thiserror::Error;

/// Gutendex-style catalog endpoint. Compiled in; there is no runtime
/// configuration for it.
pub const API_BASE_URL: &str = "http://skunkworks.ignitesol.com:8000";

/// Restricts results to books that carry at least one image resource,
/// used as a proxy for "has a cover".
const COVER_MIME_FILTER: &str = "image/";

/// Failures surfaced by the catalog client. Either the transport/status
/// layer failed or the body did not decode; there is no retry.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("catalog API error: {code} {reason}")]
    Status { code: u16, reason: String },
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed catalog response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Parameters for one page fetch.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct BookQuery {
    pub topic: String,
    /// Trimmed before sending; whitespace-only text is omitted entirely.
    pub search: Option<String>,
    /// Page number, or a full continuation URL echoed by a previous
    /// response (followed verbatim).
    pub page: Option<String>,
}

impl BookQuery {
    pub fn topic(topic: impl Into<String>) -> Self {
        BookQuery {
            topic: topic.into(),
            ..BookQuery::default()
        }
    }

    /// A locator that is an absolute URL is an upstream pagination link
    /// and bypasses query building.
    pub fn continuation_url(&self) -> Option<&str> {
        self.page
            .as_deref()
            .filter(|p| p.starts_with("http://") || p.starts_with("https://"))
    }

    /// Query parameters for a fresh (non-continuation) request.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("topic", self.topic.clone()),
            ("mime_type", COVER_MIME_FILTER.to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                params.push(("search", search.to_string()));
            }
        }
        if let Some(page) = &self.page {
            params.push(("page", page.clone()));
        }
        params
    }
}

/// Seam between the list controller and the network, so tests can drive
/// the controller from scripted pages.
#[async_trait]
pub trait BookSource {
    async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage, ApiError>;
}

/// HTTP client for the catalog endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new() -> CatalogClient {
        CatalogClient::with_base_url(API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> CatalogClient {
        CatalogClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for CatalogClient {
    fn default() -> CatalogClient {
        CatalogClient::new()
    }
}

#[async_trait]
impl BookSource for CatalogClient {
    async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage, ApiError> {
        let request = match query.continuation_url() {
            Some(url) => self.client.get(url),
            None => self
                .client
                .get(format!("{}/books", self.base_url))
                .query(&query.params()),
        };

        log::debug!("fetching books: topic={}", query.topic);
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }
        response.json::<BookPage>().await.map_err(ApiError::Decode)
    }
}
