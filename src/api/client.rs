use reqwest::{Client, Url};
use std::time::Duration;

use crate::config::CONFIG;
use crate::data_models::{SearchResponse, SearchResult};

use super::{Operation, SearchService, ServiceError};

/// [`SearchService`] over HTTP: `POST {base}/index?url=..` and
/// `GET {base}/search?query=..`.
#[derive(Debug, Clone)]
pub struct HttpSearchService {
    client: Client,
    index_url: Url,
    search_url: Url,
}

impl HttpSearchService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let invalid = |reason: String| ServiceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        // A trailing slash keeps `join` from replacing the last path segment.
        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let index_url = base.join("index").map_err(|e| invalid(e.to_string()))?;
        let search_url = base.join("search").map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            index_url,
            search_url,
        })
    }

    /// Create a service using environment configuration
    pub fn from_config() -> Result<Self, ServiceError> {
        Self::new(&CONFIG.api_url, Duration::from_secs(CONFIG.timeout_secs))
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

impl SearchService for HttpSearchService {
    async fn index(&self, url: &str) -> Result<(), ServiceError> {
        log::info!("requesting index of {url}");
        let res = self
            .client
            .post(self.index_url.clone())
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                operation: Operation::Index,
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                operation: Operation::Index,
                status,
            });
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ServiceError> {
        log::info!("searching for {query:?}");
        let transport = |source: reqwest::Error| ServiceError::Transport {
            operation: Operation::Search,
            source,
        };
        let res = self
            .client
            .get(self.search_url.clone())
            .query(&[("query", query)])
            .send()
            .await
            .map_err(transport)?;

        // The body is decoded whatever the status: a JSON error body has no
        // `results` and reads as an empty list, anything else fails to decode.
        let status = res.status();
        if !status.is_success() {
            log::warn!("search returned {status}, reading body anyway");
        }

        let body = res.bytes().await.map_err(transport)?;
        let response = SearchResponse::from_slice(&body)?;
        log::info!("search returned {} results", response.results.len());
        Ok(response.results)
    }
}
