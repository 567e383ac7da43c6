use std::future::Future;

use reqwest::StatusCode;

use crate::data_models::SearchResult;

pub mod client;

pub use client::HttpSearchService;

/// Which remote call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Index,
    Search,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Index => write!(f, "index"),
            Operation::Search => write!(f, "search"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid service url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{operation} request failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} request returned {status}")]
    Status {
        operation: Operation,
        status: StatusCode,
    },

    #[error("search response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The remote indexing/search collaborator.
///
/// `index` resolves once the service acknowledged the crawl request;
/// `search` resolves with results in the order the service ranked them.
pub trait SearchService: Send + Sync {
    fn index(&self, url: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, ServiceError>> + Send;
}
