//! Content source - Wikipedia search and page retrieval
//!
//! The tool handlers only see the [`ContentSource`] trait. `WikipediaClient`
//! implements it over the MediaWiki action API; `MemorySource` serves fixed
//! data for tests.

mod client;
pub mod markup;
mod memory;

pub use client::{WikipediaClient, WikipediaConfig};
pub use memory::MemorySource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub url: String,
    pub html: String,
}

/// Search and page-fetch operations used by the lookup tools
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Titles matching `query`, best match first
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError>;

    /// Fetch the page named `title`
    async fn fetch_page(&self, title: &str) -> Result<Page, LookupError>;
}

/// Errors from a content source.
///
/// `PageNotFound` and `Disambiguation` are the recoverable kinds; the page
/// tool reports them back to the model as text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("page '{title}' not found")]
    PageNotFound { title: String },

    #[error("\"{title}\" may refer to:\n{}", candidates.join("\n"))]
    Disambiguation { title: String, candidates: Vec<String> },

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Request(err.to_string())
    }
}
