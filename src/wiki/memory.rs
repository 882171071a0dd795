//! In-memory content source for tests and offline runs

use std::collections::HashMap;

use async_trait::async_trait;

use super::{ContentSource, LookupError, Page};

/// Content source backed by fixed search results and pages.
///
/// Unknown queries return no titles; unknown titles are `PageNotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    searches: HashMap<String, Vec<String>>,
    pages: HashMap<String, Result<Page, LookupError>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `titles`
    pub fn with_search(mut self, query: impl Into<String>, titles: &[&str]) -> Self {
        self.searches
            .insert(query.into(), titles.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Serve `html` for `title`
    pub fn with_page(mut self, title: impl Into<String>, url: impl Into<String>, html: impl Into<String>) -> Self {
        let title = title.into();
        let page = Page {
            title: title.clone(),
            url: url.into(),
            html: html.into(),
        };
        self.pages.insert(title, Ok(page));
        self
    }

    /// Make `title` a disambiguation page
    pub fn with_disambiguation(mut self, title: impl Into<String>, candidates: &[&str]) -> Self {
        let title = title.into();
        let err = LookupError::Disambiguation {
            title: title.clone(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        };
        self.pages.insert(title, Err(err));
        self
    }

    /// Make every lookup of `title` fail with a transport error
    pub fn with_failure(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.pages
            .insert(title.into(), Err(LookupError::Request(message.into())));
        self
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    async fn fetch_page(&self, title: &str) -> Result<Page, LookupError> {
        self.pages.get(title).cloned().unwrap_or_else(|| {
            Err(LookupError::PageNotFound {
                title: title.to_string(),
            })
        })
    }
}
