//! MediaWiki action API client

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use super::{ContentSource, LookupError, Page};

const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Wikimedia asks clients to identify themselves with contact details
const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_AUTHORS"),
    ")"
);

/// Configuration for the Wikipedia client
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    pub api_url: String,
    pub search_limit: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            search_limit: 10,
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Wikipedia over the MediaWiki action API
pub struct WikipediaClient {
    client: Client,
    config: WikipediaConfig,
}

/// What `prop=info|pageprops` tells us about a title
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageInfo {
    page_id: u64,
    title: String,
    url: String,
    disambiguation: bool,
}

impl WikipediaClient {
    /// Create a new client
    pub fn new(config: WikipediaConfig) -> Result<Self, LookupError> {
        if !has_contact(&config.user_agent) {
            warn!("User agent {:?} has no contact url or email", config.user_agent);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value, LookupError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Request(format!("HTTP {}", status)));
        }

        let body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            let info = error.get("info").and_then(Value::as_str).unwrap_or("unknown API error");
            return Err(LookupError::Request(info.to_string()));
        }
        Ok(body)
    }

    async fn page_info(&self, title: &str) -> Result<PageInfo, LookupError> {
        let body = self
            .get(&[
                ("action", "query"),
                ("prop", "info|pageprops"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        parse_page_info(&body, title)
    }

    async fn disambiguation_candidates(&self, title: &str) -> Result<Vec<String>, LookupError> {
        let body = self
            .get(&[
                ("action", "query"),
                ("prop", "links"),
                ("plnamespace", "0"),
                ("pllimit", "max"),
                ("titles", title),
            ])
            .await?;
        Ok(parse_links(&body))
    }

    async fn page_html(&self, page_id: u64) -> Result<String, LookupError> {
        let page_id = page_id.to_string();
        let body = self
            .get(&[
                ("action", "parse"),
                ("pageid", &page_id),
                ("prop", "text"),
                ("disableeditsection", "1"),
            ])
            .await?;
        body.pointer("/parse/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LookupError::Request("parse response has no text".to_string()))
    }
}

#[async_trait]
impl ContentSource for WikipediaClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = self.config.search_limit.to_string();
        let body = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srprop", ""),
                ("srlimit", &limit),
                ("srsearch", query),
            ])
            .await?;
        let titles = parse_search_titles(&body);
        debug!("search {:?} -> {} titles", query, titles.len());
        Ok(titles)
    }

    /// Exact-title lookup with redirects followed. Near misses are
    /// `PageNotFound`; there is no fuzzy title suggestion.
    async fn fetch_page(&self, title: &str) -> Result<Page, LookupError> {
        let info = self.page_info(title).await?;

        if info.disambiguation {
            let candidates = self.disambiguation_candidates(&info.title).await?;
            return Err(LookupError::Disambiguation {
                title: title.to_string(),
                candidates,
            });
        }

        let html = self.page_html(info.page_id).await?;
        debug!("fetched {:?} ({} bytes of html)", info.title, html.len());
        Ok(Page {
            title: info.title,
            url: info.url,
            html,
        })
    }
}

fn has_contact(user_agent: &str) -> bool {
    user_agent.contains('@') || user_agent.contains("http://") || user_agent.contains("https://")
}

fn parse_search_titles(body: &Value) -> Vec<String> {
    body.pointer("/query/search")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_page_info(body: &Value, requested: &str) -> Result<PageInfo, LookupError> {
    let not_found = || LookupError::PageNotFound {
        title: requested.to_string(),
    };

    let page = body
        .pointer("/query/pages/0")
        .ok_or_else(not_found)?;

    let flagged = |key: &str| page.get(key).and_then(Value::as_bool).unwrap_or(false);
    if flagged("missing") || flagged("invalid") {
        return Err(not_found());
    }

    let page_id = page.get("pageid").and_then(Value::as_u64).ok_or_else(not_found)?;
    let title = page
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(requested)
        .to_string();
    let url = page
        .get("fullurl")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let disambiguation = page.pointer("/pageprops/disambiguation").is_some();

    Ok(PageInfo {
        page_id,
        title,
        url,
        disambiguation,
    })
}

fn parse_links(body: &Value) -> Vec<String> {
    body.pointer("/query/pages/0/links")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(|link| link.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
