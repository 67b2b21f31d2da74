//! Google News search via SerpAPI with full-text article scraping.

use super::{clean_text, ArticleSource};
use crate::types::{AppError, Article, Result};
use crate::utils::toml_config::SignalConfig;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Raw SerpAPI response; only the fields the pipeline consumes.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news_results: Vec<NewsResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    // A plain string for `tbm=nws`, an object with `name` for the news engine.
    #[serde(default)]
    source: Value,
    #[serde(default)]
    date: String,
}

impl NewsResult {
    fn source_name(&self) -> String {
        match &self.source {
            Value::String(s) => s.trim().to_string(),
            Value::Object(map) => map
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string(),
            _ => String::new(),
        }
    }
}

/// Article source backed by the SerpAPI Google News endpoint.
pub struct SerpApiSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    num_sources: usize,
}

impl SerpApiSource {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        num_sources: usize,
        fetch_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(concat!("signal-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            num_sources: num_sources.max(1),
        })
    }

    /// Build from the `[search]` config section.
    ///
    /// A missing API key is not an error here; every fetch fails instead, so the
    /// server can still start and report the problem per job.
    pub fn from_config(config: &SignalConfig) -> Result<Self> {
        let api_key = config.search_api_key().ok();
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; news searches will fail",
                config.search.api_key_env
            );
        }
        Self::new(
            config.search.endpoint.clone(),
            api_key,
            config.search.num_sources,
            Duration::from_secs(config.search.fetch_timeout_secs),
        )
    }

    /// Query string sent to the search engine, scoped to the current month.
    pub fn search_query(topic: &str) -> String {
        format!("{} news {}", topic, Utc::now().format("%Y-%m"))
    }

    async fn search(&self, topic: &str) -> Result<Vec<NewsResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Search("Search API key is not configured".to_string()))?;

        let query = Self::search_query(topic);
        let num = self.num_sources.to_string();
        tracing::debug!(query = %query, num_sources = self.num_sources, "Calling SerpAPI");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query.as_str()),
                ("tbm", "nws"),
                ("num", num.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid search response: {}", e)))?;

        if let Some(error) = body.error {
            // SerpAPI reports "no results" through the error field.
            if body.news_results.is_empty() && error.contains("hasn't returned any results") {
                return Ok(Vec::new());
            }
            return Err(AppError::Search(error));
        }

        tracing::info!("Found {} results from SerpAPI", body.news_results.len());
        Ok(body.news_results)
    }

    /// Download one article and extract its paragraph text.
    ///
    /// Never fails: a fetch error becomes a marker in the article content.
    async fn fetch_full_text(&self, url: &str) -> String {
        match self.download(url).await {
            Ok(html) => extract_paragraphs(&html),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch article");
                format!("[Failed to fetch full article: {}]", e)
            }
        }
    }

    async fn download(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    async fn build_article(&self, item: NewsResult) -> Article {
        let url = item.link.trim().to_string();
        let content = clean_text(&self.fetch_full_text(&url).await);
        tracing::debug!(url = %url, content_len = content.len(), "Article text extracted");

        Article {
            id: uuid::Uuid::new_v4().to_string(),
            title: item.title.trim().to_string(),
            source: item.source_name(),
            date: item.date.trim().to_string(),
            url,
            content,
        }
    }
}

#[async_trait]
impl ArticleSource for SerpApiSource {
    async fn fetch(&self, query: &str) -> Result<String> {
        let results = self.search(query).await?;

        let articles: Vec<Article> = stream::iter(results)
            .map(|item| self.build_article(item))
            .buffered(self.num_sources)
            .collect()
            .await;

        serde_json::to_string(&articles)
            .map_err(|e| AppError::Internal(format!("Failed to serialize articles: {}", e)))
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

/// Concatenated text of all `<p>` elements, falling back to the body text.
pub fn extract_paragraphs(html: &str) -> String {
    let document = scraper::Html::parse_document(html);

    let paragraphs: Vec<String> = match scraper::Selector::parse("p") {
        Ok(selector) => document
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
            .collect(),
        Err(_) => Vec::new(),
    };

    if !paragraphs.is_empty() {
        return paragraphs.join("\n");
    }

    match scraper::Selector::parse("body") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(|body| body.text().collect::<String>())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}
