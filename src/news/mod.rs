//! Article retrieval.
//!
//! The search stage talks to an [`ArticleSource`]. Sources return the raw JSON
//! document they produced rather than parsed articles so the pipeline can
//! tell a malformed payload apart from an empty one.

pub mod clean;
pub mod serpapi;

use crate::types::Result;
use async_trait::async_trait;

pub use clean::clean_text;
pub use serpapi::SerpApiSource;

/// A capability that turns a search query into a JSON array of articles.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch articles for `query` as a JSON document.
    async fn fetch(&self, query: &str) -> Result<String>;

    /// Human-readable source name for logs.
    fn name(&self) -> &str;
}
