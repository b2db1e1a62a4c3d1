//! ArticleFetcher trait - optional full-text retrieval.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::article::Article;

/// Fetches the full text behind an article's link.
///
/// Feed items often carry only a short description; when a fetcher is
/// configured, the theme summarizer replaces each member's stored body with
/// the fetched full text before compression. Fetching is an external
/// collaborator capability: network access, markup extraction, and
/// timeouts all live behind this trait.
///
/// A fetch failure is not fatal: the summarizer falls back to the stored
/// body for that article.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetch the full text for an article's link.
    async fn fetch_full_text(&self, article: &Article) -> Result<String>;
}
