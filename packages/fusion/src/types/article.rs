//! Article types - the immutable input documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identifier for an article, derived from its link.
///
/// Re-ingesting the same link yields the same id, so a re-fetched article
/// supersedes the earlier record instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Create an id from an explicit string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from a link (SHA-256, truncated hex).
    pub fn from_link(link: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(link.as_bytes());
        let digest = hasher.finalize();
        Self(format!("{:x}", digest)[..16].to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An article collected from an external source.
///
/// Articles are immutable once created: a re-fetched article supersedes
/// the old record (same id) rather than editing it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Stable key, derived from the link unless supplied explicitly
    pub id: ArticleId,

    /// Headline or title
    pub title: String,

    /// Canonical link to the source
    pub link: String,

    /// Textual content (feed description or full scraped text)
    pub body: String,

    /// Provenance labels (feed name, search engine, source host)
    #[serde(default)]
    pub source_tags: Vec<String>,

    /// Publication date, if the source provided one
    pub published_at: Option<DateTime<Utc>>,

    /// When this record was created
    pub ingested_at: DateTime<Utc>,
}

impl Article {
    /// Create a new article. The id is derived from the link.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let link = link.into();
        Self {
            id: ArticleId::from_link(&link),
            title: title.into(),
            link,
            body: body.into(),
            source_tags: Vec::new(),
            published_at: None,
            ingested_at: Utc::now(),
        }
    }

    /// Override the derived id with an explicit one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = ArticleId::new(id);
        self
    }

    /// Add a provenance tag.
    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tags.push(tag.into());
        self
    }

    /// Set the publication date.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Extract the host from the link, for source tagging.
    pub fn domain(&self) -> Option<String> {
        url::Url::parse(&self.link)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    /// Body length in characters.
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_derived_from_link() {
        let a = Article::new("Title", "https://example.com/story", "Body");
        let b = Article::new("Updated title", "https://example.com/story", "New body");
        assert_eq!(a.id, b.id);

        let c = Article::new("Title", "https://example.com/other", "Body");
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_explicit_id() {
        let a = Article::new("Title", "https://example.com", "Body").with_id("custom-1");
        assert_eq!(a.id.as_str(), "custom-1");
    }

    #[test]
    fn test_domain() {
        let a = Article::new("Title", "https://news.example.com/story?id=1", "Body");
        assert_eq!(a.domain().as_deref(), Some("news.example.com"));

        let b = Article::new("Title", "not a url", "Body");
        assert_eq!(b.domain(), None);
    }

    #[test]
    fn test_source_tags() {
        let a = Article::new("Title", "https://example.com", "Body")
            .with_source_tag("rss")
            .with_source_tag("world-news");
        assert_eq!(a.source_tags, vec!["rss", "world-news"]);
    }
}
