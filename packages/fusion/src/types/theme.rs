//! Theme types - clusters of articles covering the same subject.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::article::{Article, ArticleId};

/// A cluster of one or more articles judged to cover the same subject.
///
/// A theme starts as a singleton seeded by one article and grows as the
/// clusterer absorbs articles judged similar to the seed. Membership is an
/// ordered set: absorption order is preserved and an article can only be a
/// member once. The seed article's title seeds the theme's title.
///
/// Once clustering completes the theme is finalized; the summarizer then
/// populates `summary` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Unique id for this theme
    pub id: Uuid,

    /// Theme title, seeded from the first member
    pub title: String,

    /// Member article ids, in absorption order, seed first
    members: IndexSet<ArticleId>,

    /// Concatenated member content, in absorption order
    pub content: String,

    /// Bounded summary, populated by the theme summarizer
    summary: Option<String>,

    /// When this theme was created
    pub created_at: DateTime<Utc>,
}

/// Render one article as a titled section of theme content.
pub(crate) fn article_section(title: &str, body: &str) -> String {
    format!("# {}\n\n{}", title, body)
}

impl Theme {
    /// Create a theme seeded with a single article.
    pub fn seeded(article: &Article) -> Self {
        let mut members = IndexSet::new();
        members.insert(article.id.clone());

        Self {
            id: Uuid::new_v4(),
            title: article.title.clone(),
            members,
            content: article_section(&article.title, &article.body),
            summary: None,
            created_at: Utc::now(),
        }
    }

    /// Absorb another article into this theme.
    ///
    /// Appends the article's content and records membership. Absorbing an
    /// article that is already a member is a no-op.
    pub fn absorb(&mut self, article: &Article) {
        if self.members.insert(article.id.clone()) {
            self.content.push_str("\n\n");
            self.content
                .push_str(&article_section(&article.title, &article.body));
        }
    }

    /// Member article ids, in absorption order.
    pub fn members(&self) -> &IndexSet<ArticleId> {
        &self.members
    }

    /// The seed article's id.
    pub fn seed_id(&self) -> &ArticleId {
        self.members
            .first()
            .expect("theme members are never empty")
    }

    /// Number of member articles.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether this theme has exactly one member.
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// The populated summary, if any.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Populate the summary. The first write wins; later calls are ignored.
    pub(crate) fn set_summary(&mut self, summary: String) {
        if self.summary.is_none() {
            self.summary = Some(summary);
        }
    }

    /// Replace the concatenated content (used when full text is fetched).
    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }
}

/// How a category was assigned to a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    /// The oracle classified the theme
    Oracle,

    /// A category name matched the theme's text
    KeywordMatch,

    /// No rule applied; the first category was assigned
    Default,
}

/// The category assigned to a theme.
///
/// `category` is always an element of the caller's category list, never
/// invented by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAssignment {
    /// The theme this assignment belongs to
    pub theme_id: Uuid,

    /// The assigned category, an element of the input list
    pub category: String,

    /// How the assignment was made
    pub method: AssignmentMethod,
}

/// A finalized theme paired with its category assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedTheme {
    /// The theme
    pub theme: Theme,

    /// Its category assignment
    pub assignment: CategoryAssignment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, link: &str, body: &str) -> Article {
        Article::new(title, link, body)
    }

    #[test]
    fn test_seeded_theme_is_singleton() {
        let a = article("Election results", "https://example.com/a", "Votes counted.");
        let theme = Theme::seeded(&a);

        assert_eq!(theme.title, "Election results");
        assert!(theme.is_singleton());
        assert_eq!(theme.seed_id(), &a.id);
        assert!(theme.content.contains("Votes counted."));
        assert!(theme.summary().is_none());
    }

    #[test]
    fn test_absorb_preserves_order() {
        let a = article("A", "https://example.com/a", "body a");
        let b = article("B", "https://example.com/b", "body b");
        let c = article("C", "https://example.com/c", "body c");

        let mut theme = Theme::seeded(&a);
        theme.absorb(&b);
        theme.absorb(&c);

        let ids: Vec<_> = theme.members().iter().cloned().collect();
        assert_eq!(ids, vec![a.id.clone(), b.id, c.id]);
        assert_eq!(theme.seed_id(), &a.id);
        assert_eq!(theme.len(), 3);
    }

    #[test]
    fn test_absorb_twice_is_noop() {
        let a = article("A", "https://example.com/a", "body a");
        let b = article("B", "https://example.com/b", "body b");

        let mut theme = Theme::seeded(&a);
        theme.absorb(&b);
        let content_before = theme.content.clone();
        theme.absorb(&b);

        assert_eq!(theme.len(), 2);
        assert_eq!(theme.content, content_before);
    }

    #[test]
    fn test_summary_first_write_wins() {
        let a = article("A", "https://example.com/a", "body a");
        let mut theme = Theme::seeded(&a);

        theme.set_summary("first".to_string());
        theme.set_summary("second".to_string());

        assert_eq!(theme.summary(), Some("first"));
    }
}
