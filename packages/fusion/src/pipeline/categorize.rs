//! Categorizer - assign each theme exactly one category.
//!
//! Three-step fallback chain: oracle classification, then case-insensitive
//! keyword matching, then the first category. A category is always
//! assigned, always from the caller's list, never invented.

use tracing::{debug, warn};

use crate::error::{FusionError, Result};
use crate::pipeline::chunk::leading_excerpt;
use crate::pipeline::prompts::{format_theme_context, CATEGORIZE_QUESTION};
use crate::pipeline::PipelineRun;
use crate::traits::oracle::Oracle;
use crate::types::theme::{AssignmentMethod, CategoryAssignment, Theme};

/// Case-insensitive substring match of category names against the theme.
///
/// Matches against the title first, then the summary (or raw content when
/// no summary exists); the first matching category in list order wins.
pub fn keyword_category<'a>(theme: &Theme, categories: &'a [String]) -> Option<&'a String> {
    let haystack = format!(
        "{}\n{}",
        theme.title,
        theme.summary().unwrap_or(&theme.content)
    )
    .to_lowercase();

    categories
        .iter()
        .find(|category| haystack.contains(&category.to_lowercase()))
}

/// Assign a category to a theme.
///
/// Themes that met the summarization threshold take the oracle path;
/// below-threshold themes and cancelled runs use the keyword fallback
/// directly. An out-of-range classify index is treated as malformed
/// output, never trusted.
///
/// The only hard error is an empty category list, rejected before any
/// oracle call.
pub async fn categorize<O: Oracle>(
    oracle: &O,
    theme: &Theme,
    categories: &[String],
    run: &mut PipelineRun<'_>,
) -> Result<CategoryAssignment> {
    if categories.is_empty() {
        return Err(FusionError::config("categories must not be empty"));
    }

    let use_oracle =
        theme.len() >= run.config.min_members_for_summary && !run.cancel.is_cancelled();

    if use_oracle {
        let source = theme.summary().unwrap_or(&theme.content);
        let excerpt = leading_excerpt(source, run.config.max_chunk_size, run.config.overlap);
        let context = format_theme_context(&theme.title, &excerpt);

        match oracle
            .classify(CATEGORIZE_QUESTION, categories, &context)
            .await
        {
            Ok(index) if index < categories.len() => {
                debug!(theme_id = %theme.id, category = %categories[index], "theme classified");
                return Ok(CategoryAssignment {
                    theme_id: theme.id,
                    category: categories[index].clone(),
                    method: AssignmentMethod::Oracle,
                });
            }
            Ok(index) => {
                warn!(
                    index,
                    options = categories.len(),
                    "classify returned an out-of-range index, falling back"
                );
            }
            Err(e) => {
                warn!(error = %e, theme_id = %theme.id, "classification failed, falling back");
            }
        }
    }

    if let Some(category) = keyword_category(theme, categories) {
        return Ok(CategoryAssignment {
            theme_id: theme.id,
            category: category.clone(),
            method: AssignmentMethod::KeywordMatch,
        });
    }

    Ok(CategoryAssignment {
        theme_id: theme.id,
        category: categories[0].clone(),
        method: AssignmentMethod::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullObserver;
    use crate::testing::MockOracle;
    use crate::types::{article::Article, config::FusionConfig, policy::CompressionPolicy};
    use tokio_util::sync::CancellationToken;

    fn categories() -> Vec<String> {
        vec![
            "Weather".to_string(),
            "Politics".to_string(),
            "Sports".to_string(),
        ]
    }

    fn paired_theme() -> Theme {
        let a = Article::new("Election results", "https://example.com/a", "Votes are in.");
        let b = Article::new(
            "Election results, updated",
            "https://example.com/b",
            "Final tally released.",
        );
        let mut theme = Theme::seeded(&a);
        theme.absorb(&b);
        theme
    }

    fn singleton_theme(title: &str, body: &str) -> Theme {
        Theme::seeded(&Article::new(title, "https://example.com/x", body))
    }

    struct Ctx {
        config: FusionConfig,
        policy: CompressionPolicy,
        cancel: CancellationToken,
    }

    impl Ctx {
        fn new() -> Self {
            Self {
                config: FusionConfig::default(),
                policy: CompressionPolicy::default(),
                cancel: CancellationToken::new(),
            }
        }

        fn run(&self) -> PipelineRun<'_> {
            PipelineRun::new(&self.config, &self.policy, &NullObserver, &self.cancel)
        }
    }

    #[tokio::test]
    async fn test_empty_categories_rejected_before_oracle() {
        let oracle = MockOracle::new();
        let theme = paired_theme();
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let result = categorize(&oracle, &theme, &[], &mut run).await;

        assert!(matches!(result, Err(FusionError::Config { .. })));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_classification() {
        let oracle = MockOracle::new().with_classification("Election results", 1);
        let mut theme = paired_theme();
        theme.set_summary("The election concluded.".to_string());
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        assert_eq!(assignment.category, "Politics");
        assert_eq!(assignment.method, AssignmentMethod::Oracle);
        assert_eq!(assignment.theme_id, theme.id);
    }

    #[tokio::test]
    async fn test_out_of_range_index_not_trusted() {
        let oracle = MockOracle::new().with_classification("Election results", 99);
        let mut theme = paired_theme();
        theme.set_summary("A politics story.".to_string());
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        // The summary mentions "politics", so the keyword fallback fires.
        assert_eq!(assignment.category, "Politics");
        assert_eq!(assignment.method, AssignmentMethod::KeywordMatch);
    }

    #[tokio::test]
    async fn test_failed_classify_falls_back_to_default() {
        let oracle = MockOracle::new().failing_classify();
        let theme = paired_theme();
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        // Nothing in the theme matches a category name.
        assert_eq!(assignment.category, "Weather");
        assert_eq!(assignment.method, AssignmentMethod::Default);
    }

    #[tokio::test]
    async fn test_singleton_skips_oracle() {
        let oracle = MockOracle::new();
        let theme = singleton_theme("Weather forecast", "Rain expected.");
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        assert_eq!(assignment.category, "Weather");
        assert_eq!(assignment.method, AssignmentMethod::KeywordMatch);
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_keyword_match_is_case_insensitive() {
        let oracle = MockOracle::new();
        let theme = singleton_theme("SPORTS roundup", "Scores from the weekend.");
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        assert_eq!(assignment.category, "Sports");
    }

    #[tokio::test]
    async fn test_first_matching_category_wins() {
        let oracle = MockOracle::new();
        // Both "Weather" and "Sports" appear; list order decides.
        let theme = singleton_theme("Sports day weather", "Sunny skies for the match.");
        let ctx = Ctx::new();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        assert_eq!(assignment.category, "Weather");
    }

    #[tokio::test]
    async fn test_cancelled_run_uses_fallback_only() {
        let oracle = MockOracle::new().with_classification("Election results", 1);
        let mut theme = paired_theme();
        theme.set_summary("A politics story.".to_string());
        let ctx = Ctx::new();
        ctx.cancel.cancel();
        let mut run = ctx.run();

        let assignment = categorize(&oracle, &theme, &categories(), &mut run)
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 0);
        assert_eq!(assignment.method, AssignmentMethod::KeywordMatch);
        assert_eq!(assignment.category, "Politics");
    }
}
