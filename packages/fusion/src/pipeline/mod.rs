//! The fusion pipeline - clustering, compression, and categorization.
//!
//! Control flow: articles → clusterer → themes → theme summarizer
//! (recursive compression) → categorizer → categorized themes. Every stage
//! is a strict sequence of awaited oracle calls; later stages depend on the
//! full output of earlier ones, and the oracle is treated as a shared,
//! rate-limited resource that is never hammered concurrently.

pub mod categorize;
pub mod chunk;
pub mod cluster;
pub mod compress;
pub mod prompts;
pub mod summarize;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{FusionError, Result};
use crate::progress::{FusionEvent, NullObserver, ProgressObserver};
use crate::traits::{fetcher::ArticleFetcher, oracle::Oracle};
use crate::types::{
    article::{Article, ArticleId},
    config::FusionConfig,
    policy::CompressionPolicy,
    theme::CategorizedTheme,
};

/// A pipeline stage, for cancellation reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Clustering,
    Summarization,
    Categorization,
}

/// Counters accumulated across one fusion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusionStats {
    /// Pairwise comparisons attempted
    pub comparisons: usize,

    /// Comparisons that failed and degraded to "not similar"
    pub comparisons_failed: usize,

    /// Total compression rounds across all themes
    pub compression_rounds: usize,

    /// Themes summarized by compression
    pub themes_summarized: usize,

    /// Below-threshold themes passed through with the seed body
    pub themes_passed_through: usize,

    /// Singleton themes dropped by configuration
    pub singletons_dropped: usize,
}

/// Soft conditions reported alongside results, never raised as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FusionWarning {
    /// A theme's text was still over budget when `max_depth` stopped the
    /// compression loop
    CompressionNotConverged {
        theme_id: Uuid,
        tokens: usize,
        budget: usize,
    },

    /// Some comparisons failed and were treated as "not similar"
    ComparisonsDegraded { failed: usize },

    /// The run was cancelled during this stage
    Cancelled { stage: Stage },
}

/// The output of a fusion run.
///
/// An uncancelled run contains every input article in exactly one theme
/// (unless singletons were dropped by configuration), and every theme
/// carries a category from the caller's list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionReport {
    /// Categorized themes, in clustering order
    pub themes: Vec<CategorizedTheme>,

    /// Run counters
    pub stats: FusionStats,

    /// Soft warnings (non-convergence, degraded comparisons, cancellation)
    pub warnings: Vec<FusionWarning>,

    /// False only when the run was cancelled
    pub completed: bool,
}

impl FusionReport {
    /// Whether the run completed with no warnings.
    pub fn is_clean(&self) -> bool {
        self.completed && self.warnings.is_empty()
    }
}

/// Explicit run context passed through every stage.
///
/// Owns the run's counters and warning sink; there is no module-level
/// mutable state anywhere in the pipeline.
pub struct PipelineRun<'a> {
    /// Validated configuration for this run
    pub config: &'a FusionConfig,

    /// Compression policy forwarded into prompts
    pub policy: &'a CompressionPolicy,

    /// Observer notified between oracle calls
    pub observer: &'a dyn ProgressObserver,

    /// Cancellation signal checked between oracle calls
    pub cancel: &'a CancellationToken,

    /// Counters accumulated by the stages
    pub stats: FusionStats,

    /// Warnings accumulated by the stages
    pub warnings: Vec<FusionWarning>,
}

impl<'a> PipelineRun<'a> {
    /// Create a run context.
    pub fn new(
        config: &'a FusionConfig,
        policy: &'a CompressionPolicy,
        observer: &'a dyn ProgressObserver,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            policy,
            observer,
            cancel,
            stats: FusionStats::default(),
            warnings: Vec::new(),
        }
    }
}

/// The main entry point - fuse a batch of articles into categorized themes.
///
/// # Example
///
/// ```rust,ignore
/// use fusion::{Article, FusionPipeline};
///
/// let pipeline = FusionPipeline::new(oracle);
/// let categories = vec!["Politics".to_string(), "Weather".to_string()];
///
/// let report = pipeline.run(&articles, &categories).await?;
/// for item in &report.themes {
///     println!("[{}] {}", item.assignment.category, item.theme.title);
/// }
/// ```
pub struct FusionPipeline<O: Oracle> {
    oracle: O,
    config: FusionConfig,
    policy: CompressionPolicy,
    fetcher: Option<Box<dyn ArticleFetcher>>,
    observer: Box<dyn ProgressObserver>,
}

impl<O: Oracle> FusionPipeline<O> {
    /// Create a pipeline with default configuration and policy.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            config: FusionConfig::default(),
            policy: CompressionPolicy::default(),
            fetcher: None,
            observer: Box::new(NullObserver),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: FusionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the compression policy.
    pub fn with_policy(mut self, policy: CompressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a full-text fetcher used before summarization.
    pub fn with_fetcher(mut self, fetcher: impl ArticleFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut FusionConfig {
        &mut self.config
    }

    /// Run the full pipeline.
    pub async fn run(&self, articles: &[Article], categories: &[String]) -> Result<FusionReport> {
        self.run_with_cancel(articles, categories, CancellationToken::new())
            .await
    }

    /// Run the full pipeline with cancellation support.
    ///
    /// When the token fires, the current stage stops issuing oracle calls;
    /// themes already finalized are kept, remaining categorization uses the
    /// deterministic fallbacks, and the report comes back with
    /// `completed = false`.
    pub async fn run_with_cancel(
        &self,
        articles: &[Article],
        categories: &[String],
        cancel: CancellationToken,
    ) -> Result<FusionReport> {
        // Fail fast: configuration problems are rejected before any
        // oracle call is made.
        self.config.validate()?;
        if categories.is_empty() {
            return Err(FusionError::config("categories must not be empty"));
        }

        info!(
            articles = articles.len(),
            categories = categories.len(),
            "fusion run started"
        );

        // A re-fetched article (same id) supersedes the earlier record,
        // keeping the original position in the input order.
        let mut index: IndexMap<ArticleId, Article> = IndexMap::with_capacity(articles.len());
        for article in articles {
            if index.insert(article.id.clone(), article.clone()).is_some() {
                debug!(id = %article.id, "article superseded by a later record");
            }
        }
        let deduped: Vec<Article> = index.values().cloned().collect();

        let mut run = PipelineRun::new(&self.config, &self.policy, self.observer.as_ref(), &cancel);
        let mut cancelled_during: Option<Stage> = None;

        let themes = cluster::cluster(&self.oracle, &deduped, &mut run).await;
        if cancel.is_cancelled() {
            cancelled_during.get_or_insert(Stage::Clustering);
        }

        let themes = summarize::summarize_themes(
            &self.oracle,
            themes,
            &deduped,
            self.fetcher.as_deref(),
            &mut run,
        )
        .await;
        if cancel.is_cancelled() {
            cancelled_during.get_or_insert(Stage::Summarization);
        }

        let mut categorized = Vec::with_capacity(themes.len());
        for theme in themes {
            let assignment =
                categorize::categorize(&self.oracle, &theme, categories, &mut run).await?;
            run.observer.on_event(&FusionEvent::ThemeCategorized {
                theme_id: theme.id,
                category: assignment.category.clone(),
            });
            categorized.push(CategorizedTheme { theme, assignment });
        }
        if cancel.is_cancelled() {
            cancelled_during.get_or_insert(Stage::Categorization);
        }

        let PipelineRun {
            stats,
            mut warnings,
            ..
        } = run;

        if stats.comparisons_failed > 0 {
            warnings.push(FusionWarning::ComparisonsDegraded {
                failed: stats.comparisons_failed,
            });
        }

        let completed = cancelled_during.is_none();
        if let Some(stage) = cancelled_during {
            warnings.push(FusionWarning::Cancelled { stage });
            self.observer.on_event(&FusionEvent::RunCancelled);
        }

        info!(
            themes = categorized.len(),
            completed,
            warnings = warnings.len(),
            "fusion run finished"
        );

        Ok(FusionReport {
            themes: categorized,
            stats,
            warnings,
            completed,
        })
    }
}
