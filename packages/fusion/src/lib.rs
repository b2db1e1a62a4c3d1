//! Document Fusion Library
//!
//! A batch of short articles goes in; categorized, summarized themes come
//! out. The pipeline clusters articles that cover the same subject,
//! compresses each multi-article theme to a bounded token budget through
//! recursive chunked summarization, and assigns every theme one category
//! from a caller-supplied list.
//!
//! # Design Philosophy
//!
//! **"The oracle is fallible; the pipeline is not"**
//!
//! - Every LLM capability sits behind the [`Oracle`] trait
//! - Oracle failures degrade locally (fewer merges, fallback categories),
//!   never abort a run
//! - Termination never depends on oracle compliance: the compression depth
//!   bound is enforced unconditionally
//! - Strictly sequential oracle calls: the oracle is a shared,
//!   rate-limited resource
//! - Strongly-typed, validated configuration; no loose dictionaries
//!
//! # Usage
//!
//! ```rust,ignore
//! use fusion::{Article, FusionConfig, FusionPipeline};
//!
//! let articles = vec![
//!     Article::new("Election results", "https://news.example/a", "Votes are in."),
//!     Article::new("Election update", "https://news.example/b", "Final tally."),
//!     Article::new("Weather forecast", "https://news.example/c", "Rain ahead."),
//! ];
//! let categories = vec!["Politics".to_string(), "Weather".to_string()];
//!
//! let pipeline = FusionPipeline::new(oracle);
//! let report = pipeline.run(&articles, &categories).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Oracle, ArticleFetcher)
//! - [`types`] - Articles, themes, policy, and configuration
//! - [`pipeline`] - Chunking, compression, clustering, categorization
//! - [`progress`] - Progress events and the observer trait
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod progress;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FusionError, Result};
pub use traits::{fetcher::ArticleFetcher, oracle::Oracle};
pub use types::{
    article::{Article, ArticleId},
    config::FusionConfig,
    policy::CompressionPolicy,
    theme::{AssignmentMethod, CategorizedTheme, CategoryAssignment, Theme},
};

// Re-export the pipeline entry point
pub use pipeline::{FusionPipeline, FusionReport, FusionStats, FusionWarning, PipelineRun, Stage};

// Re-export pipeline components
pub use pipeline::{
    // Categorization
    categorize::{categorize, keyword_category},
    // Chunking
    chunk::{approx_tokens, chunk, Chunk},
    // Clustering
    cluster::cluster,
    // Compression
    compress::{Compressed, Compressor},
    // Prompts
    prompts::{
        format_comparison_context, format_rewrite_prompt, format_summarize_prompt,
        format_theme_context, CATEGORIZE_QUESTION, SAME_SUBJECT_QUESTION,
    },
    // Summarization
    summarize::summarize_themes,
};

// Re-export progress observation
pub use progress::{FusionEvent, NullObserver, ProgressObserver};

// Re-export testing utilities
pub use testing::{CollectingObserver, GenerateMode, MockFetcher, MockOracle, OracleCall};
