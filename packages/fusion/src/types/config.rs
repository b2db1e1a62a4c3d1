//! Configuration for the fusion pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Numeric parameters and switches for a fusion run.
///
/// All fields are validated by [`FusionConfig::validate`] before any oracle
/// call is made; an invalid configuration is rejected at the API boundary,
/// never mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Maximum chunk size in characters.
    ///
    /// Used directly for clustering excerpts; the compressor derives its
    /// own chunk size from `context_window` and `chunk_context_ratio`.
    pub max_chunk_size: usize,

    /// Overlap between consecutive chunks, in characters.
    ///
    /// Each chunk after the first repeats this much of the previous
    /// chunk's tail to preserve cross-boundary context. Must be smaller
    /// than `max_chunk_size`.
    pub overlap: usize,

    /// Target summary budget in tokens.
    ///
    /// Compression stops once the text fits this budget (or `max_depth`
    /// is reached).
    pub target_budget: usize,

    /// Maximum compression rounds.
    ///
    /// The sole unconditional termination guarantee: even an oracle that
    /// never shortens text cannot run more than this many rounds.
    pub max_depth: usize,

    /// Minimum members before a theme is summarized by compression.
    ///
    /// Themes below this threshold pass through with the seed article's
    /// raw body as their summary.
    pub min_members_for_summary: usize,

    /// The oracle's usable context window, in tokens.
    pub context_window: usize,

    /// Fraction of the context window used per compression chunk.
    pub chunk_context_ratio: f32,

    /// Per-call output cap for summarization and rewrite generations.
    pub summary_output_tokens: usize,

    /// Run the stylistic rewrite pass even when the compression loop
    /// never ran (input already within budget).
    #[serde(default)]
    pub rewrite_within_budget: bool,

    /// Exclude single-article themes from the output entirely instead of
    /// passing them through unsummarized.
    #[serde(default)]
    pub drop_singletons: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 4096,
            overlap: 256,
            target_budget: 600,
            max_depth: 4,
            min_members_for_summary: 2,
            context_window: 8192,
            chunk_context_ratio: 0.6,
            summary_output_tokens: 400,
            rewrite_within_budget: false,
            drop_singletons: false,
        }
    }
}

impl FusionConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk size in characters.
    pub fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Set the chunk overlap in characters.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the target summary budget in tokens.
    pub fn with_target_budget(mut self, budget: usize) -> Self {
        self.target_budget = budget;
        self
    }

    /// Set the maximum compression depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the summarization membership threshold.
    pub fn with_min_members_for_summary(mut self, min: usize) -> Self {
        self.min_members_for_summary = min;
        self
    }

    /// Set the oracle context window in tokens.
    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window = tokens;
        self
    }

    /// Set the per-call output cap in tokens.
    pub fn with_summary_output_tokens(mut self, tokens: usize) -> Self {
        self.summary_output_tokens = tokens;
        self
    }

    /// Rewrite within-budget text for stylistic consistency.
    pub fn rewrite_within_budget(mut self) -> Self {
        self.rewrite_within_budget = true;
        self
    }

    /// Drop single-article themes from the output.
    pub fn drop_singletons(mut self) -> Self {
        self.drop_singletons = true;
        self
    }

    /// Validate all fields. Called before any oracle work.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(FusionError::config("max_chunk_size must be positive"));
        }
        if self.overlap >= self.max_chunk_size {
            return Err(FusionError::config(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                self.overlap, self.max_chunk_size
            )));
        }
        if self.target_budget == 0 {
            return Err(FusionError::config("target_budget must be positive"));
        }
        if self.min_members_for_summary == 0 {
            return Err(FusionError::config(
                "min_members_for_summary must be at least 1",
            ));
        }
        if self.context_window == 0 {
            return Err(FusionError::config("context_window must be positive"));
        }
        if !(self.chunk_context_ratio > 0.0 && self.chunk_context_ratio <= 1.0) {
            return Err(FusionError::config(format!(
                "chunk_context_ratio ({}) must be in (0, 1]",
                self.chunk_context_ratio
            )));
        }
        if self.summary_output_tokens == 0 {
            return Err(FusionError::config("summary_output_tokens must be positive"));
        }
        Ok(())
    }
}
