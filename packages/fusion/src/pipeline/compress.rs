//! Recursive compressor - shrink text to a token budget.
//!
//! The compressor repeatedly chunks and summarizes text until it fits the
//! target budget or the depth bound is reached. The depth bound is the sole
//! termination guarantee and is enforced unconditionally: an oracle that
//! never shortens its input still cannot run more than `max_depth` rounds.
//!
//! Multi-document composite input is treated identically to single-document
//! input; the compressor has no notion of document boundaries.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::pipeline::chunk::{approx_tokens, chunk, CHARS_PER_TOKEN};
use crate::pipeline::prompts::{format_rewrite_prompt, format_summarize_prompt};
use crate::progress::{FusionEvent, ProgressObserver};
use crate::traits::oracle::Oracle;
use crate::types::{config::FusionConfig, policy::CompressionPolicy};

/// Transient state threaded through the compression loop.
///
/// `depth` is bounded by the configured maximum; the measured token length
/// is re-derived from `text` at the top of every round.
#[derive(Debug)]
struct CompressionState {
    text: String,
    depth: usize,
}

/// Result of a compression run.
///
/// Compression never fails: oracle errors degrade to keeping the affected
/// text, and non-convergence is reported here rather than raised.
#[derive(Debug, Clone)]
pub struct Compressed {
    /// The final text
    pub text: String,

    /// Number of summarize-and-concatenate rounds that ran
    pub rounds: usize,

    /// Whether the text fit the budget when the loop exited
    pub converged: bool,
}

/// Compresses text against one oracle, policy, and configuration.
pub struct Compressor<'a, O: Oracle> {
    oracle: &'a O,
    config: &'a FusionConfig,
    policy: &'a CompressionPolicy,
    observer: &'a dyn ProgressObserver,
    cancel: &'a CancellationToken,
}

impl<'a, O: Oracle> Compressor<'a, O> {
    /// Create a compressor.
    pub fn new(
        oracle: &'a O,
        config: &'a FusionConfig,
        policy: &'a CompressionPolicy,
        observer: &'a dyn ProgressObserver,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            oracle,
            config,
            policy,
            observer,
            cancel,
        }
    }

    /// Chunk size in characters: a fixed fraction of the oracle's context
    /// window, never below the configured overlap.
    fn chunk_chars(&self) -> usize {
        let tokens =
            (self.config.context_window as f32 * self.config.chunk_context_ratio) as usize;
        (tokens * CHARS_PER_TOKEN).max(self.config.overlap + 1)
    }

    /// Compress `text` toward the target budget.
    ///
    /// Runs summarize-and-concatenate rounds until the text fits the budget
    /// or `max_depth` rounds have run, then applies one holistic rewrite
    /// pass. When the input is already within budget the rewrite runs only
    /// if `rewrite_within_budget` is set.
    pub async fn compress(&self, text: &str) -> Compressed {
        let mut state = CompressionState {
            text: text.to_string(),
            depth: 0,
        };

        let converged = loop {
            let tokens = approx_tokens(&state.text);
            if tokens <= self.config.target_budget {
                break true;
            }
            if state.depth >= self.config.max_depth {
                warn!(
                    tokens,
                    budget = self.config.target_budget,
                    depth = state.depth,
                    "compression stopped at max depth while over budget"
                );
                break false;
            }
            if self.cancel.is_cancelled() {
                break false;
            }

            let chunk_size = self.chunk_chars();
            let overlap = self.config.overlap.min(chunk_size - 1);
            let chunks = chunk(&state.text, chunk_size, overlap);
            debug!(
                round = state.depth,
                chunks = chunks.len(),
                tokens,
                "compression round"
            );

            // Summaries are collected in chunk order so the compressed
            // output never reorders the source narrative.
            let mut parts = Vec::with_capacity(chunks.len());
            for piece in chunks {
                if self.cancel.is_cancelled() {
                    parts.push(piece.text);
                    continue;
                }

                let prompt = format_summarize_prompt(&piece.text, self.policy);
                match self
                    .oracle
                    .generate(&prompt, self.config.summary_output_tokens)
                    .await
                {
                    Ok(summary) if !summary.trim().is_empty() => parts.push(summary),
                    Ok(_) => {
                        warn!(
                            sequence_index = piece.sequence_index,
                            "empty chunk summary, keeping original chunk text"
                        );
                        parts.push(piece.text);
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            sequence_index = piece.sequence_index,
                            "chunk summary failed, keeping original chunk text"
                        );
                        parts.push(piece.text);
                    }
                }
            }

            let tokens_before = tokens;
            state.text = parts.join("\n\n");
            state.depth += 1;

            self.observer.on_event(&FusionEvent::CompressionRound {
                depth: state.depth,
                tokens_before,
                tokens_after: approx_tokens(&state.text),
            });
        };

        // Final rewrite pass: correct the incremental-summary style into a
        // single coherent passage. Skipped when the loop never ran, unless
        // the caller opted into rewriting within-budget text.
        let rewrite = state.depth > 0 || self.config.rewrite_within_budget;
        if rewrite && !self.cancel.is_cancelled() {
            let prompt = format_rewrite_prompt(&state.text, self.policy);
            match self
                .oracle
                .generate(&prompt, self.config.summary_output_tokens)
                .await
            {
                Ok(rewritten) if !rewritten.trim().is_empty() => state.text = rewritten,
                Ok(_) => warn!("empty rewrite output, keeping pre-rewrite text"),
                Err(e) => warn!(error = %e, "rewrite failed, keeping pre-rewrite text"),
            }
        }

        Compressed {
            text: state.text,
            rounds: state.depth,
            converged,
        }
    }
}
