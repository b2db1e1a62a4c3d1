//! Oracle trait for text-generation operations.
//!
//! The Oracle trait abstracts the language-model capabilities the fusion
//! pipeline needs:
//! - Free-form generation (chunk summaries, rewrite passes)
//! - Yes/no judgement (same-subject comparison)
//! - Closed-set classification (category assignment)
//!
//! The pipeline treats the oracle as a shared, rate-limited resource: every
//! call is awaited to completion before the next one is issued.

use async_trait::async_trait;

use crate::error::Result;

/// Oracle trait for LLM operations.
///
/// Implementations wrap specific LLM providers (OpenAI, Anthropic, local
/// models, etc.) and handle the specifics of prompting and response
/// parsing. The oracle may be slow, may fail, and may return malformed
/// output; the pipeline recovers from all of that locally.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate free-form text from a prompt.
    ///
    /// `max_output_tokens` is a cap on the response length. Implementations
    /// should treat it as a hard limit, but the pipeline does not rely on
    /// compliance for termination.
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String>;

    /// Answer a yes/no question about the given context.
    ///
    /// Used for same-subject comparison between two articles. A failed call
    /// is treated by the caller as "no".
    async fn yes_no(&self, question: &str, context: &str) -> Result<bool>;

    /// Pick the best option for a question about the given context.
    ///
    /// Returns an index into `options`. Implementations MUST return a valid
    /// index or fail explicitly, never an out-of-range index silently
    /// clamped. The pipeline still refuses to trust an out-of-range index
    /// and falls back to keyword matching.
    async fn classify(&self, question: &str, options: &[String], context: &str) -> Result<usize>;
}
