//! Oracle prompts for the fusion pipeline.
//!
//! Prompt construction is a private concern of each pipeline component;
//! the format functions here are the only place prompt text is assembled.

use crate::types::policy::CompressionPolicy;

/// Delimiter that separates instructions from the embedded payload text.
///
/// Everything after the last occurrence of this marker in a generation
/// prompt is the text being summarized or rewritten.
pub const TEXT_DELIMITER: &str = "Text:\n";

/// Prompt for summarizing one chunk of a longer text.
pub const SUMMARIZE_CHUNK_PROMPT: &str = r#"Summarize the following passage. It may be one segment of a longer text, so keep every distinct fact and event; do not add an introduction or conclusion.

{directives}Text:
{text}"#;

/// Prompt for the final holistic rewrite pass.
pub const REWRITE_PROMPT: &str = r#"The following text was assembled from incremental summaries. Rewrite it as a single coherent passage, keeping all facts and the original ordering of events.

{directives}Text:
{text}"#;

/// Question asked for every pairwise article comparison.
pub const SAME_SUBJECT_QUESTION: &str =
    "Do these two articles report on the same subject or story?";

/// Question asked when classifying a theme.
pub const CATEGORIZE_QUESTION: &str = "Which category best fits this group of articles?";

/// Render the policy directives as a numbered instruction block.
///
/// Empty when the policy has no active directives, so prompts stay clean
/// for the default policy.
fn directives_block(policy: &CompressionPolicy) -> String {
    let directives = policy.directives();
    if directives.is_empty() {
        return String::new();
    }

    let mut block = String::from("Follow these instructions:\n");
    for (i, d) in directives.iter().enumerate() {
        block.push_str(&format!("{}. {}\n", i + 1, d));
    }
    block.push('\n');
    block
}

/// Format the per-chunk summarization prompt.
pub fn format_summarize_prompt(text: &str, policy: &CompressionPolicy) -> String {
    SUMMARIZE_CHUNK_PROMPT
        .replace("{directives}", &directives_block(policy))
        .replace("{text}", text)
}

/// Format the holistic rewrite prompt.
pub fn format_rewrite_prompt(text: &str, policy: &CompressionPolicy) -> String {
    REWRITE_PROMPT
        .replace("{directives}", &directives_block(policy))
        .replace("{text}", text)
}

/// Format the context for a same-subject comparison.
///
/// Both articles are presented with their titles and a bounded excerpt of
/// their bodies.
pub fn format_comparison_context(
    first_title: &str,
    first_excerpt: &str,
    second_title: &str,
    second_excerpt: &str,
) -> String {
    format!(
        "Article 1: {}\n{}\n\nArticle 2: {}\n{}",
        first_title, first_excerpt, second_title, second_excerpt
    )
}

/// Format the context for theme categorization.
pub fn format_theme_context(title: &str, excerpt: &str) -> String {
    format!("Theme: {}\n\n{}", title, excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_prompt_embeds_text_after_delimiter() {
        let policy = CompressionPolicy::new();
        let prompt = format_summarize_prompt("the payload", &policy);

        let (_, payload) = prompt.rsplit_once(TEXT_DELIMITER).unwrap();
        assert_eq!(payload, "the payload");
        assert!(!prompt.contains("{directives}"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_directives_rendered_when_active() {
        let policy = CompressionPolicy::new().keep_numeric_results().translate_to("Spanish");
        let prompt = format_summarize_prompt("payload", &policy);

        assert!(prompt.contains("Follow these instructions:"));
        assert!(prompt.contains("1. Preserve numbers"));
        assert!(prompt.contains("Spanish"));
    }

    #[test]
    fn test_no_directive_block_for_empty_policy() {
        let prompt = format_rewrite_prompt("payload", &CompressionPolicy::new());
        assert!(!prompt.contains("Follow these instructions"));
    }

    #[test]
    fn test_comparison_context_contains_both_articles() {
        let context =
            format_comparison_context("Election results", "votes", "Weather", "rain ahead");
        assert!(context.contains("Article 1: Election results"));
        assert!(context.contains("Article 2: Weather"));
        assert!(context.contains("rain ahead"));
    }
}
