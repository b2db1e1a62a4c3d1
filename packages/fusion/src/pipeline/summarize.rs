//! Theme summarizer - one bounded summary per multi-article theme.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::pipeline::compress::Compressor;
use crate::pipeline::{FusionWarning, PipelineRun};
use crate::progress::FusionEvent;
use crate::traits::{fetcher::ArticleFetcher, oracle::Oracle};
use crate::types::{
    article::{Article, ArticleId},
    theme::{article_section, Theme},
};

/// Summarize every theme that meets the membership threshold.
///
/// Themes below `min_members_for_summary` are not compressed: their
/// summary defaults to the seed article's raw body, or the theme is
/// dropped entirely when `drop_singletons` is set. For themes that are
/// compressed, each member's body is first replaced by fetched full text
/// when a fetcher is configured (fetch failure falls back to the stored
/// body), the bodies are concatenated in absorption order, and the
/// composite goes through the recursive compressor.
///
/// Returns the themes with summaries populated. Under cancellation,
/// remaining multi-article themes are left unsummarized; the passthrough
/// path needs no oracle and still applies.
pub async fn summarize_themes<O: Oracle>(
    oracle: &O,
    themes: Vec<Theme>,
    articles: &[Article],
    fetcher: Option<&dyn ArticleFetcher>,
    run: &mut PipelineRun<'_>,
) -> Vec<Theme> {
    let lookup: HashMap<&ArticleId, &Article> =
        articles.iter().map(|a| (&a.id, a)).collect();
    let mut out = Vec::with_capacity(themes.len());

    for mut theme in themes {
        if theme.len() < run.config.min_members_for_summary {
            if run.config.drop_singletons && theme.is_singleton() {
                debug!(theme_id = %theme.id, "dropping singleton theme");
                run.stats.singletons_dropped += 1;
                continue;
            }

            // Single-article themes pass through with the raw body.
            let seed_body = lookup
                .get(theme.seed_id())
                .map(|a| a.body.clone())
                .unwrap_or_else(|| theme.content.clone());
            theme.set_summary(seed_body);
            run.stats.themes_passed_through += 1;
            run.observer
                .on_event(&FusionEvent::ThemePassedThrough { theme_id: theme.id });
            out.push(theme);
            continue;
        }

        if run.cancel.is_cancelled() {
            // Finalized membership is kept; the summary stays empty.
            out.push(theme);
            continue;
        }

        if let Some(fetcher) = fetcher {
            let composite = compose_with_fetcher(&theme, &lookup, fetcher).await;
            theme.set_content(composite);
        }

        let compressor = Compressor::new(oracle, run.config, run.policy, run.observer, run.cancel);
        let compressed = compressor.compress(&theme.content).await;

        run.stats.compression_rounds += compressed.rounds;
        run.stats.themes_summarized += 1;

        if !compressed.converged {
            run.warnings.push(FusionWarning::CompressionNotConverged {
                theme_id: theme.id,
                tokens: crate::pipeline::chunk::approx_tokens(&compressed.text),
                budget: run.config.target_budget,
            });
        }

        run.observer.on_event(&FusionEvent::ThemeSummarized {
            theme_id: theme.id,
            rounds: compressed.rounds,
            converged: compressed.converged,
        });

        theme.set_summary(compressed.text);
        out.push(theme);
    }

    out
}

/// Rebuild a theme's composite content with fetched full texts.
///
/// Members whose fetch fails keep their stored body.
async fn compose_with_fetcher(
    theme: &Theme,
    lookup: &HashMap<&ArticleId, &Article>,
    fetcher: &dyn ArticleFetcher,
) -> String {
    let mut sections = Vec::with_capacity(theme.len());

    for id in theme.members() {
        let Some(article) = lookup.get(id).copied() else {
            continue;
        };

        let body = match fetcher.fetch_full_text(article).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(id = %article.id, "fetched text was empty, using stored body");
                article.body.clone()
            }
            Err(e) => {
                warn!(error = %e, id = %article.id, "full-text fetch failed, using stored body");
                article.body.clone()
            }
        };

        sections.push(article_section(&article.title, &body));
    }

    sections.join("\n\n")
}
