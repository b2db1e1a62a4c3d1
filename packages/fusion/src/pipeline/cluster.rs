//! Similarity clusterer - group articles into themes.
//!
//! Greedy single-link clustering: each unprocessed article seeds a theme,
//! and every remaining unprocessed article is compared against the seed
//! (not against all members) with one oracle call. O(n²) comparisons in
//! the worst case.
//!
//! Known limitation: because similarity is tested only against the seed,
//! the relation is not transitive. Two articles that each match the seed
//! land in the same theme even if a direct comparison between them would
//! have answered "no". Replacing this with transitive closure or
//! centroid clustering would change output semantics, so the single-link
//! behavior is kept as-is.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::pipeline::chunk::leading_excerpt;
use crate::pipeline::prompts::{format_comparison_context, SAME_SUBJECT_QUESTION};
use crate::pipeline::PipelineRun;
use crate::progress::FusionEvent;
use crate::traits::oracle::Oracle;
use crate::types::{
    article::{Article, ArticleId},
    theme::Theme,
};

/// Cluster articles into themes.
///
/// Outer iteration follows input order, which keeps theme identity
/// deterministic for a deterministic oracle. A failed comparison counts
/// as "not similar", so failures lean toward less merging, and a single
/// failure never aborts clustering for the remaining articles.
///
/// Cancellation stops the scan: themes already sealed are returned, and
/// articles not yet reached are left unthemed.
pub async fn cluster<O: Oracle>(
    oracle: &O,
    articles: &[Article],
    run: &mut PipelineRun<'_>,
) -> Vec<Theme> {
    let total = articles.len();
    let mut processed: HashSet<ArticleId> = HashSet::with_capacity(total);
    let mut themes = Vec::new();

    info!(articles = total, "clustering started");
    run.observer
        .on_event(&FusionEvent::ClusteringStarted { articles: total });

    for (i, seed) in articles.iter().enumerate() {
        if processed.contains(&seed.id) {
            continue;
        }
        if run.cancel.is_cancelled() {
            warn!(themed = themes.len(), "clustering cancelled");
            break;
        }

        let mut theme = Theme::seeded(seed);
        processed.insert(seed.id.clone());
        let seed_excerpt = leading_excerpt(&seed.body, run.config.max_chunk_size, run.config.overlap);

        // Articles before the seed are always processed already, so the
        // scan over the tail covers every remaining candidate.
        for (j, candidate) in articles.iter().enumerate().skip(i + 1) {
            if processed.contains(&candidate.id) {
                continue;
            }
            if run.cancel.is_cancelled() {
                break;
            }

            run.observer.on_event(&FusionEvent::ComparingArticles {
                seed_index: i,
                candidate_index: j,
                total,
            });

            let context = format_comparison_context(
                &seed.title,
                &seed_excerpt,
                &candidate.title,
                &leading_excerpt(&candidate.body, run.config.max_chunk_size, run.config.overlap),
            );

            run.stats.comparisons += 1;
            match oracle.yes_no(SAME_SUBJECT_QUESTION, &context).await {
                Ok(true) => {
                    debug!(seed = %seed.id, candidate = %candidate.id, "same subject");
                    theme.absorb(candidate);
                    processed.insert(candidate.id.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    run.stats.comparisons_failed += 1;
                    warn!(
                        error = %e,
                        seed = %seed.id,
                        candidate = %candidate.id,
                        "comparison failed, treating as not similar"
                    );
                }
            }
        }

        run.observer.on_event(&FusionEvent::ThemeSealed {
            theme_id: theme.id,
            members: theme.len(),
        });
        themes.push(theme);
    }

    info!(themes = themes.len(), "clustering completed");
    run.observer.on_event(&FusionEvent::ClusteringCompleted {
        themes: themes.len(),
    });

    themes
}
