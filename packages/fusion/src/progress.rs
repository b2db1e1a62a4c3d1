//! Progress events emitted between oracle calls.
//!
//! Every oracle call is a blocking point; the pipeline notifies an observer
//! between calls so callers can surface incremental progress (comparison
//! counters, compression rounds) without peeking into pipeline state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Facts about pipeline progress, emitted in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FusionEvent {
    /// Clustering started over a batch of articles
    ClusteringStarted { articles: usize },

    /// About to compare a candidate against a theme seed
    ComparingArticles {
        seed_index: usize,
        candidate_index: usize,
        total: usize,
    },

    /// A theme finished its scan and was finalized
    ThemeSealed { theme_id: Uuid, members: usize },

    /// Clustering finished
    ClusteringCompleted { themes: usize },

    /// One compression round completed
    CompressionRound {
        depth: usize,
        tokens_before: usize,
        tokens_after: usize,
    },

    /// A theme's summary was populated by compression
    ThemeSummarized {
        theme_id: Uuid,
        rounds: usize,
        converged: bool,
    },

    /// A below-threshold theme passed through unsummarized
    ThemePassedThrough { theme_id: Uuid },

    /// A theme received its category
    ThemeCategorized { theme_id: Uuid, category: String },

    /// The run was cancelled; remaining work uses fallbacks only
    RunCancelled,
}

/// Observer for pipeline progress.
///
/// Implementations must be cheap and non-blocking; the pipeline calls
/// `on_event` synchronously between oracle calls.
pub trait ProgressObserver: Send + Sync {
    /// Receive one progress event.
    fn on_event(&self, event: &FusionEvent);
}

/// An observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_event(&self, _event: &FusionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_tagged() {
        let event = FusionEvent::ComparingArticles {
            seed_index: 0,
            candidate_index: 2,
            total: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"comparing_articles\""));
        assert!(json.contains("\"candidate_index\":2"));
    }
}
