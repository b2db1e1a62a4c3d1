//! End-to-end pipeline tests against the mock oracle.

use tokio_util::sync::CancellationToken;

use fusion::{
    Article, AssignmentMethod, CollectingObserver, CompressionPolicy, FusionConfig, FusionError,
    FusionEvent, FusionPipeline, FusionWarning, GenerateMode, MockOracle, OracleCall,
};

fn articles() -> Vec<Article> {
    vec![
        Article::new(
            "Election results",
            "https://news.example/election",
            "Votes are counted and the results are in.",
        ),
        Article::new(
            "Election results, updated",
            "https://news.example/election-update",
            "The final tally has been released overnight.",
        ),
        Article::new(
            "Weather forecast",
            "https://news.example/weather",
            "Heavy rain is expected through the weekend.",
        ),
    ]
}

fn categories() -> Vec<String> {
    vec![
        "Politics".to_string(),
        "Weather".to_string(),
        "Sports".to_string(),
    ]
}

fn paired_oracle() -> MockOracle {
    MockOracle::new()
        .with_same_subject("Election results", "Election results, updated")
        .with_generate_mode(GenerateMode::Fixed("Combined election coverage.".to_string()))
        .with_classification("Election results", 0)
}

#[tokio::test]
async fn test_election_weather_end_to_end() {
    let oracle = paired_oracle();
    let pipeline = FusionPipeline::new(oracle)
        .with_config(FusionConfig::default().rewrite_within_budget());

    let input = articles();
    let report = pipeline.run(&input, &categories()).await.unwrap();

    assert!(report.completed);
    assert_eq!(report.themes.len(), 2);

    // Theme {A, B}: summarized by compression, classified by the oracle.
    let election = &report.themes[0];
    assert_eq!(election.theme.len(), 2);
    assert_eq!(election.theme.seed_id(), &input[0].id);
    assert!(election.theme.members().contains(&input[1].id));
    assert_eq!(election.theme.summary(), Some("Combined election coverage."));
    assert_eq!(election.assignment.category, "Politics");
    assert_eq!(election.assignment.method, AssignmentMethod::Oracle);

    // Theme {C}: passes through unsummarized, categorized by keyword.
    let weather = &report.themes[1];
    assert!(weather.theme.is_singleton());
    assert_eq!(
        weather.theme.summary(),
        Some("Heavy rain is expected through the weekend.")
    );
    assert_eq!(weather.assignment.category, "Weather");
    assert_eq!(weather.assignment.method, AssignmentMethod::KeywordMatch);
}

#[tokio::test]
async fn test_no_article_lost_or_duplicated() {
    let oracle = paired_oracle();
    let pipeline = FusionPipeline::new(oracle);

    let input = articles();
    let report = pipeline.run(&input, &categories()).await.unwrap();

    let total: usize = report.themes.iter().map(|t| t.theme.len()).sum();
    assert_eq!(total, input.len());

    let mut seen = std::collections::HashSet::new();
    for item in &report.themes {
        for id in item.theme.members() {
            assert!(seen.insert(id.clone()), "duplicate member {}", id);
        }
    }
}

#[tokio::test]
async fn test_every_category_comes_from_the_input_list() {
    let oracle = MockOracle::new().failing_classify();
    let pipeline = FusionPipeline::new(oracle);

    let report = pipeline.run(&articles(), &categories()).await.unwrap();

    let valid = categories();
    for item in &report.themes {
        assert!(valid.contains(&item.assignment.category));
    }
}

#[tokio::test]
async fn test_empty_categories_rejected_before_any_oracle_call() {
    let oracle = MockOracle::new();
    let pipeline = FusionPipeline::new(oracle);

    let result = pipeline.run(&articles(), &[]).await;

    assert!(matches!(result, Err(FusionError::Config { .. })));
}

#[tokio::test]
async fn test_invalid_config_rejected_before_any_oracle_call() {
    let oracle = MockOracle::new();
    let config = FusionConfig::default()
        .with_max_chunk_size(100)
        .with_overlap(100);
    let pipeline = FusionPipeline::new(oracle).with_config(config);

    let result = pipeline.run(&articles(), &categories()).await;

    assert!(matches!(result, Err(FusionError::Config { .. })));
}

#[tokio::test]
async fn test_oracle_failures_degrade_but_every_theme_is_categorized() {
    // Every comparison and classification fails; generation fails too.
    let oracle = MockOracle::new()
        .failing_yes_no()
        .failing_classify()
        .with_generate_mode(GenerateMode::Fail);
    let pipeline = FusionPipeline::new(oracle);

    let input = articles();
    let report = pipeline.run(&input, &categories()).await.unwrap();

    // Fail-safe toward less merging: all singletons, all categorized.
    assert!(report.completed);
    assert_eq!(report.themes.len(), 3);
    for item in &report.themes {
        assert!(item.theme.is_singleton());
        assert!(!item.assignment.category.is_empty());
    }
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, FusionWarning::ComparisonsDegraded { .. })));
}

#[tokio::test]
async fn test_cancelled_run_returns_incomplete() {
    let oracle = paired_oracle();
    let pipeline = FusionPipeline::new(oracle);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = pipeline
        .run_with_cancel(&articles(), &categories(), cancel)
        .await
        .unwrap();

    assert!(!report.completed);
    assert!(report.themes.is_empty());
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, FusionWarning::Cancelled { .. })));
}

#[tokio::test]
async fn test_cancellation_after_clustering_keeps_finalized_themes() {
    use fusion::ProgressObserver;

    struct CancelAfterClustering {
        cancel: CancellationToken,
    }

    impl ProgressObserver for CancelAfterClustering {
        fn on_event(&self, event: &FusionEvent) {
            if matches!(event, FusionEvent::ClusteringCompleted { .. }) {
                self.cancel.cancel();
            }
        }
    }

    let cancel = CancellationToken::new();
    let oracle = paired_oracle();
    let pipeline = FusionPipeline::new(oracle).with_observer(CancelAfterClustering {
        cancel: cancel.clone(),
    });

    let report = pipeline
        .run_with_cancel(&articles(), &categories(), cancel)
        .await
        .unwrap();

    // Clustering finished, so both themes survive; summarization and
    // classification were skipped in favor of deterministic fallbacks.
    assert!(!report.completed);
    assert_eq!(report.themes.len(), 2);
    assert!(report.themes[0].theme.summary().is_none());
    assert_ne!(report.themes[0].assignment.method, AssignmentMethod::Oracle);
    assert_eq!(report.themes[1].assignment.category, "Weather");
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, FusionWarning::Cancelled { .. })));
}

#[tokio::test]
async fn test_refetched_article_supersedes_earlier_record() {
    let oracle = MockOracle::new();
    let pipeline = FusionPipeline::new(oracle);

    let first = Article::new("Breaking story", "https://news.example/story", "Early details.");
    let refetched = Article::new(
        "Breaking story",
        "https://news.example/story",
        "Full details after the update.",
    );
    let input = vec![first, refetched];

    let report = pipeline.run(&input, &categories()).await.unwrap();

    assert_eq!(report.themes.len(), 1);
    assert_eq!(
        report.themes[0].theme.summary(),
        Some("Full details after the update.")
    );
}

#[tokio::test]
async fn test_drop_singletons_excludes_unmatched_articles() {
    let oracle = paired_oracle();
    let pipeline =
        FusionPipeline::new(oracle).with_config(FusionConfig::default().drop_singletons());

    let report = pipeline.run(&articles(), &categories()).await.unwrap();

    assert_eq!(report.themes.len(), 1);
    assert_eq!(report.themes[0].theme.len(), 2);
    assert_eq!(report.stats.singletons_dropped, 1);
}

#[tokio::test]
async fn test_progress_events_emitted_in_order() {
    let observer = CollectingObserver::new();
    let handle = observer.handle();

    let oracle = paired_oracle();
    let pipeline = FusionPipeline::new(oracle).with_observer(observer);

    pipeline.run(&articles(), &categories()).await.unwrap();

    let events = handle.events();
    assert!(matches!(events[0], FusionEvent::ClusteringStarted { articles: 3 }));
    assert!(events
        .iter()
        .any(|e| matches!(e, FusionEvent::ComparingArticles { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, FusionEvent::ThemeCategorized { .. })));

    // Clustering completes before any categorization event.
    let cluster_done = events
        .iter()
        .position(|e| matches!(e, FusionEvent::ClusteringCompleted { .. }))
        .unwrap();
    let first_categorized = events
        .iter()
        .position(|e| matches!(e, FusionEvent::ThemeCategorized { .. }))
        .unwrap();
    assert!(cluster_done < first_categorized);
}

#[tokio::test]
async fn test_policy_directives_reach_the_oracle() {
    use fusion::{summarize_themes, NullObserver, PipelineRun, Theme};

    let input = articles();
    let mut theme = Theme::seeded(&input[0]);
    theme.absorb(&input[1]);

    let oracle = MockOracle::new();
    let config = FusionConfig::default().rewrite_within_budget();
    let policy = CompressionPolicy::new()
        .keep_numeric_results()
        .translate_to("German");
    let cancel = CancellationToken::new();
    let mut run = PipelineRun::new(&config, &policy, &NullObserver, &cancel);

    summarize_themes(&oracle, vec![theme], &input, None, &mut run).await;

    let generate_prompts: Vec<String> = oracle
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            OracleCall::Generate { prompt, .. } => Some(prompt),
            _ => None,
        })
        .collect();
    assert!(!generate_prompts.is_empty());
    for prompt in &generate_prompts {
        assert!(prompt.contains("Preserve numbers"));
        assert!(prompt.contains("German"));
    }
}

#[tokio::test]
async fn test_generation_prompts_carry_directives() {
    use fusion::{format_summarize_prompt, Oracle};

    let oracle = MockOracle::new();
    let policy = CompressionPolicy::new().keep_numeric_results();
    let prompt = format_summarize_prompt("body text", &policy);
    oracle.generate(&prompt, 64).await.unwrap();

    let calls = oracle.calls();
    let OracleCall::Generate { prompt, .. } = &calls[0] else {
        panic!("expected a generate call");
    };
    assert!(prompt.contains("Preserve numbers"));
}
