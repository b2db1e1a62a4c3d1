//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the fusion library
//! without making real LLM or network calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{FusionError, Result};
use crate::pipeline::prompts::TEXT_DELIMITER;
use crate::progress::{FusionEvent, ProgressObserver};
use crate::traits::{fetcher::ArticleFetcher, oracle::Oracle};
use crate::types::article::Article;

/// How [`MockOracle::generate`] answers.
#[derive(Debug, Clone, Default)]
pub enum GenerateMode {
    /// Return the embedded payload unchanged, an oracle that never
    /// shortens anything (useful for termination tests)
    #[default]
    Echo,

    /// Return the first half of the embedded payload, by characters
    Halve,

    /// Return a fixed string for every call
    Fixed(String),

    /// Return an empty string (malformed output)
    Empty,

    /// Fail every call
    Fail,
}

/// Record of a call made to the mock oracle.
#[derive(Debug, Clone)]
pub enum OracleCall {
    Generate {
        prompt: String,
        max_output_tokens: usize,
    },
    YesNo {
        question: String,
        context: String,
    },
    Classify {
        question: String,
        options: Vec<String>,
        context: String,
    },
}

/// A mock oracle with scripted, deterministic responses.
///
/// Yes/no answers are keyed by title pairs: a comparison answers "yes" when
/// the context contains both titles of a registered pair. Classification
/// answers are keyed by a substring of the context (typically the theme
/// title). All calls are recorded for assertions.
#[derive(Default)]
pub struct MockOracle {
    generate_mode: GenerateMode,
    yes_pairs: RwLock<Vec<(String, String)>>,
    yes_no_fails: bool,
    classify_responses: RwLock<HashMap<String, usize>>,
    classify_fails: bool,
    calls: RwLock<Vec<OracleCall>>,
}

impl MockOracle {
    /// Create a mock oracle with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation behavior.
    pub fn with_generate_mode(mut self, mode: GenerateMode) -> Self {
        self.generate_mode = mode;
        self
    }

    /// Register a title pair that compares as "same subject".
    pub fn with_same_subject(self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.yes_pairs
            .write()
            .unwrap()
            .push((first.into(), second.into()));
        self
    }

    /// Make every yes/no call fail.
    pub fn failing_yes_no(mut self) -> Self {
        self.yes_no_fails = true;
        self
    }

    /// Register a classification answer for contexts containing `key`.
    pub fn with_classification(self, key: impl Into<String>, index: usize) -> Self {
        self.classify_responses
            .write()
            .unwrap()
            .insert(key.into(), index);
        self
    }

    /// Make every classify call fail.
    pub fn failing_classify(mut self) -> Self {
        self.classify_fails = true;
        self
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.read().unwrap().clone()
    }

    /// Total number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of generate calls made.
    pub fn generate_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, OracleCall::Generate { .. }))
            .count()
    }

    /// Extract the payload text embedded in a generation prompt.
    fn payload(prompt: &str) -> &str {
        prompt
            .rsplit_once(TEXT_DELIMITER)
            .map(|(_, payload)| payload)
            .unwrap_or(prompt)
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String> {
        self.calls.write().unwrap().push(OracleCall::Generate {
            prompt: prompt.to_string(),
            max_output_tokens,
        });

        let payload = Self::payload(prompt);
        match &self.generate_mode {
            GenerateMode::Echo => Ok(payload.to_string()),
            GenerateMode::Halve => {
                let half = payload.chars().count() / 2;
                Ok(payload.chars().take(half).collect())
            }
            GenerateMode::Fixed(text) => Ok(text.clone()),
            GenerateMode::Empty => Ok(String::new()),
            GenerateMode::Fail => Err(FusionError::oracle_msg("mock generate failure")),
        }
    }

    async fn yes_no(&self, question: &str, context: &str) -> Result<bool> {
        self.calls.write().unwrap().push(OracleCall::YesNo {
            question: question.to_string(),
            context: context.to_string(),
        });

        if self.yes_no_fails {
            return Err(FusionError::oracle_msg("mock yes/no failure"));
        }

        let yes = self
            .yes_pairs
            .read()
            .unwrap()
            .iter()
            .any(|(a, b)| context.contains(a) && context.contains(b));
        Ok(yes)
    }

    async fn classify(&self, question: &str, options: &[String], context: &str) -> Result<usize> {
        self.calls.write().unwrap().push(OracleCall::Classify {
            question: question.to_string(),
            options: options.to_vec(),
            context: context.to_string(),
        });

        if self.classify_fails {
            return Err(FusionError::oracle_msg("mock classify failure"));
        }

        let responses = self.classify_responses.read().unwrap();
        for (key, index) in responses.iter() {
            if context.contains(key) {
                return Ok(*index);
            }
        }

        Err(FusionError::malformed("no scripted classification"))
    }
}

/// A mock fetcher with scripted full texts keyed by link.
#[derive(Default)]
pub struct MockFetcher {
    texts: RwLock<HashMap<String, String>>,
    fails: bool,
}

impl MockFetcher {
    /// Create a mock fetcher with no scripted texts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a full text for a link.
    pub fn with_full_text(self, link: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.write().unwrap().insert(link.into(), text.into());
        self
    }

    /// Make every fetch fail.
    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }
}

#[async_trait]
impl ArticleFetcher for MockFetcher {
    async fn fetch_full_text(&self, article: &Article) -> Result<String> {
        if self.fails {
            return Err(FusionError::Fetch("mock fetch failure".into()));
        }

        self.texts
            .read()
            .unwrap()
            .get(&article.link)
            .cloned()
            .ok_or_else(|| FusionError::Fetch(format!("no text for {}", article.link).into()))
    }
}

/// An observer that records every event, for assertions.
#[derive(Default)]
pub struct CollectingObserver {
    events: Arc<Mutex<Vec<FusionEvent>>>,
}

impl CollectingObserver {
    /// Create a new collecting observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, in order.
    pub fn events(&self) -> Vec<FusionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// A clone sharing the same event buffer.
    pub fn handle(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl ProgressObserver for CollectingObserver {
    fn on_event(&self, event: &FusionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
