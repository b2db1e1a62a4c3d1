//! Compression policy - advisory preservation directives.

use serde::{Deserialize, Serialize};

/// Preservation directives forwarded to the oracle during compression.
///
/// These are advisory instructions embedded into summarization and rewrite
/// prompts. The compressor does not enforce them (the oracle might not
/// comply), and termination never depends on compliance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressionPolicy {
    /// Keep the original language of the text
    #[serde(default)]
    pub keep_language: bool,

    /// Preserve the title or headline
    #[serde(default)]
    pub keep_title: bool,

    /// Preserve author names
    #[serde(default)]
    pub keep_authors: bool,

    /// Preserve numbers, statistics, and measured results
    #[serde(default)]
    pub keep_numeric_results: bool,

    /// Compress as aggressively as possible
    #[serde(default)]
    pub maximize_compression: bool,

    /// Translate the output into this language
    pub translate_to: Option<String>,

    /// Free-form context the oracle should keep in mind
    pub context_hint: Option<String>,
}

impl CompressionPolicy {
    /// Create a policy with no directives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the original language.
    pub fn keep_language(mut self) -> Self {
        self.keep_language = true;
        self
    }

    /// Preserve the title.
    pub fn keep_title(mut self) -> Self {
        self.keep_title = true;
        self
    }

    /// Preserve author names.
    pub fn keep_authors(mut self) -> Self {
        self.keep_authors = true;
        self
    }

    /// Preserve numeric results.
    pub fn keep_numeric_results(mut self) -> Self {
        self.keep_numeric_results = true;
        self
    }

    /// Compress as aggressively as possible.
    pub fn maximize_compression(mut self) -> Self {
        self.maximize_compression = true;
        self
    }

    /// Translate the output into the given language.
    pub fn translate_to(mut self, language: impl Into<String>) -> Self {
        self.translate_to = Some(language.into());
        self
    }

    /// Add a free-form context hint.
    pub fn context_hint(mut self, hint: impl Into<String>) -> Self {
        self.context_hint = Some(hint.into());
        self
    }

    /// Render the active directives as prompt instructions.
    pub fn directives(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.keep_language {
            lines.push("Keep the original language of the text.".to_string());
        }
        if self.keep_title {
            lines.push("Preserve the title or headline.".to_string());
        }
        if self.keep_authors {
            lines.push("Preserve author names.".to_string());
        }
        if self.keep_numeric_results {
            lines.push("Preserve numbers, statistics, and measured results.".to_string());
        }
        if self.maximize_compression {
            lines.push("Compress as aggressively as possible.".to_string());
        }
        if let Some(lang) = &self.translate_to {
            lines.push(format!("Write the output in {}.", lang));
        }
        if let Some(hint) = &self.context_hint {
            lines.push(format!("Context: {}", hint));
        }

        lines
    }

    /// Whether any directive is active.
    pub fn is_empty(&self) -> bool {
        self.directives().is_empty()
    }
}
