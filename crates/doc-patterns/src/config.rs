use crate::error::{PatternError, Result};
use crate::types::PatternKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable thresholds for the pattern detectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Columns a tab expands to when measuring indentation
    pub tab_width: usize,

    /// Indentation width (in columns) of one list nesting level
    pub list_indent_step: usize,

    /// How many lines above a list may hold its introducing paragraph
    pub list_context_lookback: usize,

    /// Maximum preceding lines absorbed as a signature's description
    pub max_description_lines: usize,

    /// Absorb indented or comment lines directly after a signature
    pub bind_trailing_comments: bool,

    /// Blank lines allowed between a signature and its code block
    pub max_blank_before_example: usize,

    /// Terms with more words are treated as prose or headings
    pub max_term_words: usize,

    /// Terms with more characters are treated as prose or headings
    pub max_term_chars: usize,

    /// Line prefixes marking illustrative text after a grammar rule
    pub example_prefixes: Vec<String>,

    /// Pattern kinds to detect (empty = all kinds)
    pub enabled_kinds: Vec<PatternKind>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            list_indent_step: 2,
            list_context_lookback: 3,
            max_description_lines: 8,
            bind_trailing_comments: true,
            max_blank_before_example: 1,
            max_term_words: 6,
            max_term_chars: 48,
            example_prefixes: vec![
                "e.g.".to_string(),
                "eg.".to_string(),
                "example:".to_string(),
                "for example".to_string(),
                "ex:".to_string(),
            ],
            enabled_kinds: vec![],
        }
    }
}

impl PatternConfig {
    /// Create config favouring precision (short terms, no loose bindings)
    pub fn strict() -> Self {
        Self {
            list_context_lookback: 1,
            max_description_lines: 4,
            bind_trailing_comments: false,
            max_blank_before_example: 0,
            max_term_words: 4,
            max_term_chars: 32,
            ..Default::default()
        }
    }

    /// Create config favouring recall (longer terms, wider lookback)
    pub fn lenient() -> Self {
        Self {
            list_context_lookback: 5,
            max_description_lines: 16,
            max_blank_before_example: 2,
            max_term_words: 10,
            max_term_chars: 80,
            ..Default::default()
        }
    }

    /// Parse config from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate().map_err(PatternError::invalid_config)?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading pattern config from {}", path.as_ref().display());
        Self::from_toml_str(&source)
    }

    /// Check if a pattern kind should be detected
    #[must_use]
    pub fn is_enabled(&self, kind: PatternKind) -> bool {
        self.enabled_kinds.is_empty() || self.enabled_kinds.contains(&kind)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tab_width == 0 {
            return Err("tab_width must be > 0".to_string());
        }

        if self.list_indent_step == 0 {
            return Err("list_indent_step must be > 0".to_string());
        }

        if self.max_term_words == 0 || self.max_term_chars == 0 {
            return Err(format!(
                "term limits must be > 0 (max_term_words={}, max_term_chars={})",
                self.max_term_words, self.max_term_chars
            ));
        }

        if self.example_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err("example_prefixes cannot contain empty entries".to_string());
        }

        Ok(())
    }
}
