//! Paragraph and code-block records supplied by the upstream document parser.

use crate::error::{PatternError, Result};
use serde::{Deserialize, Serialize};

/// A paragraph as seen by the document parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub line_start: usize,
    pub line_end: usize,
    pub text: String,
}

impl Paragraph {
    pub fn new(line_start: usize, line_end: usize, text: impl Into<String>) -> Self {
        Self {
            line_start,
            line_end,
            text: text.into(),
        }
    }
}

/// A fenced code block, fence lines included in its range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub line_start: usize,
    pub line_end: usize,

    /// Info-string language tag, if present
    pub language: Option<String>,

    /// Code between the fences
    pub content: String,
}

impl CodeBlock {
    pub fn new(
        line_start: usize,
        line_end: usize,
        language: Option<&str>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            line_start,
            line_end,
            language: language.map(str::to_string),
            content: content.into(),
        }
    }
}

/// Parsed structure of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub paragraphs: Vec<Paragraph>,
    pub code_blocks: Vec<CodeBlock>,
}

impl DocumentModel {
    pub fn new(paragraphs: Vec<Paragraph>, code_blocks: Vec<CodeBlock>) -> Self {
        Self {
            paragraphs,
            code_blocks,
        }
    }

    /// Check every record lies inside a document of `total_lines` lines
    pub fn validate(&self, total_lines: usize) -> Result<()> {
        let ranges = self
            .paragraphs
            .iter()
            .map(|p| ("paragraph", p.line_start, p.line_end))
            .chain(
                self.code_blocks
                    .iter()
                    .map(|c| ("code block", c.line_start, c.line_end)),
            );

        for (what, start, end) in ranges {
            if start > end {
                return Err(PatternError::invalid_model(format!(
                    "{what} has reversed range {start}..={end}"
                )));
            }
            if end >= total_lines {
                return Err(PatternError::invalid_model(format!(
                    "{what} range {start}..={end} exceeds document of {total_lines} lines"
                )));
            }
        }

        Ok(())
    }
}
