//! Line-level scanning primitives shared by the detectors.

use crate::model::CodeBlock;
use crate::types::LineSpan;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}#{1,6}(?:[ \t]|$)").expect("valid heading regex"));

static SETEXT_UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(?:=+|-+)[ \t]*$").expect("valid setext regex"));

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").expect("valid fence regex"));

static THEMATIC_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$")
        .expect("valid thematic break regex")
});

/// Backtick code spans, matched within a single line
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`+[^`\n]*`+").expect("valid inline code regex"));

/// Byte ranges of inline code spans in `text`
pub(crate) fn inline_code_spans(text: &str) -> Vec<(usize, usize)> {
    INLINE_CODE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Check whether a byte offset falls inside one of `spans`
pub(crate) fn in_inline_code(spans: &[(usize, usize)], offset: usize) -> bool {
    spans
        .iter()
        .any(|(start, end)| offset >= *start && offset < *end)
}

/// Byte and character offsets of every line in a document
///
/// Lines are split on `\n`; a trailing `\r` belongs to the terminator. This
/// matches `str::lines`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    char_prefix: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = Vec::new();
        let mut char_prefix = vec![0];
        let mut offset = 0;

        for raw in text.split_inclusive('\n') {
            line_starts.push(offset);
            offset += raw.len();
            let chars = strip_terminator(raw).chars().count();
            let total = char_prefix.last().copied().unwrap_or(0) + chars;
            char_prefix.push(total);
        }

        Self {
            line_starts,
            char_prefix,
        }
    }

    /// Number of lines in the document
    #[must_use]
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }

    /// Line containing a byte offset (clamped to the last line)
    #[must_use]
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1)
    }

    /// Characters covered by a span, counting one newline between lines
    #[must_use]
    pub fn span_chars(&self, span: LineSpan) -> usize {
        let last = self.len();
        if last == 0 || span.start() >= last {
            return 0;
        }
        let end = span.end().min(last - 1);
        let chars = self.char_prefix[end + 1] - self.char_prefix[span.start()];
        chars + (end - span.start())
    }
}

/// A document prepared for scanning: split lines plus fenced-region mask
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    fenced: Vec<bool>,
}

impl<'a> SourceText<'a> {
    /// Prepare text, finding fenced code regions from the fences themselves
    pub fn new(text: &'a str) -> Self {
        let lines = split_lines(text);
        let fenced = fenced_mask(&lines);
        Self {
            text,
            lines,
            fenced,
        }
    }

    /// Prepare text, taking fenced code regions from parsed code blocks
    pub fn with_code_blocks(text: &'a str, code_blocks: &[CodeBlock]) -> Self {
        let lines = split_lines(text);
        let mut fenced = vec![false; lines.len()];
        for block in code_blocks {
            let end = block.line_end.min(lines.len().saturating_sub(1));
            for flag in fenced.iter_mut().take(end + 1).skip(block.line_start) {
                *flag = true;
            }
        }
        Self {
            text,
            lines,
            fenced,
        }
    }

    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, idx: usize) -> Option<&'a str> {
        self.lines.get(idx).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line lies inside a fenced code block (fences included)
    #[must_use]
    pub fn is_fenced(&self, idx: usize) -> bool {
        self.fenced.get(idx).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_blank(&self, idx: usize) -> bool {
        self.line(idx).map_or(true, is_blank)
    }

    /// ATX heading, or a line underlined with `===`/`---`
    #[must_use]
    pub fn is_heading_at(&self, idx: usize) -> bool {
        let Some(line) = self.line(idx) else {
            return false;
        };
        if is_atx_heading(line) {
            return true;
        }
        !is_blank(line)
            && !is_setext_underline(line)
            && self
                .line(idx + 1)
                .is_some_and(|next| is_setext_underline(next) && !self.is_fenced(idx + 1))
    }
}

/// Split text into lines without terminators
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').map(strip_terminator).collect()
}

fn strip_terminator(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Indentation width in columns, tabs advancing to the next tab stop
pub fn indent_width(line: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += tab_width - (width % tab_width),
            _ => break,
        }
    }
    width
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_atx_heading(line: &str) -> bool {
    ATX_HEADING.is_match(line)
}

pub fn is_setext_underline(line: &str) -> bool {
    SETEXT_UNDERLINE.is_match(line)
}

pub fn is_fence(line: &str) -> bool {
    FENCE.is_match(line)
}

/// `---`, `***` or `___` horizontal rule
pub fn is_thematic_break(line: &str) -> bool {
    THEMATIC_BREAK.is_match(line)
}

/// Mark lines inside ``` / ~~~ fences, fence lines included
///
/// An unclosed fence runs to the end of the document.
pub fn fenced_mask(lines: &[&str]) -> Vec<bool> {
    let mut mask = vec![false; lines.len()];
    let mut open: Option<(char, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        let fence = FENCE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| (m.as_str().chars().next().unwrap_or('`'), m.as_str().len()));

        match (open, fence) {
            (None, Some(found)) => {
                open = Some(found);
                mask[idx] = true;
            }
            (Some((ch, len)), Some((found_ch, found_len)))
                if ch == found_ch && found_len >= len && line.trim().chars().all(|c| c == ch) =>
            {
                open = None;
                mask[idx] = true;
            }
            (Some(_), _) => mask[idx] = true,
            (None, None) => {}
        }
    }

    mask
}

/// Strip one pair of surrounding inline-code backticks
pub fn strip_inline_code(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
        .filter(|inner| !inner.contains('`'))
        .map_or(trimmed, str::trim)
}
