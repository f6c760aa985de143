//! Term/definition pairs in colon, dash and indented notations.

use crate::config::PatternConfig;
use crate::links::is_link_definition;
use crate::lists::is_list_item;
use crate::scan::{indent_width, is_blank, SourceText};
use crate::types::{DefinitionItem, DefinitionNotation};
use once_cell::sync::Lazy;
use regex::Regex;

static COLON_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t]*(?:[-*+][ \t]+)?(?:\*\*|__)?([^:*_|<>`#\s][^:|]*?)(?:\*\*|__)?[ \t]*:(?:\*\*|__)?[ \t]+(\S.*)$",
    )
    .expect("valid colon definition regex")
});

static DASH_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t]*(?:[-*+][ \t]+)?(?:\*\*|__)?([^\-*_|<>`#\s\u{2013}\u{2014}][^|]*?)(?:\*\*|__)?[ \t]+(?:--?|\u{2013}|\u{2014})[ \t]+(\S.*)$",
    )
    .expect("valid dash definition regex")
});

static INDENTED_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]+(?:--?|:|\u{2013}|\u{2014})[ \t]+(\S.*)$")
        .expect("valid indented definition regex")
});

/// Terms longer than the configured limits are headings or prose
pub fn term_exceeds_limits(term: &str, config: &PatternConfig) -> bool {
    term.split_whitespace().count() > config.max_term_words
        || term.chars().count() > config.max_term_chars
}

/// Terms holding or ending a sentence are prose, not terms
pub fn is_prose_term(term: &str) -> bool {
    term.ends_with(['.', '?', '!', ','])
        || [". ", "? ", "! "].iter().any(|stop| term.contains(stop))
}

fn accept(term: &str, definition: &str, config: &PatternConfig) -> bool {
    !term.is_empty()
        && !definition.trim().is_empty()
        && !term_exceeds_limits(term, config)
        && !is_prose_term(term)
}

/// Detect term/definition pairs in document order
///
/// Repeated terms are reported once per occurrence.
pub fn detect_definitions(text: &str, config: &PatternConfig) -> Vec<DefinitionItem> {
    scan_definitions(&SourceText::new(text), config)
}

pub(crate) fn scan_definitions(
    src: &SourceText<'_>,
    config: &PatternConfig,
) -> Vec<DefinitionItem> {
    let lines = src.lines();
    let mut items = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if src.is_fenced(idx)
            || is_blank(line)
            || src.is_heading_at(idx)
            || is_link_definition(line)
        {
            idx += 1;
            continue;
        }

        if let Some(item) = single_line_definition(line, idx, config) {
            items.push(item);
            idx += 1;
            continue;
        }

        if let Some(item) = indented_definition(src, idx, config) {
            idx = item.line_end + 1;
            items.push(item);
            continue;
        }

        idx += 1;
    }

    log::debug!("Detected {} definitions", items.len());
    items
}

fn single_line_definition(
    line: &str,
    idx: usize,
    config: &PatternConfig,
) -> Option<DefinitionItem> {
    let (caps, notation) = match COLON_DEFINITION.captures(line) {
        Some(caps) => (caps, DefinitionNotation::Colon),
        None => (DASH_DEFINITION.captures(line)?, DefinitionNotation::Dash),
    };

    let term = caps[1].trim();
    let definition = caps[2].trim();
    if !accept(term, definition, config) {
        return None;
    }

    Some(DefinitionItem {
        term: term.to_string(),
        definition: definition.to_string(),
        line_start: idx,
        line_end: idx,
        notation,
    })
}

/// Term alone on a line, definition on the next, more indented line
fn indented_definition(
    src: &SourceText<'_>,
    idx: usize,
    config: &PatternConfig,
) -> Option<DefinitionItem> {
    let term_line = src.line(idx)?;
    let next = idx + 1;
    let definition_line = src.line(next)?;
    if src.is_fenced(next) || is_list_item(term_line) {
        return None;
    }
    let term_indent = indent_width(term_line, config.tab_width);
    if indent_width(definition_line, config.tab_width) <= term_indent {
        return None;
    }

    let caps = INDENTED_DEFINITION.captures(definition_line)?;
    let term = term_line.trim().trim_end_matches(':').trim();
    let term = term
        .strip_prefix("**")
        .and_then(|t| t.strip_suffix("**"))
        .unwrap_or(term);
    let definition = caps[1].trim();
    if !accept(term, definition, config) {
        return None;
    }

    Some(DefinitionItem {
        term: term.to_string(),
        definition: definition.to_string(),
        line_start: idx,
        line_end: next,
        notation: DefinitionNotation::Indented,
    })
}
