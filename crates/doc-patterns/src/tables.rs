//! Pipe-delimited and HTML table detection.

use crate::scan::{in_inline_code, inline_code_spans, is_blank, LineIndex, SourceText};
use crate::types::{Diagnostic, PatternKind, TableFormat, TableStructure};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$")
        .expect("valid table separator regex")
});

/// HTML comments, or any start/end tag with its name captured
static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<[ \t]*(/?)[ \t]*([A-Za-z][\w:-]*)(?:\s[^>]*?)?(/?)>")
        .expect("valid html tag regex")
});

fn is_separator_row(line: &str) -> bool {
    line.contains('|') && SEPARATOR_ROW.is_match(line)
}

fn is_pipe_row(line: &str) -> bool {
    line.contains('|') && !is_blank(line)
}

/// Detect tables, ordered by first line
pub fn detect_tables(text: &str) -> Vec<TableStructure> {
    let mut diagnostics = Vec::new();
    scan_tables(&SourceText::new(text), &mut diagnostics)
}

pub(crate) fn scan_tables(
    src: &SourceText<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<TableStructure> {
    let mut tables = scan_markdown_tables(src);
    tables.extend(scan_html_tables(src, diagnostics));
    tables.sort_by_key(|t| (t.line_start, t.line_end));

    log::debug!("Detected {} tables", tables.len());
    tables
}

fn join_lines(src: &SourceText<'_>, start: usize, end: usize) -> String {
    src.lines()[start..=end].join("\n")
}

fn scan_markdown_tables(src: &SourceText<'_>) -> Vec<TableStructure> {
    let lines = src.lines();
    let mut tables = Vec::new();
    let mut idx = 0;

    while idx + 1 < lines.len() {
        let header_ok = !src.is_fenced(idx)
            && is_pipe_row(lines[idx])
            && !is_separator_row(lines[idx]);
        if !header_ok || src.is_fenced(idx + 1) || !is_separator_row(lines[idx + 1]) {
            idx += 1;
            continue;
        }

        let mut end = idx + 1;
        while end + 1 < lines.len() && !src.is_fenced(end + 1) && is_pipe_row(lines[end + 1]) {
            end += 1;
        }

        tables.push(TableStructure {
            content: join_lines(src, idx, end),
            line_start: idx,
            line_end: end,
            format_type: TableFormat::Markdown,
        });
        idx = end + 1;
    }

    tables
}

/// Scan `<table>` tags, pairing nested open/close tags by depth
///
/// Tags quoted in inline code are prose, not markup.
fn scan_html_tables(
    src: &SourceText<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<TableStructure> {
    let index = LineIndex::new(src.text());
    let code_spans = inline_code_spans(src.text());
    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut open_line = 0;

    for caps in HTML_TAG.captures_iter(src.text()) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue; // comment
        };
        if !name.as_str().eq_ignore_ascii_case("table") {
            continue;
        }
        let line = index.line_of_offset(whole.start());
        if src.is_fenced(line) || in_inline_code(&code_spans, whole.start()) {
            continue;
        }

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        if self_closing {
            continue;
        }

        if !closing {
            if depth == 0 {
                open_line = line;
            }
            depth += 1;
            continue;
        }

        if depth == 0 {
            diagnostics.push(Diagnostic::new(
                PatternKind::Tables,
                Some(line),
                "closing </table> without an opening tag",
            ));
            continue;
        }

        depth -= 1;
        if depth == 0 {
            let end_line = index.line_of_offset(whole.end().saturating_sub(1));
            tables.push(TableStructure {
                content: join_lines(src, open_line, end_line),
                line_start: open_line,
                line_end: end_line,
                format_type: TableFormat::Html,
            });
        }
    }

    if depth > 0 && !src.is_empty() {
        let end_line = src.len() - 1;
        log::warn!("Unterminated <table> opened at line {open_line}, spanning to end of document");
        diagnostics.push(Diagnostic::new(
            PatternKind::Tables,
            Some(open_line),
            "unterminated <table>, record spans to end of document",
        ));
        tables.push(TableStructure {
            content: join_lines(src, open_line, end_line),
            line_start: open_line,
            line_end: end_line,
            format_type: TableFormat::Html,
        });
    }

    tables
}
