//! Ordered and unordered list detection with nesting and introducing context.

use crate::config::PatternConfig;
use crate::model::Paragraph;
use crate::scan::{
    indent_width, is_blank, is_setext_underline, is_thematic_break, LineIndex, SourceText,
};
use crate::types::{LineSpan, ListItem, PatternKind};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)\(?(?:\d{1,9}|[A-Za-z]|[ivx]{1,4}|[IVX]{1,4})[.)][ \t]+(\S.*)$")
        .expect("valid ordered list regex")
});

static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)[-*+\u{2022}][ \t]+(\S.*)$").expect("valid unordered list regex")
});

struct Marker<'a> {
    indent: usize,
    content: &'a str,
    is_ordered: bool,
}

fn parse_marker<'a>(line: &'a str, tab_width: usize) -> Option<Marker<'a>> {
    if is_thematic_break(line) {
        return None;
    }

    let (caps, is_ordered) = match UNORDERED_ITEM.captures(line) {
        Some(caps) => (caps, false),
        None => (ORDERED_ITEM.captures(line)?, true),
    };
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let content = caps.get(2)?.as_str().trim_end();

    Some(Marker {
        indent: indent_width(indent, tab_width),
        content,
        is_ordered,
    })
}

/// Check if a line starts with a list marker
pub fn is_list_item(line: &str) -> bool {
    parse_marker(line, 4).is_some()
}

struct OpenRun {
    index: usize,
    item_indent: usize,
    blank_lines: usize,
    parent_context: Option<String>,
    parent_line: Option<usize>,
}

/// Detect list items in document order
///
/// Items of one contiguous list share a `run` index and the same
/// `parent_context`. Without a parsed paragraph model, the introducing
/// paragraph is found by walking back over non-blank lines.
pub fn detect_lists(text: &str, config: &PatternConfig) -> Vec<ListItem> {
    scan_lists(&SourceText::new(text), &[], config)
}

/// Scan list items; non-empty `paragraphs` supply the parent context
pub(crate) fn scan_lists(
    src: &SourceText<'_>,
    paragraphs: &[Paragraph],
    config: &PatternConfig,
) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = Vec::new();
    let mut open: Option<OpenRun> = None;
    let mut runs = 0;
    let mut last_run_end: Option<usize> = None;

    for (idx, line) in src.lines().iter().enumerate() {
        if src.is_fenced(idx) {
            close_run(&mut open, &items, &mut last_run_end);
            continue;
        }

        if is_blank(line) {
            if let Some(run) = open.as_mut() {
                run.blank_lines += 1;
                if run.blank_lines >= 2 {
                    close_run(&mut open, &items, &mut last_run_end);
                }
            }
            continue;
        }

        if let Some(marker) = parse_marker(line, config.tab_width) {
            let run = open.get_or_insert_with(|| {
                let context = if paragraphs.is_empty() {
                    find_parent_context(src, idx, config, last_run_end)
                } else {
                    paragraph_context(src, paragraphs, idx, config, last_run_end)
                };
                let (parent_context, parent_line) =
                    context.map_or((None, None), |(text, line)| (Some(text), Some(line)));
                runs += 1;
                OpenRun {
                    index: runs - 1,
                    item_indent: marker.indent,
                    blank_lines: 0,
                    parent_context,
                    parent_line,
                }
            });
            run.item_indent = marker.indent;
            run.blank_lines = 0;

            items.push(ListItem {
                content: marker.content.to_string(),
                level: marker.indent / config.list_indent_step.max(1),
                line_start: idx,
                line_end: idx,
                is_ordered: marker.is_ordered,
                parent_context: run.parent_context.clone(),
                parent_line: run.parent_line,
                run: run.index,
            });
            continue;
        }

        // Lines indented past the current marker continue the item, even after one blank.
        if let Some(run) = open.as_mut() {
            if indent_width(line, config.tab_width) > run.item_indent && !src.is_heading_at(idx) {
                if let Some(item) = items.last_mut() {
                    item.line_end = idx;
                    item.content.push(' ');
                    item.content.push_str(line.trim());
                }
                run.blank_lines = 0;
                continue;
            }
        }

        close_run(&mut open, &items, &mut last_run_end);
    }

    log::debug!("Detected {} list items in {} runs", items.len(), runs);
    items
}

fn close_run(open: &mut Option<OpenRun>, items: &[ListItem], last_run_end: &mut Option<usize>) {
    if open.take().is_some() {
        *last_run_end = items.last().map(|item| item.line_end);
    }
}

/// Whether `idx` is owned by code, an earlier list or a rule line
fn belongs_elsewhere(src: &SourceText<'_>, idx: usize, last_run_end: Option<usize>) -> bool {
    let line = src.line(idx).unwrap_or("");
    src.is_fenced(idx)
        || last_run_end.is_some_and(|run_end| idx <= run_end)
        || is_list_item(line)
        || is_thematic_break(line)
        || is_setext_underline(line)
}

/// Nearest parsed paragraph ending within the lookback above `first_item`
fn paragraph_context(
    src: &SourceText<'_>,
    paragraphs: &[Paragraph],
    first_item: usize,
    config: &PatternConfig,
    last_run_end: Option<usize>,
) -> Option<(String, usize)> {
    let floor = first_item.saturating_sub(config.list_context_lookback);
    let paragraph = paragraphs
        .iter()
        .filter(|p| p.line_end < first_item && p.line_end >= floor)
        .max_by_key(|p| (p.line_end, p.line_start))?;

    if belongs_elsewhere(src, paragraph.line_end, last_run_end) {
        return None;
    }

    let text = paragraph
        .text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }

    Some((text, paragraph.line_start))
}

/// Nearest explanatory paragraph above `first_item`, with its first line
fn find_parent_context(
    src: &SourceText<'_>,
    first_item: usize,
    config: &PatternConfig,
    last_run_end: Option<usize>,
) -> Option<(String, usize)> {
    let floor = first_item.saturating_sub(config.list_context_lookback);
    let end = (floor..first_item).rev().find(|idx| !src.is_blank(*idx))?;

    if belongs_elsewhere(src, end, last_run_end) {
        return None;
    }

    let mut start = end;
    while start > floor {
        let prev = start - 1;
        if src.is_blank(prev)
            || belongs_elsewhere(src, prev, last_run_end)
            || src.is_heading_at(prev)
        {
            break;
        }
        start = prev;
    }

    let text = src.lines()[start..=end]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ");

    Some((text, start))
}

/// Items of one contiguous list, never empty
///
/// Built only by [`group_runs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRun<'a> {
    index: usize,
    items: &'a [ListItem],
}

impl<'a> ListRun<'a> {
    /// Run index shared by every item
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn items(&self) -> &'a [ListItem] {
        self.items
    }

    fn first(&self) -> &'a ListItem {
        let items: &'a [ListItem] = self.items;
        &items[0]
    }

    fn last(&self) -> &'a ListItem {
        let items: &'a [ListItem] = self.items;
        &items[items.len() - 1]
    }

    #[must_use]
    pub fn parent_context(&self) -> Option<&'a str> {
        self.first().parent_context.as_deref()
    }

    /// Lines of the whole run, introducing paragraph included
    #[must_use]
    pub fn span(&self) -> LineSpan {
        let start = self.first().parent_line.unwrap_or(self.first().line_start);
        LineSpan::new(start, self.last().line_end)
    }

    /// Lines from the introducing paragraph through the first item
    #[must_use]
    pub fn context_span(&self) -> Option<LineSpan> {
        let first = self.first();
        first
            .parent_line
            .map(|line| LineSpan::new(line, first.line_end))
    }

    /// Spans the list policy guards
    ///
    /// A multi-item run guards its whole span; a context paragraph guards the
    /// lines through the first item. Single-item runs have no run guard.
    pub fn guard_spans(&self) -> impl Iterator<Item = LineSpan> {
        let run = (self.items.len() > 1).then(|| self.span());
        run.into_iter().chain(self.context_span())
    }

    /// Short multi-item lists stay whole; a context paragraph stays with its first item
    #[must_use]
    pub fn should_keep_together(&self, index: &LineIndex, size_limit: usize) -> bool {
        self.guard_spans().any(|span| {
            PatternKind::Lists
                .policy()
                .holds(span, index.span_chars(span), size_limit)
        })
    }
}

/// Group items (in detection order) into their runs
pub fn group_runs(items: &[ListItem]) -> Vec<ListRun<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < items.len() {
        let index = items[start].run;
        let mut end = start + 1;
        while end < items.len() && items[end].run == index {
            end += 1;
        }
        runs.push(ListRun {
            index,
            items: &items[start..end],
        });
        start = end;
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lists(text: &str) -> Vec<ListItem> {
        detect_lists(text, &PatternConfig::default())
    }

    #[test]
    fn test_simple_list_with_context() {
        let items = lists("Supported formats:\n- JSON\n- YAML\n- XML\n");
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.is_ordered && i.run == 0 && i.level == 0));
        assert!(items
            .iter()
            .all(|i| i.parent_context.as_deref() == Some("Supported formats:")));
        assert_eq!(items[0].parent_line, Some(0));
        assert_eq!(
            items.iter().map(|i| i.content.as_str()).collect::<Vec<_>>(),
            vec!["JSON", "YAML", "XML"]
        );
    }

    #[test]
    fn test_ordered_markers() {
        let items = lists("1. first\n2) second\na. third\n(b) fourth");
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|i| i.is_ordered));
        assert_eq!(items[3].content, "fourth");
    }

    #[test]
    fn test_nesting_levels_from_indentation() {
        let items = lists("- top\n  - child\n    - grandchild\n\t- tabbed\n- back");
        let levels: Vec<_> = items.iter().map(|i| i.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 2, 0]);
        assert!(items.iter().all(|i| i.run == 0));
    }

    #[test]
    fn test_continuation_lines_extend_item() {
        let items = lists("- first item\n  wraps here\n- second");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line_end, 1);
        assert_eq!(items[0].content, "first item wraps here");
    }

    #[test]
    fn test_loose_list_survives_single_blank() {
        let items = lists("- a\n\n- b\n\n  more about b\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].run, 0);
        assert_eq!(items[1].line_end, 4);
    }

    #[test]
    fn test_double_blank_terminates_run() {
        let items = lists("- a\n- b\n\n\n- c\n- d");
        assert_eq!(items[1].run, 0);
        assert_eq!(items[2].run, 1);
        assert_eq!(items[2].parent_context, None);
    }

    #[test]
    fn test_dedented_text_terminates_run() {
        let items = lists("- a\n\nPlain paragraph.\n- b");
        assert_eq!(items[0].run, 0);
        assert_eq!(items[1].run, 1);
        assert_eq!(items[1].parent_context.as_deref(), Some("Plain paragraph."));
    }

    #[test]
    fn test_context_lookback_is_bounded() {
        let config = PatternConfig {
            list_context_lookback: 1,
            ..Default::default()
        };
        let items = detect_lists("Intro text\n\n- a\n- b", &config);
        assert_eq!(items[0].parent_context, None);
    }

    #[test]
    fn test_multi_line_context_paragraph() {
        let items = lists("# Heading\nThe options are\nlisted below:\n- a\n- b");
        assert_eq!(
            items[0].parent_context.as_deref(),
            Some("The options are listed below:")
        );
        assert_eq!(items[0].parent_line, Some(1));
    }

    #[test]
    fn test_parsed_paragraphs_supply_context() {
        let text = "Intro sentence one\nIntro two\n- a\n- b";
        let src = SourceText::new(text);
        let config = PatternConfig::default();

        let walked = scan_lists(&src, &[], &config);
        assert_eq!(
            walked[0].parent_context.as_deref(),
            Some("Intro sentence one Intro two")
        );
        assert_eq!(walked[0].parent_line, Some(0));

        let paragraphs = vec![
            Paragraph::new(0, 0, "Intro sentence one"),
            Paragraph::new(1, 1, "Intro two"),
        ];
        let items = scan_lists(&src, &paragraphs, &config);
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|i| i.parent_context.as_deref() == Some("Intro two")));
        assert_eq!(items[0].parent_line, Some(1));
    }

    #[test]
    fn test_parsed_paragraph_outside_lookback_is_ignored() {
        let text = "Far away intro\n\n\n\n\n- a\n- b";
        let paragraphs = vec![Paragraph::new(0, 0, "Far away intro")];
        let items = scan_lists(&SourceText::new(text), &paragraphs, &PatternConfig::default());
        assert_eq!(items[0].parent_context, None);
        assert_eq!(items[0].parent_line, None);
    }

    #[test]
    fn test_skips_fenced_code_and_rules() {
        let items = lists("```yaml\n- not: a list\n```\n---\n* * *");
        assert!(items.is_empty());
    }

    #[test]
    fn test_group_runs_and_keep_together() {
        let text = "Formats:\n- JSON\n- YAML\n\n\nLone:\n- only";
        let items = lists(text);
        let runs = group_runs(&items);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].span(), LineSpan::new(0, 2));
        assert_eq!(runs[1].items().len(), 1);
        assert_eq!(runs[1].index(), 1);
        assert_eq!(runs[1].guard_spans().collect::<Vec<_>>(), vec![LineSpan::new(5, 6)]);

        let index = LineIndex::new(text);
        assert!(runs[0].should_keep_together(&index, 1_000));
        assert!(!runs[0].should_keep_together(&index, 5));
        // single item lists keep only their context pairing
        assert!(runs[1].should_keep_together(&index, 1_000));
        assert_eq!(runs[1].context_span(), Some(LineSpan::new(5, 6)));
    }
}
