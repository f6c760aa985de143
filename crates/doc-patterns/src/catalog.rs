//! Per-document pattern catalog and the keep-together query.
//!
//! Every detected record that carries a keep-together policy contributes a
//! [`ProtectedSpan`]. When spans of different kinds overlap, the query takes
//! their union and the most restrictive policy wins: a range is protected as
//! soon as one overlapping span holds.

use crate::lists::group_runs;
use crate::scan::LineIndex;
use crate::types::{
    ApiDocPattern, CrossReference, DefinitionItem, Diagnostic, GrammarRule, KeepPolicy, LineSpan,
    ListItem, PatternKind, PatternRecord, TableStructure,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw detector output, one vector per kind
#[derive(Debug, Clone, Default)]
pub(crate) struct Detections {
    pub lists: Vec<ListItem>,
    pub api_signatures: Vec<ApiDocPattern>,
    pub grammar_rules: Vec<GrammarRule>,
    pub definitions: Vec<DefinitionItem>,
    pub tables: Vec<TableStructure>,
    pub cross_references: Vec<CrossReference>,
}

/// A line range a segmenter should not place a boundary inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedSpan {
    pub kind: PatternKind,
    pub span: LineSpan,
    /// Characters covered, newlines between lines included
    pub chars: usize,
    pub policy: KeepPolicy,
}

impl ProtectedSpan {
    /// Whether the span must stay whole under `size_limit`
    ///
    /// Atomic spans always hold. Size-conditional spans hold only when they
    /// cover more than one line and fit the limit.
    #[must_use]
    pub const fn holds(&self, size_limit: usize) -> bool {
        self.policy.holds(self.span, self.chars, size_limit)
    }
}

/// All patterns detected in one document
///
/// Built once by [`crate::PatternAwareChunker::analyze_content`] and read-only
/// afterwards, so it can be shared between threads and queried freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCatalog {
    index: LineIndex,
    lists: Vec<ListItem>,
    api_signatures: Vec<ApiDocPattern>,
    grammar_rules: Vec<GrammarRule>,
    definitions: Vec<DefinitionItem>,
    tables: Vec<TableStructure>,
    cross_references: Vec<CrossReference>,
    diagnostics: Vec<Diagnostic>,
    guards: Vec<ProtectedSpan>,
}

impl PatternCatalog {
    pub(crate) fn build(
        index: LineIndex,
        mut detections: Detections,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        detections
            .api_signatures
            .sort_by_key(|p| (p.line_start, p.line_end));
        detections
            .grammar_rules
            .sort_by_key(|r| (r.line_start, r.line_end));
        detections
            .definitions
            .sort_by_key(|d| (d.line_start, d.line_end));
        detections.tables.sort_by_key(|t| (t.line_start, t.line_end));

        let guards = collect_guards(&index, &detections);

        Self {
            index,
            lists: detections.lists,
            api_signatures: detections.api_signatures,
            grammar_rules: detections.grammar_rules,
            definitions: detections.definitions,
            tables: detections.tables,
            cross_references: detections.cross_references,
            diagnostics,
            guards,
        }
    }

    /// Number of lines in the analyzed document
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn lists(&self) -> &[ListItem] {
        &self.lists
    }

    #[must_use]
    pub fn api_signatures(&self) -> &[ApiDocPattern] {
        &self.api_signatures
    }

    #[must_use]
    pub fn grammar_rules(&self) -> &[GrammarRule] {
        &self.grammar_rules
    }

    #[must_use]
    pub fn definitions(&self) -> &[DefinitionItem] {
        &self.definitions
    }

    #[must_use]
    pub fn tables(&self) -> &[TableStructure] {
        &self.tables
    }

    #[must_use]
    pub fn cross_references(&self) -> &[CrossReference] {
        &self.cross_references
    }

    /// Non-fatal notes gathered during analysis
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Records of one kind, ordered by first line
    #[must_use]
    pub fn get(&self, kind: PatternKind) -> Vec<PatternRecord> {
        match kind {
            PatternKind::Lists => self.lists.iter().cloned().map(PatternRecord::List).collect(),
            PatternKind::ApiSignatures => self
                .api_signatures
                .iter()
                .cloned()
                .map(PatternRecord::ApiDoc)
                .collect(),
            PatternKind::GrammarRules => self
                .grammar_rules
                .iter()
                .cloned()
                .map(PatternRecord::Grammar)
                .collect(),
            PatternKind::Definitions => self
                .definitions
                .iter()
                .cloned()
                .map(PatternRecord::Definition)
                .collect(),
            PatternKind::Tables => self.tables.iter().cloned().map(PatternRecord::Table).collect(),
            PatternKind::CrossReferences => self
                .cross_references
                .iter()
                .cloned()
                .map(PatternRecord::CrossReference)
                .collect(),
        }
    }

    /// The catalog as a mapping from kind name to records
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, Vec<PatternRecord>> {
        PatternKind::ALL
            .iter()
            .map(|kind| (kind.as_str(), self.get(*kind)))
            .collect()
    }

    /// Number of records of one kind
    #[must_use]
    pub fn count(&self, kind: PatternKind) -> usize {
        match kind {
            PatternKind::Lists => self.lists.len(),
            PatternKind::ApiSignatures => self.api_signatures.len(),
            PatternKind::GrammarRules => self.grammar_rules.len(),
            PatternKind::Definitions => self.definitions.len(),
            PatternKind::Tables => self.tables.len(),
            PatternKind::CrossReferences => self.cross_references.len(),
        }
    }

    /// Total records across all kinds
    #[must_use]
    pub fn len(&self) -> usize {
        PatternKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Characters covered by a span of the analyzed document
    #[must_use]
    pub fn span_chars(&self, span: LineSpan) -> usize {
        self.index.span_chars(span)
    }

    /// Every span carrying a keep-together policy, ordered by position
    #[must_use]
    pub fn guards(&self) -> &[ProtectedSpan] {
        &self.guards
    }

    /// Check whether the half-open line range `[line_start, line_end)` must not be split
    ///
    /// A degenerate range (`line_end <= line_start`) is read as the single
    /// line `line_start`.
    #[must_use]
    pub fn should_keep_together(
        &self,
        line_start: usize,
        line_end: usize,
        size_limit: usize,
    ) -> bool {
        let line_end = if line_end <= line_start {
            line_start + 1
        } else {
            line_end
        };

        self.guards
            .iter()
            .any(|guard| guard.span.overlaps(line_start, line_end) && guard.holds(size_limit))
    }

    /// Merged multi-line spans that hold under `size_limit`
    #[must_use]
    pub fn protected_spans(&self, size_limit: usize) -> Vec<LineSpan> {
        let mut spans: Vec<LineSpan> = self
            .guards
            .iter()
            .filter(|guard| guard.span.line_count() > 1 && guard.holds(size_limit))
            .map(|guard| guard.span)
            .collect();
        spans.sort();

        let mut merged: Vec<LineSpan> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start() <= last.end() => *last = last.union(span),
                _ => merged.push(span),
            }
        }
        merged
    }

    /// Check whether a boundary placed before `line` keeps every protected span whole
    #[must_use]
    pub fn is_safe_boundary(&self, line: usize, size_limit: usize) -> bool {
        self.protected_spans(size_limit)
            .iter()
            .all(|span| !span.is_bisected_by(line))
    }

    /// Closest boundary to `line` that bisects no protected span
    ///
    /// Ties go to the earlier boundary.
    #[must_use]
    pub fn nearest_safe_boundary(&self, line: usize, size_limit: usize) -> usize {
        let spans = self.protected_spans(size_limit);
        let Some(span) = spans.iter().find(|span| span.is_bisected_by(line)) else {
            return line;
        };

        let before = line - span.start();
        let after = span.end() + 1 - line;
        if before <= after {
            span.start()
        } else {
            span.end() + 1
        }
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            total_lines: self.total_lines(),
            lists: self.lists.len(),
            api_signatures: self.api_signatures.len(),
            grammar_rules: self.grammar_rules.len(),
            definitions: self.definitions.len(),
            tables: self.tables.len(),
            cross_references: self.cross_references.len(),
            guards: self.guards.len(),
            diagnostics: self.diagnostics.len(),
        }
    }
}

fn collect_guards(index: &LineIndex, detections: &Detections) -> Vec<ProtectedSpan> {
    let mut guards = Vec::new();
    let mut push = |kind: PatternKind, span: LineSpan| {
        guards.push(ProtectedSpan {
            kind,
            span,
            chars: index.span_chars(span),
            policy: kind.policy(),
        });
    };

    for run in group_runs(&detections.lists) {
        for span in run.guard_spans() {
            push(PatternKind::Lists, span);
        }
    }
    for api in &detections.api_signatures {
        push(
            PatternKind::ApiSignatures,
            LineSpan::new(api.line_start, api.line_end),
        );
    }
    for rule in &detections.grammar_rules {
        push(
            PatternKind::GrammarRules,
            LineSpan::new(rule.line_start, rule.line_end),
        );
    }
    for def in &detections.definitions {
        push(
            PatternKind::Definitions,
            LineSpan::new(def.line_start, def.line_end),
        );
    }
    for table in &detections.tables {
        push(
            PatternKind::Tables,
            LineSpan::new(table.line_start, table.line_end),
        );
    }

    guards.sort_by_key(|guard| (guard.span, guard.kind));
    guards
}

/// Statistics about a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_lines: usize,
    pub lists: usize,
    pub api_signatures: usize,
    pub grammar_rules: usize,
    pub definitions: usize,
    pub tables: usize,
    pub cross_references: usize,
    pub guards: usize,
    pub diagnostics: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Lines: {} | Lists: {} | APIs: {} | Rules: {} | Definitions: {} | Tables: {} | Links: {} | Guards: {} | Diagnostics: {}",
            self.total_lines,
            self.lists,
            self.api_signatures,
            self.grammar_rules,
            self.definitions,
            self.tables,
            self.cross_references,
            self.guards,
            self.diagnostics
        )
    }
}
