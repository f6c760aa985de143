use serde::{Deserialize, Serialize};

/// Inclusive range of 0-indexed source lines
///
/// `start <= end` always holds; reversed bounds are swapped on construction
/// and on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "SpanBounds")]
pub struct LineSpan {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct SpanBounds {
    start: usize,
    end: usize,
}

impl From<SpanBounds> for LineSpan {
    fn from(bounds: SpanBounds) -> Self {
        Self::new(bounds.start, bounds.end)
    }
}

impl LineSpan {
    /// Create a span, swapping the bounds if they arrive reversed
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Span covering a single line
    #[must_use]
    pub const fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// First line (0-indexed)
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Last line (0-indexed, inclusive)
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of lines in this span
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Check whether a boundary placed before `line` would cut this span
    #[must_use]
    pub const fn is_bisected_by(&self, line: usize) -> bool {
        self.start < line && line <= self.end
    }

    /// Check overlap with the half-open line range `[start, end)`
    #[must_use]
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end >= start
    }

    /// Smallest span covering both
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Kind of structural pattern tracked in a catalog
///
/// Declaration order is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Lists,
    ApiSignatures,
    GrammarRules,
    Definitions,
    Tables,
    CrossReferences,
}

impl PatternKind {
    /// Every kind, in catalog order
    pub const ALL: [Self; 6] = [
        Self::Lists,
        Self::ApiSignatures,
        Self::GrammarRules,
        Self::Definitions,
        Self::Tables,
        Self::CrossReferences,
    ];

    /// Stable name used as the catalog key
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::ApiSignatures => "api_signatures",
            Self::GrammarRules => "grammar_rules",
            Self::Definitions => "definitions",
            Self::Tables => "tables",
            Self::CrossReferences => "cross_references",
        }
    }

    /// Keep-together policy for records of this kind
    #[must_use]
    pub const fn policy(self) -> KeepPolicy {
        match self {
            Self::GrammarRules | Self::Tables => KeepPolicy::Atomic,
            Self::Lists | Self::ApiSignatures | Self::Definitions => KeepPolicy::WithinLimit,
            Self::CrossReferences => KeepPolicy::Never,
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a protected span may be split when it does not fit a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepPolicy {
    /// Indivisible regardless of the size limit
    Atomic,
    /// Protected only while the whole span fits in the size limit
    ///
    /// A span of exactly `size_limit` characters still fits. One-line spans
    /// are never protected, since no boundary can fall inside them.
    WithinLimit,
    /// Point annotations, never protected on their own
    Never,
}

impl KeepPolicy {
    /// Decide whether `span`, covering `span_chars` characters, must stay in one chunk
    #[must_use]
    pub const fn holds(self, span: LineSpan, span_chars: usize, size_limit: usize) -> bool {
        match self {
            Self::Atomic => true,
            Self::WithinLimit => span.line_count() > 1 && span_chars <= size_limit,
            Self::Never => false,
        }
    }
}

/// A single item of an ordered or unordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Item text without its marker
    pub content: String,

    /// Nesting depth derived from indentation
    pub level: usize,

    pub line_start: usize,
    pub line_end: usize,

    pub is_ordered: bool,

    /// Explanatory paragraph introducing the list, if any
    pub parent_context: Option<String>,

    /// First line of `parent_context`
    pub parent_line: Option<usize>,

    /// Index of the list run this item belongs to
    pub run: usize,
}

/// Signature dialect that matched an API line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureLanguage {
    /// Return type, name, parenthesized arguments
    CStyle,
    /// `def name(args)` with optional return annotation
    Python,
    /// `fn name(args) -> Ret`
    Rust,
    /// `function name(args)`
    JavaScript,
    /// `func name(args) Ret`
    Go,
    /// Bare `name(args)` or `object.method(args)` call syntax
    MethodCall,
}

/// A function or method signature bound to its documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDocPattern {
    /// Raw signature text
    pub signature: String,

    /// Explanatory text around the signature, may be empty
    pub description: String,

    pub line_start: usize,
    pub line_end: usize,

    /// Line holding the signature itself
    pub signature_line: usize,

    pub language: SignatureLanguage,

    /// Content of the code block bound after the signature
    pub example: Option<String>,
}

/// A BNF/EBNF production with its illustrative examples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarRule {
    /// Rule text including alternation continuation lines
    pub rule: String,

    /// Left-hand nonterminal
    pub name: String,

    pub examples: Vec<String>,

    pub line_start: usize,
    pub line_end: usize,
}

impl GrammarRule {
    /// A rule never gets split from its own examples
    #[must_use]
    pub const fn should_keep_together(&self, _size_limit: usize) -> bool {
        true
    }
}

/// Notation a definition was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionNotation {
    /// `Term: definition`
    Colon,
    /// `Term - definition`
    Dash,
    /// Term alone on a line, definition on the next indented line
    Indented,
}

/// A term and its definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionItem {
    pub term: String,
    pub definition: String,
    pub line_start: usize,
    pub line_end: usize,
    pub notation: DefinitionNotation,
}

/// Table dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    Markdown,
    Html,
}

/// A table treated as one indivisible block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStructure {
    /// Raw table text
    pub content: String,

    pub line_start: usize,
    pub line_end: usize,

    pub format_type: TableFormat,
}

impl TableStructure {
    /// Tables are never split; oversized tables are the caller's overrun to accept
    #[must_use]
    pub const fn should_keep_together(&self, _size_limit: usize) -> bool {
        true
    }
}

/// Syntax a link was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    /// `[text](target)`
    Inline,
    /// `[text][id]` resolved against `[id]: target`
    Reference,
    /// `<a href="target">text</a>`
    Html,
}

/// A link found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub text: String,
    pub target: String,
    pub line_number: usize,
    pub style: LinkStyle,
}

/// Any detected pattern, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternRecord {
    List(ListItem),
    ApiDoc(ApiDocPattern),
    Grammar(GrammarRule),
    Definition(DefinitionItem),
    Table(TableStructure),
    CrossReference(CrossReference),
}

impl PatternRecord {
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        match self {
            Self::List(_) => PatternKind::Lists,
            Self::ApiDoc(_) => PatternKind::ApiSignatures,
            Self::Grammar(_) => PatternKind::GrammarRules,
            Self::Definition(_) => PatternKind::Definitions,
            Self::Table(_) => PatternKind::Tables,
            Self::CrossReference(_) => PatternKind::CrossReferences,
        }
    }

    /// Lines covered by the record
    #[must_use]
    pub const fn span(&self) -> LineSpan {
        match self {
            Self::List(item) => LineSpan::new(item.line_start, item.line_end),
            Self::ApiDoc(api) => LineSpan::new(api.line_start, api.line_end),
            Self::Grammar(rule) => LineSpan::new(rule.line_start, rule.line_end),
            Self::Definition(def) => LineSpan::new(def.line_start, def.line_end),
            Self::Table(table) => LineSpan::new(table.line_start, table.line_end),
            Self::CrossReference(link) => LineSpan::single(link.line_number),
        }
    }
}

/// Non-fatal note produced while building a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Detector the note comes from; `None` for notes about the whole document
    pub kind: Option<PatternKind>,
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: PatternKind, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            line,
            message: message.into(),
        }
    }

    /// Note about the document itself rather than one detector
    pub fn document(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: None,
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = self.kind.map_or("document", PatternKind::as_str);
        match self.line {
            Some(line) => write!(f, "[{source}] line {line}: {}", self.message),
            None => write!(f, "[{source}] {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_line_count() {
        assert_eq!(LineSpan::new(10, 15).line_count(), 6);
        assert_eq!(LineSpan::single(3).line_count(), 1);
    }

    #[test]
    fn test_span_normalizes_reversed_bounds() {
        let span = LineSpan::new(9, 4);
        assert_eq!(span.start(), 4);
        assert_eq!(span.end(), 9);
    }

    #[test]
    fn test_deserialized_span_is_normalized() {
        let span: LineSpan = serde_json::from_str(r#"{"start": 7, "end": 2}"#).unwrap();
        assert_eq!(span, LineSpan::new(2, 7));
        assert_eq!(span.line_count(), 6);
        assert_eq!(
            serde_json::to_string(&span).unwrap(),
            r#"{"start":2,"end":7}"#
        );
    }

    #[test]
    fn test_bisected_by_boundary() {
        let span = LineSpan::new(4, 6);
        assert!(!span.is_bisected_by(4));
        assert!(span.is_bisected_by(5));
        assert!(span.is_bisected_by(6));
        assert!(!span.is_bisected_by(7));
    }

    #[test]
    fn test_span_half_open_overlap() {
        let span = LineSpan::new(10, 16);
        assert!(span.overlaps(10, 16));
        assert!(span.overlaps(16, 20));
        assert!(span.overlaps(0, 11));
        assert!(!span.overlaps(0, 10));
        assert!(!span.overlaps(17, 30));
    }

    #[test]
    fn test_kind_policies() {
        assert_eq!(PatternKind::Tables.policy(), KeepPolicy::Atomic);
        assert_eq!(PatternKind::GrammarRules.policy(), KeepPolicy::Atomic);
        assert_eq!(PatternKind::Lists.policy(), KeepPolicy::WithinLimit);
        assert_eq!(PatternKind::ApiSignatures.policy(), KeepPolicy::WithinLimit);
        assert_eq!(PatternKind::CrossReferences.policy(), KeepPolicy::Never);
    }

    #[test]
    fn test_policy_limits() {
        let span = LineSpan::new(0, 3);
        assert!(KeepPolicy::Atomic.holds(span, 10_000, 1));
        assert!(KeepPolicy::WithinLimit.holds(span, 100, 100));
        assert!(!KeepPolicy::WithinLimit.holds(span, 101, 100));
        assert!(!KeepPolicy::Never.holds(span, 0, 100));
    }

    #[test]
    fn test_single_line_spans_only_hold_when_atomic() {
        let line = LineSpan::single(5);
        assert!(KeepPolicy::Atomic.holds(line, 40, 1));
        assert!(!KeepPolicy::WithinLimit.holds(line, 40, 1_000));
    }

    #[test]
    fn test_diagnostic_display() {
        let table = Diagnostic::new(PatternKind::Tables, Some(3), "unterminated <table>");
        assert_eq!(table.to_string(), "[tables] line 3: unterminated <table>");
        let doc = Diagnostic::document(None, "NUL byte");
        assert_eq!(doc.kind, None);
        assert_eq!(doc.to_string(), "[document] NUL byte");
    }

    #[test]
    fn test_kind_names_are_stable() {
        let names: Vec<_> = PatternKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "lists",
                "api_signatures",
                "grammar_rules",
                "definitions",
                "tables",
                "cross_references"
            ]
        );
    }
}
