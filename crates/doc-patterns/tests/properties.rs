//! Property-based tests for catalog construction and keep-together queries

use context_doc_patterns::{
    detect_definitions, detect_lists, DocumentModel, PatternAwareChunker, PatternCatalog,
    PatternConfig, PatternKind,
};
use proptest::prelude::*;

/// Lines that exercise every detector, mixed with free text
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Supported formats:".to_string()),
        Just("- item".to_string()),
        Just("  - nested item".to_string()),
        Just("1. first step".to_string()),
        Just(String::new()),
        Just("| a | b |".to_string()),
        Just("|---|---|".to_string()),
        Just("<table>".to_string()),
        Just("</table>".to_string()),
        Just("```".to_string()),
        Just("<expr> ::= term | expr \"+\" term".to_string()),
        Just("    e.g. 1 + 2".to_string()),
        Just("Latency: time to first byte".to_string()),
        Just("# Overview".to_string()),
        Just("int add(int a, int b);".to_string()),
        Just("    // adds two integers".to_string()),
        Just("See [the guide](guide.md).".to_string()),
        "[a-z ]{0,24}",
    ]
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..40).prop_map(|lines| lines.join("\n"))
}

fn analyze(text: &str) -> PatternCatalog {
    PatternAwareChunker::default()
        .analyze_content(text, &DocumentModel::default())
        .expect("analysis failed")
}

proptest! {
    #[test]
    fn prop_analysis_is_deterministic(doc in document_strategy()) {
        prop_assert_eq!(analyze(&doc), analyze(&doc));
    }

    #[test]
    fn prop_record_ranges_are_valid(doc in document_strategy()) {
        let catalog = analyze(&doc);
        let total = catalog.total_lines();
        for kind in PatternKind::ALL {
            for record in catalog.get(kind) {
                let span = record.span();
                prop_assert!(span.start() <= span.end(), "{kind} record {span:?} reversed");
                prop_assert!(span.end() < total, "{kind} record {span:?} outside {total} lines");
            }
        }
    }

    #[test]
    fn prop_nesting_levels_never_decrease(depth in 1usize..10) {
        let doc = (0..depth)
            .map(|level| format!("{}- item {level}", "  ".repeat(level)))
            .collect::<Vec<_>>()
            .join("\n");
        let items = detect_lists(&doc, &PatternConfig::default());
        prop_assert_eq!(items.len(), depth);
        for pair in items.windows(2) {
            prop_assert!(pair[0].level <= pair[1].level);
        }
    }

    #[test]
    fn prop_tables_hold_under_any_limit(doc in document_strategy(), limit in 0usize..10_000) {
        let catalog = analyze(&doc);
        for table in catalog.tables() {
            prop_assert!(catalog.should_keep_together(table.line_start, table.line_end, limit));
        }
    }

    #[test]
    fn prop_headings_never_define(
        hashes in 1usize..7,
        term in "[A-Za-z]{1,10}",
        separator in prop_oneof![Just(": "), Just(" - ")],
        rest in "[a-z ]{1,20}",
    ) {
        let heading = format!("{} {term}{separator}{rest}", "#".repeat(hashes));
        prop_assert!(detect_definitions(&heading, &PatternConfig::default()).is_empty());
        prop_assert_eq!(analyze(&heading).definitions().len(), 0);
    }

    #[test]
    fn prop_queries_are_idempotent(
        doc in document_strategy(),
        start in 0usize..45,
        end in 0usize..45,
        limit in 0usize..2_000,
    ) {
        let catalog = analyze(&doc);
        prop_assert_eq!(
            catalog.should_keep_together(start, end, limit),
            catalog.should_keep_together(start, end, limit)
        );
    }

    #[test]
    fn prop_nearest_boundary_is_safe(
        doc in document_strategy(),
        line in 0usize..45,
        limit in 0usize..2_000,
    ) {
        let catalog = analyze(&doc);
        let boundary = catalog.nearest_safe_boundary(line, limit);
        prop_assert!(catalog.is_safe_boundary(boundary, limit));
        prop_assert!(boundary <= line.max(catalog.total_lines()));
    }
}
