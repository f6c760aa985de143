use context_doc_patterns::{
    detect_definitions, DocumentModel, LineSpan, PatternAwareChunker, PatternCatalog,
    PatternConfig, PatternKind, SignatureLanguage,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn analyze(text: &str) -> PatternCatalog {
    init_logging();
    PatternAwareChunker::default()
        .analyze_content(text, &DocumentModel::default())
        .expect("analysis failed")
}

#[test]
fn simple_list_keeps_its_introduction() {
    let catalog = analyze("Supported formats:\n- JSON\n- YAML\n- XML\n");

    let items = catalog.lists();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| !item.is_ordered && item.run == 0));
    assert!(items
        .iter()
        .all(|item| item.parent_context.as_deref() == Some("Supported formats:")));
    assert!(catalog.should_keep_together(0, 2, 500));
}

#[test]
fn c_signature_binds_trailing_comment() {
    let catalog = analyze("Arithmetic helpers.\n\nint add(int a, int b);\n    // adds two integers\n");

    let apis = catalog.api_signatures();
    assert_eq!(apis.len(), 1, "got: {apis:?}");
    assert_eq!(apis[0].language, SignatureLanguage::CStyle);
    assert_eq!(apis[0].description, "// adds two integers");
    assert_eq!((apis[0].line_start, apis[0].line_end), (2, 3));

    let chars = catalog.span_chars(LineSpan::new(2, 3));
    assert!(catalog.should_keep_together(2, 4, chars));
    assert!(!catalog.should_keep_together(2, 4, chars - 1));
}

#[test]
fn markdown_table_is_never_split() {
    let text = "\
# Column reference

The table below lists every column in the events table.
Each row names a column and gives its storage type.

Columns are stored in declaration order.

Types map to the native engine types.
Nothing else is required.

| Name | Type |
|------|------|
| id   | int  |
| name | text |
| tags | list |
| meta | json |
| when | date |

End of reference.";
    let catalog = analyze(text);

    let tables = catalog.tables();
    assert_eq!(tables.len(), 1);
    assert_eq!((tables[0].line_start, tables[0].line_end), (10, 16));

    let limit = catalog.span_chars(LineSpan::new(10, 16)) / 4;
    assert!(catalog.should_keep_together(10, 16, limit));
    assert!(!catalog.is_safe_boundary(13, limit));
    assert!(catalog.is_safe_boundary(10, limit));
}

#[test]
fn grammar_rule_with_example_is_atomic() {
    let catalog = analyze("<digit> ::= \"0\" | \"1\" | ... | \"9\"\n    e.g. 7\n");

    let rules = catalog.grammar_rules();
    assert_eq!(rules.len(), 1);
    assert!(rules[0].examples.contains(&"e.g. 7".to_string()));
    assert_eq!((rules[0].line_start, rules[0].line_end), (0, 1));
    assert!(catalog.should_keep_together(0, 2, 0));
    assert!(catalog.should_keep_together(0, 2, usize::MAX));
}

#[test]
fn headings_never_become_definitions() {
    let text = "# Overview: the big picture\n## Setup - first steps\nRetries: attempts left";
    let catalog = analyze(text);

    assert_eq!(catalog.definitions().len(), 1);
    assert_eq!(catalog.definitions()[0].term, "Retries");
    assert_eq!(
        detect_definitions("# Overview", &PatternConfig::default()).len(),
        0
    );
}

#[test]
fn plain_prose_yields_an_empty_catalog() {
    let catalog = analyze("Nothing structured here.\nJust two sentences of prose.");

    assert!(catalog.is_empty());
    assert!(catalog.diagnostics().is_empty());
    assert!(PatternKind::ALL
        .iter()
        .all(|kind| catalog.get(*kind).is_empty()));
    assert!(!catalog.should_keep_together(0, 2, 10));
}

#[test]
fn quoted_table_tag_leaves_prose_splittable() {
    let mut text = String::from("Wrap rows in a `<table>` element.");
    for n in 0..50 {
        text.push_str(&format!("\nPlain prose line {n}."));
    }
    let catalog = analyze(&text);

    assert!(catalog.tables().is_empty());
    assert!(catalog.diagnostics().is_empty());
    assert!(!catalog.should_keep_together(20, 30, 0));
    assert!(catalog.protected_spans(0).is_empty());
}

#[test]
fn link_definitions_are_links_not_terms() {
    let catalog = analyze("Read [the RFC][rfc] first.\n\n[rfc]: https://example.com/rfc");

    assert!(catalog.definitions().is_empty());
    assert_eq!(catalog.cross_references().len(), 1);
    assert_eq!(catalog.cross_references()[0].target, "https://example.com/rfc");
    assert!(catalog.guards().is_empty());
}

#[test]
fn atomic_table_wins_inside_a_list_item() {
    let text = "Options:\n- alpha\n  | a | b |\n  |---|---|\n  | 1 | 2 |\n- beta";
    let catalog = analyze(text);

    assert_eq!(catalog.lists().len(), 2);
    assert_eq!(catalog.lists()[0].line_end, 4);
    assert_eq!(catalog.tables().len(), 1);

    // the list run no longer fits, but the table inside it still holds
    assert!(catalog.should_keep_together(3, 4, 1));
    assert_eq!(catalog.protected_spans(1), vec![LineSpan::new(2, 4)]);
    assert_eq!(catalog.protected_spans(1_000), vec![LineSpan::new(0, 5)]);
}

#[test]
fn config_from_toml_restricts_detection() {
    init_logging();
    let config = PatternConfig::from_toml_str(
        r#"
max_term_words = 2
enabled_kinds = ["definitions"]
"#,
    )
    .expect("valid config");
    let chunker = PatternAwareChunker::new(config);

    let catalog = chunker
        .analyze_content(
            "Time to live: seconds\nTTL: seconds\n- a\n- b",
            &DocumentModel::default(),
        )
        .expect("analysis failed");
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.definitions()[0].term, "TTL");
}
