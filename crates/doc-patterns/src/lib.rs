//! # Context Doc Patterns
//!
//! Structural pattern detection for documentation chunking.
//!
//! ## Philosophy
//!
//! A segmenter that only counts characters cuts documents in the worst places.
//! This crate finds the structures that lose their meaning when split:
//! - Lists together with the sentence that introduces them
//! - API signatures with their descriptions and examples
//! - Grammar rules with their examples
//! - Term/definition pairs
//! - Tables, which are never split
//! - Links, recorded for reference
//!
//! It never decides a chunk layout itself. It answers one question for the
//! segmenter: would a boundary here destroy a pattern?
//!
//! ## Architecture
//!
//! ```text
//! Document text + DocumentModel (paragraphs, code blocks)
//!     │
//!     ├──> SourceText (lines, fenced-code mask)
//!     │
//!     ├──> Detectors (independent, panic-isolated)
//!     │    ├─> lists        ├─> definitions
//!     │    ├─> api_doc      ├─> tables
//!     │    └─> grammar      └─> links
//!     │
//!     └──> PatternCatalog (built once, read-only)
//!          ├─> records per kind
//!          ├─> protected spans with keep-together policies
//!          └─> should_keep_together / safe boundaries
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_doc_patterns::{DocumentModel, PatternAwareChunker};
//!
//! let chunker = PatternAwareChunker::default();
//! let text = "Supported formats:\n- JSON\n- YAML\n- XML\n";
//!
//! let catalog = chunker
//!     .analyze_content(text, &DocumentModel::default())
//!     .unwrap();
//! assert_eq!(catalog.lists().len(), 3);
//!
//! // Splitting between the intro and the first item would orphan the list
//! assert!(chunker.should_keep_together(0, 2, &catalog, 500));
//! ```

mod api_doc;
mod catalog;
mod chunker;
mod config;
mod definitions;
mod error;
mod grammar;
mod links;
mod lists;
mod model;
mod scan;
mod tables;
mod types;

pub use api_doc::detect_signatures;
pub use catalog::{CatalogStats, PatternCatalog, ProtectedSpan};
pub use chunker::PatternAwareChunker;
pub use config::PatternConfig;
pub use definitions::{detect_definitions, is_prose_term, term_exceeds_limits};
pub use error::{PatternError, Result};
pub use grammar::{detect_grammar_rules, is_rule_line};
pub use links::{detect_links, is_link_definition};
pub use lists::{detect_lists, group_runs, is_list_item, ListRun};
pub use model::{CodeBlock, DocumentModel, Paragraph};
pub use scan::{LineIndex, SourceText};
pub use tables::detect_tables;
pub use types::{
    ApiDocPattern, CrossReference, DefinitionItem, DefinitionNotation, Diagnostic, GrammarRule,
    KeepPolicy, LineSpan, LinkStyle, ListItem, PatternKind, PatternRecord, SignatureLanguage,
    TableFormat, TableStructure,
};
