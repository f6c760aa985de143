use crate::api_doc::scan_signatures;
use crate::catalog::{CatalogStats, Detections, PatternCatalog};
use crate::config::PatternConfig;
use crate::definitions::scan_definitions;
use crate::error::{PatternError, Result};
use crate::grammar::scan_grammar_rules;
use crate::links::scan_links;
use crate::lists::scan_lists;
use crate::model::DocumentModel;
use crate::scan::{LineIndex, SourceText};
use crate::tables::scan_tables;
use crate::types::{
    ApiDocPattern, CrossReference, DefinitionItem, Diagnostic, GrammarRule, ListItem, PatternKind,
    TableStructure,
};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Read-only input shared by every detector of one analysis
struct DetectorInput<'s, 'a> {
    src: &'s SourceText<'a>,
    model: &'s DocumentModel,
    config: &'s PatternConfig,
}

/// Output of a single detector
enum Detected {
    Lists(Vec<ListItem>),
    ApiSignatures(Vec<ApiDocPattern>),
    GrammarRules(Vec<GrammarRule>),
    Definitions(Vec<DefinitionItem>),
    Tables(Vec<TableStructure>),
    CrossReferences(Vec<CrossReference>),
}

impl Detected {
    fn store(self, detections: &mut Detections) {
        match self {
            Self::Lists(items) => detections.lists = items,
            Self::ApiSignatures(items) => detections.api_signatures = items,
            Self::GrammarRules(items) => detections.grammar_rules = items,
            Self::Definitions(items) => detections.definitions = items,
            Self::Tables(items) => detections.tables = items,
            Self::CrossReferences(items) => detections.cross_references = items,
        }
    }
}

fn run_detector(
    kind: PatternKind,
    input: &DetectorInput<'_, '_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Detected {
    match kind {
        PatternKind::Lists => Detected::Lists(scan_lists(
            input.src,
            &input.model.paragraphs,
            input.config,
        )),
        PatternKind::ApiSignatures => Detected::ApiSignatures(scan_signatures(
            input.src,
            &input.model.code_blocks,
            input.config,
        )),
        PatternKind::GrammarRules => {
            Detected::GrammarRules(scan_grammar_rules(input.src, input.config))
        }
        PatternKind::Definitions => {
            Detected::Definitions(scan_definitions(input.src, input.config))
        }
        PatternKind::Tables => Detected::Tables(scan_tables(input.src, diagnostics)),
        PatternKind::CrossReferences => Detected::CrossReferences(scan_links(input.src)),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run one detector, turning a panic into an empty result plus a diagnostic
fn run_isolated<F>(
    kind: PatternKind,
    detector: &F,
    input: &DetectorInput<'_, '_>,
) -> (Option<Detected>, Vec<Diagnostic>)
where
    F: Fn(PatternKind, &DetectorInput<'_, '_>, &mut Vec<Diagnostic>) -> Detected + Sync,
{
    let mut diagnostics = Vec::new();
    match panic::catch_unwind(AssertUnwindSafe(|| detector(kind, input, &mut diagnostics))) {
        Ok(detected) => (Some(detected), diagnostics),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::warn!("{kind} detector failed, continuing without it: {message}");
            (
                None,
                vec![Diagnostic::new(
                    kind,
                    None,
                    format!("detector failed: {message}"),
                )],
            )
        }
    }
}

/// Main interface for pattern-aware segmentation
///
/// Analyze a document once with [`Self::analyze_content`], then ask
/// [`Self::should_keep_together`] about every boundary a segmenter considers.
pub struct PatternAwareChunker {
    config: PatternConfig,
}

impl PatternAwareChunker {
    /// Create a new chunker with configuration
    #[must_use]
    pub fn new(config: PatternConfig) -> Self {
        config
            .validate()
            .expect("Invalid pattern configuration provided");
        Self { config }
    }

    /// Create a new chunker, reporting an invalid configuration as an error
    pub fn try_new(config: PatternConfig) -> Result<Self> {
        config.validate().map_err(PatternError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Run every enabled detector once and build the document's catalog
    ///
    /// Code block ranges in `model` mark the regions detectors treat as fenced
    /// code, and its paragraphs supply the context introducing each list. A
    /// document without patterns yields an empty catalog.
    pub fn analyze_content(&self, text: &str, model: &DocumentModel) -> Result<PatternCatalog> {
        self.analyze_with(text, model, run_detector)
    }

    /// Analyze raw bytes, rejecting anything that is not UTF-8 text
    pub fn analyze_bytes(&self, bytes: &[u8], model: &DocumentModel) -> Result<PatternCatalog> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            PatternError::malformed(format!("document is not valid UTF-8: {e}"))
        })?;
        self.analyze_content(text, model)
    }

    /// Analyze a document read from disk
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        model: &DocumentModel,
    ) -> Result<PatternCatalog> {
        let bytes = std::fs::read(path.as_ref())?;
        log::debug!("Analyzing {}", path.as_ref().display());
        self.analyze_bytes(&bytes, model)
    }

    fn analyze_with<F>(
        &self,
        text: &str,
        model: &DocumentModel,
        detector: F,
    ) -> Result<PatternCatalog>
    where
        F: Fn(PatternKind, &DetectorInput<'_, '_>, &mut Vec<Diagnostic>) -> Detected + Sync,
    {
        let index = LineIndex::new(text);
        model.validate(index.len())?;

        let mut diagnostics = Vec::new();
        if let Some(offset) = text.find('\0') {
            let line = index.line_of_offset(offset);
            log::warn!("Document contains a NUL byte at line {line}, analyzing it as text");
            diagnostics.push(Diagnostic::document(
                Some(line),
                format!("NUL byte at offset {offset}"),
            ));
        }

        let src = SourceText::with_code_blocks(text, &model.code_blocks);
        let input = DetectorInput {
            src: &src,
            model,
            config: &self.config,
        };

        let kinds: Vec<PatternKind> = PatternKind::ALL
            .into_iter()
            .filter(|kind| self.config.is_enabled(*kind))
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<_> = {
            use rayon::prelude::*;
            kinds
                .par_iter()
                .map(|kind| run_isolated(*kind, &detector, &input))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<_> = kinds
            .iter()
            .map(|kind| run_isolated(*kind, &detector, &input))
            .collect();

        let mut detections = Detections::default();
        for (detected, notes) in outcomes {
            if let Some(detected) = detected {
                detected.store(&mut detections);
            }
            diagnostics.extend(notes);
        }

        let catalog = PatternCatalog::build(index, detections, diagnostics);
        log::debug!("Built pattern catalog: {}", catalog.stats());
        Ok(catalog)
    }

    /// Check whether lines `[line_start, line_end)` must stay in one chunk
    #[must_use]
    pub fn should_keep_together(
        &self,
        line_start: usize,
        line_end: usize,
        catalog: &PatternCatalog,
        size_limit: usize,
    ) -> bool {
        catalog.should_keep_together(line_start, line_end, size_limit)
    }

    /// Get statistics about an analyzed document
    #[must_use]
    pub fn get_stats(catalog: &PatternCatalog) -> CatalogStats {
        catalog.stats()
    }
}

impl Default for PatternAwareChunker {
    fn default() -> Self {
        Self::new(PatternConfig::default())
    }
}
