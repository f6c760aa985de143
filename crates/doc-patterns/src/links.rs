//! Link detection: inline, reference-style and HTML anchors.
//!
//! Reference links are resolved against `[id]: target` definitions anywhere in
//! the document; unresolved references are dropped. Images are not links.

use crate::scan::{in_inline_code, inline_code_spans, SourceText};
use crate::types::{CrossReference, LinkStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static INLINE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!?)\[([^\[\]]*)\]\(\s*(<[^>]*>|[^)\s]*)(?:\s+(?:"[^"]*"|'[^']*'))?\s*\)"#)
        .expect("valid inline link regex")
});

static REFERENCE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(!?)\[([^\[\]]+)\]\[([^\[\]]*)\]").expect("valid reference link regex")
});

static LINK_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^ {0,3}\[([^\[\]]+)\]:[ \t]*(<[^>]*>|\S+)(?:[ \t]+(?:"[^"]*"|'[^']*'|\([^)]*\)))?[ \t]*$"#)
        .expect("valid link definition regex")
});

static HTML_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#)
        .expect("valid html anchor regex")
});

static HTML_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Check whether a line is a `[label]: target` link reference definition
pub fn is_link_definition(line: &str) -> bool {
    LINK_DEFINITION.is_match(line)
}

/// Detect links in document order
pub fn detect_links(text: &str) -> Vec<CrossReference> {
    scan_links(&SourceText::new(text))
}

pub(crate) fn scan_links(src: &SourceText<'_>) -> Vec<CrossReference> {
    let definitions = collect_definitions(src);
    let mut found: Vec<(usize, usize, CrossReference)> = Vec::new();

    for (idx, line) in src.lines().iter().enumerate() {
        if src.is_fenced(idx) || is_link_definition(line) {
            continue;
        }
        let code_spans = inline_code_spans(line);
        let in_code = |pos: usize| in_inline_code(&code_spans, pos);

        for caps in INLINE_LINK.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            if is_image(&caps) || in_code(whole.start()) {
                continue;
            }
            let target = caps[3].trim_start_matches('<').trim_end_matches('>');
            found.push((
                idx,
                whole.start(),
                CrossReference {
                    text: caps[2].trim().to_string(),
                    target: target.to_string(),
                    line_number: idx,
                    style: LinkStyle::Inline,
                },
            ));
        }

        for caps in REFERENCE_LINK.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            if is_image(&caps) || in_code(whole.start()) {
                continue;
            }
            let text = caps[2].trim();
            let label = if caps[3].trim().is_empty() {
                text
            } else {
                caps[3].trim()
            };
            let Some(target) = definitions.get(&normalize_label(label)) else {
                log::debug!("Unresolved link reference [{label}] at line {idx}");
                continue;
            };
            found.push((
                idx,
                whole.start(),
                CrossReference {
                    text: text.to_string(),
                    target: target.clone(),
                    line_number: idx,
                    style: LinkStyle::Reference,
                },
            ));
        }

        for caps in HTML_ANCHOR.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            if in_code(whole.start()) {
                continue;
            }
            let target = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let text = HTML_TAGS.replace_all(&caps[3], "");
            found.push((
                idx,
                whole.start(),
                CrossReference {
                    text: text.trim().to_string(),
                    target: target.to_string(),
                    line_number: idx,
                    style: LinkStyle::Html,
                },
            ));
        }
    }

    found.sort_by_key(|(line, column, _)| (*line, *column));
    log::debug!("Detected {} cross references", found.len());
    found.into_iter().map(|(_, _, link)| link).collect()
}

fn is_image(caps: &regex::Captures<'_>) -> bool {
    caps.get(1).is_some_and(|m| m.as_str() == "!")
}

/// Labels match case-insensitively with collapsed whitespace
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First definition of each label wins
fn collect_definitions(src: &SourceText<'_>) -> HashMap<String, String> {
    let mut definitions = HashMap::new();
    for (idx, line) in src.lines().iter().enumerate() {
        if src.is_fenced(idx) {
            continue;
        }
        if let Some(caps) = LINK_DEFINITION.captures(line) {
            let target = caps[2].trim_start_matches('<').trim_end_matches('>');
            definitions
                .entry(normalize_label(&caps[1]))
                .or_insert_with(|| target.to_string());
        }
    }
    definitions
}
