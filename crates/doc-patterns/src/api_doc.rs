//! Function/method signature detection across several language dialects.
//!
//! Every non-fenced line is tried against a bank of per-dialect patterns. When
//! more than one dialect matches, the match with the most structural tokens
//! wins (keyword, explicit return type, name, parameter list), then the longer
//! match, then bank order. Each signature is bound to the description block
//! right above it, to indented/comment lines right below it, and to a code
//! block that follows.

use crate::config::PatternConfig;
use crate::model::CodeBlock;
use crate::scan::{
    indent_width, is_atx_heading, is_setext_underline, strip_inline_code, SourceText,
};
use crate::types::{ApiDocPattern, SignatureLanguage};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

struct SignatureBank {
    language: SignatureLanguage,
    regex: Regex,
    /// Tokens every match carries; an explicit return type adds one more
    base_tokens: usize,
    /// Capture group holding the return type, if the dialect has one
    return_group: Option<usize>,
}

impl SignatureBank {
    fn new(
        language: SignatureLanguage,
        pattern: &str,
        base_tokens: usize,
        return_group: Option<usize>,
    ) -> Self {
        Self {
            language,
            regex: Regex::new(pattern).expect("valid signature regex"),
            base_tokens,
            return_group,
        }
    }

    fn structural_tokens(&self, caps: &Captures<'_>) -> usize {
        let has_return = self
            .return_group
            .and_then(|group| caps.get(group))
            .is_some_and(|m| !m.as_str().trim().is_empty());
        self.base_tokens + usize::from(has_return)
    }
}

static BANKS: Lazy<Vec<SignatureBank>> = Lazy::new(|| {
    vec![
        SignatureBank::new(
            SignatureLanguage::Rust,
            r#"^(?:pub(?:\([^)]*\))?\s+)?(?:(?:const|async|unsafe)\s+)*(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_]\w*)\s*(?:<[^()]*>)?\s*\(([^()]*)\)\s*(?:->\s*([^{;]+?))?\s*(?:where\s[^{;]*)?[{;]?$"#,
            3,
            Some(3),
        ),
        SignatureBank::new(
            SignatureLanguage::Python,
            r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\((.*)\)\s*(?:->\s*([^:]+?))?\s*:?$",
            3,
            Some(3),
        ),
        SignatureBank::new(
            SignatureLanguage::JavaScript,
            r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^()]*>)?\s*\(([^()]*)\)\s*(?::\s*([^{;]+?))?\s*[{;]?$",
            3,
            Some(3),
        ),
        SignatureBank::new(
            SignatureLanguage::Go,
            r"^func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\(([^()]*)\)\s*([^{]*?)\s*\{?$",
            3,
            Some(3),
        ),
        SignatureBank::new(
            SignatureLanguage::CStyle,
            r"^((?:[A-Za-z_][\w:]*(?:<[^()]*?>)?[ \t*&]+)+)([A-Za-z_~][\w:~]*)\s*\(([^()]*)\)\s*(?:const\s*)?(?:noexcept\s*)?(?:=\s*0\s*)?([;{]?)$",
            4,
            None,
        ),
        SignatureBank::new(
            SignatureLanguage::MethodCall,
            r"^((?:[A-Za-z_$][\w$]*(?:\.|::|#|->))*[A-Za-z_$][\w$]*)\s*\(([^()]*)\)\s*;?$",
            2,
            None,
        ),
    ]
});

/// Words that make a C-style match a statement or another dialect
const NON_TYPE_LEADERS: &[&str] = &[
    "return", "if", "else", "while", "for", "switch", "case", "do", "new", "delete", "throw",
    "sizeof", "await", "yield", "print", "echo", "call", "fn", "def", "function", "func", "let",
    "var", "use", "import", "from", "goto", "export", "default", "async", "pub",
];

const CONTROL_WORDS: &[&str] = &["if", "while", "for", "switch", "return", "sizeof", "catch"];

/// A line recognised as a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignatureMatch {
    pub language: SignatureLanguage,
    pub signature: String,
    pub structural_tokens: usize,
}

/// Classify one line, resolving dialect ties
pub(crate) fn classify_signature(line: &str) -> Option<SignatureMatch> {
    let candidate = signature_candidate(line);
    if candidate.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize, SignatureMatch)> = None;
    for bank in BANKS.iter() {
        let Some(caps) = bank.regex.captures(candidate) else {
            continue;
        };
        if bank.language == SignatureLanguage::CStyle && !is_c_declaration(&caps) {
            continue;
        }
        if bank.language == SignatureLanguage::MethodCall && is_control_word(&caps[1]) {
            continue;
        }

        let tokens = bank.structural_tokens(&caps);
        let length = caps.get(0).map_or(0, |m| m.len());
        let better = best.as_ref().map_or(true, |(best_tokens, best_len, _)| {
            (tokens, length) > (*best_tokens, *best_len)
        });
        if better {
            best = Some((
                tokens,
                length,
                SignatureMatch {
                    language: bank.language,
                    signature: candidate.to_string(),
                    structural_tokens: tokens,
                },
            ));
        }
    }

    best.map(|(_, _, found)| found)
}

/// Strip heading markers and inline-code backticks around a signature
fn signature_candidate(line: &str) -> &str {
    let trimmed = line.trim();
    let unheaded = if is_atx_heading(trimmed) {
        trimmed.trim_start_matches('#').trim()
    } else {
        trimmed
    };
    strip_inline_code(unheaded)
}

fn is_control_word(name: &str) -> bool {
    CONTROL_WORDS.contains(&name)
}

/// Reject statements and prose that happen to fit the C-style shape
fn is_c_declaration(caps: &Captures<'_>) -> bool {
    let return_type = caps.get(1).map_or("", |m| m.as_str());
    let name = caps.get(2).map_or("", |m| m.as_str());
    let params = caps.get(3).map_or("", |m| m.as_str()).trim();
    let terminated = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

    let words: Vec<&str> = return_type
        .split(|c: char| c.is_whitespace() || c == '*' || c == '&')
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.len() > 4 {
        return false;
    }
    if words.iter().any(|w| NON_TYPE_LEADERS.contains(w)) || is_control_word(name) {
        return false;
    }
    if terminated || params.is_empty() || params == "void" {
        return true;
    }

    // Without a terminator, require typed parameters ("int a"), not prose ("value(s)").
    params.split(',').all(|param| {
        let param = param.trim();
        param == "..." || param.split_whitespace().count() >= 2 || param.contains('*')
    })
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["//", "/*", "--", ";;", "\"\"\""]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Detect signatures and bind them to surrounding documentation
///
/// `code_blocks` comes from the document parser; a block starting right
/// after a signature becomes its example.
pub fn detect_signatures(
    text: &str,
    code_blocks: &[CodeBlock],
    config: &PatternConfig,
) -> Vec<ApiDocPattern> {
    scan_signatures(&SourceText::new(text), code_blocks, config)
}

pub(crate) fn scan_signatures(
    src: &SourceText<'_>,
    code_blocks: &[CodeBlock],
    config: &PatternConfig,
) -> Vec<ApiDocPattern> {
    let matches: Vec<Option<SignatureMatch>> = src
        .lines()
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if src.is_fenced(idx) || src.is_blank(idx) {
                None
            } else {
                classify_signature(line)
            }
        })
        .collect();

    let is_signature = |idx: usize| matches.get(idx).is_some_and(Option::is_some);
    let mut patterns: Vec<ApiDocPattern> = Vec::new();

    for (idx, found) in matches.iter().enumerate() {
        let Some(found) = found else {
            continue;
        };
        let claimed_until = patterns.last().map(|p| p.line_end);
        if claimed_until.is_some_and(|end| idx <= end) {
            continue;
        }

        let stops_description = |line_idx: usize| {
            let line = src.line(line_idx).unwrap_or("");
            src.is_blank(line_idx)
                || src.is_fenced(line_idx)
                || is_signature(line_idx)
                || src.is_heading_at(line_idx)
                || is_setext_underline(line)
                || claimed_until.is_some_and(|end| line_idx <= end)
        };

        // Walk back over the description block.
        let mut start = idx;
        while start > 0
            && idx - start < config.max_description_lines
            && !stops_description(start - 1)
        {
            start -= 1;
        }
        let mut description: Vec<&str> =
            src.lines()[start..idx].iter().map(|l| l.trim()).collect();

        // Walk forward over indented or comment lines.
        let mut end = idx;
        if config.bind_trailing_comments {
            let sig_indent = indent_width(src.line(idx).unwrap_or(""), config.tab_width);
            while let Some(next) = src.line(end + 1) {
                if stops_description(end + 1) {
                    break;
                }
                if indent_width(next, config.tab_width) > sig_indent || is_comment_line(next) {
                    description.push(next.trim());
                    end += 1;
                } else {
                    break;
                }
            }
        }

        let mut example = None;
        let mut cursor = end + 1;
        let mut blanks = 0;
        while cursor < src.len() {
            if let Some(block) = code_blocks.iter().find(|b| b.line_start == cursor) {
                example = Some(block.content.clone());
                end = block.line_end.max(end);
                break;
            }
            if !src.is_blank(cursor) || blanks >= config.max_blank_before_example {
                break;
            }
            blanks += 1;
            cursor += 1;
        }

        patterns.push(ApiDocPattern {
            signature: found.signature.clone(),
            description: description.join("\n"),
            line_start: start,
            line_end: end,
            signature_line: idx,
            language: found.language,
            example,
        });
    }

    log::debug!("Detected {} API signatures", patterns.len());
    patterns
}
