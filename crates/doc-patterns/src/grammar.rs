//! BNF/EBNF-style rule detection.
//!
//! Rules are recognised by shape only: a nonterminal, an assignment token and a
//! production. Alternation lines (`| ...`) extend the rule above them, and the
//! indented or example-prefixed lines that follow become its examples.

use crate::config::PatternConfig;
use crate::scan::{indent_width, is_fence, SourceText};
use crate::types::GrammarRule;
use once_cell::sync::Lazy;
use regex::Regex;

static RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(<[^<>]+>|[A-Za-z_][\w\-]*)[ \t]*(::=|:=|->)[ \t]*(\S.*)$")
        .expect("valid grammar rule regex")
});

static ALTERNATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*\|[ \t]*\S").expect("valid alternation regex"));

/// Check if a line opens a grammar rule
pub fn is_rule_line(line: &str) -> bool {
    RULE.is_match(line)
}

fn is_example_line(line: &str, rule_indent: usize, config: &PatternConfig) -> bool {
    if indent_width(line, config.tab_width) > rule_indent {
        return true;
    }
    let lowered = line.trim_start().to_lowercase();
    config
        .example_prefixes
        .iter()
        .any(|prefix| lowered.starts_with(&prefix.to_lowercase()))
}

/// Detect grammar rules with their bound examples
pub fn detect_grammar_rules(text: &str, config: &PatternConfig) -> Vec<GrammarRule> {
    scan_grammar_rules(&SourceText::new(text), config)
}

pub(crate) fn scan_grammar_rules(src: &SourceText<'_>, config: &PatternConfig) -> Vec<GrammarRule> {
    let lines = src.lines();
    let mut rules = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let Some(caps) = RULE.captures(lines[idx]) else {
            idx += 1;
            continue;
        };

        let line_start = idx;
        let rule_indent = indent_width(lines[idx], config.tab_width);
        let name = caps[1].to_string();
        let mut rule = lines[idx].trim().to_string();
        idx += 1;

        while idx < lines.len() && ALTERNATION.is_match(lines[idx]) {
            rule.push(' ');
            rule.push_str(lines[idx].trim());
            idx += 1;
        }

        let mut examples = Vec::new();
        while idx < lines.len() {
            let line = lines[idx];
            if src.is_blank(idx)
                || is_fence(line)
                || is_rule_line(line)
                || !is_example_line(line, rule_indent, config)
            {
                break;
            }
            examples.push(line.trim().to_string());
            idx += 1;
        }

        rules.push(GrammarRule {
            rule,
            name,
            examples,
            line_start,
            line_end: idx - 1,
        });
    }

    log::debug!("Detected {} grammar rules", rules.len());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(text: &str) -> Vec<GrammarRule> {
        detect_grammar_rules(text, &PatternConfig::default())
    }

    #[test]
    fn test_rule_with_indented_example() {
        let found = rules("<digit> ::= \"0\" | \"1\" | ... | \"9\"\n    e.g. 7\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "<digit>");
        assert_eq!(found[0].examples, vec!["e.g. 7".to_string()]);
        assert_eq!((found[0].line_start, found[0].line_end), (0, 1));
        assert!(found[0].should_keep_together(0));
    }

    #[test]
    fn test_alternation_lines_merge_into_rule() {
        let found = rules("expr ::= term\n       | expr \"+\" term\n       | expr \"-\" term\nterm ::= digit");
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].rule,
            "expr ::= term | expr \"+\" term | expr \"-\" term"
        );
        assert_eq!((found[0].line_start, found[0].line_end), (0, 2));
        assert!(found[0].examples.is_empty());
        assert_eq!(found[1].name, "term");
    }

    #[test]
    fn test_assignment_tokens() {
        let found = rules("stmt -> IDENT '=' expr\nvalue := number | string");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "stmt");
        assert_eq!(found[1].name, "value");
    }

    #[test]
    fn test_prefixed_examples_and_termination() {
        let text = "<bool> ::= \"true\" | \"false\"\nExample: true\nfor example false\nThe rule ends here.\n";
        let found = rules(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].examples, vec!["Example: true", "for example false"]);
        assert_eq!(found[0].line_end, 2);
    }

    #[test]
    fn test_examples_stop_at_blank_line() {
        let found = rules("<a> ::= \"x\"\n    x\n\n    not bound\n");
        assert_eq!(found[0].examples, vec!["x"]);
        assert_eq!(found[0].line_end, 1);
    }

    #[test]
    fn test_rules_inside_fences_are_kept() {
        let found = rules("```ebnf\nlist ::= item { \",\" item }\n```");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line_start, 1);
        assert_eq!(found[0].line_end, 1);
    }

    #[test]
    fn test_plain_assignments_are_not_rules() {
        assert!(rules("x = 5\nlet y = x == 3;\nhttp://example.com").is_empty());
    }
}
