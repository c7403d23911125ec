//! Heuristic logic-flaw detection.
//!
//! Three tree checks (call arity, unreachable code after `return`) plus one
//! textual scan for assignments inside `if` conditions. Only plain `def`
//! functions take part; `async def` is skipped.

use std::collections::HashMap;

use regex::Regex;
use tree_sitter::Node;

use crate::analysis::{for_each_node, is_async_def, Checker, Flow, ParsedSource, SourceUnit};

use super::Finding;

lazy_static::lazy_static! {
    static ref IF_CONDITION_RE: Regex = Regex::new(r"\bif\s+(.+):").unwrap();
}

pub const UNPARSEABLE: &str = "❌ Syntax error in code; unable to analyze logic.";
const IF_ASSIGNMENT: &str =
    "🤖 Possible assignment in `if` statement (did you mean '==' instead of '='?).";

/// Function name to declared positional parameter count.
pub type FunctionSignatures = HashMap<String, usize>;

/// Count the positional-or-keyword parameters of a `parameters` node.
///
/// Parameters before a `/` are positional-only and parameters after `*` or
/// `*args` are keyword-only; neither is counted.
fn positional_params(params: Node) -> usize {
    let mut count = 0;
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" | "default_parameter" | "typed_default_parameter" => count += 1,
            "typed_parameter" => {
                let mut inner = param.walk();
                let is_splat = param.named_children(&mut inner).any(|c| {
                    matches!(c.kind(), "list_splat_pattern" | "dictionary_splat_pattern")
                });
                if is_splat {
                    break;
                }
                count += 1;
            }
            "positional_separator" => count = 0,
            "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
            _ => {}
        }
    }
    count
}

/// Collect every function definition's positional arity.
///
/// A later definition of the same name replaces an earlier one.
pub fn collect_signatures(parsed: &ParsedSource) -> FunctionSignatures {
    let mut signatures = FunctionSignatures::new();
    for_each_node(parsed.root(), |node| {
        if node.kind() == "function_definition" && !is_async_def(node) {
            if let (Some(name), Some(params)) = (
                node.child_by_field_name("name"),
                node.child_by_field_name("parameters"),
            ) {
                signatures.insert(parsed.node_text(name).to_string(), positional_params(params));
            }
        }
        Flow::Continue
    });
    signatures
}

/// Positional arguments in a call, ignoring keywords and `**` expansions.
fn positional_args(arguments: Node) -> usize {
    if arguments.kind() == "generator_expression" {
        return 1;
    }
    let mut cursor = arguments.walk();
    let count = arguments
        .named_children(&mut cursor)
        .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat" | "comment"))
        .count();
    count
}

fn arity_flaws(parsed: &ParsedSource, signatures: &FunctionSignatures) -> Vec<Finding> {
    let mut flaws = Vec::new();
    for_each_node(parsed.root(), |node| {
        if node.kind() != "call" {
            return Flow::Continue;
        }
        let Some(callee) = node.child_by_field_name("function") else {
            return Flow::Continue;
        };
        if callee.kind() != "identifier" {
            return Flow::Continue;
        }
        let name = parsed.node_text(callee);
        let (Some(&expected), Some(arguments)) =
            (signatures.get(name), node.child_by_field_name("arguments"))
        else {
            return Flow::Continue;
        };
        let actual = positional_args(arguments);
        if actual != expected {
            flaws.push(Finding::warning(format!(
                "🤖 Logic flaw: function '{}' called with {} args (expected {}).",
                name, actual, expected
            )));
        }
        Flow::Continue
    });
    flaws
}

fn unreachable_flaws(parsed: &ParsedSource) -> Vec<Finding> {
    let mut flaws = Vec::new();
    for_each_node(parsed.root(), |node| {
        if node.kind() != "function_definition" || is_async_def(node) {
            return Flow::Continue;
        }
        let (Some(name), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return Flow::Continue;
        };

        let mut cursor = body.walk();
        let statements: Vec<Node> = body
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();
        let Some((_, leading)) = statements.split_last() else {
            return Flow::Continue;
        };
        // Only the first early return per function is reported.
        if leading.iter().any(|stmt| stmt.kind() == "return_statement") {
            flaws.push(Finding::warning(format!(
                "🤖 Unreachable code detected after `return` in function '{}'.",
                parsed.node_text(name)
            )));
        }
        Flow::Continue
    });
    flaws
}

/// Whether `condition` has an `=` that is not part of a comparison or walrus.
fn has_lone_assignment(condition: &str) -> bool {
    let bytes = condition.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'=' {
            return false;
        }
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        !matches!(prev, Some(b'=' | b'<' | b'>' | b'!' | b':')) && next != Some(b'=')
    })
}

/// Scan every line for an `if` whose condition looks like an assignment.
///
/// Reported at most once per snippet.
pub fn has_if_assignment(code: &str) -> bool {
    code.lines().any(|line| {
        IF_CONDITION_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .is_some_and(|cond| has_lone_assignment(cond.as_str()))
    })
}

/// Run all logic checks.
pub fn detect_logic_flaws(unit: &SourceUnit<'_>) -> Vec<Finding> {
    let parsed = match unit.syntax_tree() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, "logic check skipped");
            return vec![Finding::warning(UNPARSEABLE)];
        }
    };

    let signatures = collect_signatures(parsed);
    let mut flaws = arity_flaws(parsed, &signatures);
    flaws.extend(unreachable_flaws(parsed));
    if has_if_assignment(unit.code()) {
        flaws.push(Finding::warning(IF_ASSIGNMENT));
    }
    flaws
}

pub struct LogicChecker;

impl Checker for LogicChecker {
    fn name(&self) -> &'static str {
        "logic"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_logic_flaws(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse_python;
    use crate::language::Language;

    fn flaws(code: &str) -> Vec<String> {
        detect_logic_flaws(&SourceUnit::new(&Language::Python, code))
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn test_signature_counts() {
        let code = r#"
def plain(a, b, c=1): pass
def typed(a: int, b: str = "x"): pass
def starred(a, *args, **kwargs): pass
def kwonly(a, *, b): pass
def posonly(a, b, /, c): pass
def method(self, x): pass
async def fetch(url): pass
"#;
        let parsed = parse_python(code).unwrap();
        let sigs = collect_signatures(&parsed);
        assert_eq!(sigs["plain"], 3);
        assert_eq!(sigs["typed"], 2);
        assert_eq!(sigs["starred"], 1);
        assert_eq!(sigs["kwonly"], 1);
        assert_eq!(sigs["posonly"], 1);
        assert_eq!(sigs["method"], 2);
        assert!(!sigs.contains_key("fetch"));
    }

    #[test]
    fn test_wrong_arity_is_flagged() {
        let code = "def add(a, b):\n    return a + b\n\nadd(1)\nadd(1, 2)\nadd(1, 2, b=3)\n";
        assert_eq!(
            flaws(code),
            vec!["🤖 Logic flaw: function 'add' called with 1 args (expected 2).".to_string()]
        );
    }

    #[test]
    fn test_unknown_and_attribute_calls_are_ignored() {
        let code = "def f(a):\n    return a\n\nprint(1, 2, 3)\nobj.f(1, 2)\n";
        assert!(flaws(code).is_empty());
    }

    #[test]
    fn test_unreachable_reported_once_per_function() {
        let code = "def f():\n    return 1\n    x = 2\n    return x\n    y = 3\n";
        assert_eq!(
            flaws(code),
            vec!["🤖 Unreachable code detected after `return` in function 'f'.".to_string()]
        );
    }

    #[test]
    fn test_async_functions_are_skipped() {
        let code = "async def fetch(url):\n    return url\n    x = 1\n\nfetch()\n";
        assert!(flaws(code).is_empty());
    }

    #[test]
    fn test_final_return_is_fine() {
        let code = "def f():\n    x = 1\n    # trailing comment\n    return x\n";
        assert!(flaws(code).is_empty());
    }

    #[test]
    fn test_lone_assignment_detection() {
        assert!(has_lone_assignment("x = 5"));
        assert!(has_lone_assignment("check(key=1)"));
        assert!(!has_lone_assignment("x == 5"));
        assert!(!has_lone_assignment("x <= 5 and y >= 2 and z != 1"));
        assert!(!has_lone_assignment("(n := len(a)) > 10"));
    }

    #[test]
    fn test_if_assignment_reported_once() {
        let code = "def check(key=None):\n    return key\n\nif check(key=1):\n    pass\nif check(key=2):\n    pass\n";
        let found = flaws(code);
        assert_eq!(found.iter().filter(|m| m.contains("Possible assignment")).count(), 1);
    }

    #[test]
    fn test_syntax_error_short_circuits() {
        assert_eq!(flaws("if x = 5:\n    pass\n"), vec![UNPARSEABLE.to_string()]);
    }

    #[test]
    fn test_empty_source() {
        assert!(flaws("").is_empty());
    }
}
