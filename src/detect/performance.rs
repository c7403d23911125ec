//! Performance heuristics for Python loops and literals.
//!
//! Deep nesting and parse failures are warnings; everything else is an
//! optimization.

use tree_sitter::Node;

use crate::analysis::{for_each_node, walk, Checker, Flow, ParsedSource, SourceUnit, Visitor};

use super::{Finding, Level};

pub const UNPARSEABLE: &str = "❌ Unable to analyze performance due to syntax errors.";
const DEEP_NESTING: &str =
    "⚠️ Deeply nested loops detected. Consider refactoring for better performance.";
const APPEND_IN_LOOP: &str = "💡 Consider using list comprehension instead of append inside a loop.";
const SORT_IN_LOOP: &str = "⚠️ Avoid sorting inside loops unless necessary.";
const NESTED_FOR: &str =
    "🔁 Nested loop detected. Consider itertools.product or a lookup table to reduce iterations.";

/// Loop depth at which nesting is reported.
pub const DEEP_NESTING_DEPTH: usize = 3;

fn is_loop(node: Node) -> bool {
    matches!(node.kind(), "for_statement" | "while_statement")
}

/// Tracks the deepest loop nesting seen.
#[derive(Default)]
struct LoopDepth {
    depth: usize,
    max_depth: usize,
}

impl<'t> Visitor<'t> for LoopDepth {
    fn enter(&mut self, node: Node<'t>) -> Flow {
        if is_loop(node) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }
        Flow::Continue
    }

    fn leave(&mut self, node: Node<'t>) {
        if is_loop(node) {
            self.depth -= 1;
        }
    }
}

/// Statements of a loop's body, comments excluded.
fn body_statements(loop_node: Node) -> Vec<Node> {
    let Some(body) = loop_node.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    let statements = body
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    statements
}

/// Append and sort calls anywhere under one loop.
fn loop_call_findings(parsed: &ParsedSource, loop_node: Node, findings: &mut Vec<Finding>) {
    for_each_node(loop_node, |node| {
        if node.kind() != "call" {
            return Flow::Continue;
        }
        let Some(callee) = node.child_by_field_name("function") else {
            return Flow::Continue;
        };
        match callee.kind() {
            "attribute" => {
                let is_append = callee
                    .child_by_field_name("attribute")
                    .is_some_and(|attr| parsed.node_text(attr) == "append");
                if is_append {
                    findings.push(Finding::optimization(APPEND_IN_LOOP));
                }
            }
            "identifier" => {
                if matches!(parsed.node_text(callee), "sorted" | "sort") {
                    findings.push(Finding::optimization(SORT_IN_LOOP));
                }
            }
            _ => {}
        }
        Flow::Continue
    });
}

/// The first bare binary-operation statement of a loop body.
fn loop_invariant_candidate(parsed: &ParsedSource, loop_node: Node) -> Option<Finding> {
    body_statements(loop_node)
        .into_iter()
        .find(|stmt| {
            stmt.kind() == "expression_statement"
                && stmt.named_child_count() == 1
                && stmt
                    .named_child(0)
                    .is_some_and(|expr| expr.kind() == "binary_operator")
        })
        .map(|stmt| {
            let text = parsed
                .node_text(stmt)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            Finding::optimization(format!(
                "🧮 Expression `{}` is evaluated on every iteration. Consider computing it once outside the loop.",
                text
            ))
            .with_impact(Level::Medium)
        })
}

/// Whether a numeric literal's value is exactly 0 or 1.
fn is_zero_or_one(literal: &str) -> bool {
    let cleaned: String = literal
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(imaginary) = cleaned.strip_suffix('j') {
        return imaginary.parse::<f64>().is_ok_and(|v| v == 0.0);
    }

    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| cleaned.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        return u128::from_str_radix(digits, radix).is_ok_and(|v| v <= 1);
    }

    cleaned.parse::<f64>().is_ok_and(|v| v == 0.0 || v == 1.0)
}

/// The first numeric literal that is neither 0 nor 1.
fn first_magic_number(parsed: &ParsedSource) -> Option<Finding> {
    let mut found = None;
    for_each_node(parsed.root(), |node| {
        if !matches!(node.kind(), "integer" | "float") {
            return Flow::Continue;
        }
        let literal = parsed.node_text(node);
        if is_zero_or_one(literal) {
            return Flow::Continue;
        }
        found = Some(
            Finding::optimization(format!(
                "🔢 Magic number {} found. Consider replacing it with a named constant.",
                literal
            ))
            .with_impact(Level::Low),
        );
        Flow::Stop
    });
    found
}

/// Run all performance checks.
pub fn detect_performance_issues(unit: &SourceUnit<'_>) -> Vec<Finding> {
    let parsed = match unit.syntax_tree() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, "performance check skipped");
            return vec![Finding::warning(UNPARSEABLE)];
        }
    };
    let root = parsed.root();
    let mut findings = Vec::new();

    let mut depth = LoopDepth::default();
    walk(root, &mut depth);
    if depth.max_depth >= DEEP_NESTING_DEPTH {
        findings.push(Finding::warning(DEEP_NESTING));
    }

    let mut loops = Vec::new();
    for_each_node(root, |node| {
        if is_loop(node) {
            loops.push(node);
        }
        Flow::Continue
    });

    for &loop_node in &loops {
        loop_call_findings(parsed, loop_node, &mut findings);
    }

    for &loop_node in loops.iter().filter(|n| n.kind() == "for_statement") {
        for stmt in body_statements(loop_node) {
            if stmt.kind() == "for_statement" {
                findings.push(Finding::optimization(NESTED_FOR).with_impact(Level::High));
            }
        }
    }

    findings.extend(
        loops
            .iter()
            .filter_map(|&loop_node| loop_invariant_candidate(parsed, loop_node)),
    );

    findings.extend(first_magic_number(parsed));
    findings
}

pub struct PerformanceChecker;

impl Checker for PerformanceChecker {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_performance_issues(unit)
    }
}
