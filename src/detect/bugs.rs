//! Known bug patterns in Python code.

use serde::Serialize;
use tree_sitter::Node;

use crate::analysis::{walk, Checker, Flow, ParsedSource, SourceUnit, Visitor};

use super::{Finding, Level};

const SHADOWED_SUM: &str = "Avoid using 'sum' as a variable (shadows built-in).";
const SHADOWED_SUM_TIP: &str = "Using 'sum' as a variable name overrides Python’s built-in sum() function, which can cause unexpected behavior.";

const UNUSED_PASS: &str = "Consider removing unused 'pass' statement (possible dead code).";
const UNUSED_PASS_TIP: &str =
    "'pass' can be removed unless you're using it as a placeholder for future code.";

const UNPARSEABLE: &str = "Syntax Error in code. Unable to parse.";
const UNPARSEABLE_TIP: &str = "Check for typos or indentation issues in your code.";

/// A bug in structured form, as returned by the standalone bug endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugReport {
    pub message: String,
    pub severity: Level,
    pub tip: String,
}

impl BugReport {
    fn from_finding(finding: Finding) -> Self {
        Self {
            message: finding.message,
            severity: finding.severity.unwrap_or(Level::Low),
            tip: finding.tip.unwrap_or_default(),
        }
    }
}

struct BugVisitor<'p> {
    parsed: &'p ParsedSource,
    bugs: Vec<Finding>,
}

impl<'p> BugVisitor<'p> {
    /// Plain `name = value` assignments only; annotated ones are skipped.
    fn assigns_to_sum(&self, node: Node) -> bool {
        if node.child_by_field_name("type").is_some() || node.child_by_field_name("right").is_none() {
            return false;
        }
        node.child_by_field_name("left")
            .is_some_and(|left| left.kind() == "identifier" && self.parsed.node_text(left) == "sum")
    }
}

impl<'t, 'p> Visitor<'t> for BugVisitor<'p> {
    fn enter(&mut self, node: Node<'t>) -> Flow {
        match node.kind() {
            "assignment" if self.assigns_to_sum(node) => {
                self.bugs
                    .push(Finding::bug(SHADOWED_SUM, Level::Medium, SHADOWED_SUM_TIP));
            }
            "pass_statement" => {
                self.bugs
                    .push(Finding::bug(UNUSED_PASS, Level::Low, UNUSED_PASS_TIP));
            }
            _ => {}
        }
        Flow::Continue
    }
}

/// Find bug patterns in a Python snippet.
pub fn detect_bugs(unit: &SourceUnit<'_>) -> Vec<Finding> {
    let parsed = match unit.syntax_tree() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, "bug check skipped");
            return vec![Finding::bug(UNPARSEABLE, Level::High, UNPARSEABLE_TIP)];
        }
    };

    let mut visitor = BugVisitor {
        parsed,
        bugs: Vec::new(),
    };
    walk(parsed.root(), &mut visitor);
    visitor.bugs
}

/// Structured bug list for a Python snippet.
pub fn bug_reports(unit: &SourceUnit<'_>) -> Vec<BugReport> {
    detect_bugs(unit)
        .into_iter()
        .map(BugReport::from_finding)
        .collect()
}

pub struct BugChecker;

impl Checker for BugChecker {
    fn name(&self) -> &'static str {
        "bugs"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_bugs(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn bugs(code: &str) -> Vec<Finding> {
        detect_bugs(&SourceUnit::new(&Language::Python, code))
    }

    #[test]
    fn test_sum_assignment_is_medium() {
        let found = bugs("sum = 0\nfor i in range(3):\n    sum = sum + i\n");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|b| b.severity == Some(Level::Medium)));
        assert!(found[0].message.contains("built-in"));
    }

    #[test]
    fn test_annotated_and_augmented_sum_are_ignored() {
        assert!(bugs("sum: int = 0\n").is_empty());
        assert!(bugs("total = 0\ntotal += 1\n").is_empty());
    }

    #[test]
    fn test_pass_is_low() {
        let found = bugs("def todo():\n    pass\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Some(Level::Low));
        assert_eq!(
            found[0].render(),
            "[low] Consider removing unused 'pass' statement (possible dead code). Tip: 'pass' can be removed unless you're using it as a placeholder for future code."
        );
    }

    #[test]
    fn test_syntax_error_yields_single_high_bug() {
        let found = bugs("def broken(:\n    return\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, UNPARSEABLE);
        assert_eq!(found[0].severity, Some(Level::High));
        assert_eq!(found[0].tip.as_deref(), Some(UNPARSEABLE_TIP));
    }

    #[test]
    fn test_python2_statements_are_unparseable() {
        for code in ["print 'Hello'\n", "exec 'x = 1'\n"] {
            let found = bugs(code);
            assert_eq!(found.len(), 1, "{}", code);
            assert_eq!(found[0].message, UNPARSEABLE);
            assert_eq!(found[0].severity, Some(Level::High));
        }
    }

    #[test]
    fn test_empty_and_clean_code() {
        assert!(bugs("").is_empty());
        assert!(bugs("print('Hello')\n").is_empty());
    }

    #[test]
    fn test_bug_reports_are_structured() {
        let reports = bug_reports(&SourceUnit::new(&Language::Python, "sum = 1\n"));
        assert_eq!(
            reports,
            vec![BugReport {
                message: SHADOWED_SUM.to_string(),
                severity: Level::Medium,
                tip: SHADOWED_SUM_TIP.to_string(),
            }]
        );
    }
}
