//! Text patterns for JavaScript snippets.

use regex::Regex;

use crate::analysis::{Checker, SourceUnit};

use super::Finding;

lazy_static::lazy_static! {
    /// `==` that is neither part of `===` nor of `!=`/`!==`.
    static ref LOOSE_EQUALITY_RE: Regex = Regex::new(r"(^|[^=!])==($|[^=])").unwrap();
}

/// Each rule fires at most once per snippet.
pub fn detect_javascript_issues(code: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    if code.contains("var ") {
        findings.push(Finding::suggestion(
            "✅ Consider using 'let' or 'const' instead of 'var'.",
        ));
    }
    if LOOSE_EQUALITY_RE.is_match(code) {
        findings.push(Finding::warning("⚠️ Use '===' for strict equality in JavaScript."));
    }
    if code.contains("console.log(") {
        findings.push(Finding::optimization(
            "💡 Remove console.log statements in production code.",
        ));
    }

    findings
}

pub struct JavaScriptChecker;

impl Checker for JavaScriptChecker {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        detect_javascript_issues(unit.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Category;

    #[test]
    fn test_all_three_patterns() {
        let code = "var x = 1;\nif (x == '1') {\n  console.log(x);\n}\n";
        let categories: Vec<Category> = detect_javascript_issues(code)
            .iter()
            .map(|f| f.category)
            .collect();
        assert_eq!(
            categories,
            vec![Category::Suggestion, Category::Warning, Category::Optimization]
        );
    }

    #[test]
    fn test_strict_equality_is_not_flagged() {
        assert!(detect_javascript_issues("if (a === b && c !== d) {}").is_empty());
    }

    #[test]
    fn test_loose_equality_at_boundaries() {
        assert_eq!(detect_javascript_issues("a==b").len(), 1);
        assert_eq!(detect_javascript_issues("==").len(), 1);
    }

    #[test]
    fn test_modern_code_is_clean() {
        let code = "const total = items.reduce((a, b) => a + b, 0);\n";
        assert!(detect_javascript_issues(code).is_empty());
    }
}
