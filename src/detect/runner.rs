//! Review orchestrator that runs every checker for a language.

use std::sync::Arc;

use crate::analysis::{Checker, SourceUnit};
use crate::format::format_issues;
use crate::language::Language;
use crate::score::{self, FindingCounts};

use super::{
    AnalysisResult, BugChecker, Category, DocstringChecker, ImportUsageChecker,
    JavaScriptChecker, LogicChecker, PerformanceChecker, StyleCache, StyleChecker, StyleReport,
};

/// Dispatches a snippet to its language's checkers and merges the results.
///
/// Checker order is the merge order of the final lists.
pub struct Reviewer {
    python: Vec<Box<dyn Checker>>,
    javascript: Vec<Box<dyn Checker>>,
    style: StyleChecker,
    style_cache: Arc<StyleCache>,
}

impl Reviewer {
    /// Create a reviewer that shares the given style cache.
    pub fn new(style_cache: Arc<StyleCache>) -> Self {
        let python: Vec<Box<dyn Checker>> = vec![
            Box::new(ImportUsageChecker),
            Box::new(DocstringChecker),
            Box::new(BugChecker),
            Box::new(LogicChecker),
            Box::new(PerformanceChecker),
            Box::new(StyleChecker::new(Arc::clone(&style_cache))),
        ];
        let javascript: Vec<Box<dyn Checker>> = vec![Box::new(JavaScriptChecker)];

        Self {
            python,
            javascript,
            style: StyleChecker::new(Arc::clone(&style_cache)),
            style_cache,
        }
    }

    /// The checkers registered for a language, in merge order.
    pub fn checkers(&self, language: &Language) -> &[Box<dyn Checker>] {
        match language {
            Language::Python => &self.python,
            Language::JavaScript => &self.javascript,
            Language::Unsupported(_) => &[],
        }
    }

    /// Analyze a snippet given a free-form language tag.
    pub fn analyze(&self, language: &str, code: &str) -> AnalysisResult {
        self.analyze_language(&Language::parse(language), code)
    }

    pub fn analyze_language(&self, language: &Language, code: &str) -> AnalysisResult {
        if !language.is_supported() {
            tracing::debug!(language = %language, "unsupported language");
            return AnalysisResult::unsupported();
        }

        let unit = SourceUnit::new(language, code);
        let mut suggestions = Vec::new();
        let mut warnings = Vec::new();
        let mut optimizations = Vec::new();
        let mut bugs = Vec::new();

        for checker in self.checkers(language) {
            let findings = checker.check(&unit);
            tracing::debug!(checker = checker.name(), findings = findings.len(), "checker done");

            for finding in findings {
                let rendered = finding.render();
                match finding.category {
                    Category::Suggestion => suggestions.push(rendered),
                    Category::Warning => warnings.push(rendered),
                    Category::Optimization => optimizations.push(rendered),
                    Category::Bug => bugs.push(rendered),
                }
            }
        }

        let suggestions = format_issues(&suggestions);
        let warnings = format_issues(&warnings);
        let optimizations = format_issues(&optimizations);

        let review = score::calculate(FindingCounts {
            suggestions: suggestions.len(),
            warnings: warnings.len(),
            optimizations: optimizations.len(),
            bugs: bugs.len(),
        });

        AnalysisResult {
            suggestions,
            warnings,
            optimizations,
            bugs,
            score: review.score,
            remark: review.remark,
        }
    }

    /// The standalone style report, served from the shared cache.
    pub fn check_style(&self, language: &Language, code: &str) -> Arc<StyleReport> {
        self.style.report(language, code)
    }

    pub fn style_cache(&self) -> &Arc<StyleCache> {
        &self.style_cache
    }
}

impl Default for Reviewer {
    fn default() -> Self {
        Self::new(Arc::new(StyleCache::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::is_template;
    use crate::score::Remark;

    #[test]
    fn test_hello_world() {
        let result = Reviewer::default().analyze("python", "print('Hello')");
        assert!(result.bugs.is_empty());
        assert!((0..=100).contains(&result.score));
        // Only the missing trailing newline fires.
        assert_eq!(result.suggestions.len(), 1);
        assert!(result.suggestions.iter().all(|s| is_template(s)));
        assert!(result.warnings.is_empty());
        assert_eq!(result.score, 98);
        assert_eq!(result.remark, Remark::Excellent);
    }

    #[test]
    fn test_unsupported_language() {
        let result = Reviewer::default().analyze("cobol", "DISPLAY 'HI'.");
        assert_eq!(result, AnalysisResult::unsupported());
        assert_eq!(result.suggestions, vec!["language not supported".to_string()]);
        assert_eq!(result.score, 0);
        assert_eq!(result.remark, Remark::Unsupported);
    }

    #[test]
    fn test_empty_python() {
        let result = Reviewer::default().analyze("python", "");
        assert_eq!(result.score, 100);
        assert_eq!(result.finding_count(), 0);
        assert_eq!(result.remark, Remark::Excellent);
    }

    #[test]
    fn test_merge_order_follows_registration() {
        let code = "import os\ndef f():\n    return 1\n";
        let result = Reviewer::default().analyze("python", code);
        // Import warning comes before anything the style checker adds.
        assert_eq!(result.warnings[0], "⚠️ Unused import detected: os");
        assert!(result.suggestions[0].starts_with("✅ Add a docstring"));
    }

    #[test]
    fn test_syntax_error_degrades_per_checker() {
        let result = Reviewer::default().analyze("python", "def broken(:\n");
        assert_eq!(result.bugs.len(), 1);
        assert!(result.bugs[0].starts_with("[high] Syntax Error in code."));
        assert!(result
            .warnings
            .iter()
            .any(|w| w == crate::detect::logic::UNPARSEABLE));
        assert!(result
            .warnings
            .iter()
            .any(|w| w == crate::detect::performance::UNPARSEABLE));
        assert!(result.optimizations.is_empty());
    }

    #[test]
    fn test_javascript_dispatch() {
        let result = Reviewer::default().analyze("JavaScript", "var a = 1;\nconsole.log(a == 1);\n");
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.optimizations.len(), 1);
        // 100 - 2 - 5 - 1
        assert_eq!(result.score, 92);
    }

    #[test]
    fn test_repeat_analysis_hits_style_cache() {
        let reviewer = Reviewer::default();
        let code = "def Bad():\n  x=1\n";
        let first = reviewer.analyze("python", code);
        let second = reviewer.analyze("python", code);
        assert_eq!(first, second);
        let stats = reviewer.style_cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }
}
