//! Core traits for checkers.

use once_cell::unsync::OnceCell;

use super::parse::{parse_python, ParsedSource, SyntaxError};
use crate::detect::Finding;
use crate::language::Language;

/// One snippet under review.
///
/// The syntax tree is built lazily on first request and shared by every
/// tree-based checker of the same analysis.
pub struct SourceUnit<'a> {
    language: &'a Language,
    code: &'a str,
    syntax: OnceCell<Result<ParsedSource, SyntaxError>>,
}

impl<'a> SourceUnit<'a> {
    pub fn new(language: &'a Language, code: &'a str) -> Self {
        Self {
            language,
            code,
            syntax: OnceCell::new(),
        }
    }

    pub fn language(&self) -> &Language {
        self.language
    }

    pub fn code(&self) -> &str {
        self.code
    }

    /// The Python syntax tree, or the reason there is none.
    pub fn syntax_tree(&self) -> Result<&ParsedSource, &SyntaxError> {
        self.syntax.get_or_init(|| parse_python(self.code)).as_ref()
    }
}

/// An independent check producing zero or more findings.
///
/// Checkers never fail: problems such as unparseable input are reported as
/// findings so the remaining checkers still run.
pub trait Checker: Send + Sync {
    /// Short identifier used in logs (e.g., "style", "bugs").
    fn name(&self) -> &'static str;

    /// Run the check against one snippet.
    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding>;
}
