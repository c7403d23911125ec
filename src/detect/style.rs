//! PEP 8 flavoured style checks.
//!
//! Raw findings are formatted before they are stored, and the whole result
//! is cached per `(language, code)` so a repeated snippet skips both the
//! line scan and the formatting.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::{Checker, SourceUnit};
use crate::format::format_issues;
use crate::language::Language;
use crate::score;

use super::cache::StyleCache;
use super::Finding;

lazy_static::lazy_static! {
    static ref DEFINED_NAME_RE: Regex =
        Regex::new(r"def\s+([a-zA-Z0-9_]+)\s*\(|([a-zA-Z0-9_]+)\s*=").unwrap();
    static ref SNAKE_CASE_RE: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
}

pub const MAX_LINE_LENGTH: usize = 79;
pub const INDENT_WIDTH: usize = 4;

/// The outcome of a style check, with its own informational sub-score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleReport {
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
    pub optimizations: Vec<String>,
    pub score: i32,
    pub remark: String,
}

/// Run the style checks without consulting any cache.
pub fn check_code_style(language: &Language, code: &str) -> StyleReport {
    let mut suggestions = Vec::new();
    let mut warnings = Vec::new();
    let optimizations: Vec<String> = Vec::new();

    if *language == Language::Python {
        for (idx, line) in code.split('\n').enumerate() {
            let line_no = idx + 1;

            if line.chars().count() > MAX_LINE_LENGTH {
                warnings.push(format!("Line {}: exceeds {} characters.", line_no, MAX_LINE_LENGTH));
            }
            if line.contains('\t') {
                warnings.push(format!(
                    "Line {}: contains tab character. Use 4 spaces instead.",
                    line_no
                ));
            }
            let trimmed = line.trim();
            if trimmed.starts_with('#') && !trimmed.starts_with("# ") {
                suggestions.push(format!("Line {}: Add a space after '#' in comments.", line_no));
            }
            let leading_spaces = line.len() - line.trim_start_matches(' ').len();
            if leading_spaces > 0 && leading_spaces % INDENT_WIDTH != 0 {
                warnings.push(format!(
                    "Line {}: Indentation not a multiple of 4 spaces.",
                    line_no
                ));
            }
        }

        if !code.is_empty() && !code.ends_with('\n') {
            suggestions.push("File should end with a newline.".to_string());
        }

        for caps in DEFINED_NAME_RE.captures_iter(code) {
            let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            if !SNAKE_CASE_RE.is_match(name.as_str()) {
                suggestions.push(format!("🔧 Rename '{}' to follow snake_case.", name.as_str()));
            }
        }
    } else {
        warnings.push(format!("Style check for {} not supported yet.", language));
    }

    let (score, remark) = score::calculate_style(suggestions.len(), warnings.len());

    StyleReport {
        suggestions: format_issues(&suggestions),
        warnings: format_issues(&warnings),
        optimizations: format_issues(&optimizations),
        score,
        remark: remark.to_string(),
    }
}

/// Style checker backed by a shared cache.
pub struct StyleChecker {
    cache: Arc<StyleCache>,
}

impl StyleChecker {
    pub fn new(cache: Arc<StyleCache>) -> Self {
        Self { cache }
    }

    /// The style report for a snippet, computed at most once per cache lifetime.
    pub fn report(&self, language: &Language, code: &str) -> Arc<StyleReport> {
        self.cache
            .get_or_insert_with(language, code, || check_code_style(language, code))
    }
}

impl Checker for StyleChecker {
    fn name(&self) -> &'static str {
        "style"
    }

    fn check(&self, unit: &SourceUnit<'_>) -> Vec<Finding> {
        let report = self.report(unit.language(), unit.code());
        report
            .suggestions
            .iter()
            .map(|s| Finding::suggestion(s.as_str()))
            .chain(report.warnings.iter().map(|w| Finding::warning(w.as_str())))
            .chain(
                report
                    .optimizations
                    .iter()
                    .map(|o| Finding::optimization(o.as_str())),
            )
            .collect()
    }
}
