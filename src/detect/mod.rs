//! Checkers that turn a snippet into review findings.

mod bugs;
mod cache;
mod docstrings;
mod imports;
mod javascript;
mod logic;
mod performance;
mod runner;
mod style;
mod types;

pub use bugs::{bug_reports, detect_bugs, BugChecker, BugReport};
pub use cache::{CacheStats, StyleCache, DEFAULT_CAPACITY};
pub use docstrings::{audit_docstrings, detect_missing_docstrings, DocstringChecker};
pub use imports::{detect_unused_imports, extract_imported_names, ImportUsageChecker, ImportedName};
pub use javascript::{detect_javascript_issues, JavaScriptChecker};
pub use logic::{collect_signatures, detect_logic_flaws, FunctionSignatures, LogicChecker};
pub use performance::{detect_performance_issues, PerformanceChecker};
pub use runner::Reviewer;
pub use style::{check_code_style, StyleChecker, StyleReport};
pub use types::{AnalysisResult, Category, Finding, Level};
