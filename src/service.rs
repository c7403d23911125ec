//! Request handling around the analysis core.
//!
//! A review request is analyzed, rendered to a report document, persisted,
//! and answered with the result plus the report's location. The auxiliary
//! operations (bugs, optimizations, docstrings, style, history) skip the
//! report and the store.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::SourceUnit;
use crate::config::Config;
use crate::detect::{
    audit_docstrings, bug_reports, detect_performance_issues, AnalysisResult, BugReport, Reviewer,
    StyleReport,
};
use crate::error::{Result, ReviewError};
use crate::format::format_issues;
use crate::language::Language;
use crate::report::{ReportRenderer, TextReportRenderer};
use crate::score::Remark;
use crate::store::{JsonlStore, NewReview, ReviewRecord, ReviewStore};

fn default_language() -> String {
    "python".to_string()
}

fn default_review_type() -> String {
    "basic".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Accepted for compatibility; every review runs the same checks.
    #[serde(default = "default_review_type")]
    pub review_type: String,
}

impl ReviewRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            review_type: default_review_type(),
        }
    }

    /// Parse a request body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| ReviewError::InvalidRequest(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
    pub optimizations: Vec<String>,
    pub bugs: Vec<String>,
    pub score: i32,
    pub remark: Remark,
    /// Location of the rendered report, when one was written.
    pub report_url: Option<String>,
}

impl ReviewResponse {
    fn new(result: AnalysisResult, report_url: Option<String>) -> Self {
        Self {
            suggestions: result.suggestions,
            warnings: result.warnings,
            optimizations: result.optimizations,
            bugs: result.bugs,
            score: result.score,
            remark: result.remark,
            report_url,
        }
    }
}

/// The review front end: analyzer plus optional report renderer and store.
pub struct ReviewService {
    reviewer: Reviewer,
    renderer: Option<Box<dyn ReportRenderer>>,
    store: Option<Arc<dyn ReviewStore>>,
}

impl ReviewService {
    /// A service that only analyzes.
    pub fn new(reviewer: Reviewer) -> Self {
        Self {
            reviewer,
            renderer: None,
            store: None,
        }
    }

    /// A service wired from configuration: text reports and a JSON-lines store.
    pub fn from_config(config: &Config) -> Self {
        let reviewer = Reviewer::new(config.build_style_cache());
        let renderer =
            TextReportRenderer::new(config.report_dir()).with_page_lines(config.report.page_lines);
        Self::new(reviewer)
            .with_renderer(Box::new(renderer))
            .with_store(Arc::new(JsonlStore::new(config.store_path())))
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ReviewStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn without_store(mut self) -> Self {
        self.store = None;
        self
    }

    pub fn reviewer(&self) -> &Reviewer {
        &self.reviewer
    }

    /// Analyze, render, persist, respond.
    pub fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse> {
        tracing::debug!(
            language = %request.language,
            review_type = %request.review_type,
            bytes = request.code.len(),
            "review requested"
        );
        let result = self.reviewer.analyze(&request.language, &request.code);

        let report_url = match &self.renderer {
            Some(renderer) => Some(
                renderer
                    .render(&request.language, &request.code, &result)
                    .inspect_err(|err| tracing::warn!(error = %err, "report rendering failed"))
                    .map(|path| path_to_url(&path))?,
            ),
            None => None,
        };

        if let Some(store) = &self.store {
            store
                .save(NewReview::from_result(
                    &request.code,
                    &request.language,
                    &result,
                ))
                .inspect_err(|err| tracing::warn!(error = %err, "saving review failed"))?;
        }

        Ok(ReviewResponse::new(result, report_url))
    }

    /// Structured bug list for Python code.
    pub fn analyze_bugs(&self, code: &str) -> Vec<BugReport> {
        bug_reports(&SourceUnit::new(&Language::Python, code))
    }

    /// The performance checker's findings, formatted.
    pub fn analyze_optimizations(&self, code: &str) -> Vec<String> {
        let rendered: Vec<String> = detect_performance_issues(&SourceUnit::new(&Language::Python, code))
            .iter()
            .map(|f| f.render())
            .collect();
        format_issues(&rendered)
    }

    /// Functions and classes without a docstring.
    pub fn check_docstrings(&self, code: &str) -> Result<Vec<String>> {
        audit_docstrings(code)
    }

    pub fn check_style(&self, language: &str, code: &str) -> Arc<StyleReport> {
        self.reviewer.check_style(&Language::parse(language), code)
    }

    /// Saved reviews, oldest first. Empty when no store is attached.
    pub fn history(&self) -> Result<Vec<ReviewRecord>> {
        match &self.store {
            Some(store) => store.list(),
            None => Ok(Vec::new()),
        }
    }
}

fn path_to_url(path: &std::path::Path) -> String {
    let absolute: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    absolute.display().to_string()
}
