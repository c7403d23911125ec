//! Output formatting for review results.
//!
//! Two destinations:
//! - report documents: paginated plain text written to the report directory
//! - terminal: colored pretty output or JSON on stdout

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use colored::*;
use serde::Serialize;

use crate::config::{DEFAULT_PAGE_LINES, MIN_PAGE_LINES};
use crate::detect::{AnalysisResult, BugReport, Level, StyleReport};
use crate::error::Result;
use crate::score::Remark;
use crate::store::ReviewRecord;

const FORM_FEED: char = '\u{000C}';
const REPORT_TITLE: &str = "Code Review Report";
/// Attempts at finding an unused report name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 64;

// =============================================================================
// Report documents
// =============================================================================

/// Renders an analysis into a stored document and returns its location.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, language: &str, code: &str, result: &AnalysisResult) -> Result<PathBuf>;
}

/// Lay out a review as pages of plain text.
///
/// Every page starts with a header line and a blank line; pages are
/// separated by a form feed.
pub fn render_document(
    language: &str,
    code: &str,
    result: &AnalysisResult,
    page_lines: usize,
) -> String {
    let page_lines = page_lines.max(MIN_PAGE_LINES);
    let body = document_body(language, code, result);

    let per_page = page_lines - 2;
    let pages: Vec<&[String]> = body.chunks(per_page).collect();
    let total = pages.len();

    let mut out = String::new();
    for (idx, page) in pages.iter().enumerate() {
        if idx > 0 {
            out.push(FORM_FEED);
            out.push('\n');
        }
        out.push_str(&format!("{}  (page {}/{})\n\n", REPORT_TITLE, idx + 1, total));
        for line in page.iter() {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn document_body(language: &str, code: &str, result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![
        format!("Language: {}", language),
        format!("Score: {} ({})", result.score, result.remark),
        String::new(),
    ];

    for (title, items) in [
        ("Suggestions", &result.suggestions),
        ("Warnings", &result.warnings),
        ("Optimizations", &result.optimizations),
        ("Bugs", &result.bugs),
    ] {
        lines.push(format!("{}:", title));
        if items.is_empty() {
            lines.push("  (none)".to_string());
        }
        lines.extend(items.iter().map(|item| format!("  - {}", item)));
        lines.push(String::new());
    }

    lines.push("Submitted Code:".to_string());
    lines.extend(code.lines().map(|line| format!("    {}", line)));
    lines
}

/// Writes reports as text files with unique names.
pub struct TextReportRenderer {
    dir: PathBuf,
    page_lines: usize,
    seq: AtomicU64,
}

impl TextReportRenderer {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            page_lines: DEFAULT_PAGE_LINES,
            seq: AtomicU64::new(1),
        }
    }

    pub fn with_page_lines(mut self, page_lines: usize) -> Self {
        self.page_lines = page_lines.max(MIN_PAGE_LINES);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_name(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("review_{}_{:04}.txt", Utc::now().format("%Y%m%d%H%M%S%3f"), seq)
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, language: &str, code: &str, result: &AnalysisResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let document = render_document(language, code, result, self.page_lines);

        let mut attempts = 0;
        loop {
            let path = self.dir.join(self.next_name());
            // create_new keeps a concurrent process from clobbering our file.
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(document.as_bytes())?;
                    tracing::debug!(path = %path.display(), "report written");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempts < MAX_NAME_ATTEMPTS => {
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Print any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty format
// =============================================================================

fn write_colored_score(score: i32) {
    let text = score.to_string();
    match score {
        s if s >= 90 => print!("{}", text.green().bold()),
        s if s >= 75 => print!("{}", text.green()),
        s if s >= 60 => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

fn write_colored_remark(remark: Remark) {
    let text = remark.as_str();
    match remark {
        Remark::Excellent | Remark::Good => print!("{}", text.green()),
        Remark::Average => print!("{}", text.yellow()),
        Remark::NeedsImprovement => print!("{}", text.red()),
        Remark::Unsupported => print!("{}", text.dimmed()),
    }
}

fn write_section(title: &str, items: &[String], marker: ColoredString) {
    if items.is_empty() {
        return;
    }
    println!("  {} ({}):", title.bold(), items.len());
    for item in items {
        println!("    {} {}", marker, item);
    }
    println!();
}

fn write_banner() {
    println!();
    print!("  ");
    print!("{}", "codereview".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

/// Print one review result.
pub fn write_pretty(source: &str, language: &str, result: &AnalysisResult, report: Option<&Path>) {
    write_banner();

    print!("  {}", "Source:   ".dimmed());
    println!("{}", source);
    print!("  {}", "Language: ".dimmed());
    println!("{}", language);
    if let Some(path) = report {
        print!("  {}", "Report:   ".dimmed());
        println!("{}", path.display());
    }
    println!();

    write_section("Suggestions", &result.suggestions, "•".cyan());
    write_section("Warnings", &result.warnings, "!".yellow());
    write_section("Optimizations", &result.optimizations, "»".blue());
    write_section("Bugs", &result.bugs, "✗".red());

    print!("  Score: ");
    write_colored_score(result.score);
    print!("  Remark: ");
    write_colored_remark(result.remark);
    println!();
    println!();
}

/// Print a standalone style report.
pub fn write_style_pretty(source: &str, report: &StyleReport) {
    write_banner();
    print!("  {}", "Source: ".dimmed());
    println!("{}", source);
    println!();

    write_section("Suggestions", &report.suggestions, "•".cyan());
    write_section("Warnings", &report.warnings, "!".yellow());
    write_section("Optimizations", &report.optimizations, "»".blue());

    print!("  Style score: ");
    write_colored_score(report.score);
    println!("  {}", report.remark);
    println!();
}

fn write_severity_tag(severity: Level) {
    match severity {
        Level::High => print!("  {}", "HIGH  ".red().bold()),
        Level::Medium => print!("  {}", "MEDIUM".yellow()),
        Level::Low => print!("  {}", "LOW   ".dimmed()),
    }
}

/// Print structured bug reports.
pub fn write_bugs_pretty(source: &str, bugs: &[BugReport]) {
    write_banner();
    print!("  {}", "Source: ".dimmed());
    println!("{}", source);
    println!();

    if bugs.is_empty() {
        println!("  {}", "✓ No bugs detected".green());
        println!();
        return;
    }

    println!("  {} ({}):", "Bugs".bold(), bugs.len());
    println!();
    for bug in bugs {
        write_severity_tag(bug.severity);
        println!("   {}", bug.message);
        println!("            {}", bug.tip.dimmed());
        println!();
    }
}

/// Print a plain list of messages under a heading, or a success line.
pub fn write_list_pretty(source: &str, title: &str, items: &[String], empty: &str) {
    write_banner();
    print!("  {}", "Source: ".dimmed());
    println!("{}", source);
    println!();

    if items.is_empty() {
        println!("  {}", format!("✓ {}", empty).green());
    } else {
        write_section(title, items, "-".yellow());
    }
    println!();
}

fn first_line(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > width {
        let cut: String = line.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

/// Print stored reviews as a table.
pub fn write_history_table(records: &[ReviewRecord]) {
    if records.is_empty() {
        println!("No reviews saved yet.");
        return;
    }

    println!(
        "{:>4}  {:<20}  {:<10}  {:>5}  {:<17}  {}",
        "ID".bold(),
        "CREATED".bold(),
        "LANGUAGE".bold(),
        "SCORE".bold(),
        "REMARK".bold(),
        "CODE".bold()
    );
    for record in records {
        println!(
            "{:>4}  {:<20}  {:<10}  {:>5}  {:<17}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.language,
            record.score,
            record.remark,
            first_line(&record.code, 40).dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Reviewer;
    use tempfile::TempDir;

    fn sample_result() -> AnalysisResult {
        Reviewer::default().analyze("python", "import os\nprint('hi')")
    }

    #[test]
    fn test_document_sections_in_order() {
        let doc = render_document("python", "import os\nprint('hi')", &sample_result(), 56);
        let positions: Vec<usize> = [
            "Language: python",
            "Score: 93 (Excellent)",
            "Suggestions:",
            "Warnings:",
            "Optimizations:",
            "Bugs:",
            "Submitted Code:",
        ]
        .iter()
        .map(|needle| doc.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(doc.contains("  - ⚠️ Unused import detected: os"));
        assert!(doc.contains("    print('hi')"));
        assert!(!doc.contains(FORM_FEED));
    }

    #[test]
    fn test_long_code_is_paginated() {
        let code: String = (0..100).map(|i| format!("x{} = {}\n", i, i)).collect();
        let result = AnalysisResult::unsupported();
        let doc = render_document("python", &code, &result, 20);

        let pages: Vec<&str> = doc.split(FORM_FEED).collect();
        assert!(pages.len() > 1);
        let total = pages.len();
        for (idx, page) in pages.iter().enumerate() {
            let page = page.trim_start_matches('\n');
            assert!(page.starts_with(&format!("{}  (page {}/{})", REPORT_TITLE, idx + 1, total)));
            assert!(page.lines().count() <= 20);
        }
    }

    #[test]
    fn test_page_lines_has_a_floor() {
        let doc = render_document("python", "", &AnalysisResult::unsupported(), 1);
        let first_page = doc.split(FORM_FEED).next().unwrap_or("");
        assert_eq!(first_page.lines().count(), MIN_PAGE_LINES);
    }

    #[test]
    fn test_renderer_writes_unique_files() {
        let temp = TempDir::new().unwrap();
        let renderer = TextReportRenderer::new(temp.path().join("reports"));
        let result = sample_result();

        let first = renderer.render("python", "print('hi')", &result).unwrap();
        let second = renderer.render("python", "print('hi')", &result).unwrap();

        assert_ne!(first, second);
        for path in [&first, &second] {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("review_") && name.ends_with(".txt"), "{}", name);
            let content = fs::read_to_string(path).unwrap();
            assert!(content.starts_with(REPORT_TITLE));
        }
    }

    #[test]
    fn test_first_line_truncates() {
        assert_eq!(first_line("abc\ndef", 10), "abc");
        assert_eq!(first_line("abcdefghij", 5), "abcd…");
        assert_eq!(first_line("", 5), "");
    }
}
