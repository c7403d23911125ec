//! Integration tests for the request layer, reports, history and CLI.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use codereview::cli::{self, Cli, EXIT_FAILED, EXIT_SUCCESS};
use codereview::service::{ReviewRequest, ReviewService};
use codereview::{Config, Remark};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Write a config that keeps reports and history inside `dir`.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("codereview.yaml");
    let content = format!(
        "report:\n  dir: {}\n  page_lines: 20\nstore:\n  path: {}\n{}",
        dir.join("reports").display(),
        dir.join("reviews.jsonl").display(),
        extra
    );
    fs::write(&path, content).unwrap();
    path
}

fn service_in(dir: &Path) -> ReviewService {
    let config = Config::parse_file(write_config(dir, "")).unwrap();
    ReviewService::from_config(&config)
}

#[test]
fn test_review_writes_report_and_history() {
    let temp = TempDir::new().unwrap();
    let service = service_in(temp.path());

    let request = ReviewRequest::from_json(
        r#"{"code": "import os\nprint('hi')\n", "language": "python", "review_type": "basic"}"#,
    )
    .unwrap();
    let response = service.review(&request).unwrap();

    assert_eq!(response.warnings, vec!["⚠️ Unused import detected: os".to_string()]);
    assert_eq!(response.score, 95);
    assert_eq!(response.remark, Remark::Excellent);

    let report = PathBuf::from(response.report_url.expect("report should be written"));
    assert!(report.starts_with(temp.path().join("reports").canonicalize().unwrap()));
    let document = fs::read_to_string(&report).unwrap();
    assert!(document.contains("Language: python"));
    assert!(document.contains("Score: 95 (Excellent)"));
    assert!(document.contains("⚠️ Unused import detected: os"));

    let history = service.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].code, "import os\nprint('hi')\n");
    assert_eq!(history[0].warnings, "⚠️ Unused import detected: os");
    assert_eq!(history[0].score, 95);
    assert_eq!(history[0].remark, "Excellent");
}

#[test]
fn test_history_survives_a_new_service() {
    let temp = TempDir::new().unwrap();
    service_in(temp.path())
        .review(&ReviewRequest::new("var a = 1;", "javascript"))
        .unwrap();
    service_in(temp.path())
        .review(&ReviewRequest::new("print('x')\n", "python"))
        .unwrap();

    let history = service_in(temp.path()).history().unwrap();
    let ids: Vec<u64> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(history[0].created_at <= history[1].created_at);
}

#[test]
fn test_unsupported_language_is_still_recorded() {
    let temp = TempDir::new().unwrap();
    let service = service_in(temp.path());
    let response = service
        .review(&ReviewRequest::new("IDENTIFICATION DIVISION.", "cobol"))
        .unwrap();

    assert_eq!(response.suggestions, vec!["language not supported".to_string()]);
    assert_eq!(response.score, 0);
    assert_eq!(response.remark, Remark::Unsupported);
    assert_eq!(service.history().unwrap()[0].remark, "Unsupported");
}

#[test]
fn test_auxiliary_operations() {
    let service = ReviewService::new(Default::default());
    let messy = fs::read_to_string(testdata_path().join("messy.py")).unwrap();

    let bugs = service.analyze_bugs(&messy);
    assert_eq!(bugs.len(), 2);
    let json = serde_json::to_value(&bugs).unwrap();
    assert_eq!(json[0]["severity"], "low");
    assert_eq!(json[1]["severity"], "medium");

    let optimizations = service.analyze_optimizations(&messy);
    assert!(optimizations.iter().any(|o| o.ends_with("(impact: high)")));

    let missing = service.check_docstrings(&messy).unwrap();
    assert_eq!(missing, vec!["Function 'Process' is missing a docstring.".to_string()]);

    // The comment spacing and the `Process` name.
    let style = service.check_style("python", &messy);
    assert_eq!(style.suggestions.len(), 2);
    assert!(style.warnings.is_empty());
    assert_eq!(style.score, 96);
    assert_eq!(style.remark, "Good job!");
}

#[test]
fn test_cli_min_score_gate() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "min_score: 90\n");
    let config = config.to_string_lossy().to_string();

    let clean = testdata_path().join("clean.py");
    let messy = testdata_path().join("messy.py");

    let cli = Cli::try_parse_from([
        "codereview",
        "--config",
        config.as_str(),
        "review",
        clean.to_str().unwrap(),
        "--format",
        "json",
    ])
    .unwrap();
    assert_eq!(cli::run(&cli).unwrap(), EXIT_SUCCESS);

    let cli = Cli::try_parse_from([
        "codereview",
        "--config",
        config.as_str(),
        "review",
        messy.to_str().unwrap(),
        "--format",
        "json",
    ])
    .unwrap();
    assert_eq!(cli::run(&cli).unwrap(), EXIT_FAILED);
}

#[test]
fn test_cli_reviews_a_directory_in_parallel() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let config = config.to_string_lossy().to_string();
    let testdata = testdata_path();

    let cli = Cli::try_parse_from([
        "codereview",
        "--config",
        config.as_str(),
        "review",
        testdata.to_str().unwrap(),
        "--format",
        "json",
    ])
    .unwrap();
    assert_eq!(cli::run(&cli).unwrap(), EXIT_SUCCESS);

    let saved = Config::parse_file(&config).unwrap();
    let history = ReviewService::from_config(&saved).history().unwrap();
    assert_eq!(history.len(), 5);
    let reports = fs::read_dir(temp.path().join("reports")).unwrap().count();
    assert_eq!(reports, 5);
}

#[test]
fn test_cli_no_save_skips_history() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let config = config.to_string_lossy().to_string();
    let clean = testdata_path().join("clean.py");

    let cli = Cli::try_parse_from([
        "codereview",
        "--config",
        config.as_str(),
        "review",
        clean.to_str().unwrap(),
        "--no-save",
    ])
    .unwrap();
    assert_eq!(cli::run(&cli).unwrap(), EXIT_SUCCESS);
    assert!(!temp.path().join("reviews.jsonl").exists());
}

#[test]
fn test_cli_docstrings_rejects_syntax_errors() {
    let broken = testdata_path().join("broken.py");
    let cli = Cli::try_parse_from(["codereview", "docstrings", broken.to_str().unwrap()]).unwrap();
    let err = cli::run(&cli).unwrap_err();
    assert!(err.to_string().contains("syntax error"));
}

#[test]
fn test_cli_python_only_commands_reject_javascript() {
    let app = testdata_path().join("app.js");
    let cli = Cli::try_parse_from(["codereview", "bugs", app.to_str().unwrap()]).unwrap();
    assert!(cli::run(&cli).is_err());
}
