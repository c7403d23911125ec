//! Command-line interface for codereview.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::{Config, CONFIG_TEMPLATE, DEFAULT_CONFIG_NAMES};
use crate::language::Language;
use crate::report;
use crate::service::{ReviewRequest, ReviewResponse, ReviewService};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into when reviewing a tree.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", "venv", "__pycache__", "target"];

/// Heuristic code review for Python and JavaScript.
///
/// Flags unused imports, missing docstrings, style problems, common bug
/// patterns, logic slips and loop performance issues, then scores the
/// snippet from 0 to 100.
#[derive(Parser)]
#[command(name = "codereview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review a file, a directory, stdin or a JSON request
    Review(ReviewArgs),
    /// Run only the style checks
    Style(SourceArgs),
    /// List bug patterns with severity and tips (Python)
    Bugs(SourceArgs),
    /// List performance findings (Python)
    Optimize(SourceArgs),
    /// Audit functions and classes for docstrings (Python)
    Docstrings(SourceArgs),
    /// Show saved reviews
    History(HistoryArgs),
    /// Write a config file from the template
    Init(InitArgs),
}

/// Where code comes from and how to print the answer.
#[derive(Args)]
pub struct SourceArgs {
    /// File to read, or '-' for stdin
    pub path: PathBuf,

    /// Language tag (default: from the file extension, else python)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// File or directory to review, or '-' for stdin
    #[arg(required_unless_present = "request")]
    pub path: Option<PathBuf>,

    /// Review a JSON request body ({"code", "language", "review_type"}) read from a file or '-'
    #[arg(long, conflicts_with = "path")]
    pub request: Option<PathBuf>,

    /// Language tag (default: from the file extension, else python)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Minimum acceptable score (exit 1 if any review scores lower)
    #[arg(long)]
    pub min_score: Option<i32>,

    /// Do not save reviews to the history store
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codereview.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

fn check_format(format: &str) -> anyhow::Result<()> {
    if format != "pretty" && format != "json" {
        anyhow::bail!("invalid format {:?}, must be 'pretty' or 'json'", format);
    }
    Ok(())
}

fn load_config(cli_config: Option<&Path>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    Config::load(cli_config, &cwd).context("failed to load config")
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read code from a file or stdin.
fn read_source(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("failed to read stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Explicit tag first, then the file extension, then Python.
fn resolve_language(explicit: Option<&str>, path: &Path) -> String {
    if let Some(tag) = explicit {
        return tag.to_string();
    }
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .map(|lang| lang.as_str().to_string())
        .unwrap_or_else(|| "python".to_string())
}

/// Collect reviewable files under a directory.
fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if !e.file_type().is_dir() || e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            let name: &str = &name;
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let supported = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
            .is_some();
        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[derive(Serialize)]
struct FileReview {
    path: String,
    language: String,
    #[serde(flatten)]
    response: ReviewResponse,
}

fn below(min_score: Option<i32>, score: i32) -> bool {
    min_score.is_some_and(|min| score < min)
}

fn print_review(source: &str, language: &str, response: &ReviewResponse) {
    let result = crate::detect::AnalysisResult {
        suggestions: response.suggestions.clone(),
        warnings: response.warnings.clone(),
        optimizations: response.optimizations.clone(),
        bugs: response.bugs.clone(),
        score: response.score,
        remark: response.remark,
    };
    let report_path = response.report_url.as_deref().map(Path::new);
    report::write_pretty(source, language, &result, report_path);
}

/// Run the review command.
pub fn run_review(args: &ReviewArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    check_format(&args.format)?;
    let config = load_config(config_path)?;
    let min_score = args.min_score.or(config.min_score);

    let mut service = ReviewService::from_config(&config);
    if args.no_save {
        service = service.without_store();
    }

    if let Some(request_path) = &args.request {
        let body = read_source(request_path)?;
        let request = ReviewRequest::from_json(&body)?;
        let response = service.review(&request)?;
        if args.format == "json" {
            report::write_json(&response)?;
        } else {
            print_review(&request_path.display().to_string(), &request.language, &response);
        }
        return Ok(if below(min_score, response.score) { EXIT_FAILED } else { EXIT_SUCCESS });
    }

    let Some(path) = &args.path else {
        anyhow::bail!("nothing to review: pass a path or --request");
    };

    let files = if !is_stdin(path) && path.is_dir() {
        collect_files(path)?
    } else {
        vec![path.clone()]
    };
    if files.is_empty() {
        eprintln!("Warning: no Python or JavaScript files under {}", path.display());
        return Ok(EXIT_SUCCESS);
    }

    let reviews: Vec<FileReview> = files
        .par_iter()
        .map(|file| -> anyhow::Result<FileReview> {
            let code = read_source(file)?;
            let language = resolve_language(args.language.as_deref(), file);
            let response = service
                .review(&ReviewRequest::new(code, language.clone()))
                .with_context(|| format!("review of {} failed", file.display()))?;
            Ok(FileReview {
                path: file.display().to_string(),
                language,
                response,
            })
        })
        .collect::<anyhow::Result<_>>()?;

    if args.format == "json" {
        if reviews.len() == 1 {
            report::write_json(&reviews[0])?;
        } else {
            report::write_json(&reviews)?;
        }
    } else {
        for review in &reviews {
            print_review(&review.path, &review.language, &review.response);
        }
    }

    let failed = reviews.iter().any(|r| below(min_score, r.response.score));
    Ok(if failed { EXIT_FAILED } else { EXIT_SUCCESS })
}

/// Run the style command.
pub fn run_style(args: &SourceArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    check_format(&args.format)?;
    let config = load_config(config_path)?;
    let service = ReviewService::new(crate::detect::Reviewer::new(config.build_style_cache()));

    let code = read_source(&args.path)?;
    let language = resolve_language(args.language.as_deref(), &args.path);
    let style = service.check_style(&language, &code);

    if args.format == "json" {
        report::write_json(style.as_ref())?;
    } else {
        report::write_style_pretty(&args.path.display().to_string(), &style);
    }
    Ok(EXIT_SUCCESS)
}

fn python_only(args: &SourceArgs) -> anyhow::Result<String> {
    check_format(&args.format)?;
    let language = Language::parse(&resolve_language(args.language.as_deref(), &args.path));
    if language != Language::Python {
        anyhow::bail!("this command only supports python, got {}", language);
    }
    read_source(&args.path)
}

/// Run the bugs command.
pub fn run_bugs(args: &SourceArgs) -> anyhow::Result<i32> {
    let code = python_only(args)?;
    let bugs = ReviewService::new(Default::default()).analyze_bugs(&code);

    if args.format == "json" {
        report::write_json(&bugs)?;
    } else {
        report::write_bugs_pretty(&args.path.display().to_string(), &bugs);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the optimize command.
pub fn run_optimize(args: &SourceArgs) -> anyhow::Result<i32> {
    let code = python_only(args)?;
    let optimizations = ReviewService::new(Default::default()).analyze_optimizations(&code);

    if args.format == "json" {
        report::write_json(&optimizations)?;
    } else {
        report::write_list_pretty(
            &args.path.display().to_string(),
            "Optimizations",
            &optimizations,
            "No performance issues found",
        );
    }
    Ok(EXIT_SUCCESS)
}

/// Run the docstrings command.
pub fn run_docstrings(args: &SourceArgs) -> anyhow::Result<i32> {
    let code = python_only(args)?;
    let issues = ReviewService::new(Default::default()).check_docstrings(&code)?;

    if args.format == "json" {
        report::write_json(&issues)?;
    } else {
        report::write_list_pretty(
            &args.path.display().to_string(),
            "Missing docstrings",
            &issues,
            "All functions and classes are documented",
        );
    }
    Ok(EXIT_SUCCESS)
}

/// Run the history command.
pub fn run_history(args: &HistoryArgs, config_path: Option<&Path>) -> anyhow::Result<i32> {
    check_format(&args.format)?;
    let config = load_config(config_path)?;
    let records = ReviewService::from_config(&config).history()?;

    if args.format == "json" {
        report::write_json(&records)?;
    } else {
        report::write_history_table(&records);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&args.output, CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    let discovered = args
        .output
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| DEFAULT_CONFIG_NAMES.contains(&n));
    if !discovered {
        println!("Pass it with --config {}", args.output.display());
    }
    Ok(EXIT_SUCCESS)
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Review(args) => run_review(args, config),
        Commands::Style(args) => run_style(args, config),
        Commands::Bugs(args) => run_bugs(args),
        Commands::Optimize(args) => run_optimize(args),
        Commands::Docstrings(args) => run_docstrings(args),
        Commands::History(args) => run_history(args, config),
        Commands::Init(args) => run_init(args),
    }
}
