//! codereview - heuristic code review for Python and JavaScript snippets.
//!
//! A snippet goes through a fixed set of independent checkers for its
//! language. Their findings are merged into suggestions, warnings,
//! optimizations and bugs, passed through a message formatter, and scored
//! from 0 to 100 with a qualitative remark.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter parsing, the `Checker` trait and the tree walker
//! - `detect`: the checkers, the style cache and the `Reviewer` orchestrator
//! - `format`: raw finding phrases to templated messages
//! - `score`: score and remark calculation
//! - `service`: request/response layer (report + persistence around a review)
//! - `report`: report documents and terminal output
//! - `store`: review history
//! - `config`: YAML configuration
//!
//! # Example
//!
//! ```
//! use codereview::Reviewer;
//!
//! let result = Reviewer::default().analyze("python", "print('Hello')\n");
//! assert!(result.bugs.is_empty());
//! assert_eq!(result.score, 100);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod format;
pub mod language;
pub mod report;
pub mod score;
pub mod service;
pub mod store;

pub use config::Config;
pub use detect::{AnalysisResult, Finding, Reviewer, StyleCache};
pub use error::{Result, ReviewError};
pub use language::Language;
pub use score::Remark;
pub use service::{ReviewRequest, ReviewResponse, ReviewService};
