//! Error types for the outer layers (requests, config, storage, reports).
//!
//! The analysis pipeline itself never fails: checker problems become
//! findings. These errors only cover the plumbing around it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The submitted code could not be parsed where a parse is mandatory.
    #[error("syntax error in code at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    /// The review request was not valid JSON or had the wrong shape.
    #[error("invalid review request: {0}")]
    InvalidRequest(String),

    /// A tree-sitter query or grammar could not be loaded.
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("review store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
