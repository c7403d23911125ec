//! Configuration file schema for codereview.
//!
//! Every field is optional; an absent file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::detect::{StyleCache, DEFAULT_CAPACITY};
use crate::error::{Result, ReviewError};

/// File names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codereview.yaml", ".codereview.yaml"];

/// The template written by `codereview init`.
pub const CONFIG_TEMPLATE: &str = include_str!("templates/codereview.yaml");

pub const DEFAULT_PAGE_LINES: usize = 56;
/// Pages shorter than this cannot fit the page header and a section.
pub const MIN_PAGE_LINES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub style_cache: StyleCacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Reviews scoring below this make the CLI exit with a failure code.
    #[serde(default)]
    pub min_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StyleCacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

impl Default for StyleCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory for rendered reports (default: `<data dir>/reports`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_page_lines")]
    pub page_lines: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: None,
            page_lines: DEFAULT_PAGE_LINES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON-lines file of saved reviews (default: `<data dir>/reviews.jsonl`).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_page_lines() -> usize {
    DEFAULT_PAGE_LINES
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        // An empty or comment-only document is null, not an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str::<Option<Config>>(content)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or the first default name found in
    /// `dir`, or fall back to defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover(dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered config");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.style_cache.capacity == 0 {
            return Err(ReviewError::InvalidConfig(
                "style_cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.report.page_lines < MIN_PAGE_LINES {
            return Err(ReviewError::InvalidConfig(format!(
                "report.page_lines must be at least {}, got {}",
                MIN_PAGE_LINES, self.report.page_lines
            )));
        }
        if let Some(min) = self.min_score {
            if !(0..=100).contains(&min) {
                return Err(ReviewError::InvalidConfig(format!(
                    "min_score must be between 0 and 100, got {}",
                    min
                )));
            }
        }
        Ok(())
    }

    pub fn build_style_cache(&self) -> Arc<StyleCache> {
        Arc::new(StyleCache::with_ttl(
            self.style_cache.capacity,
            self.style_cache.ttl_seconds.map(Duration::from_secs),
        ))
    }

    pub fn report_dir(&self) -> PathBuf {
        self.report
            .dir
            .clone()
            .unwrap_or_else(|| data_dir().join("reports"))
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| data_dir().join("reviews.jsonl"))
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// The per-user data directory, or the working directory when the
/// platform has none.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "codereview")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
style_cache:
  capacity: 16
  ttl_seconds: 60
report:
  dir: /tmp/reports
  page_lines: 40
store:
  path: /tmp/reviews.jsonl
min_score: 75
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.style_cache.capacity, 16);
        assert_eq!(config.style_cache.ttl_seconds, Some(60));
        assert_eq!(config.report_dir(), PathBuf::from("/tmp/reports"));
        assert_eq!(config.report.page_lines, 40);
        assert_eq!(config.store_path(), PathBuf::from("/tmp/reviews.jsonl"));
        assert_eq!(config.min_score, Some(75));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse_str("min_score: 50\n").unwrap();
        assert_eq!(config.style_cache, StyleCacheConfig::default());
        assert_eq!(config.report.page_lines, DEFAULT_PAGE_LINES);
        assert_eq!(Config::parse_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_template_parses() {
        let config = Config::parse_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.style_cache.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.report.page_lines, DEFAULT_PAGE_LINES);
        assert_eq!(config.min_score, None);
    }

    #[test]
    fn test_validation_errors() {
        let err = Config::parse_str("style_cache:\n  capacity: 0\n").unwrap_err();
        assert!(matches!(err, ReviewError::InvalidConfig(_)));

        let err = Config::parse_str("report:\n  page_lines: 3\n").unwrap_err();
        assert!(err.to_string().contains("page_lines"));

        let err = Config::parse_str("min_score: 101\n").unwrap_err();
        assert!(err.to_string().contains("min_score"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::parse_str("style_cache: [1, 2").unwrap_err();
        assert!(matches!(err, ReviewError::ConfigParse(_)));
    }

    #[test]
    fn test_discover_and_load() {
        let temp = TempDir::new().unwrap();
        assert!(discover(temp.path()).is_none());
        assert_eq!(Config::load(None, temp.path()).unwrap(), Config::default());

        std::fs::write(temp.path().join(".codereview.yaml"), "min_score: 80\n").unwrap();
        assert_eq!(
            discover(temp.path()),
            Some(temp.path().join(".codereview.yaml"))
        );
        assert_eq!(Config::load(None, temp.path()).unwrap().min_score, Some(80));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(Some(&temp.path().join("nope.yaml")), temp.path()).unwrap_err();
        assert!(matches!(err, ReviewError::Io(_)));
    }
}
