//! Core types for review findings.

use serde::{Deserialize, Serialize};

use crate::score::Remark;

/// Which bucket of the result a finding lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Suggestion,
    Warning,
    Optimization,
    Bug,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Suggestion => "suggestion",
            Category::Warning => "warning",
            Category::Optimization => "optimization",
            Category::Bug => "bug",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency tag: severity for bugs, impact for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::Medium => write!(f, "medium"),
            Level::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            _ => Err(format!("unknown level: {}", s)),
        }
    }
}

/// A single piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub message: String,
    /// Bug findings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Level>,
    /// Non-bug findings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Level>,
    /// Extended rationale attached to bug findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl Finding {
    fn plain(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            severity: None,
            impact: None,
            tip: None,
        }
    }

    pub fn suggestion(message: impl Into<String>) -> Self {
        Self::plain(Category::Suggestion, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::plain(Category::Warning, message)
    }

    pub fn optimization(message: impl Into<String>) -> Self {
        Self::plain(Category::Optimization, message)
    }

    pub fn bug(message: impl Into<String>, severity: Level, tip: impl Into<String>) -> Self {
        Self {
            category: Category::Bug,
            message: message.into(),
            severity: Some(severity),
            impact: None,
            tip: Some(tip.into()),
        }
    }

    /// Tag a non-bug finding with its impact.
    pub fn with_impact(mut self, impact: Level) -> Self {
        if self.category != Category::Bug {
            self.impact = Some(impact);
        }
        self
    }

    /// The user-facing string for this finding.
    ///
    /// Bugs render as `[severity] message Tip: tip`; other findings get an
    /// `(impact: level)` suffix when tagged.
    pub fn render(&self) -> String {
        match self.category {
            Category::Bug => {
                let mut out = match self.severity {
                    Some(severity) => format!("[{}] {}", severity, self.message),
                    None => self.message.clone(),
                };
                if let Some(tip) = &self.tip {
                    out.push_str(" Tip: ");
                    out.push_str(tip);
                }
                out
            }
            _ => match self.impact {
                Some(impact) => format!("{} (impact: {})", self.message, impact),
                None => self.message.clone(),
            },
        }
    }
}

/// The aggregate output of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
    pub optimizations: Vec<String>,
    pub bugs: Vec<String>,
    pub score: i32,
    pub remark: Remark,
}

impl AnalysisResult {
    /// The fixed result for a language without a checker set.
    pub fn unsupported() -> Self {
        Self {
            suggestions: vec!["language not supported".to_string()],
            warnings: Vec::new(),
            optimizations: Vec::new(),
            bugs: Vec::new(),
            score: 0,
            remark: Remark::Unsupported,
        }
    }

    /// Total number of findings across all categories.
    pub fn finding_count(&self) -> usize {
        self.suggestions.len() + self.warnings.len() + self.optimizations.len() + self.bugs.len()
    }

    pub fn has_bugs(&self) -> bool {
        !self.bugs.is_empty()
    }
}
