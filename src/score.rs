//! Scoring and remark tiers.
//!
//! Turns finding counts into a 0-100 review score (higher is better) and a
//! qualitative remark.

use serde::{Deserialize, Serialize};

/// Points deducted per finding.
pub mod points {
    pub const WARNING: i32 = 5;
    pub const SUGGESTION: i32 = 2;
    pub const OPTIMIZATION: i32 = 1;
    pub const BUG: i32 = 3;

    // Style sub-score
    pub const STYLE_SUGGESTION: i32 = 2;
    pub const STYLE_WARNING: i32 = 3;
}

/// Remark tier thresholds (inclusive lower bounds).
pub mod tiers {
    pub const EXCELLENT_MIN: i32 = 90;
    pub const GOOD_MIN: i32 = 75;
    pub const AVERAGE_MIN: i32 = 60;

    /// The style sub-score says "Good job!" up to this many findings.
    pub const STYLE_GOOD_JOB_MAX: usize = 2;
}

pub const MAX_SCORE: i32 = 100;

/// Qualitative label for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remark {
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Average")]
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    #[serde(rename = "Unsupported")]
    Unsupported,
}

impl Remark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Remark::Excellent => "Excellent",
            Remark::Good => "Good",
            Remark::Average => "Average",
            Remark::NeedsImprovement => "Needs Improvement",
            Remark::Unsupported => "Unsupported",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Excellent" => Some(Remark::Excellent),
            "Good" => Some(Remark::Good),
            "Average" => Some(Remark::Average),
            "Needs Improvement" => Some(Remark::NeedsImprovement),
            "Unsupported" => Some(Remark::Unsupported),
            _ => None,
        }
    }
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindingCounts {
    pub suggestions: usize,
    pub warnings: usize,
    pub optimizations: usize,
    pub bugs: usize,
}

/// Score plus remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScore {
    pub score: i32,
    pub remark: Remark,
}

fn deduction(count: usize, per_finding: i32) -> i32 {
    i32::try_from(count)
        .unwrap_or(i32::MAX)
        .saturating_mul(per_finding)
}

/// Determine the remark from a score.
pub fn remark_for(score: i32) -> Remark {
    match score {
        s if s >= tiers::EXCELLENT_MIN => Remark::Excellent,
        s if s >= tiers::GOOD_MIN => Remark::Good,
        s if s >= tiers::AVERAGE_MIN => Remark::Average,
        _ => Remark::NeedsImprovement,
    }
}

/// Calculate the review score from finding counts.
pub fn calculate(counts: FindingCounts) -> ReviewScore {
    let deductions = deduction(counts.warnings, points::WARNING)
        .saturating_add(deduction(counts.suggestions, points::SUGGESTION))
        .saturating_add(deduction(counts.optimizations, points::OPTIMIZATION))
        .saturating_add(deduction(counts.bugs, points::BUG));

    let score = MAX_SCORE.saturating_sub(deductions).max(0);

    ReviewScore {
        score,
        remark: remark_for(score),
    }
}

/// The informational sub-score carried by a style result.
pub fn calculate_style(suggestions: usize, warnings: usize) -> (i32, &'static str) {
    let deductions = deduction(suggestions, points::STYLE_SUGGESTION)
        .saturating_add(deduction(warnings, points::STYLE_WARNING));
    let score = MAX_SCORE.saturating_sub(deductions).max(0);

    let remark = if suggestions.saturating_add(warnings) <= tiers::STYLE_GOOD_JOB_MAX {
        "Good job!"
    } else {
        "Needs improvement"
    };

    (score, remark)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(suggestions: usize, warnings: usize, optimizations: usize, bugs: usize) -> FindingCounts {
        FindingCounts {
            suggestions,
            warnings,
            optimizations,
            bugs,
        }
    }

    #[test]
    fn test_calculate_score() {
        let score = calculate(counts(1, 1, 1, 1));
        // 100 - 2 - 5 - 1 - 3
        assert_eq!(score.score, 89);
        assert_eq!(score.remark, Remark::Good);
    }

    #[test]
    fn test_clean_code_is_excellent() {
        let score = calculate(FindingCounts::default());
        assert_eq!(score.score, 100);
        assert_eq!(score.remark, Remark::Excellent);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let score = calculate(counts(0, 50, 0, 0));
        assert_eq!(score.score, 0);
        assert_eq!(score.remark, Remark::NeedsImprovement);

        let score = calculate(counts(usize::MAX, usize::MAX, usize::MAX, usize::MAX));
        assert_eq!(score.score, 0);
    }

    #[test]
    fn test_remark_thresholds() {
        assert_eq!(remark_for(100), Remark::Excellent);
        assert_eq!(remark_for(90), Remark::Excellent);
        assert_eq!(remark_for(89), Remark::Good);
        assert_eq!(remark_for(75), Remark::Good);
        assert_eq!(remark_for(74), Remark::Average);
        assert_eq!(remark_for(60), Remark::Average);
        assert_eq!(remark_for(59), Remark::NeedsImprovement);
        assert_eq!(remark_for(0), Remark::NeedsImprovement);
    }

    #[test]
    fn test_style_sub_score() {
        assert_eq!(calculate_style(0, 0), (100, "Good job!"));
        assert_eq!(calculate_style(1, 1), (95, "Good job!"));
        assert_eq!(calculate_style(2, 1), (93, "Needs improvement"));
        assert_eq!(calculate_style(0, 40), (0, "Needs improvement"));
    }

    #[test]
    fn test_remark_round_trips_through_strings() {
        for remark in [
            Remark::Excellent,
            Remark::Good,
            Remark::Average,
            Remark::NeedsImprovement,
            Remark::Unsupported,
        ] {
            assert_eq!(Remark::parse(remark.as_str()), Some(remark));
        }
        let json = serde_json::to_string(&Remark::NeedsImprovement).unwrap();
        assert_eq!(json, "\"Needs Improvement\"");
    }
}
