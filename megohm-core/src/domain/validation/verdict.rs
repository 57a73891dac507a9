// megohm-core/src/domain/validation/verdict.rs

use super::finding::{Finding, Severity};
use super::result::ValidationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    NeedsReview,
    Rejected,
}

impl Verdict {
    /// MINOR and INFO never move the verdict.
    pub fn from_worst(worst: Option<Severity>) -> Self {
        match worst {
            Some(Severity::Critical) => Self::Rejected,
            Some(Severity::Major) => Self::NeedsReview,
            _ => Self::Approved,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Worst-of across every domain result; order of `results` is irrelevant.
pub fn aggregate(results: &[ValidationResult]) -> Verdict {
    Verdict::from_worst(results.iter().filter_map(|r| r.worst_severity()).max())
}

/// All findings, most severe first. Stable within a severity.
pub fn findings_by_severity(results: &[ValidationResult]) -> Vec<&Finding> {
    let mut findings: Vec<&Finding> = results.iter().flat_map(|r| r.findings()).collect();
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    findings
}
