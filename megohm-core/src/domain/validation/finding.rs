// megohm-core/src/domain/validation/finding.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Declaration order gives the ordering: Info < Minor < Major < Critical,
// so `max()` over findings is the worst severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Critical, Self::Major, Self::Minor, Self::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemediationKind {
    DocumentationFix,
    RetestRequired,
}

impl RemediationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentationFix => "DOCUMENTATION_FIX",
            Self::RetestRequired => "RETEST_REQUIRED",
        }
    }
}

impl fmt::Display for RemediationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One violation, with the evidence and the clause that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub field_path: String,
    pub extracted_value: serde_json::Value,
    pub threshold: serde_json::Value,
    pub standard_reference: String,
    pub remediation_kind: RemediationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One evaluated rule, pass or fail. This is what the audit trail persists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEvaluation {
    pub rule_id: String,
    pub passed: bool,
    pub details: BTreeMap<String, serde_json::Value>,
}
