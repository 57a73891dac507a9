// megohm-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Structural errors: they point at a code or configuration defect, never at
/// a badly filled test report. Data-quality problems become findings instead.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown standard profile: '{0}'")]
    #[diagnostic(
        code(megohm::domain::unknown_profile),
        help("Supported profiles are 'neta' and 'microsoft'.")
    )]
    UnknownProfile(String),

    #[error("No threshold table for domain '{domain}' under profile {profile}")]
    #[diagnostic(
        code(megohm::domain::unknown_domain),
        help("Every profile must carry a table for every validation domain.")
    )]
    UnknownDomain { profile: String, domain: String },

    #[error("Threshold '{name}' missing from the {domain} table of profile {profile}")]
    #[diagnostic(code(megohm::domain::missing_threshold))]
    MissingThreshold {
        profile: String,
        domain: String,
        name: String,
    },

    #[error("Threshold '{name}' has the wrong shape (expected {expected})")]
    #[diagnostic(code(megohm::domain::threshold_shape))]
    ThresholdShape { name: String, expected: &'static str },

    #[error("No voltage class covers a rating of {volts} V")]
    #[diagnostic(
        code(megohm::domain::voltage_class),
        help("Check the rated voltage on the nameplate or extend the voltage-class table.")
    )]
    UnresolvableVoltageClass { volts: f64 },
}
