// megohm-core/src/domain/validation/mod.rs

pub mod calibration;
pub mod finding;
pub mod grounding;
pub mod insulation;
pub mod result;
pub mod thermography;
pub mod verdict;

// Re-exports
pub use calibration::CalibrationValidator;
pub use finding::{Finding, RemediationKind, RuleEvaluation, Severity};
pub use grounding::GroundingValidator;
pub use insulation::InsulationValidator;
pub use result::{FindingDraft, ValidationBuilder, ValidationResult};
pub use thermography::ThermographyValidator;
pub use verdict::{Verdict, aggregate, findings_by_severity};

use crate::domain::extraction::ExtractionResult;
use crate::domain::standards::Domain;

/// A domain validator: a pure function of the extraction and the config it holds.
/// Never fails on bad data; problems in the report come back as findings.
pub trait Validator: Send + Sync {
    fn domain(&self) -> Domain;

    fn validate(&self, extraction: &ExtractionResult) -> ValidationResult;
}
