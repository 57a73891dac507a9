// megohm-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

/// Everything a review can fail with. Findings are never errors: this only
/// carries structural defects, I/O, and audit sink failures.
#[derive(Error, Debug, Diagnostic)]
pub enum MegohmError {
    // --- STANDARDS TABLES, PROFILES ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- FILES, SETTINGS, EXTRACTION DOCUMENTS ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- AUDIT TRAIL (counted by the engine, never propagated past it) ---
    #[error("Audit record could not be encoded: {0}")]
    #[diagnostic(code(megohm::audit::encode))]
    AuditEncoding(#[from] serde_json::Error),

    #[error("Audit sink rejected record: {0}")]
    #[diagnostic(code(megohm::audit::sink))]
    AuditSink(String),
}

// io::Error belongs to the infrastructure layer; no second variant for it.
impl From<std::io::Error> for MegohmError {
    fn from(err: std::io::Error) -> Self {
        MegohmError::Infrastructure(InfrastructureError::Io(err))
    }
}
