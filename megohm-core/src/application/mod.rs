// megohm-core/src/application/mod.rs

pub mod audit;
pub mod review;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use megohm_core::application::{ReviewEngine, emit_audit};`
// without knowing the internal file layout.

pub use audit::{AuditOutcome, emit_audit};
pub use review::{AnalysisReport, ReviewEngine};
