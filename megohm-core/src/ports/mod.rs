// megohm-core/src/ports/mod.rs

pub mod audit;

pub use audit::{AuditRecord, AuditSink};
