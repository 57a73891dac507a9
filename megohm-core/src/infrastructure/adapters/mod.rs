// megohm-core/src/infrastructure/adapters/mod.rs

pub mod jsonl_audit;
pub mod tracing_audit;

pub use jsonl_audit::JsonLinesAuditSink;
pub use tracing_audit::{NullAuditSink, TracingAuditSink};
