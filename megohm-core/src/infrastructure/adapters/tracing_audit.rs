// megohm-core/src/infrastructure/adapters/tracing_audit.rs

use tracing::info;

use crate::error::MegohmError;
use crate::ports::audit::{AuditRecord, AuditSink};

/// Default sink: audit records become structured log events on the
/// `megohm::audit` target, so a log pipeline can pick them up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), MegohmError> {
        let details = serde_json::to_string(&record.details)?;

        info!(
            target: "megohm::audit",
            analysis_id = %record.analysis_id,
            domain = %record.domain,
            standard = %record.standard_profile,
            rule_id = %record.rule_id,
            passed = record.passed,
            timestamp = %record.timestamp.to_rfc3339(),
            details = %details,
            "rule evaluated"
        );
        Ok(())
    }
}

/// Discards everything. For dry runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _record: &AuditRecord) -> Result<(), MegohmError> {
        Ok(())
    }
}
