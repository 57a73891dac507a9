// megohm-core/src/application/audit.rs

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::validation::ValidationResult;
use crate::ports::audit::{AuditRecord, AuditSink};

/// What happened to the audit records of one review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditOutcome {
    pub emitted: usize,
    pub failed: usize,
}

/// Sends one record per rule evaluation to the sink.
///
/// Fail-open: a sink error, or a sink panic, is logged and counted, never
/// propagated. The audit trail is a compliance record, not a gate on the
/// validation result.
#[instrument(skip(results, sink), fields(results = results.len()))]
pub fn emit_audit(
    analysis_id: &str,
    results: &[ValidationResult],
    sink: &dyn AuditSink,
    timestamp: DateTime<Utc>,
) -> AuditOutcome {
    let mut outcome = AuditOutcome::default();

    for result in results {
        for rule in result.rules_evaluated() {
            let record = AuditRecord {
                analysis_id: analysis_id.to_string(),
                domain: result.domain(),
                standard_profile: result.standard_profile(),
                rule_id: rule.rule_id.clone(),
                passed: rule.passed,
                details: rule.details.clone(),
                timestamp,
            };

            match catch_unwind(AssertUnwindSafe(|| sink.record(&record))) {
                Ok(Ok(())) => outcome.emitted += 1,
                Ok(Err(e)) => {
                    warn!(rule_id = %rule.rule_id, error = %e, "Audit record dropped (fail-open)");
                    outcome.failed += 1;
                }
                Err(_) => {
                    warn!(rule_id = %rule.rule_id, "Audit sink panicked, record dropped (fail-open)");
                    outcome.failed += 1;
                }
            }
        }
    }

    debug!(emitted = outcome.emitted, failed = outcome.failed, "Audit emission finished");
    outcome
}
