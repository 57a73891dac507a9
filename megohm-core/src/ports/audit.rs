// megohm-core/src/ports/audit.rs

// The compliance record of every rule the engine evaluated.
// The engine only knows this contract, not where records end up
// (file, log pipeline, database owned by the API layer...).

use crate::domain::standards::{Domain, StandardProfile};
use crate::error::MegohmError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub analysis_id: String,
    pub domain: Domain,
    pub standard_profile: StandardProfile,
    pub rule_id: String,
    pub passed: bool,
    pub details: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<(), MegohmError>;
}
