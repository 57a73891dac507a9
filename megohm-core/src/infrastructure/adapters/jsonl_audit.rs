// megohm-core/src/infrastructure/adapters/jsonl_audit.rs

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::MegohmError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::audit::{AuditRecord, AuditSink};

/// Append-only JSON-lines audit trail. One line per rule evaluation.
pub struct JsonLinesAuditSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesAuditSink {
    pub fn open(path: &Path) -> Result<Self, InfrastructureError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "Audit log opened");

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), MegohmError> {
        let line = serde_json::to_string(record)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| MegohmError::AuditSink("audit writer lock poisoned".into()))?;

        writeln!(writer, "{line}")?;
        // Each record must hit the file before the review returns.
        writer.flush()?;
        Ok(())
    }
}
