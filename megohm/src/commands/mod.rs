// megohm/src/commands/mod.rs

pub mod batch;
pub mod review;
pub mod thresholds;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use megohm_core::domain::standards::StandardsRegistry;
use megohm_core::infrastructure::adapters::{JsonLinesAuditSink, TracingAuditSink};
use megohm_core::infrastructure::config::{ReviewSettings, load_settings};
use megohm_core::ports::audit::AuditSink;
use megohm_core::{ReviewEngine, StandardProfile, Verdict};

/// Exit code when a reviewed report reaches the `fail_on` verdict.
pub const EXIT_VERDICT: i32 = 2;

/// Settings file, then ENV, then CLI flags.
pub fn resolve_settings(
    project_dir: &Path,
    standard: Option<StandardProfile>,
    audit_log: Option<PathBuf>,
) -> anyhow::Result<ReviewSettings> {
    let mut settings = load_settings(project_dir)
        .with_context(|| format!("Failed to load settings from {:?}", project_dir))?;
    if let Some(profile) = standard {
        settings.standard = profile;
    }
    if audit_log.is_some() {
        settings.audit_log = audit_log;
    }
    Ok(settings)
}

/// Everything a command needs: resolved settings, engine, audit sink.
pub struct Session {
    pub settings: ReviewSettings,
    pub engine: Arc<ReviewEngine>,
    pub sink: Arc<dyn AuditSink>,
}

impl Session {
    pub fn open(
        project_dir: &Path,
        standard: Option<StandardProfile>,
        audit_log: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let settings = resolve_settings(project_dir, standard, audit_log)?;

        // A broken threshold table must stop us before the first report.
        StandardsRegistry::verify()?;

        let sink: Arc<dyn AuditSink> = match &settings.audit_log {
            Some(path) => Arc::new(
                JsonLinesAuditSink::open(path)
                    .with_context(|| format!("Failed to open audit log {:?}", path))?,
            ),
            None => Arc::new(TracingAuditSink),
        };

        info!(standard = %settings.standard, audit_log = ?settings.audit_log, "Session ready");

        Ok(Self {
            settings,
            engine: Arc::new(ReviewEngine::default()),
            sink,
        })
    }

    pub fn profile(&self) -> StandardProfile {
        self.settings.standard
    }

    /// Exits with `EXIT_VERDICT` when `worst` reaches the configured gate.
    pub fn enforce_gate(&self, worst: Verdict) {
        if worst >= self.settings.fail_on {
            eprintln!(
                "\n💥 Verdict {} reaches the fail_on gate ({}).",
                worst, self.settings.fail_on
            );
            std::process::exit(EXIT_VERDICT);
        }
    }
}
