// megohm-core/src/infrastructure/config/settings.rs

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::standards::StandardProfile;
use crate::domain::validation::Verdict;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["megohm_project_conf.yaml", "megohm.yaml"];

/// Runtime settings. Thresholds are NOT configurable here: they are compiled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReviewSettings {
    #[serde(default)]
    pub standard: StandardProfile,

    /// JSON-lines audit trail. None = audit goes to the log only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,

    /// Reports validated in parallel by `batch`.
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 256))]
    pub concurrency: usize,

    /// Verdict at (or above) which the CLI exits non-zero.
    #[serde(default = "default_fail_on")]
    pub fail_on: Verdict,
}

fn default_concurrency() -> usize {
    4
}

fn default_fail_on() -> Verdict {
    Verdict::Rejected
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            standard: StandardProfile::default(),
            audit_log: None,
            concurrency: default_concurrency(),
            fail_on: default_fail_on(),
        }
    }
}

#[instrument(skip(project_dir))]
pub fn load_settings(project_dir: &Path) -> Result<ReviewSettings, InfrastructureError> {
    // 1. File (optional)
    let mut settings = match find_settings_file(project_dir) {
        Some(path) => {
            info!(path = ?path, "Loading review settings");
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings at {:?}", path))?;
            serde_yaml::from_str(&content)?
        }
        None => {
            info!("No settings file found, using defaults");
            ReviewSettings::default()
        }
    };

    // 2. Environment layering: MEGOHM_STANDARD=microsoft megohm review ...
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    // 3. Fail-secure: invalid settings stop everything
    settings.validate()?;
    Ok(settings)
}

fn find_settings_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn apply_env_overrides<F>(settings: &mut ReviewSettings, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("MEGOHM_STANDARD") {
        let profile = StandardProfile::from_str(&val)
            .map_err(|e| InfrastructureError::ConfigError(format!("MEGOHM_STANDARD: {e}")))?;
        info!(old = %settings.standard, new = %profile, "Overriding standard via ENV");
        settings.standard = profile;
    }
    if let Some(val) = lookup("MEGOHM_AUDIT_LOG") {
        info!(old = ?settings.audit_log, new = ?val, "Overriding audit log via ENV");
        settings.audit_log = Some(PathBuf::from(val));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = load_settings(dir.path())?;
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.fail_on, Verdict::Rejected);
        Ok(())
    }

    #[test]
    fn test_yaml_file_is_loaded() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("megohm.yaml"),
            "standard: MICROSOFT\naudit_log: audit.jsonl\nconcurrency: 8\nfail_on: NEEDS_REVIEW\n",
        )?;
        let settings = load_settings(dir.path())?;
        assert_eq!(settings.audit_log, Some(PathBuf::from("audit.jsonl")));
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.fail_on, Verdict::NeedsReview);
        Ok(())
    }

    #[test]
    fn test_out_of_range_concurrency_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("megohm.yaml"), "concurrency: 0\n")?;
        let res = load_settings(dir.path());
        assert!(matches!(res, Err(InfrastructureError::InvalidSettings(_))));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("MEGOHM_STANDARD", "ms"), ("MEGOHM_AUDIT_LOG", "/tmp/a.jsonl")]);
        let mut settings = ReviewSettings::default();
        apply_env_overrides(&mut settings, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.standard, StandardProfile::Microsoft);
        assert_eq!(settings.audit_log, Some(PathBuf::from("/tmp/a.jsonl")));

        let bad: HashMap<&str, &str> = HashMap::from([("MEGOHM_STANDARD", "iec")]);
        let res = apply_env_overrides(&mut settings, |k| bad.get(k).map(|v| v.to_string()));
        assert!(matches!(res, Err(InfrastructureError::ConfigError(_))));
    }
}
