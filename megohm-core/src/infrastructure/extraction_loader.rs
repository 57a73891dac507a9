// megohm-core/src/infrastructure/extraction_loader.rs

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::extraction::ExtractionResult;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}

/// Reads one extraction payload (JSON or YAML, chosen by file extension).
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_extraction(path: &Path) -> Result<ExtractionResult, InfrastructureError> {
    let format = format_of(path)
        .ok_or_else(|| InfrastructureError::UnsupportedFormat(path.display().to_string()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read extraction at {:?}", path))?;

    let extraction: ExtractionResult = match format {
        Format::Json => serde_json::from_str(&content)?,
        Format::Yaml => serde_yaml::from_str(&content)?,
    };

    debug!(analysis_id = %extraction.analysis_id, "Extraction loaded");
    Ok(extraction)
}

/// Every extraction file under `dir`, sorted so batch output is stable.
pub fn discover_extractions(dir: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    if !dir.is_dir() {
        return Err(InfrastructureError::ConfigError(format!(
            "{:?} is not a directory",
            dir
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| format_of(p).is_some())
        .collect();

    files.sort();
    Ok(files)
}
