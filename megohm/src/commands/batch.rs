// megohm/src/commands/batch.rs
//
// USE CASE: Validate every extraction file under a directory, in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

use megohm_core::infrastructure::extraction_loader::{discover_extractions, load_extraction};
use megohm_core::{AnalysisReport, Verdict};

use super::Session;
use crate::cli::OutputFormat;
use crate::render;

#[derive(Serialize)]
struct BatchEntry {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn review_file(session: &Session, path: &Path) -> anyhow::Result<AnalysisReport> {
    let extraction = load_extraction(path)?;
    Ok(session
        .engine
        .review(&extraction, session.profile(), session.sink.as_ref())?)
}

pub async fn execute(
    session: Arc<Session>,
    dir: PathBuf,
    format: OutputFormat,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let files = discover_extractions(&dir)?;
    let limit = concurrency.unwrap_or(session.settings.concurrency).clamp(1, 256);
    info!(files = files.len(), concurrency = limit, "Batch review started");

    if files.is_empty() {
        println!("No extraction files (.json, .yaml, .yml) under {}", dir.display());
        return Ok(());
    }

    // Validation is CPU-bound and synchronous: one blocking task per file.
    let tasks = files.into_iter().map(|path| {
        let session = Arc::clone(&session);
        async move {
            let label = path.display().to_string();
            let outcome = tokio::task::spawn_blocking(move || review_file(&session, &path))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|res| res);
            (label, outcome)
        }
    });

    let mut results: Vec<(String, anyhow::Result<AnalysisReport>)> =
        futures::stream::iter(tasks).buffer_unordered(limit).collect().await;
    // Completion order is arbitrary; output is not.
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut worst = Verdict::Approved;
    let mut failures = 0usize;
    for (file, outcome) in &results {
        match outcome {
            Ok(report) => worst = worst.max(report.verdict()),
            Err(e) => {
                warn!(file = %file, error = %format!("{e:#}"), "Report could not be reviewed");
                failures += 1;
            }
        }
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<BatchEntry> = results
                .into_iter()
                .map(|(file, outcome)| match outcome {
                    Ok(report) => BatchEntry {
                        file,
                        report: Some(report),
                        error: None,
                    },
                    Err(e) => BatchEntry {
                        file,
                        report: None,
                        error: Some(format!("{e:#}")),
                    },
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let rows: Vec<(String, Result<&AnalysisReport, String>)> = results
                .iter()
                .map(|(file, outcome)| {
                    (
                        file.clone(),
                        outcome.as_ref().map_err(|e| format!("{e:#}")),
                    )
                })
                .collect();
            println!("{}", render::batch_table(&rows));
            println!("📊 {} report(s), worst verdict: {}", rows.len(), worst);
        }
    }

    if failures > 0 {
        eprintln!("\n❌ {} file(s) could not be reviewed.", failures);
        std::process::exit(1);
    }

    session.enforce_gate(worst);
    Ok(())
}
