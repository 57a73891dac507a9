// megohm/src/commands/review.rs
//
// USE CASE: Validate one extraction file.

use std::path::PathBuf;

use anyhow::Context;
use megohm_core::infrastructure::extraction_loader::load_extraction;
use megohm_core::infrastructure::fs::atomic_write;

use super::Session;
use crate::cli::OutputFormat;
use crate::render;

pub fn execute(
    session: &Session,
    file: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let extraction = load_extraction(&file)
        .with_context(|| format!("Failed to load extraction {:?}", file))?;

    let report = session
        .engine
        .review(&extraction, session.profile(), session.sink.as_ref())?;

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &output {
        atomic_write(path, &json)?;
    }

    match format {
        OutputFormat::Json => println!("{}", json),
        OutputFormat::Table => {
            print!("{}", render::report_text(&report));
            if let Some(path) = &output {
                println!("📄 JSON report saved to {}", path.display());
            }
        }
    }

    session.enforce_gate(report.verdict());
    Ok(())
}
