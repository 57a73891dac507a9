// megohm/src/main.rs

mod cli;
mod commands;
mod render;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{Session, resolve_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing) on stderr, so `--format json` stays parseable.
    // RUST_LOG=megohm_core=debug megohm review ... to see the rule details
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,megohm::audit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: REVIEW ONE REPORT ---
        Commands::Review {
            file,
            format,
            output,
        } => {
            let session = Session::open(&cli.project_dir, cli.standard, cli.audit_log)?;
            commands::review::execute(&session, file, format, output)?;
        }

        // --- USE CASE: BATCH REVIEW ---
        Commands::Batch {
            dir,
            format,
            concurrency,
        } => {
            let session = Arc::new(Session::open(
                &cli.project_dir,
                cli.standard,
                cli.audit_log,
            )?);
            commands::batch::execute(session, dir, format, concurrency).await?;
        }

        // --- USE CASE: THRESHOLD TABLES ---
        Commands::Thresholds { format } => {
            let settings = resolve_settings(&cli.project_dir, cli.standard, None)?;
            commands::thresholds::execute(settings.standard, format)?;
        }
    }

    Ok(())
}
