// megohm/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use megohm_core::StandardProfile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "megohm")]
#[command(about = "Validates electrical test reports against NETA / Microsoft acceptance tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding megohm.yaml (settings)
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Standard profile (neta | microsoft). Overrides settings and MEGOHM_STANDARD.
    #[arg(long, short, global = true)]
    pub standard: Option<StandardProfile>,

    /// Append audit records to this JSON-lines file
    #[arg(long, global = true)]
    pub audit_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🔎 Validates one extraction file (JSON or YAML)
    Review {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Also write the JSON report to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 📦 Validates every extraction file under a directory
    Batch {
        dir: PathBuf,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Reports validated in parallel (default from settings)
        #[arg(long, short = 'j')]
        concurrency: Option<usize>,
    },

    /// 📏 Prints the threshold tables of a profile
    Thresholds {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}
