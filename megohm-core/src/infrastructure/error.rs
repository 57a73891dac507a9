// megohm-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(megohm::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- LOADING (IO + context) ---
    #[error("{0:#}")]
    #[diagnostic(code(megohm::infra::load))]
    Load(#[from] anyhow::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(megohm::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(
        code(megohm::infra::json),
        help("The extraction payload must match the ExtractionResult schema.")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    #[diagnostic(code(megohm::infra::settings))]
    InvalidSettings(#[from] validator::ValidationErrors),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(megohm::infra::config))]
    ConfigError(String),

    #[error("Unsupported extraction file '{0}' (expected .json, .yaml or .yml)")]
    #[diagnostic(code(megohm::infra::format))]
    UnsupportedFormat(String),
}
