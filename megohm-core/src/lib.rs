// megohm-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts towards the outside world (audit log).
pub mod ports;

// 2. Domain (business core)
// Standards tables, extraction model, validators, verdict.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Settings files, extraction files, audit sinks.
pub mod infrastructure;

// 4. Application (Use Cases)
// Review orchestration + audit emission.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use megohm_core::{MegohmError, ReviewEngine, StandardProfile, Verdict};
pub use application::{AnalysisReport, ReviewEngine};
pub use domain::standards::StandardProfile;
pub use domain::validation::Verdict;
pub use error::MegohmError;
