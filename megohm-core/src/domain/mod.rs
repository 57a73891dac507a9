pub mod error;
pub mod extraction;
pub mod standards;
pub mod validation;

// Handy re-exports to keep imports short elsewhere
pub use error::DomainError;
