//! Core error types for the trade import pipeline.
//!
//! Module-level error enums (`ImportError`, `NormalizeError`, `LookupError`)
//! live next to the code that raises them; this module composes them into a
//! single root type for callers that want one error surface.

use thiserror::Error;

use crate::enhancer::LookupError;
use crate::import::ImportError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the trade import core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Symbol lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
