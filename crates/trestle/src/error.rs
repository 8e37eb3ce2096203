//! Error types for Trestle operations.
//!
//! [`TrestleError`] covers everything that can go wrong between source text
//! and SVG output.

use thiserror::Error;

use trestle_parser::error::ParseError;

/// The main error type for Trestle operations.
///
/// The `Parse` variant keeps the source text next to the diagnostics so that
/// callers can render labeled spans.
#[derive(Debug, Error)]
pub enum TrestleError {
    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl TrestleError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
