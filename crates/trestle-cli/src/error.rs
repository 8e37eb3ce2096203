//! Errors of a single CLI invocation.
//!
//! Each variant names the phase that failed. All of them end the process
//! with the same exit code.

use std::io;

use thiserror::Error;

use trestle::TrestleError;

/// The main error type for the Trestle CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The diagram source could not be read.
    #[error("failed to read {origin}")]
    Acquire { origin: String, source: io::Error },

    /// The renderer rejected the diagram source.
    #[error(transparent)]
    Render(#[from] TrestleError),

    /// The rendered SVG could not be written.
    #[error("failed to write {target}")]
    Emit { target: String, source: io::Error },
}

impl CliError {
    pub(crate) fn acquire(origin: impl Into<String>, source: io::Error) -> Self {
        Self::Acquire {
            origin: origin.into(),
            source,
        }
    }

    pub(crate) fn emit(target: impl Into<String>, source: io::Error) -> Self {
        Self::Emit {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error::Error as _;

    #[test]
    fn test_messages_name_the_endpoint() {
        let err = CliError::acquire(
            "diagram.tre",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(err.to_string(), "failed to read diagram.tre");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("No such file or directory")
        );

        let err = CliError::emit("standard output", io::Error::other("broken pipe"));
        assert_eq!(err.to_string(), "failed to write standard output");
    }

    #[test]
    fn test_render_is_transparent() {
        let err = CliError::from(TrestleError::Config("bad".to_string()));
        assert_eq!(err.to_string(), "Config error: bad");
    }
}
