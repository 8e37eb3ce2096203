//! Diagnostics for the Trestle parser.
//!
//! Errors are reported as [`Diagnostic`]s: an [`ErrorCode`], a message, one
//! or more labeled source spans and optional help text. All diagnostics found
//! while parsing a document are wrapped together in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use trestle_parser::error::{Diagnostic, ErrorCode};
//! # use trestle_parser::Span;
//!
//! let diag = Diagnostic::error("unterminated node")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(0..6), "missing `]`")
//!     .with_help("close the node with `]` on the same line");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
