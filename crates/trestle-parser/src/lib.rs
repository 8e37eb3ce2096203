//! # Trestle Parser
//!
//! Parser for the Trestle box-and-arrow diagram language.
//!
//! ```text
//! // nodes are written in brackets, compartments split by `|`
//! #direction: right
//! [Customer | name; email]->[Order]
//! [<abstract> Shape] <:- [Circle]
//! [<note> remember the cache] -- [Order]
//! ```
//!
//! ## Usage
//!
//! ```
//! # use trestle_parser::{parse, error::ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let diagram = parse("[Alice]->[Bob]")?;
//!     assert_eq!(diagram.nodes().len(), 2);
//!     assert_eq!(diagram.relations().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod diagram;
pub mod error;

mod elaborate;
mod parser;
mod span;

pub use diagram::Diagram;
pub use span::{Span, Spanned};

use log::debug;

use elaborate::Builder;
use error::{DiagnosticCollector, ParseError};

/// Parse source text into a [`Diagram`].
///
/// Syntax and semantic problems anywhere in the source are collected and
/// returned together.
///
/// # Errors
///
/// Returns [`ParseError`] with one [`Diagnostic`](error::Diagnostic) per
/// problem found.
pub fn parse(source: &str) -> Result<Diagram, ParseError> {
    debug!(source_len = source.len(); "Parsing diagram source");

    let mut diagnostics = DiagnosticCollector::new();
    let statements = parser::statements(source, &mut diagnostics);

    let mut builder = Builder::new(&mut diagnostics);
    for statement in statements {
        builder.add_statement(statement);
    }
    let diagram = builder.build();

    diagnostics.finish().map(|()| diagram)
}
