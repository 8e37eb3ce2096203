//! Error adapter for converting [`CliError`] to miette diagnostics.
//!
//! When the renderer rejects a diagram, its [`ParseError`] may hold several
//! diagnostics. Each one becomes its own report with labeled source spans.
//!
//! [`ParseError`]: trestle_parser::error::ParseError

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use trestle::TrestleError;
use trestle_parser::error::Diagnostic;

use crate::CliError;

/// Adapter for a single parser diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for errors without source locations: I/O failures and
/// configuration errors.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Acquire { .. } => "trestle::acquire",
            CliError::Render(TrestleError::Parse { .. }) => "trestle::parse",
            CliError::Render(TrestleError::Config(_)) => "trestle::config",
            CliError::Emit { .. } => "trestle::emit",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: trestle_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`CliError`] into a list of reportable errors.
///
/// A rejected diagram yields one [`Reportable`] per diagnostic; every other
/// error yields exactly one.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Render(TrestleError::Parse {
            err: parse_err,
            src,
        }) => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use trestle_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    fn render_error(diagnostics: Vec<Diagnostic>, src: &str) -> CliError {
        CliError::Render(TrestleError::new_parse_error(
            ParseError::from(diagnostics),
            src,
        ))
    }

    #[test]
    fn test_each_diagnostic_is_reported() {
        let err = render_error(
            vec![
                Diagnostic::error("unterminated node")
                    .with_code(ErrorCode::E101)
                    .with_label(Span::new(0..2), "missing `]`"),
                Diagnostic::error("unknown node kind `x`")
                    .with_code(ErrorCode::E201)
                    .with_label(Span::new(4..5), "here")
                    .with_help("expected one of `class`, `abstract`, `note` or `label`"),
            ],
            "[a\n[<x> b]",
        );

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "unterminated node");
        assert_eq!(reportables[1].to_string(), "unknown node kind `x`");
        assert_eq!(
            reportables[1].code().map(|c| c.to_string()).as_deref(),
            Some("E201")
        );
        assert!(reportables[1].help().is_some());
        assert!(reportables[1].source_code().is_some());
    }

    #[test]
    fn test_io_error_is_single_report() {
        let err = CliError::acquire(
            "missing.tre",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "failed to read missing.tre");
                assert_eq!(
                    e.code().map(|c| c.to_string()).as_deref(),
                    Some("trestle::acquire")
                );
                assert!(std::error::Error::source(e).is_some());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_config_error_has_code() {
        let err = CliError::Render(TrestleError::Config("bad spacing".to_string()));
        let reportables = to_reportables(&err);
        assert_eq!(
            reportables[0].code().map(|c| c.to_string()).as_deref(),
            Some("trestle::config")
        );
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("primary"));
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_graphical_report_includes_code_and_message() {
        let err = render_error(
            vec![
                Diagnostic::error("association is not followed by a node")
                    .with_code(ErrorCode::E102)
                    .with_label(Span::new(3..5), "dangling"),
            ],
            "[a]->",
        );

        let reporter = miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::none());
        let mut rendered = String::new();
        for reportable in to_reportables(&err) {
            reporter.render_report(&mut rendered, &reportable).unwrap();
        }

        assert!(rendered.contains("E102"), "{rendered}");
        assert!(rendered.contains("association is not followed by a node"));
        assert!(rendered.contains("dangling"));
    }
}
