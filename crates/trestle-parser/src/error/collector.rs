//! Collector for accumulating diagnostics during a parse.

use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics so a single pass can report every problem in a
/// document instead of stopping at the first one.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection: `Err` with every diagnostic if any were emitted.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(ParseError::new(self.diagnostics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_empty_is_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::error("error 1"));
        collector.emit(Diagnostic::error("error 2"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[0].message(), "error 1");
        assert_eq!(err.diagnostics()[1].message(), "error 2");
    }
}
