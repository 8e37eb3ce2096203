//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a location in the source.
///
/// A diagnostic usually carries one primary label marking where the problem
/// is, and any number of secondary labels giving context such as
/// "node opened here".
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(0..3), "here");
        let secondary = Label::secondary(Span::new(5..9), "opened here");

        assert!(primary.is_primary());
        assert!(!secondary.is_primary());
        assert_eq!(primary.message(), "here");
        assert_eq!(secondary.span(), Span::new(5..9));
    }
}
