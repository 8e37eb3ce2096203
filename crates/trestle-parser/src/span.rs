//! Source location tracking.
//!
//! [`Span`] is a half-open byte range into the diagram source. [`Spanned`]
//! attaches a span to a parsed value so later phases can report errors at
//! the right place.

use std::ops::Range;

/// A half-open byte range `start..end` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Byte offset of the first character.
    pub fn start(self) -> usize {
        self.start
    }

    /// Byte offset one past the last character.
    pub fn end(self) -> usize {
        self.end
    }

    /// Length of the span in bytes.
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the span covers no bytes.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span::new(self.start.min(other.start)..self.end.max(other.end))
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range)
    }
}

/// A value together with the [`Span`] it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn inner(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Transform the value, keeping the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_and_empty() {
        let span = Span::new(3..8);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(4..4).is_empty());
    }

    #[test]
    fn test_span_inverted_range_is_clamped() {
        let span = Span::new(7..2);
        assert_eq!(span.start(), 7);
        assert_eq!(span.end(), 7);
    }

    #[test]
    fn test_span_union() {
        let a = Span::new(2..5);
        let b = Span::new(10..12);
        assert_eq!(a.union(b), Span::new(2..12));
        assert_eq!(b.union(a), Span::new(2..12));
    }

    #[test]
    fn test_spanned_map() {
        let spanned = Spanned::new("12", Span::new(0..2));
        let mapped = spanned.map(|s| s.len());
        assert_eq!(*mapped.inner(), 2);
        assert_eq!(mapped.span(), Span::new(0..2));
    }
}
