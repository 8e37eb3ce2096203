//! Error codes for the Trestle diagnostic system.
//!
//! Codes are grouped by phase:
//! - `E1xx` - Syntax errors found while reading a line
//! - `E2xx` - Semantic errors found while building the diagram

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected input.
    ///
    /// A line starts with something other than a node, directive or comment,
    /// or a chain is followed by text that is not an association.
    E100,

    /// Unterminated node.
    ///
    /// A `[` was not closed by `]` on the same line.
    E101,

    /// Dangling association.
    ///
    /// An association such as `->` is not followed by a node.
    E102,

    /// Malformed directive.
    ///
    /// A `#` line lacks a directive name or the `:` separator.
    E103,

    // =========================================================================
    // Semantic Errors (E2xx)
    // =========================================================================
    /// Empty node name.
    E200,

    /// Unknown node kind in `<kind>` position.
    E201,

    /// Invalid directive value.
    E202,
}

impl ErrorCode {
    /// Returns the code as a string (e.g. `"E101"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "unexpected input",
            ErrorCode::E101 => "unterminated node",
            ErrorCode::E102 => "dangling association",
            ErrorCode::E103 => "malformed directive",
            ErrorCode::E200 => "empty node name",
            ErrorCode::E201 => "unknown node kind",
            ErrorCode::E202 => "invalid directive value",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "unterminated node");
        assert_eq!(ErrorCode::E201.description(), "unknown node kind");
    }
}
