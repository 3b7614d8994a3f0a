//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: IR construction errors
/// - E2xxx: Local verification and resolution errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Construction Errors (E1xxx)
    /// Duplicate function declaration
    E1001,
    /// Varargs function without a user parameter
    E1002,
    /// Function declared without a body
    E1003,
    /// Closure not nested inside a function body
    E1004,
    /// Closure expression refers to a non-closure function
    E1005,

    // Resolution Errors (E2xxx)
    /// Unresolved invocation target
    E2001,
    /// Undeclared reference
    E2002,
    /// Assignment to a constant binding
    E2003,
    /// Duplicate binding in the same block
    E2004,

    // Internal Errors (E9xxx)
    /// Too many errors
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E9001,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Errors raised while building the IR. They abort the unit.
    pub fn is_construction_error(self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Errors raised by local verification and resolution. Batched.
    pub fn is_resolution_error(self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
