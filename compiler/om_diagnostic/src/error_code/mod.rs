//! Error codes for all object-model diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E6020`) with the first digit
//! indicating the phase that reported it.

use std::fmt;

/// Error codes for all object-model diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Class table construction errors
/// - E6xxx: Evaluation errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Class Table Errors (E1xxx)
    /// Two classes share a name
    E1001,
    /// Two parameters of one class share a name
    E1002,
    /// Two fields of one class share a name
    E1003,
    /// Reserved body slot was never defined
    E1004,
    /// Operand refers to a parameter or instruction that does not exist
    E1005,
    /// Class body has no fields terminator
    E1006,
    /// Fields terminator arity differs from the declared field list
    E1007,
    /// List concatenation without operands
    E1008,
    /// Class definition interned through a different table's interner
    E1009,

    // Evaluation Errors (E6xxx)
    /// Integer operation failed (wraps the operator error)
    E6001,
    /// Negative shift amount
    E6002,
    /// Shift amount does not fit in 64 bits
    E6003,
    /// Integer result too wide
    E6004,
    /// Value has the wrong variant or type
    E6010,
    /// Actual parameter has the wrong type
    E6011,
    /// Unknown class name
    E6020,
    /// Unknown field name
    E6021,
    /// Unknown instruction
    E6022,
    /// Actual/formal parameter count mismatch
    E6030,
    /// Actual parameter is null
    E6031,
    /// Demand depth limit exceeded
    E6032,
    /// Instance limit exceeded
    E6033,
    /// Dataflow cycle
    E6040,
    /// Uncategorized evaluation error
    E6099,

    // Internal Errors (E9xxx)
    /// Internal evaluator error
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()` which is exhaustive (Rust match enforces it).
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6010,
        ErrorCode::E6011,
        ErrorCode::E6020,
        ErrorCode::E6021,
        ErrorCode::E6022,
        ErrorCode::E6030,
        ErrorCode::E6031,
        ErrorCode::E6032,
        ErrorCode::E6033,
        ErrorCode::E6040,
        ErrorCode::E6099,
        ErrorCode::E9001,
    ];

    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6020 => "E6020",
            ErrorCode::E6021 => "E6021",
            ErrorCode::E6022 => "E6022",
            ErrorCode::E6030 => "E6030",
            ErrorCode::E6031 => "E6031",
            ErrorCode::E6032 => "E6032",
            ErrorCode::E6033 => "E6033",
            ErrorCode::E6040 => "E6040",
            ErrorCode::E6099 => "E6099",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line description, used by `--explain`-style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "duplicate class name",
            ErrorCode::E1002 => "duplicate parameter name",
            ErrorCode::E1003 => "duplicate field name",
            ErrorCode::E1004 => "reserved body slot never defined",
            ErrorCode::E1005 => "operand out of range",
            ErrorCode::E1006 => "missing fields terminator",
            ErrorCode::E1007 => "fields terminator arity mismatch",
            ErrorCode::E1008 => "list concatenation without operands",
            ErrorCode::E1009 => "class from a different interner",
            ErrorCode::E6001 => "failed to evaluate integer operation",
            ErrorCode::E6002 => "negative shift amount",
            ErrorCode::E6003 => "shift amount too large",
            ErrorCode::E6004 => "integer result too wide",
            ErrorCode::E6010 => "type mismatch",
            ErrorCode::E6011 => "parameter type mismatch",
            ErrorCode::E6020 => "unknown class",
            ErrorCode::E6021 => "unknown field",
            ErrorCode::E6022 => "unknown instruction",
            ErrorCode::E6030 => "parameter count mismatch",
            ErrorCode::E6031 => "null parameter",
            ErrorCode::E6032 => "demand depth limit exceeded",
            ErrorCode::E6033 => "instance limit exceeded",
            ErrorCode::E6040 => "dataflow cycle",
            ErrorCode::E6099 => "evaluation error",
            ErrorCode::E9001 => "internal evaluator error",
        }
    }

    /// Check if this is a class table construction error (E1xxx).
    pub fn is_class_table_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is an evaluation error (E6xxx).
    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }

    /// Check if this is an internal error (E9xxx).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
