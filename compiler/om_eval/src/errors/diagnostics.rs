//! Evaluation error to diagnostic conversion.
//!
//! # Error Code Ranges (E6xxx)
//!
//! - E6001–E6009: Integer arithmetic
//! - E6010–E6019: Type errors
//! - E6020–E6029: Access errors (class, field, instruction)
//! - E6030–E6039: Instantiation errors (parameters, resource limits)
//! - E6040–E6049: Dataflow errors
//! - E6099: Custom/uncategorized

use om_diagnostic::{Diagnostic, ErrorCode};

use super::{EvalError, EvalErrorKind};

impl EvalErrorKind {
    /// Map this error kind to its corresponding `ErrorCode`.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            // Integer arithmetic
            Self::IntegerOperationFailed => ErrorCode::E6001,
            Self::NegativeShiftAmount { .. } => ErrorCode::E6002,
            Self::ShiftAmountTooLarge { .. } => ErrorCode::E6003,
            Self::IntegerWidthExceeded { .. } => ErrorCode::E6004,

            // Type
            Self::TypeMismatch { .. } => ErrorCode::E6010,
            Self::ParameterTypeMismatch { .. } => ErrorCode::E6011,

            // Access
            Self::UnknownClass { .. } => ErrorCode::E6020,
            Self::UnknownField { .. } => ErrorCode::E6021,
            Self::UnknownInstruction { .. } => ErrorCode::E6022,

            // Instantiation
            Self::ParameterCountMismatch { .. } => ErrorCode::E6030,
            Self::NullParameter { .. } => ErrorCode::E6031,
            Self::RecursionLimit { .. } => ErrorCode::E6032,
            Self::InstanceLimit { .. } => ErrorCode::E6033,

            // Dataflow
            Self::DataflowCycle { .. } => ErrorCode::E6040,

            // Custom/catch-all
            Self::Custom { .. } => ErrorCode::E6099,
        }
    }
}

impl EvalError {
    /// Map this error to its corresponding `ErrorCode`.
    #[inline]
    pub fn error_code(&self) -> ErrorCode {
        self.kind.error_code()
    }

    /// Convert to a structured diagnostic.
    ///
    /// Own notes come first, followed by one note per wrapped cause
    /// (outermost first) carrying that cause's code and message.
    #[cold]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.error_code()).with_message(self.message.clone());
        for note in &self.notes {
            diag = diag.with_note(note.message.clone());
        }
        let mut cause = self.cause();
        while let Some(err) = cause {
            diag = diag.with_note(format!("caused by [{}]: {}", err.error_code(), err.message));
            for note in &err.notes {
                diag = diag.with_note(note.message.clone());
            }
            cause = err.cause();
        }
        diag
    }
}
