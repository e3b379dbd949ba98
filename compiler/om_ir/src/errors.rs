//! Class table construction errors.

use om_diagnostic::{Diagnostic, ErrorCode};
use thiserror::Error;

/// Rejected class definition or class table.
///
/// Reported by [`ClassBuilder::finish`](crate::ClassBuilder::finish) and
/// [`ClassTableBuilder::define`](crate::ClassTableBuilder::define), before
/// any evaluation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("class \"{class}\" is defined more than once")]
    DuplicateClass { class: String },
    #[error("class \"{class}\" declares parameter \"{param}\" more than once")]
    DuplicateParam { class: String, param: String },
    #[error("class \"{class}\" declares field \"{field}\" more than once")]
    DuplicateField { class: String, field: String },
    #[error("class \"{class}\" reserves instruction {index} but never defines it")]
    UndefinedLocal { class: String, index: u32 },
    #[error("class \"{class}\" instruction {index} refers to {operand}, which does not exist")]
    LocalOutOfRange {
        class: String,
        index: usize,
        operand: String,
    },
    #[error("class \"{class}\" has no fields terminator")]
    MissingFieldsTerminator { class: String },
    #[error(
        "class \"{class}\" declares {declared} fields but its terminator yields {yielded}"
    )]
    FieldCountMismatch {
        class: String,
        declared: usize,
        yielded: usize,
    },
    #[error("class \"{class}\" instruction {index} concatenates no lists")]
    EmptyConcat { class: String, index: usize },
    #[error("class \"{class}\" was built against a different interner than this table")]
    ForeignInterner { class: String },
}

impl IrError {
    /// Map this error to its corresponding `ErrorCode`.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            IrError::DuplicateClass { .. } => ErrorCode::E1001,
            IrError::DuplicateParam { .. } => ErrorCode::E1002,
            IrError::DuplicateField { .. } => ErrorCode::E1003,
            IrError::UndefinedLocal { .. } => ErrorCode::E1004,
            IrError::LocalOutOfRange { .. } => ErrorCode::E1005,
            IrError::MissingFieldsTerminator { .. } => ErrorCode::E1006,
            IrError::FieldCountMismatch { .. } => ErrorCode::E1007,
            IrError::EmptyConcat { .. } => ErrorCode::E1008,
            IrError::ForeignInterner { .. } => ErrorCode::E1009,
        }
    }

    /// Convert to a structured diagnostic.
    #[cold]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.error_code()).with_message(self.to_string())
    }
}
