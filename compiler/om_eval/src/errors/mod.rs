//! Error types for evaluation.
//!
//! `EvalErrorKind` provides typed error categories for diagnostic conversion.
//! Factory functions (e.g., `unknown_class()`) are the public API: they
//! populate both `kind` and `message`.

mod diagnostics;

use std::fmt;

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Typed error category for structured diagnostics.
///
/// Each variant carries the data needed to render its message. Factory
/// functions populate both `kind` and `message`; the `Display` impl produces
/// the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Integer arithmetic
    /// Wraps an arithmetic failure; the original error is the `cause`.
    IntegerOperationFailed,
    NegativeShiftAmount {
        op: String,
    },
    ShiftAmountTooLarge {
        op: String,
    },
    IntegerWidthExceeded {
        op: String,
        width: u64,
        limit: u32,
    },

    // Type
    TypeMismatch {
        expected: String,
        got: String,
    },
    ParameterTypeMismatch {
        param: String,
    },

    // Access
    UnknownClass {
        name: String,
    },
    UnknownField {
        field: String,
    },
    UnknownInstruction {
        op: String,
    },

    // Instantiation
    ParameterCountMismatch {
        actual: usize,
        formal: usize,
    },
    NullParameter {
        param: String,
    },
    RecursionLimit {
        depth: usize,
    },
    InstanceLimit {
        limit: usize,
    },

    // Dataflow
    /// `class` owns the binding that was demanded while in progress.
    DataflowCycle {
        class: String,
    },

    /// Catch-all for errors without a structured kind.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integer arithmetic
            Self::IntegerOperationFailed => write!(f, "failed to evaluate integer operation"),
            Self::NegativeShiftAmount { op } => {
                write!(f, "'{op}' op shift amount must be non-negative")
            }
            Self::ShiftAmountTooLarge { op } => {
                write!(f, "'{op}' op shift amount must be representable in 64 bits")
            }
            Self::IntegerWidthExceeded { op, width, limit } => write!(
                f,
                "'{op}' op result needs {width} bits, more than the limit of {limit}"
            ),

            // Type
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::ParameterTypeMismatch { param } => {
                write!(f, "actual parameter for \"{param}\" has invalid type")
            }

            // Access
            Self::UnknownClass { name } => write!(f, "unknown class name \"{name}\""),
            Self::UnknownField { field } => write!(f, "field \"{field}\" does not exist"),
            Self::UnknownInstruction { op } => write!(f, "unknown instruction '{op}'"),

            // Instantiation
            Self::ParameterCountMismatch { actual, formal } => write!(
                f,
                "actual parameter list length ({actual}) does not match formal parameter list length ({formal})"
            ),
            Self::NullParameter { param } => {
                write!(f, "actual parameter for \"{param}\" is null")
            }
            Self::RecursionLimit { depth } => {
                write!(f, "maximum evaluation depth exceeded (limit: {depth})")
            }
            Self::InstanceLimit { limit } => {
                write!(f, "maximum number of object instances exceeded (limit: {limit})")
            }

            // Dataflow
            Self::DataflowCycle { .. } => write!(
                f,
                "failed to finalize evaluation. Probably the class contains a dataflow cycle"
            ),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Additional context note attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category for diagnostic conversion.
    pub kind: EvalErrorKind,
    /// Human-readable error message; equals `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
    /// Additional context notes, outermost first.
    pub notes: Vec<EvalNote>,
    /// Error this one wraps, if any.
    pub cause: Option<Box<EvalError>>,
}

impl EvalError {
    /// Create an error with just a message.
    ///
    /// Uses `Custom` kind. Prefer the factory functions when a structured
    /// kind is available.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
            notes: Vec::new(),
            cause: None,
        }
    }

    /// Create an error from a structured kind.
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            notes: Vec::new(),
            cause: None,
        }
    }

    /// Attach a context note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(EvalNote::new(note));
        self
    }

    /// Wrap another error as the cause of this one.
    #[must_use]
    pub fn with_cause(mut self, cause: EvalError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&EvalError> {
        self.cause.as_deref()
    }

    /// The innermost error of the cause chain (`self` if there is no cause).
    pub fn root_cause(&self) -> &EvalError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

// Factory functions

/// Wrap an arithmetic failure.
#[cold]
pub fn integer_operation_failed(cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOperationFailed).with_cause(cause)
}

#[cold]
pub fn negative_shift_amount(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NegativeShiftAmount { op: op.to_string() })
}

#[cold]
pub fn shift_amount_too_large(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ShiftAmountTooLarge { op: op.to_string() })
}

#[cold]
pub fn integer_width_exceeded(op: &str, width: u64, limit: u32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerWidthExceeded {
        op: op.to_string(),
        width,
        limit,
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

/// Parameter type check failure, with a note naming both types.
#[cold]
pub fn parameter_type_mismatch(param: &str, expected: &str, found: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParameterTypeMismatch {
        param: param.to_string(),
    })
    .with_note(format!("expected `{expected}`, found `{found}`"))
}

#[cold]
pub fn unknown_class(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownClass {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_field(field: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownField {
        field: field.to_string(),
    })
}

#[cold]
pub fn unknown_instruction(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownInstruction { op: op.to_string() })
}

#[cold]
pub fn parameter_count_mismatch(actual: usize, formal: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParameterCountMismatch { actual, formal })
}

#[cold]
pub fn null_parameter(param: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullParameter {
        param: param.to_string(),
    })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { depth })
}

#[cold]
pub fn instance_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InstanceLimit { limit })
}

/// A value was demanded while it was still being computed.
#[cold]
pub fn dataflow_cycle(class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DataflowCycle {
        class: class.to_owned(),
    })
    .with_note(format!("while evaluating class \"{class}\""))
}
