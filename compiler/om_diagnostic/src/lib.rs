//! Diagnostics for the object-model toolchain.
//!
//! Errors in this workspace are values: every fallible operation returns a
//! typed error, and callers that want a uniform report convert it into a
//! [`Diagnostic`]. There is no process-wide handler to register.
//!
//! - [`ErrorCode`]: stable identifier per error category (`E1xxx` for class
//!   table construction, `E6xxx` for evaluation, `E9xxx` for internal errors)
//! - [`Diagnostic`]: code + severity + message + notes, rendered with `Display`

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
