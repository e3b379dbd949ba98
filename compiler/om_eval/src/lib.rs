#![deny(clippy::arithmetic_side_effects)]
//! Lazy evaluator for object-model class tables.
//!
//! Instantiating a class walks its body, creating nested objects, projecting
//! fields, doing integer arithmetic and building lists. Bodies are graph
//! regions: an instruction may use a value defined later, and two objects may
//! refer to each other. What is not allowed is a value whose computation
//! needs itself; that is reported as a dataflow cycle.
//!
//! # Architecture
//!
//! - [`Evaluator`]: entry point; owns the shared class table and [`EvalConfig`]
//! - `engine`: one evaluation session (frames, bindings, memo table)
//! - [`value`]: the resolved result graph and its handles
//! - [`operators`] / [`lists`]: pure arithmetic and list functions
//! - [`errors`]: [`EvalError`] and its diagnostic conversion
//!
//! ```ignore
//! let evaluator = Evaluator::new(table);
//! let obj = evaluator.instantiate("MyClass", vec![Some(Value::attribute(Attribute::int(42, 32)))])?;
//! let field = obj.get_field_by_str("field")?;
//! ```

mod config;
mod diagnostics;
mod engine;
pub mod errors;
mod evaluator;
pub mod lists;
pub mod operators;
mod stack;
pub mod value;

#[cfg(test)]
mod tests;

pub use config::{EvalConfig, EvaluatorBuilder};
pub use diagnostics::{Demand, DemandStack, EvalStats};
pub use errors::{EvalError, EvalErrorKind, EvalNote, EvalResult};
pub use evaluator::{Evaluator, InstantiateRequest};
pub use stack::ensure_sufficient_stack;
pub use value::{AnyValue, ListValue, ObjectValue, Value, ValueGraph, ValueId};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Reads `RUST_LOG` to select levels, e.g. `RUST_LOG=om_eval=trace` for
/// per-instruction events. Does nothing when `RUST_LOG` is unset. Safe to
/// call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
