//! Object-model IR: the inputs consumed by the evaluator.
//!
//! - [`Name`] / [`StringInterner`]: interned identifiers for classes, fields and parameters
//! - [`OmType`]: declared parameter and field types
//! - [`Attribute`]: immutable literal constants
//! - [`ClassDef`] / [`Instr`]: class signatures and body instructions
//! - [`ClassTable`] / [`ClassTableBuilder`]: name-keyed lookup, built once and then read-only
//!
//! Nothing here evaluates anything; see `om_eval`.

mod attr;
mod builder;
mod class;
mod errors;
mod interner;
mod name;
mod table;
mod types;

pub use attr::{Attribute, IntegerAttr, Signedness};
pub use builder::{ClassBuilder, ClassTableBuilder};
pub use class::{
    ClassBody, ClassDef, FieldDecl, Instr, IntegerBinaryOp, LocalRef, ParamDecl,
};
pub use errors::IrError;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use table::{ClassTable, SharedClassTable};
pub use types::{OmType, TypeDisplay};
