//! Literal constants carried by `constant` instructions and attribute values.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::OmType;

/// Signedness annotation of an integer attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
    Signless,
}

impl Signedness {
    fn prefix(self) -> &'static str {
        match self {
            Signedness::Signed => "si",
            Signedness::Unsigned => "ui",
            Signedness::Signless => "i",
        }
    }
}

/// Arbitrary-precision integer with its declared bit width and signedness.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegerAttr {
    pub value: BigInt,
    pub width: u32,
    pub signedness: Signedness,
}

impl IntegerAttr {
    pub fn new(value: impl Into<BigInt>, width: u32, signedness: Signedness) -> Self {
        IntegerAttr {
            value: value.into(),
            width,
            signedness,
        }
    }

    /// Signed integer (`si<width>`).
    pub fn signed(value: impl Into<BigInt>, width: u32) -> Self {
        Self::new(value, width, Signedness::Signed)
    }

    /// Signless integer (`i<width>`).
    pub fn signless(value: impl Into<BigInt>, width: u32) -> Self {
        Self::new(value, width, Signedness::Signless)
    }

    /// Value as `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }

    /// Minimum number of bits needed to hold `value` in two's complement.
    ///
    /// Zero needs one bit; `-1` needs one bit; `1` needs two.
    pub fn min_signed_width(value: &BigInt) -> u64 {
        if value.is_zero() {
            return 1;
        }
        if value.is_negative() {
            // -2^(n-1) fits in n bits
            let magnitude = -value - 1u32;
            magnitude.bits() + 1
        } else {
            value.bits() + 1
        }
    }
}

impl fmt::Display for IntegerAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {}{}",
            self.value,
            self.signedness.prefix(),
            self.width
        )
    }
}

/// Immutable literal value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Integer(IntegerAttr),
    Bool(bool),
    String(String),
    /// Constant the evaluator does not interpret, tagged with its kind.
    Opaque { kind: String, payload: String },
}

impl Attribute {
    /// Signed integer attribute.
    pub fn int(value: impl Into<BigInt>, width: u32) -> Self {
        Attribute::Integer(IntegerAttr::signed(value, width))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Attribute::String(s.into())
    }

    pub fn opaque(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Attribute::Opaque {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Runtime type of this literal.
    pub fn ty(&self) -> OmType {
        match self {
            Attribute::Integer(int) => OmType::int(int.width),
            Attribute::Bool(_) => OmType::Bool,
            Attribute::String(_) => OmType::String,
            Attribute::Opaque { kind, .. } => OmType::Opaque(kind.clone()),
        }
    }

    pub fn as_integer(&self) -> Option<&IntegerAttr> {
        match self {
            Attribute::Integer(int) => Some(int),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attribute::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<IntegerAttr> for Attribute {
    fn from(int: IntegerAttr) -> Self {
        Attribute::Integer(int)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Integer(int) => write!(f, "{int}"),
            Attribute::Bool(b) => write!(f, "{b}"),
            Attribute::String(s) => write!(f, "{s:?}"),
            Attribute::Opaque { kind, payload } => write!(f, "#{kind}<{payload}>"),
        }
    }
}
