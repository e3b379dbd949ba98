//! Declared types of parameters, fields and list elements.

use std::fmt;

use crate::{Name, StringInterner};

/// A declared object-model type.
///
/// Class references are interned in the owning table's interner; render them
/// with [`OmType::display`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OmType {
    /// Integer of any width (`integer`).
    Integer,
    /// Integer of an exact bit width (`i<N>`).
    Int { width: u32 },
    Bool,
    String,
    /// Opaque constant of a named kind (`opaque<kind>`).
    Opaque(String),
    /// Homogeneous list (`list<T>`).
    List(Box<OmType>),
    /// Instance of a class (`class<Name>`).
    Class(Name),
    /// Top type; accepts every value.
    Any,
}

impl OmType {
    /// Exact-width integer type.
    pub fn int(width: u32) -> Self {
        OmType::Int { width }
    }

    /// List type with the given element type.
    pub fn list(elem: OmType) -> Self {
        OmType::List(Box::new(elem))
    }

    /// Opaque type of the given kind.
    pub fn opaque(kind: impl Into<String>) -> Self {
        OmType::Opaque(kind.into())
    }

    /// Check whether a value whose runtime type is `actual` may be bound
    /// where `self` is declared.
    ///
    /// `any` accepts everything and `integer` accepts every exact-width
    /// integer. Lists are covariant in their element type.
    pub fn accepts(&self, actual: &OmType) -> bool {
        match (self, actual) {
            (OmType::Any, _) => true,
            (OmType::Integer, OmType::Integer | OmType::Int { .. }) => true,
            (OmType::List(expected), OmType::List(found)) => expected.accepts(found),
            _ => self == actual,
        }
    }

    /// Element type, if this is a list type.
    pub fn element_type(&self) -> Option<&OmType> {
        match self {
            OmType::List(elem) => Some(elem),
            _ => None,
        }
    }

    /// Render this type, resolving class names through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, interner }
    }
}

/// Display adapter returned by [`OmType::display`].
pub struct TypeDisplay<'a> {
    ty: &'a OmType,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            OmType::Integer => write!(f, "integer"),
            OmType::Int { width } => write!(f, "i{width}"),
            OmType::Bool => write!(f, "bool"),
            OmType::String => write!(f, "string"),
            OmType::Opaque(kind) => write!(f, "opaque<{kind}>"),
            OmType::List(elem) => write!(f, "list<{}>", elem.display(self.interner)),
            OmType::Class(name) => write!(f, "class<{}>", self.interner.lookup(*name)),
            OmType::Any => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accepts() {
        assert!(OmType::Any.accepts(&OmType::String));
        assert!(OmType::Integer.accepts(&OmType::int(7)));
        assert!(OmType::int(32).accepts(&OmType::int(32)));
        assert!(!OmType::int(32).accepts(&OmType::int(64)));
        assert!(!OmType::int(32).accepts(&OmType::String));
        assert!(OmType::list(OmType::Integer).accepts(&OmType::list(OmType::int(8))));
        assert!(!OmType::list(OmType::Bool).accepts(&OmType::list(OmType::int(8))));
        assert!(!OmType::String.accepts(&OmType::Any));
    }

    #[test]
    fn test_display() {
        let interner = StringInterner::new();
        let node = interner.intern("Node");
        let ty = OmType::list(OmType::Class(node));
        assert_eq!(ty.display(&interner).to_string(), "list<class<Node>>");
        assert_eq!(OmType::int(64).display(&interner).to_string(), "i64");
        assert_eq!(
            OmType::opaque("path").display(&interner).to_string(),
            "opaque<path>"
        );
    }
}
