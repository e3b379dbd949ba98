//! List operations.

use om_ir::OmType;

use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::ValueId;

/// Concatenate lists, appending element references left to right.
///
/// All operands must share one element type. Elements are not copied: the
/// result refers to the same element values as the operands.
pub fn concat<'a>(
    lists: impl IntoIterator<Item = (&'a OmType, &'a [ValueId])>,
) -> EvalResult<(OmType, Vec<ValueId>)> {
    let mut lists = lists.into_iter();
    let Some((elem_type, first)) = lists.next() else {
        return Err(EvalError::new("list concatenation needs at least one list"));
    };
    let mut elements = first.to_vec();
    for (ty, items) in lists {
        if ty != elem_type {
            return Err(type_mismatch(
                &format!("list<{}>", describe(elem_type)),
                &format!("list<{}>", describe(ty)),
            ));
        }
        elements.extend_from_slice(items);
    }
    Ok((elem_type.clone(), elements))
}

/// Type name without class-name resolution, for mismatch messages.
fn describe(ty: &OmType) -> String {
    match ty {
        OmType::Integer => "integer".to_string(),
        OmType::Int { width } => format!("i{width}"),
        OmType::Bool => "bool".to_string(),
        OmType::String => "string".to_string(),
        OmType::Opaque(kind) => format!("opaque<{kind}>"),
        OmType::List(elem) => format!("list<{}>", describe(elem)),
        OmType::Class(_) => "class".to_string(),
        OmType::Any => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalErrorKind;
    use pretty_assertions::assert_eq;

    fn ids(raw: &[u32]) -> Vec<ValueId> {
        raw.iter().copied().map(ValueId::new).collect()
    }

    #[test]
    fn test_concat_preserves_order() {
        let ty = OmType::Integer;
        let a = ids(&[4, 7]);
        let b = ids(&[9]);
        let (elem, result) = concat([(&ty, a.as_slice()), (&ty, b.as_slice())]).unwrap();
        assert_eq!(elem, OmType::Integer);
        assert_eq!(result, ids(&[4, 7, 9]));
    }

    #[test]
    fn test_concat_single_and_empty_lists() {
        let ty = OmType::String;
        let empty: Vec<ValueId> = Vec::new();
        let a = ids(&[1]);
        let (_, result) =
            concat([(&ty, empty.as_slice()), (&ty, a.as_slice()), (&ty, empty.as_slice())])
                .unwrap();
        assert_eq!(result, ids(&[1]));
    }

    #[test]
    fn test_concat_element_type_mismatch() {
        let ints = OmType::Integer;
        let strings = OmType::String;
        let a = ids(&[1]);
        let err = concat([(&ints, a.as_slice()), (&strings, a.as_slice())]).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::TypeMismatch {
                expected: "list<integer>".into(),
                got: "list<string>".into(),
            }
        );
    }

    #[test]
    fn test_concat_nothing() {
        let none: [(&OmType, &[ValueId]); 0] = [];
        assert!(concat(none).is_err());
    }
}
