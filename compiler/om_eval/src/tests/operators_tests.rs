//! Integer arithmetic and list concatenation, through the evaluator and
//! directly against the operator functions.

use num_bigint::BigInt;
use om_diagnostic::ErrorCode;
use om_ir::{Attribute, ClassTableBuilder, IntegerAttr, IntegerBinaryOp, OmType};
use pretty_assertions::assert_eq;

use super::fixtures::{define, eval, int_field, int_list_field};
use crate::operators::{evaluate_integer_binary, MAX_INTEGER_WIDTH};
use crate::{EvalErrorKind, Evaluator};

/// One-field class computing `lhs <op> rhs` from two constants.
fn binary_class(op: IntegerBinaryOp, lhs: Attribute, rhs: Attribute) -> ClassTableBuilder {
    let mut table = ClassTableBuilder::new();
    define(&mut table, "Arith", |c| {
        let l = c.constant(lhs);
        let r = c.constant(rhs);
        let result = c.integer_binary(op, l, r);
        c.field("result", OmType::Integer);
        c.fields([result]);
    });
    table
}

fn si(value: i64, width: u32) -> IntegerAttr {
    IntegerAttr::signed(value, width)
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add() {
        let obj = eval(
            binary_class(IntegerBinaryOp::Add, Attribute::int(1, 3), Attribute::int(2, 3)).build(),
            "Arith",
        );
        assert_eq!(int_field(&obj, "result"), 3);
    }

    #[test]
    fn test_mul() {
        let obj = eval(
            binary_class(IntegerBinaryOp::Mul, Attribute::int(2, 3), Attribute::int(3, 3)).build(),
            "Arith",
        );
        assert_eq!(int_field(&obj, "result"), 6);
    }

    #[test]
    fn test_shr() {
        let obj = eval(
            binary_class(IntegerBinaryOp::Shr, Attribute::int(8, 5), Attribute::int(2, 3)).build(),
            "Arith",
        );
        assert_eq!(int_field(&obj, "result"), 2);
    }

    #[test]
    fn test_shl() {
        let obj = eval(
            binary_class(IntegerBinaryOp::Shl, Attribute::int(8, 7), Attribute::int(2, 3)).build(),
            "Arith",
        );
        assert_eq!(int_field(&obj, "result"), 32);
    }

    #[test]
    fn test_width_mismatch() {
        let obj = eval(
            binary_class(IntegerBinaryOp::Add, Attribute::int(1, 3), Attribute::int(2, 4)).build(),
            "Arith",
        );
        assert_eq!(int_field(&obj, "result"), 3);
    }

    #[test]
    fn test_objects() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Class1", |c| {
            let k = c.constant(Attribute::int(1, 3));
            c.field("value", OmType::Integer);
            c.fields([k]);
        });
        define(&mut table, "Class2", |c| {
            let k = c.constant(Attribute::int(2, 3));
            c.field("value", OmType::Integer);
            c.fields([k]);
        });
        define(&mut table, "IntegerBinaryArithmeticObjects", |c| {
            let o1 = c.object("Class1", []);
            let v1 = c.project(o1, &["value"]);
            let o2 = c.object("Class2", []);
            let v2 = c.project(o2, &["value"]);
            let sum = c.integer_binary(IntegerBinaryOp::Add, v1, v2);
            c.field("result", OmType::Integer);
            c.fields([sum]);
        });

        let obj = eval(table.build(), "IntegerBinaryArithmeticObjects");
        assert_eq!(int_field(&obj, "result"), 3);
    }

    #[test]
    fn test_operands_through_any() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Arith", |c| {
            let l = c.constant(Attribute::int(5, 4));
            let r = c.constant(Attribute::int(6, 4));
            let l = c.any_cast(l);
            let r = c.any_cast(r);
            let product = c.integer_binary(IntegerBinaryOp::Mul, l, r);
            c.field("result", OmType::Integer);
            c.fields([product]);
        });

        let obj = eval(table.build(), "Arith");
        assert_eq!(int_field(&obj, "result"), 30);
    }

    #[test]
    fn test_non_integer_operand() {
        let table = binary_class(
            IntegerBinaryOp::Add,
            Attribute::int(1, 3),
            Attribute::string("two"),
        );
        let err = Evaluator::new(table.build())
            .instantiate("Arith", vec![])
            .unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::TypeMismatch {
                expected: "integer".into(),
                got: "string".into(),
            }
        );
        assert!(err.cause().is_none());
    }
}

mod shift_errors {
    use super::*;
    use pretty_assertions::assert_eq;

    fn too_large() -> Attribute {
        let value: BigInt = "36893488147419100000".parse().unwrap();
        Attribute::Integer(IntegerAttr::signed(value, 66))
    }

    fn check_wrapped(op: IntegerBinaryOp, rhs: Attribute, code: ErrorCode, message: &str) {
        let table = binary_class(op, Attribute::int(8, 5), rhs);
        let err = Evaluator::new(table.build())
            .instantiate("Arith", vec![])
            .unwrap_err();

        assert_eq!(err.message, "failed to evaluate integer operation");
        assert_eq!(err.error_code(), ErrorCode::E6001);
        let cause = err.cause().unwrap();
        assert_eq!(cause.error_code(), code);
        assert_eq!(cause.message, message);
        assert_eq!(err.root_cause(), cause);

        let diag = err.to_diagnostic();
        assert_eq!(diag.notes, vec![format!("caused by [{code}]: {message}")]);
    }

    #[test]
    fn test_shr_negative() {
        check_wrapped(
            IntegerBinaryOp::Shr,
            Attribute::int(-2, 3),
            ErrorCode::E6002,
            "'integer.shr' op shift amount must be non-negative",
        );
    }

    #[test]
    fn test_shr_too_large() {
        check_wrapped(
            IntegerBinaryOp::Shr,
            too_large(),
            ErrorCode::E6003,
            "'integer.shr' op shift amount must be representable in 64 bits",
        );
    }

    #[test]
    fn test_shl_negative() {
        check_wrapped(
            IntegerBinaryOp::Shl,
            Attribute::int(-2, 3),
            ErrorCode::E6002,
            "'integer.shl' op shift amount must be non-negative",
        );
    }

    #[test]
    fn test_shl_too_large() {
        check_wrapped(
            IntegerBinaryOp::Shl,
            too_large(),
            ErrorCode::E6003,
            "'integer.shl' op shift amount must be representable in 64 bits",
        );
    }

    #[test]
    fn test_shl_result_too_wide() {
        let amount = i64::from(MAX_INTEGER_WIDTH);
        check_wrapped(
            IntegerBinaryOp::Shl,
            Attribute::int(amount, 32),
            ErrorCode::E6004,
            "'integer.shl' op result needs 65541 bits, more than the limit of 65536",
        );
    }
}

mod operator_fns {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_result_widths() {
        let add = evaluate_integer_binary(IntegerBinaryOp::Add, &si(1, 3), &si(2, 3)).unwrap();
        assert_eq!(add, si(3, 4));
        let mul = evaluate_integer_binary(IntegerBinaryOp::Mul, &si(2, 3), &si(3, 3)).unwrap();
        assert_eq!(mul, si(6, 6));
        let shl = evaluate_integer_binary(IntegerBinaryOp::Shl, &si(8, 7), &si(2, 3)).unwrap();
        assert_eq!(shl, si(32, 9));
        let shr = evaluate_integer_binary(IntegerBinaryOp::Shr, &si(8, 5), &si(2, 3)).unwrap();
        assert_eq!(shr, si(2, 5));
    }

    #[test]
    fn test_shr_rounds_toward_negative_infinity() {
        let shr = evaluate_integer_binary(IntegerBinaryOp::Shr, &si(-7, 8), &si(1, 2)).unwrap();
        assert_eq!(shr.to_i64(), Some(-4));
    }

    #[test]
    fn test_signless_operands_give_signed_result() {
        let lhs = IntegerAttr::signless(3, 8);
        let rhs = IntegerAttr::signless(4, 8);
        let sum = evaluate_integer_binary(IntegerBinaryOp::Add, &lhs, &rhs).unwrap();
        assert_eq!(sum, si(7, 9));
    }

    #[test]
    fn test_narrow_width_is_widened_to_fit() {
        // 7 does not fit the declared 3-bit operands; the result still holds it.
        let sum = evaluate_integer_binary(IntegerBinaryOp::Add, &si(7, 3), &si(7, 3)).unwrap();
        assert_eq!(sum.to_i64(), Some(14));
        assert_eq!(sum.width, 5);
    }

    #[test]
    fn test_shl_zero_by_huge_amount_is_rejected() {
        let err = evaluate_integer_binary(
            IntegerBinaryOp::Shl,
            &si(0, 1),
            &si(i64::from(u32::MAX), 64),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::E6004);
    }
}

mod lists {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_concat() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "ListConcat", |c| {
            let k0 = c.constant(Attribute::int(0, 8));
            let k1 = c.constant(Attribute::int(1, 8));
            let k2 = c.constant(Attribute::int(2, 8));
            let l0 = c.list_create(OmType::int(8), [k0, k1]);
            let l1 = c.list_create(OmType::int(8), [k2]);
            let concat = c.list_concat([l0, l1]);
            c.field("result", OmType::list(OmType::int(8)));
            c.fields([concat]);
        });

        let obj = eval(table.build(), "ListConcat");
        assert_eq!(int_list_field(&obj, "result"), vec![0, 1, 2]);
    }

    #[test]
    fn test_list_concat_field() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "ListField", |c| {
            let k = c.constant(Attribute::int(2, 8));
            let list = c.list_create(OmType::int(8), [k]);
            c.field("value", OmType::list(OmType::int(8)));
            c.fields([list]);
        });
        define(&mut table, "ListConcatField", |c| {
            let holder = c.object("ListField", []);
            let k0 = c.constant(Attribute::int(0, 8));
            let k1 = c.constant(Attribute::int(1, 8));
            let l0 = c.list_create(OmType::int(8), [k0, k1]);
            let l1 = c.project(holder, &["value"]);
            let concat = c.list_concat([l0, l1]);
            c.field("result", OmType::list(OmType::int(8)));
            c.fields([concat]);
        });

        let obj = eval(table.build(), "ListConcatField");
        assert_eq!(int_list_field(&obj, "result"), vec![0, 1, 2]);

        assert_eq!(obj.graph().stats().objects_created, 2);
    }

    #[test]
    fn test_list_concat_preserves_element_identity() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Item", |c| c.fields([]));
        define(&mut table, "Lists", |c| {
            let item = c.object("Item", []);
            let l0 = c.list_create(OmType::Any, [item]);
            let l1 = c.list_create(OmType::Any, [item]);
            let concat = c.list_concat([l0, l1]);
            c.field("all", OmType::list(OmType::Any))
                .field("item", OmType::Any);
            c.fields([concat, item]);
        });

        let obj = eval(table.build(), "Lists");
        let item = obj.get_field_by_str("item").unwrap();
        let all = obj.get_field_by_str("all").unwrap().as_list().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.elements().all(|e| e == item));
    }

    #[test]
    fn test_list_concat_element_type_mismatch() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Bad", |c| {
            let k = c.constant(Attribute::int(0, 8));
            let s = c.constant(Attribute::string("s"));
            let l0 = c.list_create(OmType::Integer, [k]);
            let l1 = c.list_create(OmType::String, [s]);
            let concat = c.list_concat([l0, l1]);
            c.field("result", OmType::Any);
            c.fields([concat]);
        });

        let err = Evaluator::new(table.build())
            .instantiate("Bad", vec![])
            .unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::TypeMismatch {
                expected: "list<integer>".into(),
                got: "list<string>".into(),
            }
        );
    }
}

mod proptest_arithmetic {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_matches_i128(a in any::<i64>(), b in any::<i64>()) {
            let sum = evaluate_integer_binary(IntegerBinaryOp::Add, &si(a, 64), &si(b, 64)).unwrap();
            prop_assert_eq!(sum.value, BigInt::from(i128::from(a) + i128::from(b)));
            prop_assert_eq!(sum.width, 65);
        }

        #[test]
        fn mul_matches_i128(a in any::<i64>(), b in any::<i64>()) {
            let product = evaluate_integer_binary(IntegerBinaryOp::Mul, &si(a, 64), &si(b, 64)).unwrap();
            prop_assert_eq!(product.value, BigInt::from(i128::from(a) * i128::from(b)));
            prop_assert_eq!(product.width, 128);
        }

        #[test]
        fn add_commutes(a in any::<i32>(), wa in 1u32..64, b in any::<i32>(), wb in 1u32..64) {
            let lhs = si(i64::from(a), wa);
            let rhs = si(i64::from(b), wb);
            let ab = evaluate_integer_binary(IntegerBinaryOp::Add, &lhs, &rhs).unwrap();
            let ba = evaluate_integer_binary(IntegerBinaryOp::Add, &rhs, &lhs).unwrap();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn shl_then_shr_round_trips(a in any::<i32>(), amount in 0i64..64) {
            let shifted = evaluate_integer_binary(IntegerBinaryOp::Shl, &si(i64::from(a), 32), &si(amount, 8)).unwrap();
            let back = evaluate_integer_binary(IntegerBinaryOp::Shr, &shifted, &si(amount, 8)).unwrap();
            prop_assert_eq!(back.value, BigInt::from(a));
        }

        #[test]
        fn result_width_holds_value(a in any::<i64>(), b in any::<i64>()) {
            for op in [IntegerBinaryOp::Add, IntegerBinaryOp::Mul] {
                let result = evaluate_integer_binary(op, &si(a, 8), &si(b, 8)).unwrap();
                prop_assert!(u64::from(result.width) >= IntegerAttr::min_signed_width(&result.value));
            }
        }
    }
}
