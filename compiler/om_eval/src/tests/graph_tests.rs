//! Forward references, mutual references, dataflow cycles, resource limits
//! and values shared across evaluations.

use om_diagnostic::ErrorCode;
use om_ir::{Attribute, ClassTableBuilder, Instr, IntegerBinaryOp, OmType};
use pretty_assertions::assert_eq;

use super::fixtures::{define, define_passthrough, eval, int, int_field, int_list_field};
use crate::{EvalErrorKind, Evaluator, Value};

/// `class LinkedList(n: any, val: string) -> (n: any, val: string)`.
fn linked_list(table: &mut ClassTableBuilder) {
    define(table, "LinkedList", |c| {
        let n = c.param("n", OmType::Any);
        let val = c.param("val", OmType::String);
        c.field("n", OmType::Any).field("val", OmType::String);
        c.fields([n, val]);
    });
}

mod regions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_graph_region() {
        let mut table = ClassTableBuilder::new();
        linked_list(&mut table);
        define(&mut table, "ReferenceEachOther", |c| {
            let s = c.constant(Attribute::string("foo"));
            let val = c.reserve();
            let first = c.reserve();
            let second = c.reserve();
            c.define(
                val,
                Instr::ObjectField {
                    object: second,
                    path: vec![c.intern("n"), c.intern("n"), c.intern("val")],
                },
            );
            c.define(
                first,
                Instr::Object {
                    class: c.intern("LinkedList"),
                    args: vec![second, val],
                },
            );
            c.define(
                second,
                Instr::Object {
                    class: c.intern("LinkedList"),
                    args: vec![first, s],
                },
            );
            c.field("field1", OmType::Any).field("field2", OmType::Any);
            c.fields([first, second]);
        });

        let obj = eval(table.build(), "ReferenceEachOther");
        let field1 = obj.get_field_by_str("field1").unwrap().as_object().unwrap();
        let field2 = obj.get_field_by_str("field2").unwrap().as_object().unwrap();

        assert_eq!(field1, field2.get_field_by_str("n").unwrap());
        assert_eq!(field2, field1.get_field_by_str("n").unwrap());
        let val = field1.get_field_by_str("val").unwrap();
        assert_eq!(val.as_attribute().unwrap().as_str(), Some("foo"));
    }

    #[test]
    fn test_cycle() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "LinkedList", |c| {
            let n = c.param("n", OmType::Any);
            c.field("n", OmType::Any);
            c.fields([n]);
        });
        define(&mut table, "ReferenceEachOther", |c| {
            let val = c.reserve();
            let object = c.object("LinkedList", [val]);
            c.define(
                val,
                Instr::ObjectField {
                    object,
                    path: vec![c.intern("n")],
                },
            );
            c.field("field", OmType::Any);
            c.fields([object]);
        });
        let evaluator = Evaluator::new(table.build());

        let err = evaluator
            .instantiate("ReferenceEachOther", vec![])
            .unwrap_err();
        assert_eq!(
            err.message,
            "failed to finalize evaluation. Probably the class contains a dataflow cycle"
        );
        assert_eq!(
            err.kind,
            EvalErrorKind::DataflowCycle {
                class: "ReferenceEachOther".into()
            }
        );
        assert_eq!(
            err.notes[0].message,
            "while evaluating class \"ReferenceEachOther\""
        );
        assert_eq!(
            err.notes[1].message,
            "demanded by instruction 0 of class \"ReferenceEachOther\""
        );

        let diag = err.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E6040);
        assert_eq!(diag.notes.len(), err.notes.len());
    }

    #[test]
    fn test_self_sum_is_cycle() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "SelfSum", |c| {
            let sum = c.reserve();
            let one = c.constant(Attribute::int(1, 8));
            c.define(
                sum,
                Instr::IntegerBinary {
                    op: IntegerBinaryOp::Add,
                    lhs: sum,
                    rhs: one,
                },
            );
            c.field("result", OmType::Integer);
            c.fields([sum]);
        });
        let evaluator = Evaluator::new(table.build());

        let err = evaluator.instantiate("SelfSum", vec![]).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::DataflowCycle {
                class: "SelfSum".into()
            }
        );
    }

    #[test]
    fn test_objects_delayed() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Class1", |c| {
            let input = c.param("input", OmType::Integer);
            let one = c.constant(Attribute::int(1, 3));
            c.field("value", OmType::Integer)
                .field("input", OmType::Integer);
            c.fields([one, input]);
        });
        define(&mut table, "Class2", |c| {
            let two = c.constant(Attribute::int(2, 3));
            c.field("value", OmType::Integer);
            c.fields([two]);
        });
        define(&mut table, "IntegerBinaryArithmeticObjectsDelayed", |c| {
            let sum = c.reserve();
            let obj1 = c.object("Class1", [sum]);
            let v1 = c.project(obj1, &["value"]);
            let obj2 = c.object("Class2", []);
            let v2 = c.project(obj2, &["value"]);
            c.define(
                sum,
                Instr::IntegerBinary {
                    op: IntegerBinaryOp::Add,
                    lhs: v1,
                    rhs: v2,
                },
            );
            c.field("result", OmType::Integer);
            c.fields([sum]);
        });

        let obj = eval(table.build(), "IntegerBinaryArithmeticObjectsDelayed");
        assert_eq!(int_field(&obj, "result"), 3);
    }

    #[test]
    fn test_delayed_param_reaches_child() {
        let mut table = ClassTableBuilder::new();
        define_passthrough(&mut table, "Holder", OmType::Integer);
        define(&mut table, "Outer", |c| {
            let later = c.reserve();
            let holder = c.object("Holder", [later]);
            c.define(later, Instr::Constant(Attribute::int(9, 5)));
            c.field("holder", OmType::Any);
            c.fields([holder]);
        });

        let obj = eval(table.build(), "Outer");
        let holder = obj.get_field_by_str("holder").unwrap().as_object().unwrap();
        assert_eq!(int_field(&holder, "field"), 9);
    }

    #[test]
    fn test_cyclic_display_terminates() {
        let mut table = ClassTableBuilder::new();
        linked_list(&mut table);
        define(&mut table, "Ring", |c| {
            let s = c.constant(Attribute::string("x"));
            let first = c.reserve();
            let second = c.object("LinkedList", [first, s]);
            c.define(
                first,
                Instr::Object {
                    class: c.intern("LinkedList"),
                    args: vec![second, s],
                },
            );
            c.field("head", OmType::Any);
            c.fields([first]);
        });

        let obj = eval(table.build(), "Ring");
        let rendered = obj.to_string();
        assert!(rendered.starts_with("Ring { head: LinkedList { n: LinkedList { n: <LinkedList#"));
        assert!(rendered.ends_with("val: \"x\" }, val: \"x\" } }"));
    }
}

mod limits {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `class Loop(n) { m = n + 1; next = Loop(m) }`: a new instance per step.
    fn counting_loop(table: &mut ClassTableBuilder) {
        define(table, "Loop", |c| {
            let n = c.param("n", OmType::Integer);
            let one = c.constant(Attribute::int(1, 2));
            let m = c.integer_binary(IntegerBinaryOp::Add, n, one);
            let next = c.object("Loop", [m]);
            c.field("next", OmType::Any);
            c.fields([next]);
        });
    }

    #[test]
    fn test_instance_limit() {
        let mut table = ClassTableBuilder::new();
        counting_loop(&mut table);
        let evaluator = Evaluator::builder(table.build()).max_instances(10).build();

        let err = evaluator
            .instantiate("Loop", vec![Some(int(0, 8))])
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::InstanceLimit { limit: 10 });
        assert_eq!(err.error_code(), ErrorCode::E6033);
    }

    #[test]
    fn test_self_instantiation_with_same_params_is_memoized() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Knot", |c| {
            let n = c.param("n", OmType::Integer);
            let me = c.object("Knot", [n]);
            c.field("me", OmType::Any);
            c.fields([me]);
        });
        let evaluator = Evaluator::new(table.build());

        let obj = evaluator.instantiate("Knot", vec![Some(int(4, 8))]).unwrap();
        assert_eq!(obj.get_field_by_str("me").unwrap(), obj.as_value());
        assert_eq!(obj.graph().stats().objects_created, 1);
        assert_eq!(obj.to_string(), "Knot { me: <Knot#2> }");
    }

    /// `result = s0`, `s(i) = s(i+1) + 1`, `s(last) = 0`: a demand chain as
    /// deep as `len`.
    fn chain(table: &mut ClassTableBuilder, len: usize) {
        define(table, "Chain", |c| {
            let one = c.constant(Attribute::int(1, 8));
            let slots: Vec<_> = (0..len).map(|_| c.reserve()).collect();
            for pair in slots.windows(2) {
                c.define(
                    pair[0],
                    Instr::IntegerBinary {
                        op: IntegerBinaryOp::Add,
                        lhs: pair[1],
                        rhs: one,
                    },
                );
            }
            c.define(slots[len - 1], Instr::Constant(Attribute::int(0, 8)));
            c.field("result", OmType::Integer);
            c.fields([slots[0]]);
        });
    }

    #[test]
    fn test_depth_limit() {
        let mut table = ClassTableBuilder::new();
        chain(&mut table, 32);
        let evaluator = Evaluator::builder(table.build()).max_depth(8).build();

        let err = evaluator.instantiate("Chain", vec![]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::RecursionLimit { depth: 8 });
        assert_eq!(err.message, "maximum evaluation depth exceeded (limit: 8)");
    }

    #[test]
    fn test_deep_chain_unlimited() {
        let mut table = ClassTableBuilder::new();
        chain(&mut table, 2000);
        let evaluator = Evaluator::builder(table.build()).unlimited_depth().build();

        let obj = evaluator.instantiate("Chain", vec![]).unwrap();
        assert_eq!(int_field(&obj, "result"), 1999);
    }
}

mod imports {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prior_result_as_param() {
        let mut table = ClassTableBuilder::new();
        define_passthrough(&mut table, "Inner", OmType::Integer);
        let inner_ty = OmType::Class(table.intern("Inner"));
        define(&mut table, "Outer", |c| {
            let a = c.param("a", inner_ty.clone());
            let b = c.param("b", inner_ty);
            let value = c.project(a, &["field"]);
            c.field("a", OmType::Any)
                .field("b", OmType::Any)
                .field("value", OmType::Integer);
            c.fields([a, b, value]);
        });
        let evaluator = Evaluator::new(table.build());

        let inner = evaluator
            .instantiate("Inner", vec![Some(int(11, 8))])
            .unwrap();
        let outer = evaluator
            .instantiate(
                "Outer",
                vec![Some(inner.as_value()), Some(inner.as_value())],
            )
            .unwrap();

        assert_eq!(int_field(&outer, "value"), 11);
        let a = outer.get_field_by_str("a").unwrap();
        let b = outer.get_field_by_str("b").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, inner.as_value());
    }

    #[test]
    fn test_prior_result_wrong_class() {
        let mut table = ClassTableBuilder::new();
        define_passthrough(&mut table, "Inner", OmType::Integer);
        define(&mut table, "Other", |c| c.fields([]));
        let inner_ty = OmType::Class(table.intern("Inner"));
        define(&mut table, "Outer", |c| {
            c.param("a", inner_ty);
            c.fields([]);
        });
        let evaluator = Evaluator::new(table.build());

        let other = evaluator.instantiate("Other", vec![]).unwrap();
        let err = evaluator
            .instantiate("Outer", vec![Some(other.as_value())])
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::E6011);
        assert_eq!(
            err.notes[0].message,
            "expected `class<Inner>`, found `class<Other>`"
        );
    }

    #[test]
    fn test_value_from_other_table() {
        let mut first = ClassTableBuilder::new();
        define_passthrough(&mut first, "Point", OmType::Integer);
        let first = Evaluator::new(first.build());
        let point = first.instantiate("Point", vec![Some(int(7, 8))]).unwrap();

        let mut second = ClassTableBuilder::new();
        define(&mut second, "Unrelated", |c| c.fields([]));
        define_passthrough(&mut second, "Point", OmType::Integer);
        define_passthrough(&mut second, "Holder", OmType::Any);
        let second = Evaluator::new(second.build());

        let holder = second
            .instantiate("Holder", vec![Some(point.as_value())])
            .unwrap();
        let copied = holder.get_field_by_str("field").unwrap().as_object().unwrap();
        assert_eq!(copied.class_name(), "Point");
        assert_eq!(int_field(&copied, "field"), 7);
    }

    #[test]
    fn test_value_from_other_table_unknown_class() {
        let mut first = ClassTableBuilder::new();
        define_passthrough(&mut first, "Point", OmType::Integer);
        let first = Evaluator::new(first.build());
        let point = first.instantiate("Point", vec![Some(int(7, 8))]).unwrap();

        let mut second = ClassTableBuilder::new();
        define_passthrough(&mut second, "Holder", OmType::Any);
        let second = Evaluator::new(second.build());

        let err = second
            .instantiate("Holder", vec![Some(point.as_value())])
            .unwrap_err();
        assert_eq!(err.message, "unknown class name \"Point\"");
    }

    #[test]
    fn test_standalone_list_param() {
        let mut table = ClassTableBuilder::new();
        define(&mut table, "Concat", |c| {
            let xs = c.param("xs", OmType::list(OmType::Integer));
            let k = c.constant(Attribute::int(9, 8));
            let tail = c.list_create(OmType::int(8), [k]);
            let all = c.list_concat([xs, tail]);
            c.field("all", OmType::list(OmType::int(8)));
            c.fields([all]);
        });
        let evaluator = Evaluator::new(table.build());

        let xs = Value::attribute_list(
            OmType::int(8),
            [Attribute::int(1, 8), Attribute::int(2, 8)],
        );
        let obj = evaluator.instantiate("Concat", vec![Some(xs)]).unwrap();
        assert_eq!(int_list_field(&obj, "all"), vec![1, 2, 9]);
    }
}
