//! Evaluator scenario tests.
//!
//! Each scenario builds a small class table with `ClassTableBuilder`,
//! instantiates one class and inspects the resulting object graph.


mod graph_tests;
mod operators_tests;
