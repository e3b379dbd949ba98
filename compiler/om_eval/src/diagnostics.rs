//! Diagnostic infrastructure for the evaluator.
//!
//! - `DemandStack`: the chain of bindings currently being computed, with the
//!   depth limit check integrated into `push()`
//! - `EvalStats`: per-session counters, exposed on the result graph

use om_ir::{ClassTable, Name};

use crate::errors::{recursion_limit_exceeded, EvalError};

/// One in-progress binding: instruction `instr` of an instance of `class`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Demand {
    pub class: Name,
    pub instr: u32,
}

/// Live chain of demanded bindings.
///
/// Each forced binding pushes a frame and pops it when its instruction
/// finishes.
#[derive(Clone, Debug)]
pub struct DemandStack {
    frames: Vec<Demand>,
    max_depth: Option<usize>,
}

impl DemandStack {
    /// `max_depth` is `None` for unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a demand, checking the depth limit.
    ///
    /// The frame is NOT pushed on overflow.
    pub fn push(&mut self, demand: Demand) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        self.frames.push(demand);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "DemandStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Describe the chain, most recent demand first, for error notes.
    pub fn describe(&self, classes: &ClassTable) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .map(|d| {
                format!(
                    "demanded by instruction {} of class \"{}\"",
                    d.instr,
                    classes.name_str(d.class)
                )
            })
            .collect()
    }
}

/// Per-session evaluation counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub instructions_evaluated: u64,
    pub objects_created: u64,
    pub memo_hits: u64,
}

impl EvalStats {
    #[inline]
    pub fn count_instruction(&mut self) {
        self.instructions_evaluated = self.instructions_evaluated.wrapping_add(1);
    }

    #[inline]
    pub fn count_object(&mut self) {
        self.objects_created = self.objects_created.wrapping_add(1);
    }

    #[inline]
    pub fn count_memo_hit(&mut self) {
        self.memo_hits = self.memo_hits.wrapping_add(1);
    }

    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Evaluation profile:\n  \
             Instructions evaluated: {}\n  \
             Objects created:        {}\n  \
             Memo hits:              {}",
            self.instructions_evaluated, self.objects_created, self.memo_hits,
        )
    }
}
