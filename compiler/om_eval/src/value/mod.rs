//! Evaluation results.
//!
//! A top-level instantiation produces one [`ValueGraph`]: an arena of nodes
//! addressed by [`ValueId`]. Object fields and list elements are ids, so
//! sharing and cycles are index relationships, never owning cycles. The graph
//! is immutable once returned and is released when the last handle drops.
//!
//! Handles ([`Value`], [`ObjectValue`], [`ListValue`], [`AnyValue`]) pair an
//! `Arc<ValueGraph>` with an id. Two handles are equal iff they name the same
//! node of the same graph.

mod display;
mod handles;

use std::fmt;

use om_ir::{Attribute, Name, OmType, SharedClassTable};
use smallvec::SmallVec;

use crate::EvalStats;

pub use handles::{AnyValue, ListValue, ObjectValue, Value};

/// Index into a value graph.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ValueId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.0)
    }
}

/// Evaluation state of one instruction result.
///
/// `Unstarted -> InProgress -> Resolved | Failed`. Demanding an
/// `InProgress` binding is a dataflow cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BindingState {
    Unstarted { frame: u32, instr: u32 },
    InProgress { frame: u32 },
    Resolved(ValueId),
    Failed,
}

/// Arena node.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    Attribute(Attribute),
    /// Field ids follow the class's field declaration order.
    Object {
        class: Name,
        fields: Vec<ValueId>,
    },
    List {
        elem_type: OmType,
        elements: Vec<ValueId>,
    },
    Any(ValueId),
    Binding(BindingState),
}

impl Node {
    /// Ids this node refers to.
    pub(crate) fn children(&self) -> SmallVec<[ValueId; 4]> {
        match self {
            Node::Attribute(_) | Node::Binding(_) => SmallVec::new(),
            Node::Object { fields, .. } => fields.iter().copied().collect(),
            Node::List { elements, .. } => elements.iter().copied().collect(),
            Node::Any(inner) => smallvec::smallvec![*inner],
        }
    }

    /// Short variant name for type mismatch messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Node::Attribute(Attribute::Integer(_)) => "integer",
            Node::Attribute(Attribute::Bool(_)) => "bool",
            Node::Attribute(Attribute::String(_)) => "string",
            Node::Attribute(Attribute::Opaque { .. }) => "opaque",
            Node::Object { .. } => "object",
            Node::List { .. } => "list",
            Node::Any(_) => "any",
            Node::Binding(_) => "unresolved value",
        }
    }
}

/// Immutable graph of values produced by one evaluation.
pub struct ValueGraph {
    nodes: Vec<Node>,
    /// Table the object classes belong to; `None` for standalone values.
    classes: Option<SharedClassTable>,
    stats: EvalStats,
}

impl ValueGraph {
    pub(crate) fn new(nodes: Vec<Node>, classes: Option<SharedClassTable>, stats: EvalStats) -> Self {
        ValueGraph {
            nodes,
            classes,
            stats,
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: ValueId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Follow resolved bindings to the value node they stand for.
    pub(crate) fn resolve(&self, mut id: ValueId) -> ValueId {
        while let Node::Binding(BindingState::Resolved(next)) = self.node(id) {
            id = *next;
        }
        id
    }

    /// Class table the objects in this graph belong to.
    pub fn classes(&self) -> Option<&SharedClassTable> {
        self.classes.as_ref()
    }

    /// Counters collected while this graph was evaluated.
    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    /// Number of arena nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for ValueGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueGraph")
            .field("nodes", &self.nodes.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "arena sizes are bounded far below u32::MAX"
)]
pub(crate) fn to_value_id(index: usize) -> ValueId {
    ValueId::new(index as u32)
}
