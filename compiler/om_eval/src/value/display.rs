//! Rendering of value graphs.
//!
//! Objects already printed are shown as `<Class#id>`. Lists and `any`
//! wrappers that contain themselves are cut at the repeat, so cyclic graphs
//! terminate.

use std::fmt;

use rustc_hash::FxHashSet;

use super::{AnyValue, ListValue, Node, ObjectValue, Value, ValueGraph, ValueId};
use crate::ensure_sufficient_stack;

struct Renderer<'a> {
    graph: &'a ValueGraph,
    /// Objects printed so far.
    seen: FxHashSet<ValueId>,
    /// Lists and wrappers on the current path.
    active: FxHashSet<ValueId>,
}

impl Renderer<'_> {
    fn render(&mut self, f: &mut fmt::Formatter<'_>, id: ValueId) -> fmt::Result {
        let graph = self.graph;
        let id = graph.resolve(id);
        match graph.node(id) {
            Node::Attribute(attr) => write!(f, "{attr}"),
            Node::Object { class, fields } => {
                let classes = graph.classes();
                let class_name = classes.map_or("", |c| c.name_str(*class));
                if !self.seen.insert(id) {
                    return write!(f, "<{class_name}#{}>", id.raw());
                }
                let def = classes.and_then(|c| c.lookup(*class));
                write!(f, "{class_name} {{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match (classes, def.and_then(|d| d.fields().get(i))) {
                        (Some(c), Some(decl)) => write!(f, " {}: ", c.name_str(decl.name))?,
                        _ => write!(f, " #{i}: ")?,
                    }
                    ensure_sufficient_stack(|| self.render(f, *field))?;
                }
                if fields.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
            Node::List { .. } | Node::Any(_) if !self.active.insert(id) => write!(f, "..."),
            Node::List { elements, .. } => {
                write!(f, "[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    ensure_sufficient_stack(|| self.render(f, *elem))?;
                }
                self.active.remove(&id);
                write!(f, "]")
            }
            Node::Any(inner) => {
                write!(f, "any(")?;
                ensure_sufficient_stack(|| self.render(f, *inner))?;
                self.active.remove(&id);
                write!(f, ")")
            }
            Node::Binding(_) => write!(f, "<unresolved>"),
        }
    }
}

fn render_root(f: &mut fmt::Formatter<'_>, graph: &ValueGraph, id: ValueId) -> fmt::Result {
    Renderer {
        graph,
        seen: FxHashSet::default(),
        active: FxHashSet::default(),
    }
    .render(f, id)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_root(f, self.graph(), self.id())
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_root(f, self.graph(), self.id())
    }
}

impl fmt::Display for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_value(), f)
    }
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_value(), f)
    }
}
