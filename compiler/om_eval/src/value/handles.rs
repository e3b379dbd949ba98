//! Shared handles into a value graph.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use om_ir::{Attribute, ClassDef, IntegerAttr, Name, OmType};

use super::{to_value_id, Node, ValueGraph, ValueId};
use crate::errors::{type_mismatch, unknown_field, EvalResult};

/// Any evaluated value.
#[derive(Clone)]
pub struct Value {
    graph: Arc<ValueGraph>,
    id: ValueId,
}

impl Value {
    pub(crate) fn from_graph(graph: Arc<ValueGraph>, id: ValueId) -> Self {
        let id = graph.resolve(id);
        Value { graph, id }
    }

    /// Standalone literal value, e.g. a top-level parameter.
    pub fn attribute(attr: Attribute) -> Value {
        let graph = ValueGraph::new(vec![Node::Attribute(attr)], None, Default::default());
        Value::from_graph(Arc::new(graph), ValueId::new(0))
    }

    /// Standalone list of literals with the given element type.
    pub fn attribute_list(elem_type: OmType, attrs: impl IntoIterator<Item = Attribute>) -> Value {
        let mut nodes: Vec<Node> = attrs.into_iter().map(Node::Attribute).collect();
        let elements = (0..nodes.len()).map(to_value_id).collect();
        let id = to_value_id(nodes.len());
        nodes.push(Node::List {
            elem_type,
            elements,
        });
        Value::from_graph(Arc::new(ValueGraph::new(nodes, None, Default::default())), id)
    }

    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[inline]
    pub fn graph(&self) -> &Arc<ValueGraph> {
        &self.graph
    }

    #[inline]
    pub(crate) fn node(&self) -> &Node {
        self.graph.node(self.id)
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.node(), Node::Attribute(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.node(), Node::Object { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.node(), Node::List { .. })
    }

    pub fn is_any(&self) -> bool {
        matches!(self.node(), Node::Any(_))
    }

    /// Id of the payload after unwrapping any number of `any` wrappers.
    fn narrowed_id(&self) -> ValueId {
        let mut id = self.id;
        // A wrapper can wrap itself; give up once every node was visited.
        for _ in 0..=self.graph.len() {
            let Node::Any(inner) = self.graph.node(id) else {
                break;
            };
            id = self.graph.resolve(*inner);
        }
        id
    }

    /// The literal, looking through `any` wrappers.
    pub fn as_attribute(&self) -> EvalResult<&Attribute> {
        match self.graph.node(self.narrowed_id()) {
            Node::Attribute(attr) => Ok(attr),
            other => Err(type_mismatch("attribute", other.kind_name())),
        }
    }

    /// The integer literal, looking through `any` wrappers.
    pub fn as_integer(&self) -> EvalResult<&IntegerAttr> {
        match self.graph.node(self.narrowed_id()) {
            Node::Attribute(Attribute::Integer(int)) => Ok(int),
            other => Err(type_mismatch("integer", other.kind_name())),
        }
    }

    /// The object, looking through `any` wrappers.
    pub fn as_object(&self) -> EvalResult<ObjectValue> {
        let id = self.narrowed_id();
        match self.graph.node(id) {
            Node::Object { .. } => Ok(ObjectValue {
                graph: Arc::clone(&self.graph),
                id,
            }),
            other => Err(type_mismatch("object", other.kind_name())),
        }
    }

    /// The list, looking through `any` wrappers.
    pub fn as_list(&self) -> EvalResult<ListValue> {
        let id = self.narrowed_id();
        match self.graph.node(id) {
            Node::List { .. } => Ok(ListValue {
                graph: Arc::clone(&self.graph),
                id,
            }),
            other => Err(type_mismatch("list", other.kind_name())),
        }
    }

    /// The `any` wrapper itself; no narrowing.
    pub fn as_any(&self) -> EvalResult<AnyValue> {
        match self.node() {
            Node::Any(_) => Ok(AnyValue {
                graph: Arc::clone(&self.graph),
                id: self.id,
            }),
            other => Err(type_mismatch("any", other.kind_name())),
        }
    }

    /// Runtime type. `any` wrappers report [`OmType::Any`].
    pub fn type_of(&self) -> OmType {
        match self.node() {
            Node::Attribute(attr) => attr.ty(),
            Node::Object { class, .. } => OmType::Class(*class),
            Node::List { elem_type, .. } => OmType::list(elem_type.clone()),
            Node::Any(_) | Node::Binding(_) => OmType::Any,
        }
    }

    /// Check whether both handles name the same node of the same graph.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph) && self.id == other.id
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.graph).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

/// An instance of a class.
#[derive(Clone)]
pub struct ObjectValue {
    graph: Arc<ValueGraph>,
    id: ValueId,
}

impl ObjectValue {
    pub(crate) fn from_graph(graph: Arc<ValueGraph>, id: ValueId) -> Self {
        let id = graph.resolve(id);
        ObjectValue { graph, id }
    }

    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[inline]
    pub fn graph(&self) -> &Arc<ValueGraph> {
        &self.graph
    }

    fn parts(&self) -> (Name, &[ValueId]) {
        match self.graph.node(self.id) {
            Node::Object { class, fields } => (*class, fields),
            _ => (Name::EMPTY, &[]),
        }
    }

    /// Interned class name.
    pub fn class(&self) -> Name {
        self.parts().0
    }

    /// Class name as a string.
    pub fn class_name(&self) -> &'static str {
        self.graph
            .classes()
            .map_or("", |classes| classes.name_str(self.class()))
    }

    pub fn class_def(&self) -> Option<&ClassDef> {
        self.graph.classes()?.lookup(self.class())
    }

    /// Field value by interned name.
    pub fn get_field(&self, name: Name) -> EvalResult<Value> {
        let (_, fields) = self.parts();
        self.class_def()
            .and_then(|def| def.field_index(name))
            .and_then(|index| fields.get(index))
            .map(|id| Value::from_graph(Arc::clone(&self.graph), *id))
            .ok_or_else(|| {
                let field = self
                    .graph
                    .classes()
                    .map_or("", |classes| classes.name_str(name));
                unknown_field(field)
            })
    }

    /// Field value by string name.
    pub fn get_field_by_str(&self, name: &str) -> EvalResult<Value> {
        match self.graph.classes().and_then(|c| c.interner().get(name)) {
            Some(interned) => self.get_field(interned),
            None => Err(unknown_field(name)),
        }
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<Name> {
        self.class_def()
            .map(|def| def.field_names().collect())
            .unwrap_or_default()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (Name, Value)> + '_ {
        let (_, ids) = self.parts();
        self.field_names()
            .into_iter()
            .zip(ids.iter())
            .map(|(name, id)| (name, Value::from_graph(Arc::clone(&self.graph), *id)))
    }

    pub fn as_value(&self) -> Value {
        Value {
            graph: Arc::clone(&self.graph),
            id: self.id,
        }
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value {
            graph: obj.graph,
            id: obj.id,
        }
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph) && self.id == other.id
    }
}

impl Eq for ObjectValue {}

impl PartialEq<Value> for ObjectValue {
    fn eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph) && self.id == other.id
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectValue({self})")
    }
}

/// Ordered, fixed-length list of shared element values.
#[derive(Clone)]
pub struct ListValue {
    graph: Arc<ValueGraph>,
    id: ValueId,
}

impl ListValue {
    fn parts(&self) -> (Option<&OmType>, &[ValueId]) {
        match self.graph.node(self.id) {
            Node::List {
                elem_type,
                elements,
            } => (Some(elem_type), elements),
            _ => (None, &[]),
        }
    }

    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// Declared element type.
    pub fn elem_type(&self) -> &OmType {
        self.parts().0.unwrap_or(&OmType::Any)
    }

    pub fn len(&self) -> usize {
        self.parts().1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts().1.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.parts()
            .1
            .get(index)
            .map(|id| Value::from_graph(Arc::clone(&self.graph), *id))
    }

    /// Element handles in order. Payloads are shared, not copied.
    pub fn elements(&self) -> impl Iterator<Item = Value> + '_ {
        self.parts()
            .1
            .iter()
            .map(|id| Value::from_graph(Arc::clone(&self.graph), *id))
    }

    pub fn as_value(&self) -> Value {
        Value {
            graph: Arc::clone(&self.graph),
            id: self.id,
        }
    }
}

impl From<ListValue> for Value {
    fn from(list: ListValue) -> Self {
        Value {
            graph: list.graph,
            id: list.id,
        }
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph) && self.id == other.id
    }
}

impl Eq for ListValue {}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListValue({self})")
    }
}

/// A value whose static type was erased by `any.cast`.
#[derive(Clone)]
pub struct AnyValue {
    graph: Arc<ValueGraph>,
    id: ValueId,
}

impl AnyValue {
    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// The wrapped value.
    pub fn inner(&self) -> Value {
        match self.graph.node(self.id) {
            Node::Any(inner) => Value::from_graph(Arc::clone(&self.graph), *inner),
            _ => self.as_value(),
        }
    }

    pub fn as_value(&self) -> Value {
        Value {
            graph: Arc::clone(&self.graph),
            id: self.id,
        }
    }
}

impl From<AnyValue> for Value {
    fn from(any: AnyValue) -> Self {
        Value {
            graph: any.graph,
            id: any.id,
        }
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph) && self.id == other.id
    }
}

impl Eq for AnyValue {}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue({})", self.as_value())
    }
}
