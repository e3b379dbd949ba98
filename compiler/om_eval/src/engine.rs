//! One evaluation session: everything a single top-level `instantiate` call
//! creates.
//!
//! Every instantiated class gets a frame holding the actual parameter ids and
//! one binding per body instruction. Bindings start
//! `Unstarted` and are evaluated on first demand; an object's node and its
//! field slots exist before any field value is computed, so objects can refer
//! to each other while a value that needs itself hits an `InProgress` binding.
//!
//! After the root object is created, `drive` forces every binding of every
//! frame in creation order, so each instruction runs exactly once even if
//! nothing demands it.

use std::sync::Arc;

use om_ir::{
    Attribute, ClassDef, ClassTable, Instr, IntegerAttr, LocalRef, Name, OmType,
    SharedClassTable,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::diagnostics::{Demand, DemandStack, EvalStats};
use crate::errors::{
    dataflow_cycle, instance_limit_exceeded, integer_operation_failed, null_parameter,
    parameter_count_mismatch, parameter_type_mismatch, type_mismatch, unknown_class,
    unknown_field, unknown_instruction, EvalError, EvalResult,
};
use crate::operators::evaluate_integer_binary;
use crate::value::{to_value_id, BindingState, Node, ObjectValue, Value, ValueGraph, ValueId};
use crate::{ensure_sufficient_stack, lists, EvalConfig};

/// Demand-chain entries attached to a dataflow cycle error.
const CYCLE_NOTE_FRAMES: usize = 4;

struct Frame<'a> {
    class: &'a ClassDef,
    params: Vec<ValueId>,
    /// One binding per body instruction.
    bindings: Vec<ValueId>,
}

impl Frame<'_> {
    /// `ClassDef` operands are validated at build time, so both indexes are
    /// in range.
    #[inline]
    fn local(&self, r: LocalRef) -> ValueId {
        match r {
            LocalRef::Param(i) => self.params[i as usize],
            LocalRef::Instr(i) => self.bindings[i as usize],
        }
    }
}

/// One argument of a memo key.
///
/// Keys depend only on the argument's local id, never on how far evaluation
/// has progressed. Literal parameters and `constant` bindings compare by
/// value; every other local compares by identity.
#[derive(Clone, PartialEq, Eq, Hash)]
enum MemoArg {
    Literal(Attribute),
    Ref(ValueId),
}

type MemoKey = (Name, SmallVec<[MemoArg; 4]>);

pub(crate) struct Session<'a> {
    classes: &'a SharedClassTable,
    config: &'a EvalConfig,
    nodes: Vec<Node>,
    frames: Vec<Frame<'a>>,
    memo: FxHashMap<MemoKey, ValueId>,
    /// Bindings of `constant` instructions and their literal.
    constants: FxHashMap<ValueId, &'a Attribute>,
    /// Nodes copied from parameter graphs, keyed by (source graph, source id).
    imports: FxHashMap<(usize, ValueId), ValueId>,
    demands: DemandStack,
    stats: EvalStats,
}

impl<'a> Session<'a> {
    pub(crate) fn new(classes: &'a SharedClassTable, config: &'a EvalConfig) -> Self {
        Session {
            classes,
            config,
            nodes: Vec::new(),
            frames: Vec::new(),
            memo: FxHashMap::default(),
            constants: FxHashMap::default(),
            imports: FxHashMap::default(),
            demands: DemandStack::new(config.max_depth),
            stats: EvalStats::default(),
        }
    }

    #[inline]
    fn table(&self) -> &'a ClassTable {
        self.classes
    }

    fn alloc(&mut self, node: Node) -> ValueId {
        let id = to_value_id(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Validate the parameters, instantiate `class_name`, run every body and
    /// return the resolved root object.
    pub(crate) fn instantiate(
        mut self,
        class_name: Name,
        actual_params: &[Option<Value>],
    ) -> EvalResult<ObjectValue> {
        let table = self.table();
        let class = table
            .lookup(class_name)
            .ok_or_else(|| unknown_class(table.name_str(class_name)))?;

        if actual_params.len() != class.params().len() {
            return Err(parameter_count_mismatch(
                actual_params.len(),
                class.params().len(),
            ));
        }

        let mut actuals = Vec::with_capacity(actual_params.len());
        for (param, actual) in class.params().iter().zip(actual_params) {
            match actual {
                Some(value) => actuals.push(value),
                None => return Err(null_parameter(table.name_str(param.name))),
            }
        }

        let mut args = Vec::with_capacity(actuals.len());
        for (param, value) in class.params().iter().zip(actuals) {
            let id = self.import(value)?;
            let found = self.runtime_type(id);
            if !param.ty.accepts(&found) {
                let interner = table.interner();
                return Err(parameter_type_mismatch(
                    table.name_str(param.name),
                    &param.ty.display(interner).to_string(),
                    &found.display(interner).to_string(),
                ));
            }
            args.push(id);
        }

        let root = self.create_object(class_name, args)?;
        self.drive()?;
        self.finish(root)
    }

    /// Allocate an instance of `class_name`, or return the memoized one.
    ///
    /// Arguments are not forced. The object's field slots are the frame's
    /// terminator locals, so the object is complete before any of its
    /// instructions run.
    fn create_object(&mut self, class_name: Name, args: Vec<ValueId>) -> EvalResult<ValueId> {
        let table = self.table();
        let class = table
            .lookup(class_name)
            .ok_or_else(|| unknown_class(table.name_str(class_name)))?;
        if args.len() != class.params().len() {
            return Err(parameter_count_mismatch(args.len(), class.params().len()));
        }

        let key: MemoKey = (
            class_name,
            args.iter().map(|arg| self.memo_arg(*arg)).collect(),
        );
        if let Some(&object) = self.memo.get(&key) {
            self.stats.count_memo_hit();
            return Ok(object);
        }

        if let Some(limit) = self.config.max_instances {
            if self.frames.len() >= limit {
                return Err(instance_limit_exceeded(limit));
            }
        }

        let frame_id = to_frame_id(self.frames.len());
        let instrs = &class.body().instrs;
        let mut bindings = Vec::with_capacity(instrs.len());
        for (index, instr) in instrs.iter().enumerate() {
            let binding = self.alloc(Node::Binding(BindingState::Unstarted {
                frame: frame_id,
                instr: to_frame_id(index),
            }));
            if let Instr::Constant(attr) = instr {
                self.constants.insert(binding, attr);
            }
            bindings.push(binding);
        }
        let frame = Frame {
            class,
            params: args,
            bindings,
        };
        let fields = class
            .body()
            .fields
            .iter()
            .map(|r| frame.local(*r))
            .collect();
        self.frames.push(frame);

        let object = self.alloc(Node::Object {
            class: class_name,
            fields,
        });
        self.memo.insert(key, object);
        self.stats.count_object();
        tracing::trace!(
            class = table.name_str(class_name),
            object = object.raw(),
            "created object"
        );
        Ok(object)
    }

    /// Memo key entry for the local `id`.
    fn memo_arg(&self, id: ValueId) -> MemoArg {
        if let Some(attr) = self.constants.get(&id) {
            return MemoArg::Literal((*attr).clone());
        }
        match &self.nodes[id.index()] {
            Node::Attribute(attr) => MemoArg::Literal(attr.clone()),
            _ => MemoArg::Ref(id),
        }
    }

    /// Force every binding of every frame, including frames created along
    /// the way.
    fn drive(&mut self) -> EvalResult<()> {
        for frame in 0usize.. {
            let Some(count) = self.frames.get(frame).map(|f| f.bindings.len()) else {
                break;
            };
            for instr in 0..count {
                let binding = self.frames[frame].bindings[instr];
                self.force(binding)?;
            }
        }
        Ok(())
    }

    /// Follow resolved bindings without evaluating anything.
    fn peek(&self, mut id: ValueId) -> ValueId {
        while let Node::Binding(BindingState::Resolved(next)) = self.nodes[id.index()] {
            id = next;
        }
        id
    }

    /// Evaluate `id` if needed and return the id of the value node it stands for.
    fn force(&mut self, mut id: ValueId) -> EvalResult<ValueId> {
        loop {
            let Node::Binding(state) = self.nodes[id.index()] else {
                return Ok(id);
            };
            match state {
                BindingState::Resolved(next) => id = next,
                BindingState::InProgress { frame } => {
                    let class = self.frames[frame as usize].class;
                    let mut err = dataflow_cycle(self.table().name_str(class.name()));
                    for note in self
                        .demands
                        .describe(self.table())
                        .into_iter()
                        .take(CYCLE_NOTE_FRAMES)
                    {
                        err = err.with_note(note);
                    }
                    return Err(err);
                }
                BindingState::Failed => {
                    return Err(EvalError::new(
                        "value depends on a computation that already failed",
                    ));
                }
                BindingState::Unstarted { frame, instr } => {
                    let class = self.frames[frame as usize].class;
                    self.nodes[id.index()] = Node::Binding(BindingState::InProgress { frame });
                    if let Err(err) = self.demands.push(Demand {
                        class: class.name(),
                        instr,
                    }) {
                        self.nodes[id.index()] = Node::Binding(BindingState::Failed);
                        return Err(err);
                    }
                    let result = ensure_sufficient_stack(|| {
                        self.eval_instr(frame as usize, instr as usize)
                    });
                    self.demands.pop();
                    match result {
                        Ok(value) => {
                            self.nodes[id.index()] = Node::Binding(BindingState::Resolved(value));
                            id = value;
                        }
                        Err(err) => {
                            self.nodes[id.index()] = Node::Binding(BindingState::Failed);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Force `id`, then unwrap `any` wrappers, forcing each payload.
    fn force_narrowed(&mut self, id: ValueId) -> EvalResult<ValueId> {
        let mut id = self.force(id)?;
        // A wrapper can end up wrapping itself; stop once every node was visited.
        for steps in 0usize.. {
            let Node::Any(inner) = self.nodes[id.index()] else {
                break;
            };
            if steps > self.nodes.len() {
                break;
            }
            id = self.force(inner)?;
        }
        Ok(id)
    }

    fn eval_instr(&mut self, frame: usize, index: usize) -> EvalResult<ValueId> {
        let class = self.frames[frame].class;
        let instr = &class.body().instrs[index];
        self.stats.count_instruction();
        tracing::trace!(
            class = self.table().name_str(class.name()),
            index,
            op = instr.kind_name(),
            "evaluating instruction"
        );

        match instr {
            Instr::Constant(attr) => Ok(self.alloc(Node::Attribute(attr.clone()))),
            Instr::Object {
                class: target,
                args,
            } => {
                let args = args.iter().map(|a| self.frames[frame].local(*a)).collect();
                self.create_object(*target, args)
            }
            Instr::ObjectField { object, path } => {
                let mut current = self.frames[frame].local(*object);
                for field in path {
                    let object = self.force_narrowed(current)?;
                    current = self.field_slot(object, *field)?;
                }
                self.force(current)
            }
            Instr::ListCreate {
                elem_type,
                elements,
            } => {
                let elements = elements
                    .iter()
                    .map(|e| self.frames[frame].local(*e))
                    .collect();
                Ok(self.alloc(Node::List {
                    elem_type: elem_type.clone(),
                    elements,
                }))
            }
            Instr::ListConcat { lists } => {
                let mut forced = SmallVec::<[ValueId; 4]>::with_capacity(lists.len());
                for list in lists {
                    let local = self.frames[frame].local(*list);
                    forced.push(self.force_narrowed(local)?);
                }
                let parts = forced
                    .iter()
                    .map(|id| self.list_parts(*id))
                    .collect::<EvalResult<Vec<_>>>()?;
                let (elem_type, elements) = lists::concat(parts)?;
                Ok(self.alloc(Node::List {
                    elem_type,
                    elements,
                }))
            }
            Instr::AnyCast(input) => {
                let inner = self.frames[frame].local(*input);
                Ok(self.alloc(Node::Any(inner)))
            }
            Instr::IntegerBinary { op, lhs, rhs } => {
                let lhs = self.frames[frame].local(*lhs);
                let lhs = self.force_narrowed(lhs)?;
                let rhs = self.frames[frame].local(*rhs);
                let rhs = self.force_narrowed(rhs)?;
                let result = evaluate_integer_binary(*op, self.integer(lhs)?, self.integer(rhs)?)
                    .map_err(integer_operation_failed)?;
                Ok(self.alloc(Node::Attribute(Attribute::Integer(result))))
            }
            Instr::Unrecognized { op } => Err(unknown_instruction(self.table().name_str(*op))),
        }
    }

    /// Slot holding `field` of the object node `object`.
    fn field_slot(&self, object: ValueId, field: Name) -> EvalResult<ValueId> {
        match &self.nodes[object.index()] {
            Node::Object { class, fields } => {
                let table = self.table();
                table
                    .lookup(*class)
                    .and_then(|def| def.field_index(field))
                    .and_then(|index| fields.get(index).copied())
                    .ok_or_else(|| unknown_field(table.name_str(field)))
            }
            other => Err(type_mismatch("object", other.kind_name())),
        }
    }

    fn list_parts(&self, id: ValueId) -> EvalResult<(&OmType, &[ValueId])> {
        match &self.nodes[id.index()] {
            Node::List {
                elem_type,
                elements,
            } => Ok((elem_type, elements)),
            other => Err(type_mismatch("list", other.kind_name())),
        }
    }

    fn integer(&self, id: ValueId) -> EvalResult<&IntegerAttr> {
        match &self.nodes[id.index()] {
            Node::Attribute(Attribute::Integer(int)) => Ok(int),
            other => Err(type_mismatch("integer", other.kind_name())),
        }
    }

    /// Runtime type for parameter checks; `any` wrappers report their payload.
    fn runtime_type(&self, id: ValueId) -> OmType {
        let mut id = self.peek(id);
        for steps in 0usize.. {
            let Node::Any(inner) = self.nodes[id.index()] else {
                break;
            };
            if steps > self.nodes.len() {
                return OmType::Any;
            }
            id = self.peek(inner);
        }
        match &self.nodes[id.index()] {
            Node::Attribute(attr) => attr.ty(),
            Node::Object { class, .. } => OmType::Class(*class),
            Node::List { elem_type, .. } => OmType::list(elem_type.clone()),
            Node::Any(_) | Node::Binding(_) => OmType::Any,
        }
    }

    /// Copy the graph reachable from `value` into this session.
    ///
    /// Sharing and cycles are preserved: each source node is copied once,
    /// and placeholders are allocated before any node is filled in.
    fn import(&mut self, value: &Value) -> EvalResult<ValueId> {
        let graph = value.graph();
        let source = Arc::as_ptr(graph) as usize;
        let root = graph.resolve(value.id());
        if let Some(&mapped) = self.imports.get(&(source, root)) {
            return Ok(mapped);
        }

        let mut order = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let id = graph.resolve(id);
            if self.imports.contains_key(&(source, id)) {
                continue;
            }
            let placeholder = self.alloc(Node::Binding(BindingState::Failed));
            self.imports.insert((source, id), placeholder);
            order.push(id);
            pending.extend(graph.node(id).children());
        }

        for id in order {
            let mapped = |session: &Self, child: ValueId| {
                session.imports[&(source, graph.resolve(child))]
            };
            let node = match graph.node(id) {
                Node::Attribute(attr) => Node::Attribute(attr.clone()),
                Node::Object { class, fields } => Node::Object {
                    class: self.translate_class(graph, *class)?,
                    fields: fields.iter().map(|f| mapped(self, *f)).collect(),
                },
                Node::List {
                    elem_type,
                    elements,
                } => Node::List {
                    elem_type: self.translate_type(graph, elem_type),
                    elements: elements.iter().map(|e| mapped(self, *e)).collect(),
                },
                Node::Any(inner) => Node::Any(mapped(self, *inner)),
                Node::Binding(_) => {
                    return Err(EvalError::new("parameter value is not fully evaluated"));
                }
            };
            let target = self.imports[&(source, id)];
            self.nodes[target.index()] = node;
        }
        Ok(self.imports[&(source, root)])
    }

    /// Map a class name from `graph`'s table into this session's table.
    fn translate_class(&self, graph: &ValueGraph, class: Name) -> EvalResult<Name> {
        let table = self.table();
        match graph.classes() {
            Some(source) if source.ptr_eq(self.classes) => Ok(class),
            Some(source) => {
                let name = source.name_str(class);
                table
                    .interner()
                    .get(name)
                    .filter(|n| table.lookup(*n).is_some())
                    .ok_or_else(|| unknown_class(name))
            }
            None => Err(unknown_class("")),
        }
    }

    fn translate_type(&self, graph: &ValueGraph, ty: &OmType) -> OmType {
        match ty {
            OmType::Class(name) => match graph.classes() {
                Some(source) if !source.ptr_eq(self.classes) => {
                    OmType::Class(self.table().interner().intern(source.name_str(*name)))
                }
                _ => ty.clone(),
            },
            OmType::List(elem) => OmType::list(self.translate_type(graph, elem)),
            _ => ty.clone(),
        }
    }

    /// Rewrite every reference to point at resolved value nodes and seal the
    /// graph.
    fn finish(self, root: ValueId) -> EvalResult<ObjectValue> {
        let Session {
            classes,
            mut nodes,
            stats,
            ..
        } = self;

        let mut resolved = Vec::with_capacity(nodes.len());
        for index in 0..nodes.len() {
            let mut id = to_value_id(index);
            while let Node::Binding(state) = nodes[id.index()] {
                match state {
                    BindingState::Resolved(next) => id = next,
                    _ => {
                        return Err(EvalError::new(
                            "failed to finalize evaluation: a value was left unresolved",
                        ));
                    }
                }
            }
            resolved.push(id);
        }

        for node in &mut nodes {
            match node {
                Node::Object { fields, .. } => {
                    for field in fields {
                        *field = resolved[field.index()];
                    }
                }
                Node::List { elements, .. } => {
                    for elem in elements {
                        *elem = resolved[elem.index()];
                    }
                }
                Node::Any(inner) => *inner = resolved[inner.index()],
                Node::Attribute(_) | Node::Binding(_) => {}
            }
        }

        tracing::debug!(
            instructions = stats.instructions_evaluated,
            objects = stats.objects_created,
            memo_hits = stats.memo_hits,
            "evaluation finished"
        );
        let graph = Arc::new(ValueGraph::new(nodes, Some(classes.clone()), stats));
        Ok(ObjectValue::from_graph(graph, resolved[root.index()]))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "frame and instruction counts are bounded by max_instances and class body sizes"
)]
fn to_frame_id(index: usize) -> u32 {
    index as u32
}
