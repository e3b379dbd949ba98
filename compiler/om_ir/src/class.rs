//! Class signatures and body instructions.
//!
//! A class body is a graph region: an instruction may name the result of an
//! instruction declared after it. Operands are [`LocalRef`]s into the
//! enclosing class's parameter list or instruction list.

use rustc_hash::FxHashMap;

use crate::{Attribute, Name, OmType, SharedInterner};

/// Reference to a body-local value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocalRef {
    /// The i-th formal parameter.
    Param(u32),
    /// The result of the i-th body instruction.
    Instr(u32),
}

/// Integer binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntegerBinaryOp {
    Add,
    Mul,
    Shl,
    Shr,
}

impl IntegerBinaryOp {
    /// Operation name used in diagnostics.
    pub fn mnemonic(self) -> &'static str {
        match self {
            IntegerBinaryOp::Add => "integer.add",
            IntegerBinaryOp::Mul => "integer.mul",
            IntegerBinaryOp::Shl => "integer.shl",
            IntegerBinaryOp::Shr => "integer.shr",
        }
    }
}

/// One body instruction. Each produces exactly one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    Constant(Attribute),
    /// Instantiate `class` with `args`. Arguments are passed unevaluated.
    Object { class: Name, args: Vec<LocalRef> },
    /// Follow `path` through nested object fields.
    ObjectField { object: LocalRef, path: Vec<Name> },
    ListCreate {
        elem_type: OmType,
        elements: Vec<LocalRef>,
    },
    ListConcat { lists: Vec<LocalRef> },
    /// Erase the static type of the operand.
    AnyCast(LocalRef),
    IntegerBinary {
        op: IntegerBinaryOp,
        lhs: LocalRef,
        rhs: LocalRef,
    },
    /// Instruction from a newer producer that this evaluator does not know.
    Unrecognized { op: Name },
}

impl Instr {
    /// All operands, in order.
    pub fn operands(&self) -> Vec<LocalRef> {
        match self {
            Instr::Constant(_) | Instr::Unrecognized { .. } => Vec::new(),
            Instr::Object { args, .. } => args.clone(),
            Instr::ObjectField { object, .. } => vec![*object],
            Instr::ListCreate { elements, .. } => elements.clone(),
            Instr::ListConcat { lists } => lists.clone(),
            Instr::AnyCast(input) => vec![*input],
            Instr::IntegerBinary { lhs, rhs, .. } => vec![*lhs, *rhs],
        }
    }

    /// Short name for tracing.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instr::Constant(_) => "constant",
            Instr::Object { .. } => "object",
            Instr::ObjectField { .. } => "object.field",
            Instr::ListCreate { .. } => "list.create",
            Instr::ListConcat { .. } => "list.concat",
            Instr::AnyCast(_) => "any.cast",
            Instr::IntegerBinary { op, .. } => op.mnemonic(),
            Instr::Unrecognized { .. } => "unrecognized",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Name,
    pub ty: OmType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: OmType,
}

/// Body instructions plus the `fields` terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassBody {
    pub instrs: Vec<Instr>,
    /// One value per declared field, in declaration order.
    pub fields: Vec<LocalRef>,
}

/// Immutable class definition.
///
/// Only [`ClassBuilder::finish`](crate::ClassBuilder::finish) creates a
/// `ClassDef`, after validating the body, so every operand and terminator
/// entry of a `ClassDef` is in range.
#[derive(Clone, Debug)]
pub struct ClassDef {
    name: Name,
    params: Vec<ParamDecl>,
    fields: Vec<FieldDecl>,
    body: ClassBody,
    field_index: FxHashMap<Name, usize>,
    /// Interner that every `Name` above belongs to.
    interner: SharedInterner,
}

impl ClassDef {
    pub(crate) fn new(
        interner: SharedInterner,
        name: Name,
        params: Vec<ParamDecl>,
        fields: Vec<FieldDecl>,
        body: ClassBody,
    ) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        ClassDef {
            name,
            params,
            fields,
            body,
            field_index,
            interner,
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Formal parameters in declaration order.
    #[inline]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Declared fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    #[inline]
    pub fn body(&self) -> &ClassBody {
        &self.body
    }

    /// Position of a field in declaration order.
    #[inline]
    pub fn field_index(&self, name: Name) -> Option<usize> {
        self.field_index.get(&name).copied()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Number of body-local values: parameters plus instruction results.
    pub fn local_count(&self) -> usize {
        self.params.len() + self.body.instrs.len()
    }

    pub(crate) fn interned_by(&self, interner: &SharedInterner) -> bool {
        self.interner.ptr_eq(interner)
    }

    /// Class name resolved through the class's own interner.
    pub(crate) fn name_str(&self) -> &'static str {
        self.interner.lookup(self.name)
    }
}

impl PartialEq for ClassDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.fields == other.fields
            && self.body == other.body
    }
}

impl Eq for ClassDef {}
