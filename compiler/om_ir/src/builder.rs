//! Builders for class definitions and class tables.
//!
//! ```text
//! class <Name>(<param>: <type>, ...) -> (<field>: <type>, ...) {
//!   <body-instructions>
//!   fields <value>, ... ;
//! }
//! ```
//!
//! Each body method appends one instruction and returns a [`LocalRef`] to its
//! result. Forward references use [`ClassBuilder::reserve`] followed later by
//! [`ClassBuilder::define`].

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    Attribute, ClassBody, ClassDef, ClassTable, FieldDecl, Instr, IntegerBinaryOp, IrError,
    LocalRef, Name, OmType, ParamDecl, SharedInterner,
};

/// Collects class definitions into a [`ClassTable`].
pub struct ClassTableBuilder {
    interner: SharedInterner,
    classes: FxHashMap<Name, ClassDef>,
    order: Vec<Name>,
}

impl ClassTableBuilder {
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// Use an existing interner, e.g. one shared with another table.
    pub fn with_interner(interner: SharedInterner) -> Self {
        ClassTableBuilder {
            interner,
            classes: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Start a new class definition.
    pub fn class(&self, name: &str) -> ClassBuilder {
        ClassBuilder::new(self.interner.clone(), self.interner.intern(name))
    }

    /// Add a finished class.
    ///
    /// Class names must be unique, and the class must have been started with
    /// [`class`](Self::class) on a builder sharing this builder's interner.
    pub fn define(&mut self, class: ClassDef) -> Result<(), IrError> {
        if !class.interned_by(&self.interner) {
            return Err(IrError::ForeignInterner {
                class: class.name_str().to_owned(),
            });
        }
        if self.classes.contains_key(&class.name()) {
            return Err(IrError::DuplicateClass {
                class: self.interner.lookup(class.name()).to_owned(),
            });
        }
        self.order.push(class.name());
        self.classes.insert(class.name(), class);
        Ok(())
    }

    /// Finish the table. No classes can be added afterwards.
    pub fn build(self) -> ClassTable {
        ClassTable::new(self.interner, self.classes, self.order)
    }
}

impl Default for ClassTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one [`ClassDef`].
pub struct ClassBuilder {
    interner: SharedInterner,
    name: Name,
    params: Vec<ParamDecl>,
    fields: Vec<FieldDecl>,
    /// `None` marks a reserved slot awaiting `define`.
    instrs: Vec<Option<Instr>>,
    terminator: Option<Vec<LocalRef>>,
    /// Misuse detected before `finish` (e.g. defining a parameter slot).
    deferred: Option<IrError>,
}

impl ClassBuilder {
    fn new(interner: SharedInterner, name: Name) -> Self {
        ClassBuilder {
            interner,
            name,
            params: Vec::new(),
            fields: Vec::new(),
            instrs: Vec::new(),
            terminator: None,
            deferred: None,
        }
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name(&self) -> Name {
        self.name
    }

    /// Declare the next formal parameter and return a reference to it.
    pub fn param(&mut self, name: &str, ty: OmType) -> LocalRef {
        let index = to_u32(self.params.len());
        self.params.push(ParamDecl {
            name: self.interner.intern(name),
            ty,
        });
        LocalRef::Param(index)
    }

    /// Declare the next field.
    pub fn field(&mut self, name: &str, ty: OmType) -> &mut Self {
        self.fields.push(FieldDecl {
            name: self.interner.intern(name),
            ty,
        });
        self
    }

    /// Append an arbitrary instruction.
    pub fn instr(&mut self, instr: Instr) -> LocalRef {
        let index = to_u32(self.instrs.len());
        self.instrs.push(Some(instr));
        LocalRef::Instr(index)
    }

    pub fn constant(&mut self, attr: impl Into<Attribute>) -> LocalRef {
        self.instr(Instr::Constant(attr.into()))
    }

    pub fn object(&mut self, class: &str, args: impl IntoIterator<Item = LocalRef>) -> LocalRef {
        let class = self.interner.intern(class);
        self.instr(Instr::Object {
            class,
            args: args.into_iter().collect(),
        })
    }

    /// Field projection along `path`.
    pub fn project(&mut self, object: LocalRef, path: &[&str]) -> LocalRef {
        let path = path.iter().map(|s| self.interner.intern(s)).collect();
        self.instr(Instr::ObjectField { object, path })
    }

    pub fn list_create(
        &mut self,
        elem_type: OmType,
        elements: impl IntoIterator<Item = LocalRef>,
    ) -> LocalRef {
        self.instr(Instr::ListCreate {
            elem_type,
            elements: elements.into_iter().collect(),
        })
    }

    pub fn list_concat(&mut self, lists: impl IntoIterator<Item = LocalRef>) -> LocalRef {
        self.instr(Instr::ListConcat {
            lists: lists.into_iter().collect(),
        })
    }

    pub fn any_cast(&mut self, input: LocalRef) -> LocalRef {
        self.instr(Instr::AnyCast(input))
    }

    pub fn integer_binary(&mut self, op: IntegerBinaryOp, lhs: LocalRef, rhs: LocalRef) -> LocalRef {
        self.instr(Instr::IntegerBinary { op, lhs, rhs })
    }

    /// Instruction the evaluator does not know; evaluation reports it.
    pub fn unrecognized(&mut self, op: &str) -> LocalRef {
        let op = self.interner.intern(op);
        self.instr(Instr::Unrecognized { op })
    }

    /// Reserve an instruction slot to be defined later, so earlier
    /// instructions can refer to it.
    pub fn reserve(&mut self) -> LocalRef {
        let index = to_u32(self.instrs.len());
        self.instrs.push(None);
        LocalRef::Instr(index)
    }

    /// Fill a slot obtained from [`reserve`](Self::reserve).
    ///
    /// Misuse (a parameter, an unknown slot, or a slot defined twice) is
    /// reported by [`finish`](Self::finish).
    pub fn define(&mut self, slot: LocalRef, instr: Instr) {
        if let LocalRef::Instr(index) = slot {
            if let Some(entry) = self.instrs.get_mut(index as usize) {
                if entry.is_none() {
                    *entry = Some(instr);
                    return;
                }
            }
        }
        let err = IrError::LocalOutOfRange {
            class: self.class_name(),
            index: self.instrs.len(),
            operand: describe(slot),
        };
        self.defer(err);
    }

    /// Set the `fields` terminator: one value per declared field.
    pub fn fields(&mut self, values: impl IntoIterator<Item = LocalRef>) {
        self.terminator = Some(values.into_iter().collect());
    }

    /// Validate the body and produce the class definition.
    pub fn finish(self) -> Result<ClassDef, IrError> {
        if let Some(err) = self.deferred {
            return Err(err);
        }
        let class = self.interner.lookup(self.name).to_owned();

        let mut seen = FxHashSet::default();
        for param in &self.params {
            if !seen.insert(param.name) {
                return Err(IrError::DuplicateParam {
                    class,
                    param: self.interner.lookup(param.name).to_owned(),
                });
            }
        }
        seen.clear();
        for field in &self.fields {
            if !seen.insert(field.name) {
                return Err(IrError::DuplicateField {
                    class,
                    field: self.interner.lookup(field.name).to_owned(),
                });
            }
        }

        let param_count = self.params.len();
        let instr_count = self.instrs.len();
        let in_range = |r: &LocalRef| match *r {
            LocalRef::Param(i) => (i as usize) < param_count,
            LocalRef::Instr(i) => (i as usize) < instr_count,
        };

        let mut instrs = Vec::with_capacity(instr_count);
        for (index, slot) in self.instrs.into_iter().enumerate() {
            let Some(instr) = slot else {
                return Err(IrError::UndefinedLocal {
                    class,
                    index: to_u32(index),
                });
            };
            if let Some(bad) = instr.operands().iter().find(|r| !in_range(r)) {
                return Err(IrError::LocalOutOfRange {
                    class,
                    index,
                    operand: describe(*bad),
                });
            }
            if matches!(&instr, Instr::ListConcat { lists } if lists.is_empty()) {
                return Err(IrError::EmptyConcat { class, index });
            }
            instrs.push(instr);
        }

        let Some(terminator) = self.terminator else {
            return Err(IrError::MissingFieldsTerminator { class });
        };
        if terminator.len() != self.fields.len() {
            return Err(IrError::FieldCountMismatch {
                class,
                declared: self.fields.len(),
                yielded: terminator.len(),
            });
        }
        if let Some(bad) = terminator.iter().find(|r| !in_range(r)) {
            return Err(IrError::LocalOutOfRange {
                class,
                index: instr_count,
                operand: describe(*bad),
            });
        }

        Ok(ClassDef::new(
            self.interner,
            self.name,
            self.params,
            self.fields,
            ClassBody {
                instrs,
                fields: terminator,
            },
        ))
    }

    fn class_name(&self) -> String {
        self.interner.lookup(self.name).to_owned()
    }

    fn defer(&mut self, err: IrError) {
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }
}

fn describe(r: LocalRef) -> String {
    match r {
        LocalRef::Param(i) => format!("parameter {i}"),
        LocalRef::Instr(i) => format!("instruction {i}"),
    }
}

/// Body positions are bounded far below `u32::MAX` by memory.
#[expect(
    clippy::cast_possible_truncation,
    reason = "class bodies never approach u32::MAX entries"
)]
fn to_u32(index: usize) -> u32 {
    index as u32
}
