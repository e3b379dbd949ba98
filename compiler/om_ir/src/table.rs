//! Read-only class table.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{ClassDef, Name, SharedInterner};

/// Name-keyed lookup of class definitions.
///
/// Built once by [`ClassTableBuilder`](crate::ClassTableBuilder); there is no
/// way to add or remove classes afterwards. Owns the interner that every
/// [`Name`] in its definitions refers to.
pub struct ClassTable {
    interner: SharedInterner,
    classes: FxHashMap<Name, ClassDef>,
    /// Definition order, for deterministic iteration.
    order: Vec<Name>,
}

impl ClassTable {
    pub(crate) fn new(
        interner: SharedInterner,
        classes: FxHashMap<Name, ClassDef>,
        order: Vec<Name>,
    ) -> Self {
        ClassTable {
            interner,
            classes,
            order,
        }
    }

    /// Look up a class by interned name.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<&ClassDef> {
        self.classes.get(&name)
    }

    /// Look up a class by string name.
    ///
    /// Does not intern `name`; unknown strings simply miss.
    pub fn lookup_str(&self, name: &str) -> Option<&ClassDef> {
        self.interner.get(name).and_then(|n| self.lookup(n))
    }

    /// The interner for every name in this table.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Resolve a name to its string.
    #[inline]
    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Classes in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDef> + '_ {
        self.order.iter().filter_map(|n| self.classes.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.order.iter().map(|n| self.interner.lookup(*n)))
            .finish()
    }
}

/// Thread-safe shared class table.
///
/// Independent evaluations share only this handle.
pub struct SharedClassTable(Arc<ClassTable>);

impl SharedClassTable {
    pub fn new(table: ClassTable) -> Self {
        SharedClassTable(Arc::new(table))
    }

    /// Check whether two handles share the same table.
    pub fn ptr_eq(&self, other: &SharedClassTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for SharedClassTable {
    fn clone(&self) -> Self {
        SharedClassTable(Arc::clone(&self.0))
    }
}

impl std::ops::Deref for SharedClassTable {
    type Target = ClassTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedClassTable({:?})", &*self.0)
    }
}

impl From<ClassTable> for SharedClassTable {
    fn from(table: ClassTable) -> Self {
        SharedClassTable::new(table)
    }
}
