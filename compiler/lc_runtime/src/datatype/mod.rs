//! Datatype registry.
//!
//! Maps each constructor to its datatype, its field names and its slot in
//! the datatype's elimination layout. Constructors of a datatype are kept
//! in lexicographic order of their names; a constructor's slot is its
//! position in that order, so a compiled match has one entry per slot.

use lc_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;

use crate::errors::{capacity_exceeded, duplicate_constructor, EvalResult};

/// Index of a registered datatype.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataTypeId(u32);

impl DataTypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered datatype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataType {
    pub name: Name,
    /// Constructors, sorted by name. Also the elimination layout.
    pub ctrs: Vec<Name>,
}

/// A registered constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtrInfo {
    pub datatype: DataTypeId,
    /// Position in `DataType::ctrs`.
    pub slot: usize,
    /// Field names, in declaration order.
    pub fields: Vec<Name>,
}

/// Constructor → datatype map, populated at setup time.
#[derive(Clone, Debug, Default)]
pub struct DataTypeRegistry {
    datatypes: Vec<DataType>,
    ctrs: FxHashMap<Name, CtrInfo>,
}

impl DataTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in datatypes: `Bool`, `List`, `Option`,
    /// `Pair` and `Ordering`.
    pub fn with_prelude(interner: &StringInterner) -> Self {
        let mut registry = Self::new();
        let prelude: [(&str, &[(&str, &[&str])]); 5] = [
            ("Bool", &[("True", &[]), ("False", &[])]),
            ("List", &[("Nil", &[]), ("Cons", &["head", "tail"])]),
            ("Option", &[("None", &[]), ("Some", &["x"])]),
            ("Pair", &[("Pair", &["fst", "snd"])]),
            ("Ordering", &[("LT", &[]), ("EQ", &[]), ("GT", &[])]),
        ];
        for (raw, (name, ctrs)) in (0..).zip(prelude) {
            registry.insert(interner, DataTypeId(raw), name, ctrs);
        }
        registry
    }

    /// Register a datatype with its constructors and their field names.
    ///
    /// Constructor names must be unique across the whole registry.
    #[tracing::instrument(level = "debug", skip_all, fields(datatype = name))]
    pub fn register(
        &mut self,
        interner: &StringInterner,
        name: &str,
        ctrs: &[(&str, &[&str])],
    ) -> EvalResult<DataTypeId> {
        for (i, (ctr, _)) in ctrs.iter().enumerate() {
            let taken = self.ctrs.contains_key(&interner.intern(ctr));
            if taken || ctrs[..i].iter().any(|(other, _)| other == ctr) {
                return Err(duplicate_constructor(ctr));
            }
        }
        let raw =
            u32::try_from(self.datatypes.len()).map_err(|_| capacity_exceeded("datatypes"))?;
        let id = DataTypeId(raw);
        self.insert(interner, id, name, ctrs);
        Ok(id)
    }

    /// `id` must be the next free index.
    fn insert(
        &mut self,
        interner: &StringInterner,
        id: DataTypeId,
        name: &str,
        ctrs: &[(&str, &[&str])],
    ) {
        let mut sorted = ctrs.to_vec();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut layout = Vec::with_capacity(sorted.len());
        for (slot, (ctr, fields)) in sorted.into_iter().enumerate() {
            let ctr = interner.intern(ctr);
            layout.push(ctr);
            self.ctrs.insert(
                ctr,
                CtrInfo {
                    datatype: id,
                    slot,
                    fields: fields.iter().map(|f| interner.intern(f)).collect(),
                },
            );
        }
        tracing::debug!(ctrs = layout.len(), "registered datatype");
        self.datatypes.push(DataType {
            name: interner.intern(name),
            ctrs: layout,
        });
    }

    #[inline]
    pub fn ctr(&self, ctr: Name) -> Option<&CtrInfo> {
        self.ctrs.get(&ctr)
    }

    pub fn datatype_of(&self, ctr: Name) -> Option<DataTypeId> {
        self.ctr(ctr).map(|info| info.datatype)
    }

    pub fn arity(&self, ctr: Name) -> Option<usize> {
        self.ctr(ctr).map(|info| info.fields.len())
    }

    pub fn slot_of(&self, ctr: Name) -> Option<usize> {
        self.ctr(ctr).map(|info| info.slot)
    }

    #[inline]
    pub fn datatype(&self, id: DataTypeId) -> &DataType {
        &self.datatypes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.datatypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
    }
}

#[cfg(test)]
mod tests;
