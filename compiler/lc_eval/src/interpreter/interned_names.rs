//! Pre-interned primitive names.
//!
//! Both primitive tables are keyed by name. Interning every name once at
//! construction lets `prim` definitions and binary applications resolve
//! their operator with a `Name` lookup instead of a string comparison.

use lc_ir::{Name, StringInterner};
use lc_runtime::{BinaryOp, UnaryOp};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub(crate) struct PrimitiveNames {
    unary: FxHashMap<Name, UnaryOp>,
    binary: FxHashMap<Name, BinaryOp>,
}

impl PrimitiveNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        Self {
            unary: UnaryOp::ALL
                .into_iter()
                .map(|op| (interner.intern(op.name()), op))
                .collect(),
            binary: BinaryOp::ALL
                .into_iter()
                .map(|op| (interner.intern(op.symbol()), op))
                .collect(),
        }
    }

    #[inline]
    pub(crate) fn unary(&self, name: Name) -> Option<UnaryOp> {
        self.unary.get(&name).copied()
    }

    #[inline]
    pub(crate) fn binary(&self, name: Name) -> Option<BinaryOp> {
        self.binary.get(&name).copied()
    }
}
