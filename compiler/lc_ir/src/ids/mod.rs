//! Index types for the flat syntax arena.
//!
//! Every syntax node is addressed by a `u32` index into one of the
//! `ExprArena` tables. Indices are only meaningful for the arena that
//! produced them.

use std::fmt;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// Index of an expression node.
    ExprId
);
define_index!(
    /// Index of a binding occurrence (`let x`, `prim x`, `letrec f`).
    BinderId
);
define_index!(
    /// Index of a pattern trie.
    TrieId
);
define_index!(
    /// Index of an argument trie (the fields of one constructor branch).
    ArgsId
);
define_index!(
    /// Index of a definition inside a `Defs` block.
    DefId
);

macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            /// Empty range.
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u32) -> Self {
                $name { start, len }
            }

            #[inline]
            pub const fn len(self) -> usize {
                self.len as usize
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.len == 0
            }

            /// Positions covered by this range.
            #[inline]
            pub fn as_range(self) -> std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }
        }
    };
}

define_range!(
    /// Contiguous run of `ExprId`s in the arena's expression-list table.
    ExprRange
);
define_range!(
    /// Contiguous run of definitions of one `Defs` block.
    DefRange
);

impl DefRange {
    /// Definition ids covered by this range, in declaration order.
    pub fn iter(self) -> impl DoubleEndedIterator<Item = DefId> + ExactSizeIterator {
        (self.start..self.start + self.len).map(DefId::new)
    }
}

/// An annotatable syntax node: either an expression or a binder.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Expr(ExprId),
    Binder(BinderId),
}

impl From<ExprId> for Node {
    fn from(id: ExprId) -> Self {
        Node::Expr(id)
    }
}

impl From<BinderId> for Node {
    fn from(id: BinderId) -> Self {
        Node::Binder(id)
    }
}
