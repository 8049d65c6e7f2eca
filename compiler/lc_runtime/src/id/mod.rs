//! Identities of runtime objects and handles into the store.
//!
//! An `Id` names a versioned object independently of where the store keeps
//! it. Derived ids tie a value or explanation to the syntax node that
//! produced it, qualified by the instantiation frame of the call that was
//! running. Re-running the same derivation reproduces the same ids.

use std::fmt;

use lc_ir::Node;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

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

define_handle!(
    /// Handle of a versioned value.
    Vid
);
define_handle!(
    /// Handle of a versioned explanation.
    Tid
);
define_handle!(
    /// Handle of a recursive definition group.
    RecGroupId
);
define_handle!(
    /// An instantiation frame: one closure body evaluation.
    FrameId
);

impl FrameId {
    /// The frame of the top-level program.
    pub const ROOT: FrameId = FrameId(0);
}

/// Which of the two objects derived from one evaluation an id names.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Role {
    Value,
    Trace,
}

/// Identity key of a versioned object.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Id {
    /// Supplied from outside, e.g. inputs to the program.
    Extern(u32),
    /// Derived from the syntax node that produced the object.
    Node {
        node: Node,
        frame: FrameId,
        role: Role,
    },
}

impl Id {
    #[inline]
    pub fn value(node: impl Into<Node>, frame: FrameId) -> Self {
        Id::Node {
            node: node.into(),
            frame,
            role: Role::Value,
        }
    }

    #[inline]
    pub fn trace(node: impl Into<Node>, frame: FrameId) -> Self {
        Id::Node {
            node: node.into(),
            frame,
            role: Role::Trace,
        }
    }

    /// The originating syntax node, for derived ids.
    pub fn node(self) -> Option<Node> {
        match self {
            Id::Extern(_) => None,
            Id::Node { node, .. } => Some(node),
        }
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Extern(n) => write!(f, "ν{n}"),
            Id::Node { node, frame, role } => {
                let role = match role {
                    Role::Value => "v",
                    Role::Trace => "t",
                };
                write!(f, "{node:?}@{}:{role}", frame.0)
            }
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
