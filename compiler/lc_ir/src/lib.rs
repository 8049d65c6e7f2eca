//! lambdacalc IR - syntax for the explaining evaluator.
//!
//! This crate contains the data structures shared by the runtime and the
//! evaluator:
//! - `Name` and `StringInterner` for interned identifiers
//! - `ExprArena`, a flat arena of expressions, binders, tries and definitions
//! - `Annotation` and the `Lattice` trait used by the slicing passes
//! - `ExprBuilder` for constructing programs without a parser
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers and string literals are `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId(u32)` indices
//! - **Immutable Shape, Mutable Annotations**: node kinds never change once
//!   allocated; each node carries a `Cell<Annotation>` so slicing passes can
//!   annotate a shared arena in place.

mod annotation;
mod arena;
mod ast;
mod builder;
mod ids;
mod interner;
mod name;

pub use annotation::{Annotation, Lattice};
pub use arena::ExprArena;
pub use ast::{Args, Def, ExprKind, Kont, RecDef, Trie};
pub use builder::ExprBuilder;
pub use ids::{ArgsId, BinderId, DefId, DefRange, ExprId, ExprRange, Node, TrieId};
pub use interner::{InternError, StringInterner};
pub use name::Name;
