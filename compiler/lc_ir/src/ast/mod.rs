//! Expression, definition and trie node kinds.
//!
//! Children are referenced by index; see `ExprArena` for storage.

use crate::{ArgsId, BinderId, DefRange, ExprId, ExprRange, Name, TrieId};

/// Expression kinds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Number literal.
    Num(f64),
    /// String literal (interned).
    Str(Name),
    /// Function literal: a pattern-matching lambda.
    Fun(TrieId),
    /// Saturated constructor application `C(e1, ..., en)`.
    Constr { ctr: Name, args: ExprRange },
    /// Variable reference.
    Var(Name),
    /// Function application.
    App { func: ExprId, arg: ExprId },
    /// Binary primitive application; the operator is syntax, not a value.
    BinaryApp {
        op: Name,
        left: ExprId,
        right: ExprId,
    },
    /// Sequence of definitions followed by a body.
    Defs { defs: DefRange, body: ExprId },
    /// `match scrutinee as trie`.
    MatchAs { scrutinee: ExprId, trie: TrieId },
}

/// One definition in a `Defs` block.
#[derive(Clone, Debug, PartialEq)]
pub enum Def {
    /// `let x = e`
    Let { x: BinderId, e: ExprId },
    /// `primitive x`, binding the unary primitive named by `x`.
    Prim { x: BinderId },
    /// `letrec f1 = σ1; ...; fn = σn`, a mutually recursive group.
    LetRec(Vec<RecDef>),
}

/// One function of a recursive group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecDef {
    pub x: BinderId,
    pub trie: TrieId,
}

/// What to do once a pattern has matched.
///
/// At the top of a trie this is the branch body; inside a constructor
/// branch it is the trie for the remaining fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kont {
    Expr(ExprId),
    Args(ArgsId),
}

/// Pattern-matching trie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trie {
    /// Bind the scrutinee to `x`.
    Var { x: Name, kont: Kont },
    /// Dispatch on the constructor; branches need not cover the datatype.
    Constr(Vec<(Name, ArgsId)>),
}

/// Matching of constructor fields, one trie per field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Args {
    /// No fields left.
    End(Kont),
    /// Match the next field with this trie; its continuation is an `Args`.
    Next(TrieId),
}
