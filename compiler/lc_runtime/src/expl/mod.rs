//! Explanations: the recorded derivation of each evaluated value.
//!
//! One `Expl` variant per evaluation rule, holding exactly the sub-results
//! that rule consumed. Explanations are written once by the evaluator and
//! then only read by the slicing passes.

use lc_ir::{Annotation, BinderId, Lattice, Name};

use crate::{Env, Store, Tid, Vid};

/// An explanation paired with the value it explains.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExplValue {
    pub expl: Tid,
    pub value: Vid,
}

impl ExplValue {
    #[inline]
    pub fn new(expl: Tid, value: Vid) -> Self {
        ExplValue { expl, value }
    }
}

/// Derivation of one evaluation step.
#[derive(Clone, Debug, PartialEq)]
pub enum Expl {
    /// Literals and function literals.
    Empty,
    /// Constructor application; one entry per argument, in order.
    Constr { args: Vec<ExplValue> },
    /// Variable reference resolved to `binding`.
    Var { x: Name, binding: Vid },
    /// Closure application.
    App {
        func: ExplValue,
        arg: ExplValue,
        /// Closures of the callee's recursive group as closed for this call.
        rec_env: Env,
        matched: Match,
        body: ExplValue,
    },
    /// Application of a unary primitive.
    UnaryApp { op: ExplValue, arg: ExplValue },
    BinaryApp {
        left: ExplValue,
        op: Name,
        right: ExplValue,
    },
    Defs { defs: Vec<ExplDef>, body: ExplValue },
    MatchAs {
        scrutinee: ExplValue,
        matched: Match,
        body: ExplValue,
    },
}

impl Expl {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expl::Empty => "Empty",
            Expl::Constr { .. } => "Constr",
            Expl::Var { .. } => "Var",
            Expl::App { .. } => "App",
            Expl::UnaryApp { .. } => "UnaryApp",
            Expl::BinaryApp { .. } => "BinaryApp",
            Expl::Defs { .. } => "Defs",
            Expl::MatchAs { .. } => "MatchAs",
        }
    }
}

/// Derivation of one definition in a `Defs` block.
#[derive(Clone, Debug, PartialEq)]
pub enum ExplDef {
    /// `let x = e`: the evaluated `bound` and its copy at the binder.
    Let {
        x: BinderId,
        bound: ExplValue,
        binding: Vid,
    },
    /// `primitive x`: the primitive as bound at the binder.
    Prim { x: BinderId, binding: Vid },
    /// A recursive group, closed once for the block.
    LetRec { closures: Env },
}

/// Record of which pattern fired, and on what.
///
/// Only the branch that actually matched is recorded; unmatched branches
/// and variable patterns leave nothing to unapply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Match {
    /// A variable pattern consumed the value without inspecting it.
    Var,
    /// A constructor pattern matched `value`; `args` are the matches of
    /// its fields, in field order.
    Data {
        value: Vid,
        ctr: Name,
        args: Vec<Match>,
    },
}

impl Match {
    /// Availability of the match: the scrutinee and every destructured
    /// part of it must be available.
    pub fn annotation(&self, store: &Store) -> Annotation {
        match self {
            Match::Var => Annotation::top(),
            Match::Data { value, args, .. } => args
                .iter()
                .fold(store.annotation(*value), |acc, m| {
                    acc.meet(m.annotation(store))
                }),
        }
    }

    /// Push demand `α` back onto every nested match, then onto the
    /// scrutinee itself.
    pub fn unapply(&self, store: &Store, annotation: Annotation) {
        if let Match::Data { value, args, .. } = self {
            for arg in args {
                arg.unapply(store, annotation);
            }
            store.join_annotation(*value, annotation);
        }
    }
}
