//! lambdacalc Eval - explaining evaluator with forward and backward slicing.
//!
//! # Architecture
//!
//! - `Interpreter`: one session over a program arena; evaluates once,
//!   recording an explanation for every value, then slices that derivation
//! - `Matchers`: compiles pattern tries into per-datatype eliminators and
//!   applies them, producing the `Match` records slicing walks back
//! - `ensure_sufficient_stack`: every recursive pass grows the stack on
//!   demand
//!
//! # Re-exports
//!
//! The runtime types a session hands out are re-exported from
//! `lc_runtime`: `Value`, `Env`, `ExplValue`, `Expl`, `Match`, `Store`,
//! `EvalError` and `EvalResult`.

pub mod interpreter;
pub mod matcher;
mod stack;

pub use interpreter::{Interpreter, InterpreterBuilder};
pub use matcher::{MatchResult, Matcher, Matchers};
pub use stack::ensure_sufficient_stack;

pub use lc_runtime::{
    DataTypeRegistry, Env, ErrorCategory, EvalError, EvalErrorKind, EvalResult, Expl, ExplDef,
    ExplValue, Match, Store, Value, Vid,
};

#[cfg(test)]
mod tests;
