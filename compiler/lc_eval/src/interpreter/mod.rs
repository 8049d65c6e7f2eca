//! The explaining interpreter.
//!
//! One `Interpreter` is one session: it owns the store every value and
//! explanation of the session lives in, and borrows the program arena, the
//! interner and the datatype registry. A session evaluates a program once
//! and then slices the resulting derivation any number of times:
//!
//! - `evaluate` runs the program, recording an explanation for every value
//!   and computing each value's availability from the syntax annotations.
//! - `forward_slice` replays the recorded explanations only, propagating
//!   availability from the syntax annotations to the values.
//! - `backward_slice` walks the explanations the other way, propagating
//!   demand from the values back to the syntax.
//!
//! Annotations are reset by the caller between passes
//! (`clear_annotations`, `set_all_annotations`).

mod builder;
mod bwd;
mod eval;
mod fwd;
mod interned_names;

pub use builder::InterpreterBuilder;

use interned_names::PrimitiveNames;
use lc_ir::{Annotation, ExprArena, ExprId, Lattice, StringInterner};
use lc_runtime::{DataTypeRegistry, Env, EvalResult, ExplValue, FrameId, Store, Value, Vid};

use crate::matcher::Matchers;

/// An evaluation session over one program arena.
pub struct Interpreter<'a> {
    pub(crate) arena: &'a ExprArena,
    pub(crate) interner: &'a StringInterner,
    pub(crate) registry: &'a DataTypeRegistry,
    pub(crate) store: Store,
    /// Top-level environment programs are evaluated in.
    pub(crate) env: Env,
    pub(crate) matchers: Matchers<'a>,
    pub(crate) prims: PrimitiveNames,
}

impl<'a> Interpreter<'a> {
    /// A session with an empty store and environment.
    pub fn new(
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        registry: &'a DataTypeRegistry,
    ) -> Self {
        InterpreterBuilder::new(arena, interner, registry).build()
    }

    pub fn builder(
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        registry: &'a DataTypeRegistry,
    ) -> InterpreterBuilder<'a> {
        InterpreterBuilder::new(arena, interner, registry)
    }

    /// Evaluate `expr` in the session environment.
    pub fn evaluate(&mut self, expr: ExprId) -> EvalResult<ExplValue> {
        let env = self.env.clone();
        self.evaluate_in(&env, expr)
    }

    /// Evaluate `expr` in `env`, recording its derivation.
    #[tracing::instrument(level = "debug", skip_all, fields(expr = ?expr))]
    pub fn evaluate_in(&mut self, env: &Env, expr: ExprId) -> EvalResult<ExplValue> {
        let result = self.eval(env, expr, FrameId::ROOT)?;
        tracing::debug!(
            values = self.store.value_count(),
            expls = self.store.expl_count(),
            frames = self.store.frame_count(),
            "evaluated"
        );
        Ok(result)
    }

    /// Replay the derivation of `result` forward and return its new
    /// availability.
    ///
    /// Syntax annotations are the inputs. Every value of the derivation is
    /// re-annotated; afterwards each expression is met with the
    /// availability of the values it produced.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn forward_slice(&self, result: ExplValue) -> EvalResult<Annotation> {
        fwd::Forward::new(self.arena, &self.store).run(result)
    }

    /// Push the demand on `result` back through its derivation and return
    /// the expression it came from.
    ///
    /// Demand only ever accumulates (`join`), so callers clear annotations
    /// first and then mark the parts of the result they need.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn backward_slice(&self, result: ExplValue) -> EvalResult<ExprId> {
        bwd::Backward::new(self.arena, &self.store).run(result)
    }

    // Annotations

    /// Set every syntax node under `root` to `annotation`.
    pub fn set_all_annotations(&self, root: ExprId, annotation: Annotation) {
        self.arena.set_all_annotations(root, annotation);
    }

    /// Set every value of the session to `annotation`.
    pub fn set_all_value_annotations(&self, annotation: Annotation) {
        self.store.set_all_annotations(annotation);
    }

    /// Reset the syntax under `root` and every value to bottom.
    pub fn clear_annotations(&self, root: ExprId) {
        self.set_all_annotations(root, Annotation::bot());
        self.set_all_value_annotations(Annotation::bot());
    }

    // Inputs

    /// Store `value` at a fresh external identity.
    ///
    /// Inputs carry no explanation; slicing stops at them.
    pub fn input(&mut self, value: Value) -> EvalResult<Vid> {
        let id = self.store.fresh();
        self.store.at(id, value)
    }

    /// Store `value` as an input and bind it to `name` in the session
    /// environment.
    pub fn bind_input(&mut self, name: &str, value: Value) -> EvalResult<Vid> {
        let v = self.input(value)?;
        self.env = self.env.extend(self.interner.intern(name), v);
        Ok(v)
    }

    // Accessors

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[inline]
    pub fn arena(&self) -> &'a ExprArena {
        self.arena
    }

    #[inline]
    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    #[inline]
    pub fn registry(&self) -> &'a DataTypeRegistry {
        self.registry
    }

    #[inline]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The value of `result`.
    #[inline]
    pub fn value(&self, result: ExplValue) -> &Value {
        self.store.value(result.value)
    }
}
