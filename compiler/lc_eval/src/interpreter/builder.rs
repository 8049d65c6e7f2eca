//! `InterpreterBuilder` for creating sessions with a prepared store or
//! environment.

use lc_ir::{ExprArena, StringInterner};
use lc_runtime::{DataTypeRegistry, Env, Store};

use super::interned_names::PrimitiveNames;
use super::Interpreter;
use crate::matcher::Matchers;

/// Builder for `Interpreter` sessions.
pub struct InterpreterBuilder<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    registry: &'a DataTypeRegistry,
    store: Option<Store>,
    env: Option<Env>,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        registry: &'a DataTypeRegistry,
    ) -> Self {
        Self {
            arena,
            interner,
            registry,
            store: None,
            env: None,
        }
    }

    /// Start from an existing store, e.g. one already holding inputs.
    #[must_use]
    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the top-level environment. Its values must live in the store.
    #[must_use]
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        Interpreter {
            arena: self.arena,
            interner: self.interner,
            registry: self.registry,
            store: self.store.unwrap_or_default(),
            env: self.env.unwrap_or_default(),
            matchers: Matchers::new(self.arena, self.interner, self.registry),
            prims: PrimitiveNames::new(self.interner),
        }
    }
}
