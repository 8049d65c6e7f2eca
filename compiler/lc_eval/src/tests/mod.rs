//! Session-level tests: evaluation, slicing and identity.
//!
//! Each suite builds programs with `ExprBuilder` against a `Fixture` that
//! owns the arena, interner and registry an `Interpreter` borrows.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

mod slicing_tests;

use lc_ir::{Annotation, ExprArena, ExprBuilder, ExprId, StringInterner, TrieId};
use lc_runtime::{DataTypeRegistry, ExplValue, Value};

use crate::Interpreter;

/// Install a test subscriber once; `RUST_LOG` selects the output.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) struct Fixture {
    pub interner: StringInterner,
    pub registry: DataTypeRegistry,
    pub arena: ExprArena,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let interner = StringInterner::new();
        let registry = DataTypeRegistry::with_prelude(&interner);
        Fixture {
            interner,
            registry,
            arena: ExprArena::new(),
        }
    }

    pub fn build<R>(&mut self, f: impl FnOnce(&mut ExprBuilder<'_>) -> R) -> R {
        let mut b = ExprBuilder::new(&mut self.arena, &self.interner);
        f(&mut b)
    }

    pub fn interpreter(&self) -> Interpreter<'_> {
        Interpreter::new(&self.arena, &self.interner, &self.registry)
    }

    pub fn annotation(&self, e: ExprId) -> Annotation {
        self.arena.annotation(e)
    }
}

/// The number a result evaluated to.
pub(crate) fn num(interp: &Interpreter<'_>, result: ExplValue) -> f64 {
    match interp.value(result) {
        Value::Num(n) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

/// The constructor a result evaluated to.
pub(crate) fn ctr(interp: &Interpreter<'_>, result: ExplValue) -> &'static str {
    match interp.value(result) {
        Value::Data(d) => interp.interner().lookup(d.ctr),
        other => panic!("expected data, got {other:?}"),
    }
}

/// `3 + 4 * 2`, returning the root and `[3, 4, 2, *, +]`.
pub(crate) fn three_plus_four_times_two(b: &mut ExprBuilder<'_>) -> (ExprId, [ExprId; 5]) {
    let three = b.num(3.0);
    let four = b.num(4.0);
    let two = b.num(2.0);
    let times = b.binary("*", four, two);
    let plus = b.binary("+", three, times);
    (plus, [three, four, two, times, plus])
}

/// `{ Nil -> 0; Cons(h, t) -> 1 + length t }`, the trie of `length`.
pub(crate) fn length_trie(b: &mut ExprBuilder<'_>) -> TrieId {
    let zero = b.num(0.0);
    let nil = b.branch("Nil", &[], zero);
    let one = b.num(1.0);
    let length = b.var("length");
    let t = b.var("t");
    let call = b.app(length, t);
    let sum = b.binary("+", one, call);
    let cons = b.branch("Cons", &["h", "t"], sum);
    b.case(vec![nil, cons])
}

/// `letrec length = ...; length [elems]`, returning the root, the
/// element literals and the binder's definition.
pub(crate) fn length_of(b: &mut ExprBuilder<'_>, elems: &[f64]) -> (ExprId, Vec<ExprId>, lc_ir::Def) {
    let trie = length_trie(b);
    let def = b.letrec(vec![("length", trie)]);
    let lits: Vec<_> = elems.iter().map(|&n| b.num(n)).collect();
    let list = b.list(&lits);
    let length = b.var("length");
    let call = b.app(length, list);
    let root = b.defs(vec![def.clone()], call);
    (root, lits, def)
}
