//! Backward slicing.
//!
//! Demand on a value is joined onto everything its explanation says it was
//! built from, then onto the expression that produced it. Joins never lose
//! demand, so a value shared by several consumers ends up with the join of
//! all of them.
//!
//! The derivation is a DAG: the same value is reachable along many paths.
//! The pass remembers the annotation each value was last walked with and
//! skips it unless the demand has grown since, which bounds the work by
//! the size of the derivation rather than the number of paths through it.
//!
//! Within a rule, demand reaches the body before the definitions and
//! matches that bound its variables, so every binding has accumulated its
//! full demand before it is walked.

use lc_ir::{Annotation, ExprArena, ExprId, Lattice, Node};
use lc_runtime::errors::{malformed_rec_group, missing_explanation};
use lc_runtime::{Env, EvalResult, Expl, ExplDef, ExplValue, Store, Vid};
use rustc_hash::FxHashMap;

use crate::stack::ensure_sufficient_stack;

pub(super) struct Backward<'s> {
    arena: &'s ExprArena,
    store: &'s Store,
    visited: FxHashMap<Vid, Annotation>,
}

impl<'s> Backward<'s> {
    pub(super) fn new(arena: &'s ExprArena, store: &'s Store) -> Self {
        Backward {
            arena,
            store,
            visited: FxHashMap::default(),
        }
    }

    pub(super) fn run(mut self, result: ExplValue) -> EvalResult<ExprId> {
        let Some(Node::Expr(root)) = self.store.expl_id(result.expl).node() else {
            return Err(missing_explanation(
                &self.store.id_of(result.value).to_string(),
            ));
        };
        self.uneval(result)?;
        tracing::debug!(visited = self.visited.len(), "backward slice done");
        Ok(root)
    }

    fn uneval(&mut self, ev: ExplValue) -> EvalResult<()> {
        ensure_sufficient_stack(|| self.uneval_inner(ev))
    }

    fn uneval_inner(&mut self, ev: ExplValue) -> EvalResult<()> {
        let store = self.store;
        let annotation = store.annotation(ev.value);
        if let Some(&seen) = self.visited.get(&ev.value) {
            if annotation.leq(seen) {
                return Ok(());
            }
        }
        self.visited.insert(ev.value, annotation);

        let Some(origin) = store.expl_id(ev.expl).node() else {
            return Err(missing_explanation(&store.id_of(ev.value).to_string()));
        };

        match store.expl(ev.expl) {
            Expl::Empty => {}
            Expl::Constr { args } => {
                for &arg in args {
                    self.uneval(arg)?;
                }
            }
            Expl::Var { binding, .. } => {
                store.join_annotation(*binding, annotation);
            }
            Expl::App {
                func,
                arg,
                rec_env,
                matched,
                body,
            } => {
                store.join_annotation(body.value, annotation);
                self.uneval(*body)?;
                matched.unapply(store, annotation);
                self.unclose(rec_env)?;
                store.join_annotation(func.value, annotation);
                self.uneval(*func)?;
                self.uneval(*arg)?;
            }
            Expl::UnaryApp { op: left, arg: right } | Expl::BinaryApp { left, right, .. } => {
                store.join_annotation(left.value, annotation);
                store.join_annotation(right.value, annotation);
                self.uneval(*left)?;
                self.uneval(*right)?;
            }
            Expl::Defs { defs, body } => {
                store.join_annotation(body.value, annotation);
                self.uneval(*body)?;
                for def in defs.iter().rev() {
                    match def {
                        ExplDef::Let { x, bound, binding } => {
                            let demand = store.annotation(*binding);
                            store.join_annotation(bound.value, demand);
                            self.arena.join_annotation(*x, demand);
                            self.uneval(*bound)?;
                        }
                        ExplDef::Prim { x, binding } => {
                            self.arena.join_annotation(*x, store.annotation(*binding));
                        }
                        ExplDef::LetRec { closures } => self.unclose(closures)?,
                    }
                }
            }
            Expl::MatchAs {
                scrutinee,
                matched,
                body,
            } => {
                store.join_annotation(body.value, annotation);
                self.uneval(*body)?;
                matched.unapply(store, annotation);
                self.uneval(*scrutinee)?;
            }
        }

        self.arena.join_annotation(origin, annotation);
        Ok(())
    }

    /// Push the demand on each closure of a recursive group onto the
    /// binder that defines it. Every closure of the group shares one slot
    /// per binder, so all instances observe the same demand.
    fn unclose(&self, closures: &Env) -> EvalResult<()> {
        for v in closures.values() {
            let Some(Node::Binder(x)) = self.store.id_of(v).node() else {
                return Err(malformed_rec_group(
                    "closure is not identified by its binder",
                ));
            };
            self.arena.join_annotation(x, self.store.annotation(v));
        }
        Ok(())
    }
}
