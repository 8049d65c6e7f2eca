//! Forward replay.
//!
//! Re-derives the availability of every value of a derivation from the
//! explanations alone: no expression is evaluated again and no match is
//! dispatched again. Each rule takes the meet of what it consumed, exactly
//! as evaluation does, and overwrites the value's annotation.
//!
//! Expression annotations are the inputs of the pass. Results are written
//! back onto the originating expressions only once the replay is over, so
//! a node reached through several calls is read unchanged by every one of
//! them.

use lc_ir::{Annotation, ExprArena, ExprId, Lattice, Node};
use lc_runtime::errors::{malformed_rec_group, missing_explanation};
use lc_runtime::{Env, EvalResult, Expl, ExplDef, ExplValue, Store};

use crate::stack::ensure_sufficient_stack;

pub(super) struct Forward<'s> {
    arena: &'s ExprArena,
    store: &'s Store,
    /// Availability computed per expression instance, written back last.
    writes: Vec<(ExprId, Annotation)>,
}

impl<'s> Forward<'s> {
    pub(super) fn new(arena: &'s ExprArena, store: &'s Store) -> Self {
        Forward {
            arena,
            store,
            writes: Vec::new(),
        }
    }

    pub(super) fn run(mut self, result: ExplValue) -> EvalResult<Annotation> {
        let annotation = self.replay(result)?;
        for (e, annotation) in self.writes {
            self.arena.meet_annotation(e, annotation);
        }
        Ok(annotation)
    }

    fn replay(&mut self, ev: ExplValue) -> EvalResult<Annotation> {
        ensure_sufficient_stack(|| self.replay_inner(ev))
    }

    fn replay_inner(&mut self, ev: ExplValue) -> EvalResult<Annotation> {
        let store = self.store;
        let Some(Node::Expr(e)) = store.expl_id(ev.expl).node() else {
            return Err(missing_explanation(&store.id_of(ev.value).to_string()));
        };
        let here = self.arena.annotation(e);

        let annotation = match store.expl(ev.expl) {
            Expl::Empty => here,
            Expl::Constr { args } => {
                for &arg in args {
                    self.replay(arg)?;
                }
                here
            }
            Expl::Var { binding, .. } => store.annotation(*binding).meet(here),
            Expl::App {
                func,
                arg,
                rec_env,
                matched,
                body,
            } => {
                let func = self.replay(*func)?;
                self.replay(*arg)?;
                self.reclose(rec_env)?;
                let matched = matched.annotation(store);
                let body = self.replay(*body)?;
                Annotation::meet_all([func, matched, body, here])
            }
            Expl::UnaryApp { op, arg } => {
                let op = self.replay(*op)?;
                let arg = self.replay(*arg)?;
                Annotation::meet_all([op, arg, here])
            }
            Expl::BinaryApp { left, right, .. } => {
                let left = self.replay(*left)?;
                let right = self.replay(*right)?;
                Annotation::meet_all([left, right, here])
            }
            Expl::Defs { defs, body } => {
                for def in defs {
                    match def {
                        ExplDef::Let { x, bound, binding } => {
                            let bound = self.replay(*bound)?;
                            store.set_annotation(*binding, bound.meet(self.arena.annotation(*x)));
                        }
                        ExplDef::Prim { x, binding } => {
                            store.set_annotation(*binding, self.arena.annotation(*x));
                        }
                        ExplDef::LetRec { closures } => self.reclose(closures)?,
                    }
                }
                self.replay(*body)?.meet(here)
            }
            Expl::MatchAs {
                scrutinee,
                matched,
                body,
            } => {
                self.replay(*scrutinee)?;
                let matched = matched.annotation(store);
                let body = self.replay(*body)?;
                Annotation::meet_all([matched, body, here])
            }
        };

        store.set_annotation(ev.value, annotation);
        self.writes.push((e, annotation));
        Ok(annotation)
    }

    /// A closed recursive function is as available as its binder.
    fn reclose(&self, closures: &Env) -> EvalResult<()> {
        for v in closures.values() {
            let Some(Node::Binder(x)) = self.store.id_of(v).node() else {
                return Err(malformed_rec_group(
                    "closure is not identified by its binder",
                ));
            };
            self.store.set_annotation(v, self.arena.annotation(x));
        }
        Ok(())
    }
}
