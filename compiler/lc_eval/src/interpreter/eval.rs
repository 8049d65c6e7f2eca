//! Evaluation rules.
//!
//! Every rule places its result at `Id::value(e, frame)` and its
//! explanation at `Id::trace(e, frame)`, then annotates the result with the
//! meet of everything the rule consumed. A closure body runs in the frame
//! entered at its call site, so each call gets its own identities while a
//! re-run of the same derivation lands on the same ones.

use lc_ir::{Annotation, Def, DefRange, ExprId, ExprKind, ExprRange, Kont, Lattice, Name};
use lc_runtime::errors::{
    constructor_arity, malformed_trie, non_primitive_operand, not_callable, undefined_variable,
    unknown_binary_op, unknown_constructor, unknown_primitive,
};
use lc_runtime::{
    Closure, Env, EvalResult, Expl, ExplDef, ExplValue, FrameId, Id, RecGroupId, Value, Vid,
};

use super::Interpreter;
use crate::stack::ensure_sufficient_stack;

impl Interpreter<'_> {
    /// Evaluate `e` in `env` within `frame`.
    pub(crate) fn eval(&mut self, env: &Env, e: ExprId, frame: FrameId) -> EvalResult<ExplValue> {
        ensure_sufficient_stack(|| self.eval_inner(env, e, frame)).map_err(|err| err.with_expr(e))
    }

    fn eval_inner(&mut self, env: &Env, e: ExprId, frame: FrameId) -> EvalResult<ExplValue> {
        let here = self.arena.annotation(e);
        match self.arena.kind(e) {
            ExprKind::Num(n) => {
                let v = self.store.at(Id::value(e, frame), Value::Num(n))?;
                self.finish(e, frame, v, Expl::Empty, here)
            }
            ExprKind::Str(s) => {
                let v = self.store.at(Id::value(e, frame), Value::Str(s))?;
                self.finish(e, frame, v, Expl::Empty, here)
            }
            ExprKind::Fun(trie) => {
                let closure = Value::Closure(Closure {
                    env: env.clone(),
                    group: None,
                    trie,
                });
                let v = self.store.at(Id::value(e, frame), closure)?;
                self.finish(e, frame, v, Expl::Empty, here)
            }
            ExprKind::Constr { ctr, args } => self.eval_constr(env, e, frame, ctr, args, here),
            ExprKind::Var(x) => {
                let binding = env
                    .lookup(x)
                    .ok_or_else(|| undefined_variable(self.interner.lookup(x)))?;
                let v = self.store.copy_at(Id::value(e, frame), binding)?;
                let annotation = self.store.annotation(binding).meet(here);
                self.finish(e, frame, v, Expl::Var { x, binding }, annotation)
            }
            ExprKind::App { func, arg } => self.eval_app(env, e, frame, func, arg, here),
            ExprKind::BinaryApp { op, left, right } => {
                self.eval_binary(env, e, frame, (op, left, right), here)
            }
            ExprKind::Defs { defs, body } => self.eval_defs(env, e, frame, defs, body, here),
            ExprKind::MatchAs { scrutinee, trie } => {
                let scrutinee = self.eval(env, scrutinee, frame)?;
                let matched = self.matchers.apply(&self.store, trie, scrutinee.value)?;
                let Kont::Expr(body) = matched.kont else {
                    return Err(malformed_trie("match continues with fields after the pattern"));
                };
                let body = self.eval(&env.concat(&matched.bindings), body, frame)?;
                let v = self.store.copy_at(Id::value(e, frame), body.value)?;
                let annotation = Annotation::meet_all([
                    matched.annotation,
                    self.store.annotation(body.value),
                    here,
                ]);
                let expl = Expl::MatchAs {
                    scrutinee,
                    matched: matched.matched,
                    body,
                };
                self.finish(e, frame, v, expl, annotation)
            }
        }
    }

    fn eval_constr(
        &mut self,
        env: &Env,
        e: ExprId,
        frame: FrameId,
        ctr: Name,
        args: ExprRange,
        here: Annotation,
    ) -> EvalResult<ExplValue> {
        let arena = self.arena;
        let arity = self
            .registry
            .arity(ctr)
            .ok_or_else(|| unknown_constructor(self.interner.lookup(ctr)))?;
        let args = arena.expr_list(args);
        if args.len() != arity {
            return Err(constructor_arity(
                self.interner.lookup(ctr),
                arity,
                args.len(),
            ));
        }

        let mut evaluated = Vec::with_capacity(args.len());
        for &arg in args {
            evaluated.push(self.eval(env, arg, frame)?);
        }
        let value = Value::data(ctr, evaluated.iter().map(|arg| arg.value));
        let v = self.store.at(Id::value(e, frame), value)?;
        self.finish(e, frame, v, Expl::Constr { args: evaluated }, here)
    }

    fn eval_app(
        &mut self,
        env: &Env,
        e: ExprId,
        frame: FrameId,
        func: ExprId,
        arg: ExprId,
        here: Annotation,
    ) -> EvalResult<ExplValue> {
        let func = self.eval(env, func, frame)?;
        let arg = self.eval(env, arg, frame)?;

        match self.store.value(func.value).clone() {
            Value::Closure(closure) => {
                let matched = self.matchers.apply(&self.store, closure.trie, arg.value)?;
                let Kont::Expr(body) = matched.kont else {
                    return Err(malformed_trie("function continues with fields after the pattern"));
                };
                let rec_env = match closure.group {
                    Some(group) => self.close_defs(group)?,
                    None => Env::empty(),
                };
                let body_env = closure.env.concat(&rec_env).concat(&matched.bindings);
                let callee = self.store.enter_frame(frame, e)?;
                tracing::trace!(frame = callee.raw(), "entering closure body");
                let body = self.eval(&body_env, body, callee)?;

                let v = self.store.copy_at(Id::value(e, frame), body.value)?;
                let annotation = Annotation::meet_all([
                    self.store.annotation(func.value),
                    matched.annotation,
                    self.store.annotation(body.value),
                    here,
                ]);
                let expl = Expl::App {
                    func,
                    arg,
                    rec_env,
                    matched: matched.matched,
                    body,
                };
                self.finish(e, frame, v, expl, annotation)
            }
            Value::UnaryOp(op) => {
                let operand = self.store.value(arg.value);
                if !operand.is_primitive() {
                    return Err(non_primitive_operand(
                        op.name(),
                        &operand.shape_name(self.interner),
                    ));
                }
                let result = op.apply(operand, self.interner)?;
                let v = self.store.at(Id::value(e, frame), result)?;
                let annotation = Annotation::meet_all([
                    self.store.annotation(func.value),
                    self.store.annotation(arg.value),
                    here,
                ]);
                self.finish(e, frame, v, Expl::UnaryApp { op: func, arg }, annotation)
            }
            other => Err(not_callable(&other.shape_name(self.interner))),
        }
    }

    fn eval_binary(
        &mut self,
        env: &Env,
        e: ExprId,
        frame: FrameId,
        (op, left, right): (Name, ExprId, ExprId),
        here: Annotation,
    ) -> EvalResult<ExplValue> {
        let binary = self
            .prims
            .binary(op)
            .ok_or_else(|| unknown_binary_op(self.interner.lookup(op)))?;
        let left = self.eval(env, left, frame)?;
        let right = self.eval(env, right, frame)?;

        let (l, r) = (self.store.value(left.value), self.store.value(right.value));
        for operand in [l, r] {
            if !operand.is_primitive() {
                return Err(non_primitive_operand(
                    binary.symbol(),
                    &operand.shape_name(self.interner),
                ));
            }
        }
        let result = binary.apply(l, r, self.interner)?;
        let v = self.store.at(Id::value(e, frame), result)?;
        let annotation = Annotation::meet_all([
            self.store.annotation(left.value),
            self.store.annotation(right.value),
            here,
        ]);
        self.finish(e, frame, v, Expl::BinaryApp { left, op, right }, annotation)
    }

    /// Definitions are processed in order, each seeing the ones before it.
    fn eval_defs(
        &mut self,
        env: &Env,
        e: ExprId,
        frame: FrameId,
        defs: DefRange,
        body: ExprId,
        here: Annotation,
    ) -> EvalResult<ExplValue> {
        let arena = self.arena;
        let mut ext = Env::empty();
        let mut expl_defs = Vec::with_capacity(defs.len());

        for def in defs.iter() {
            match arena.def(def) {
                Def::Let { x, e: bound } => {
                    let bound = self.eval(&env.concat(&ext), *bound, frame)?;
                    let binding = self.store.copy_at(Id::value(*x, frame), bound.value)?;
                    self.store.set_expl(binding, bound.expl);
                    let annotation = self
                        .store
                        .annotation(bound.value)
                        .meet(arena.annotation(*x));
                    self.store.set_annotation(binding, annotation);
                    ext = ext.extend(arena.binder_name(*x), binding);
                    expl_defs.push(ExplDef::Let {
                        x: *x,
                        bound,
                        binding,
                    });
                }
                Def::Prim { x } => {
                    let name = arena.binder_name(*x);
                    let op = self
                        .prims
                        .unary(name)
                        .ok_or_else(|| unknown_primitive(self.interner.lookup(name)))?;
                    let binding = self.store.at(Id::value(*x, frame), Value::UnaryOp(op))?;
                    let t = self.store.record(Id::trace(*x, frame), Expl::Empty)?;
                    self.store.set_expl(binding, t);
                    self.store.set_annotation(binding, arena.annotation(*x));
                    ext = ext.extend(name, binding);
                    expl_defs.push(ExplDef::Prim { x: *x, binding });
                }
                Def::LetRec(group) => {
                    let group = self.store.rec_group(frame, group, env.concat(&ext))?;
                    let closures = self.close_defs(group)?;
                    ext = ext.concat(&closures);
                    expl_defs.push(ExplDef::LetRec { closures });
                }
            }
        }

        let body = self.eval(&env.concat(&ext), body, frame)?;
        let v = self.store.copy_at(Id::value(e, frame), body.value)?;
        let annotation = self.store.annotation(body.value).meet(here);
        let expl = Expl::Defs {
            defs: expl_defs,
            body,
        };
        self.finish(e, frame, v, expl, annotation)
    }

    /// Close every function of `group` against the group's environment.
    ///
    /// Each closure lives at its binder in the frame the group was defined
    /// in, so closing the same group again reuses the same closures.
    pub(crate) fn close_defs(&mut self, group: RecGroupId) -> EvalResult<Env> {
        let record = self.store.group(group).clone();
        let mut closures = Env::empty();
        for def in &record.defs {
            let closure = Value::Closure(Closure {
                env: record.env.clone(),
                group: Some(group),
                trie: def.trie,
            });
            let v = self.store.at(Id::value(def.x, record.frame), closure)?;
            let t = self.store.record(Id::trace(def.x, record.frame), Expl::Empty)?;
            self.store.set_expl(v, t);
            self.store.set_annotation(v, self.arena.annotation(def.x));
            closures = closures.extend(self.arena.binder_name(def.x), v);
        }
        Ok(closures)
    }

    fn finish(
        &mut self,
        e: ExprId,
        frame: FrameId,
        v: Vid,
        expl: Expl,
        annotation: Annotation,
    ) -> EvalResult<ExplValue> {
        let t = self.store.record(Id::trace(e, frame), expl)?;
        self.store.set_expl(v, t);
        self.store.set_annotation(v, annotation);
        Ok(ExplValue::new(t, v))
    }
}
