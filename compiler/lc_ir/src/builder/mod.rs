//! Programmatic construction of programs.
//!
//! There is no parser; tests and embedders build syntax through
//! `ExprBuilder`, which interns names and allocates nodes in one step.

use crate::{
    Args, ArgsId, Def, ExprArena, ExprId, ExprKind, Kont, Name, RecDef, StringInterner, Trie,
    TrieId,
};

/// Builds expressions, definitions and tries into an `ExprArena`.
pub struct ExprBuilder<'a> {
    arena: &'a mut ExprArena,
    interner: &'a StringInterner,
}

impl<'a> ExprBuilder<'a> {
    pub fn new(arena: &'a mut ExprArena, interner: &'a StringInterner) -> Self {
        ExprBuilder { arena, interner }
    }

    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    // Expressions

    pub fn num(&mut self, n: f64) -> ExprId {
        self.arena.alloc_expr(ExprKind::Num(n))
    }

    pub fn str(&mut self, s: &str) -> ExprId {
        let s = self.name(s);
        self.arena.alloc_expr(ExprKind::Str(s))
    }

    pub fn var(&mut self, x: &str) -> ExprId {
        let x = self.name(x);
        self.arena.alloc_expr(ExprKind::Var(x))
    }

    pub fn app(&mut self, func: ExprId, arg: ExprId) -> ExprId {
        self.arena.alloc_expr(ExprKind::App { func, arg })
    }

    /// Curried application `f a1 ... an`.
    pub fn apps(&mut self, func: ExprId, args: &[ExprId]) -> ExprId {
        args.iter().fold(func, |f, &a| self.app(f, a))
    }

    pub fn binary(&mut self, op: &str, left: ExprId, right: ExprId) -> ExprId {
        let op = self.name(op);
        self.arena.alloc_expr(ExprKind::BinaryApp { op, left, right })
    }

    pub fn constr(&mut self, ctr: &str, args: &[ExprId]) -> ExprId {
        let ctr = self.name(ctr);
        let args = self.arena.alloc_expr_list(args.iter().copied());
        self.arena.alloc_expr(ExprKind::Constr { ctr, args })
    }

    /// A prelude list literal, `Cons(e1, Cons(..., Nil))`.
    pub fn list(&mut self, elems: &[ExprId]) -> ExprId {
        let nil = self.constr("Nil", &[]);
        elems
            .iter()
            .rev()
            .fold(nil, |tail, &head| self.constr("Cons", &[head, tail]))
    }

    pub fn fun(&mut self, trie: TrieId) -> ExprId {
        self.arena.alloc_expr(ExprKind::Fun(trie))
    }

    /// `fun x -> body`
    pub fn lambda(&mut self, x: &str, body: ExprId) -> ExprId {
        let trie = self.var_trie(x, Kont::Expr(body));
        self.fun(trie)
    }

    pub fn match_as(&mut self, scrutinee: ExprId, trie: TrieId) -> ExprId {
        self.arena.alloc_expr(ExprKind::MatchAs { scrutinee, trie })
    }

    pub fn defs(&mut self, defs: Vec<Def>, body: ExprId) -> ExprId {
        let defs = self.arena.alloc_defs(defs);
        self.arena.alloc_expr(ExprKind::Defs { defs, body })
    }

    // Definitions

    pub fn let_(&mut self, x: &str, e: ExprId) -> Def {
        let x = self.name(x);
        Def::Let {
            x: self.arena.alloc_binder(x),
            e,
        }
    }

    pub fn prim(&mut self, x: &str) -> Def {
        let x = self.name(x);
        Def::Prim {
            x: self.arena.alloc_binder(x),
        }
    }

    pub fn letrec(&mut self, group: Vec<(&str, TrieId)>) -> Def {
        let defs = group
            .into_iter()
            .map(|(f, trie)| {
                let f = self.name(f);
                RecDef {
                    x: self.arena.alloc_binder(f),
                    trie,
                }
            })
            .collect();
        Def::LetRec(defs)
    }

    // Tries

    pub fn var_trie(&mut self, x: &str, kont: Kont) -> TrieId {
        let x = self.name(x);
        self.arena.alloc_trie(Trie::Var { x, kont })
    }

    pub fn constr_trie(&mut self, branches: Vec<(Name, ArgsId)>) -> TrieId {
        self.arena.alloc_trie(Trie::Constr(branches))
    }

    pub fn args_end(&mut self, kont: Kont) -> ArgsId {
        self.arena.alloc_args(Args::End(kont))
    }

    pub fn args_next(&mut self, field: TrieId) -> ArgsId {
        self.arena.alloc_args(Args::Next(field))
    }

    /// One branch `C(x1, ..., xn) -> body` whose fields are all variables.
    pub fn branch(&mut self, ctr: &str, vars: &[&str], body: ExprId) -> (Name, ArgsId) {
        let ctr = self.name(ctr);
        let mut args = self.args_end(Kont::Expr(body));
        for var in vars.iter().rev() {
            let field = self.var_trie(var, Kont::Args(args));
            args = self.args_next(field);
        }
        (ctr, args)
    }

    /// A constructor trie from branches made with `branch`.
    pub fn case(&mut self, branches: Vec<(Name, ArgsId)>) -> TrieId {
        self.constr_trie(branches)
    }
}
