//! Pattern-match compilation and application.
//!
//! A trie compiles to a `Matcher`: either a variable binder or an
//! elimination table with one optional slot per constructor of the
//! scrutinee's datatype, in the registry's slot order. Tries may cover only
//! some constructors; a value whose constructor has no slot is a pattern
//! mismatch, never a fallthrough.
//!
//! Applying a matcher yields the bindings, the `Match` record used later by
//! the slicing passes, the continuation to run next, and the availability of
//! the match: the meet of the scrutinee's annotation with those of every
//! destructured part.

use std::rc::Rc;

use lc_ir::{Annotation, Args, ArgsId, ExprArena, Kont, Lattice, Name, StringInterner, Trie, TrieId};
use lc_runtime::errors::{
    malformed_trie, pattern_mismatch, too_few_fields, too_many_fields, unknown_constructor,
};
use lc_runtime::{DataTypeId, DataTypeRegistry, Env, EvalResult, Match, Store, Value, Vid};
use rustc_hash::FxHashMap;

use crate::stack::ensure_sufficient_stack;

/// A compiled trie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// Bind the scrutinee to `x`.
    Var { x: Name, kont: Kont },
    /// Dispatch on the constructor; `slots[i]` handles the datatype's
    /// `i`-th constructor.
    Elim {
        datatype: DataTypeId,
        slots: Vec<Option<ArgsId>>,
    },
}

/// Outcome of applying a matcher to a value.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub bindings: Env,
    pub matched: Match,
    pub kont: Kont,
    pub annotation: Annotation,
}

/// Compiles tries on demand and caches them per `TrieId`.
pub struct Matchers<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    registry: &'a DataTypeRegistry,
    cache: FxHashMap<TrieId, Rc<Matcher>>,
}

impl<'a> Matchers<'a> {
    pub fn new(
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        registry: &'a DataTypeRegistry,
    ) -> Self {
        Matchers {
            arena,
            interner,
            registry,
            cache: FxHashMap::default(),
        }
    }

    /// Compile `trie`, reusing an earlier compilation.
    pub fn compile(&mut self, trie: TrieId) -> EvalResult<Rc<Matcher>> {
        if let Some(matcher) = self.cache.get(&trie) {
            return Ok(Rc::clone(matcher));
        }

        let matcher = match self.arena.trie(trie) {
            Trie::Var { x, kont } => Matcher::Var { x: *x, kont: *kont },
            Trie::Constr(branches) => self.compile_elim(branches)?,
        };
        let matcher = Rc::new(matcher);
        self.cache.insert(trie, Rc::clone(&matcher));
        Ok(matcher)
    }

    fn compile_elim(&self, branches: &[(Name, ArgsId)]) -> EvalResult<Matcher> {
        let Some(&(first, _)) = branches.first() else {
            return Err(malformed_trie("constructor pattern without branches"));
        };
        let datatype = self
            .registry
            .datatype_of(first)
            .ok_or_else(|| unknown_constructor(self.interner.lookup(first)))?;

        let mut slots = vec![None; self.registry.datatype(datatype).ctrs.len()];
        for &(ctr, args) in branches {
            let info = self
                .registry
                .ctr(ctr)
                .ok_or_else(|| unknown_constructor(self.interner.lookup(ctr)))?;
            if info.datatype != datatype {
                return Err(pattern_mismatch(
                    self.interner.lookup(ctr),
                    self.datatype_name(datatype),
                ));
            }
            if slots[info.slot].replace(args).is_some() {
                return Err(malformed_trie(&format!(
                    "two branches for {}",
                    self.interner.lookup(ctr)
                )));
            }
        }
        Ok(Matcher::Elim { datatype, slots })
    }

    /// Match `v` against `trie`.
    pub fn apply(&mut self, store: &Store, trie: TrieId, v: Vid) -> EvalResult<MatchResult> {
        let matcher = self.compile(trie)?;
        ensure_sufficient_stack(|| match &*matcher {
            Matcher::Var { x, kont } => Ok(MatchResult {
                bindings: Env::singleton(*x, v),
                matched: Match::Var,
                kont: *kont,
                annotation: Annotation::top(),
            }),
            Matcher::Elim { datatype, slots } => self.apply_elim(store, *datatype, slots, v),
        })
    }

    fn apply_elim(
        &mut self,
        store: &Store,
        datatype: DataTypeId,
        slots: &[Option<ArgsId>],
        v: Vid,
    ) -> EvalResult<MatchResult> {
        let Value::Data(data) = store.value(v) else {
            return Err(pattern_mismatch(
                &store.value(v).shape_name(self.interner),
                self.datatype_name(datatype),
            ));
        };
        let ctr = data.ctr;
        let info = self
            .registry
            .ctr(ctr)
            .ok_or_else(|| unknown_constructor(self.interner.lookup(ctr)))?;
        if info.datatype != datatype {
            return Err(pattern_mismatch(
                self.interner.lookup(ctr),
                self.datatype_name(datatype),
            ));
        }
        let Some(args) = slots[info.slot] else {
            return Err(pattern_mismatch(
                self.interner.lookup(ctr),
                &self.branch_names(datatype, slots),
            ));
        };

        let fields = data.fields.clone();
        let (bindings, arg_matches, kont, annotation) =
            self.apply_args(store, ctr, args, &fields)?;
        Ok(MatchResult {
            bindings,
            matched: Match::Data {
                value: v,
                ctr,
                args: arg_matches,
            },
            kont,
            annotation: store.annotation(v).meet(annotation),
        })
    }

    /// Match constructor fields one trie at a time.
    fn apply_args(
        &mut self,
        store: &Store,
        ctr: Name,
        mut args: ArgsId,
        fields: &[Vid],
    ) -> EvalResult<(Env, Vec<Match>, Kont, Annotation)> {
        let mut bindings = Env::empty();
        let mut matches = Vec::with_capacity(fields.len());
        let mut annotation = Annotation::top();
        let mut rest = fields;
        loop {
            match self.arena.args(args) {
                Args::End(kont) => {
                    if !rest.is_empty() {
                        return Err(too_many_fields(self.interner.lookup(ctr)));
                    }
                    return Ok((bindings, matches, kont, annotation));
                }
                Args::Next(field_trie) => {
                    let Some((&field, tail)) = rest.split_first() else {
                        return Err(too_few_fields(self.interner.lookup(ctr)));
                    };
                    let result = self.apply(store, field_trie, field)?;
                    let Kont::Args(next) = result.kont else {
                        return Err(malformed_trie("field pattern continues with an expression"));
                    };
                    bindings = bindings.concat(&result.bindings);
                    matches.push(result.matched);
                    annotation = annotation.meet(result.annotation);
                    args = next;
                    rest = tail;
                }
            }
        }
    }

    fn datatype_name(&self, datatype: DataTypeId) -> &'static str {
        self.interner.lookup(self.registry.datatype(datatype).name)
    }

    /// Constructors the matcher has branches for, for mismatch messages.
    fn branch_names(&self, datatype: DataTypeId, slots: &[Option<ArgsId>]) -> String {
        self.registry
            .datatype(datatype)
            .ctrs
            .iter()
            .zip(slots)
            .filter(|(_, slot)| slot.is_some())
            .map(|(&ctr, _)| self.interner.lookup(ctr))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}
