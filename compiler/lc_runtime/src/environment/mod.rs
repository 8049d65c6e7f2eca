//! Persistent environments.
//!
//! An environment is a snoc-list of `(Name, Vid)` bindings sharing structure
//! through `Rc`. Later bindings shadow earlier ones with the same name. Every
//! operation returns a new environment; existing ones are never modified, so
//! closures can capture an environment by cloning the handle.

use std::fmt;
use std::rc::Rc;

use lc_ir::Name;

use crate::Vid;

struct Binding {
    name: Name,
    value: Vid,
    prev: Env,
    len: usize,
}

/// An immutable, shareable variable environment.
#[derive(Clone, Default)]
pub struct Env(Option<Rc<Binding>>);

impl Env {
    pub fn empty() -> Self {
        Env(None)
    }

    pub fn singleton(name: Name, value: Vid) -> Self {
        Env::empty().extend(name, value)
    }

    /// This environment with one more binding at the end.
    #[must_use]
    pub fn extend(&self, name: Name, value: Vid) -> Self {
        Env(Some(Rc::new(Binding {
            name,
            value,
            prev: self.clone(),
            len: self.len() + 1,
        })))
    }

    /// Right-biased union: bindings of `other` shadow those of `self`.
    #[must_use]
    pub fn concat(&self, other: &Env) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        other
            .entries()
            .into_iter()
            .fold(self.clone(), |env, (name, value)| env.extend(name, value))
    }

    /// The most recent binding of `name`.
    pub fn lookup(&self, name: Name) -> Option<Vid> {
        self.iter()
            .find(|&(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// Bindings from newest to oldest, shadowed ones included.
    pub fn iter(&self) -> impl Iterator<Item = (Name, Vid)> + '_ {
        let mut cursor = self.0.as_deref();
        std::iter::from_fn(move || {
            let binding = cursor?;
            cursor = binding.prev.0.as_deref();
            Some((binding.name, binding.value))
        })
    }

    /// Bindings in the order they were made.
    pub fn entries(&self) -> Vec<(Name, Vid)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.reverse();
        entries
    }

    /// Bound values in binding order.
    pub fn values(&self) -> Vec<Vid> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |b| b.len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Env {}
