//! Annotation lattice for availability (forward) and demand (backward).
//!
//! Forward slicing reads annotations as "this input is available" and
//! combines them with `meet`: a rule's result is available only when every
//! dependency is. Backward slicing reads them as "this output is needed" and
//! accumulates with `join`, so a node visited along several paths keeps the
//! strongest demand it has seen.

use std::fmt;

/// A bounded lattice of annotations.
///
/// Implementations must make `meet` and `join` associative, commutative and
/// idempotent, with `top` the unit of `meet` and `bot` the unit of `join`.
pub trait Lattice: Copy + Eq + fmt::Debug {
    /// Fully present / fully needed.
    fn top() -> Self;

    /// Absent / not needed.
    fn bot() -> Self;

    /// Conjunction: all of these must hold.
    #[must_use]
    fn meet(self, other: Self) -> Self;

    /// Accumulation: any of these makes it hold.
    #[must_use]
    fn join(self, other: Self) -> Self;

    /// Lattice order.
    fn leq(self, other: Self) -> bool {
        self.join(other) == other
    }

    /// Meet of any number of operands; `top` when there are none.
    fn meet_all<I: IntoIterator<Item = Self>>(annotations: I) -> Self {
        annotations.into_iter().fold(Self::top(), Self::meet)
    }

    /// Join of any number of operands; `bot` when there are none.
    fn join_all<I: IntoIterator<Item = Self>>(annotations: I) -> Self {
        annotations.into_iter().fold(Self::bot(), Self::join)
    }

    fn is_top(self) -> bool {
        self == Self::top()
    }

    fn is_bot(self) -> bool {
        self == Self::bot()
    }
}

/// The two-point annotation lattice `Bot < Top`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Annotation {
    Bot,
    Top,
}

impl Lattice for Annotation {
    #[inline]
    fn top() -> Self {
        Annotation::Top
    }

    #[inline]
    fn bot() -> Self {
        Annotation::Bot
    }

    #[inline]
    fn meet(self, other: Self) -> Self {
        match (self, other) {
            (Annotation::Top, Annotation::Top) => Annotation::Top,
            _ => Annotation::Bot,
        }
    }

    #[inline]
    fn join(self, other: Self) -> Self {
        match (self, other) {
            (Annotation::Bot, Annotation::Bot) => Annotation::Bot,
            _ => Annotation::Top,
        }
    }
}

impl From<bool> for Annotation {
    fn from(b: bool) -> Self {
        if b {
            Annotation::Top
        } else {
            Annotation::Bot
        }
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Bot => write!(f, "⊥"),
            Annotation::Top => write!(f, "⊤"),
        }
    }
}

#[cfg(test)]
mod tests;
