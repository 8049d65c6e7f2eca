//! Runtime values.
//!
//! A `Value` is the payload of a versioned slot in the store. Its identity,
//! annotation and explanation live in the slot, not here, so two slots may
//! hold equal payloads and still be different objects.

use lc_ir::{Name, StringInterner, TrieId};
use smallvec::SmallVec;

use crate::{Env, RecGroupId, UnaryOp, Vid};

/// Constructor fields, inline up to four.
pub type Fields = SmallVec<[Vid; 4]>;

/// A function value.
///
/// The captured environment does not include the closure's own recursive
/// group; callers close it again from `group` on every application.
#[derive(Clone, Debug, PartialEq)]
pub struct Closure {
    pub env: Env,
    pub group: Option<RecGroupId>,
    pub trie: TrieId,
}

/// Instance of a datatype constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct DataValue {
    pub ctr: Name,
    pub fields: Fields,
}

/// Runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Num(f64),
    /// Interned string content.
    Str(Name),
    Closure(Closure),
    Data(DataValue),
    /// A first-class unary primitive.
    UnaryOp(UnaryOp),
}

impl Value {
    pub fn data(ctr: Name, fields: impl IntoIterator<Item = Vid>) -> Self {
        Value::Data(DataValue {
            ctr,
            fields: fields.into_iter().collect(),
        })
    }

    /// Name of the runtime type, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "Num",
            Value::Str(_) => "Str",
            Value::Closure(_) => "Closure",
            Value::Data(_) => "Data",
            Value::UnaryOp(_) => "UnaryOp",
        }
    }

    /// Type name with the constructor spelled out for data values.
    pub fn shape_name(&self, interner: &StringInterner) -> String {
        match self {
            Value::Data(d) => interner.lookup(d.ctr).to_string(),
            other => other.type_name().to_string(),
        }
    }

    /// Whether both payloads have the same runtime class.
    ///
    /// Every constructor is its own class, so data values agree only when
    /// their constructors do.
    pub fn same_shape(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Data(a), Value::Data(b)) => a.ctr == b.ctr,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    /// Numbers and strings, the operands primitives accept.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Num(_) | Value::Str(_))
    }

    /// Values this one refers to directly.
    pub fn fields(&self) -> &[Vid] {
        match self {
            Value::Data(d) => d.fields.as_slice(),
            _ => &[],
        }
    }
}
