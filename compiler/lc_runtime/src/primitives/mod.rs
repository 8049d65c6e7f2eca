//! Primitive operations.
//!
//! Both tables are fixed and keyed by name. Unary primitives are
//! first-class: a `prim` definition binds one to a variable and it is
//! applied like a closure. Binary primitives are syntax only.
//!
//! Operations return a bare `Value`; the evaluator places it at the
//! identity of the application that produced it.

use lc_ir::StringInterner;

use crate::errors::{primitive_type_mismatch, user_error, EvalResult};
use crate::Value;

/// First-class unary primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Ceiling,
    Error,
    Floor,
    Log,
    NumToStr,
    Trace,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 6] = [
        UnaryOp::Ceiling,
        UnaryOp::Error,
        UnaryOp::Floor,
        UnaryOp::Log,
        UnaryOp::NumToStr,
        UnaryOp::Trace,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Ceiling => "ceiling",
            UnaryOp::Error => "error",
            UnaryOp::Floor => "floor",
            UnaryOp::Log => "log",
            UnaryOp::NumToStr => "numToStr",
            UnaryOp::Trace => "trace",
        }
    }

    /// Apply to a number or string.
    pub fn apply(self, arg: &Value, interner: &StringInterner) -> EvalResult<Value> {
        match (self, arg) {
            (UnaryOp::Ceiling, Value::Num(x)) => Ok(Value::Num(x.ceil())),
            (UnaryOp::Floor, Value::Num(x)) => Ok(Value::Num(x.floor())),
            (UnaryOp::Log, Value::Num(x)) => Ok(Value::Num(x.ln())),
            (UnaryOp::NumToStr, Value::Num(x)) => {
                Ok(Value::Str(interner.intern(&format_num(*x))))
            }
            (UnaryOp::Error, Value::Str(message)) => Err(user_error(interner.lookup(*message))),
            (UnaryOp::Trace, Value::Num(x)) => {
                tracing::info!(value = *x, "trace");
                Ok(arg.clone())
            }
            (UnaryOp::Trace, Value::Str(s)) => {
                tracing::info!(value = interner.lookup(*s), "trace");
                Ok(arg.clone())
            }
            (UnaryOp::Error, other) => Err(primitive_type_mismatch(
                self.name(),
                "Str",
                other.type_name(),
            )),
            (_, other) => Err(primitive_type_mismatch(
                self.name(),
                "Num",
                other.type_name(),
            )),
        }
    }
}

/// Binary primitives, applied with infix syntax.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Minus,
    Plus,
    Times,
    Pow,
    Div,
    EqualInt,
    EqualStr,
    Greater,
    GreaterEq,
    GreaterEqStr,
    Less,
    LessEq,
    LessEqStr,
    Concat,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 14] = [
        BinaryOp::Minus,
        BinaryOp::Plus,
        BinaryOp::Times,
        BinaryOp::Pow,
        BinaryOp::Div,
        BinaryOp::EqualInt,
        BinaryOp::EqualStr,
        BinaryOp::Greater,
        BinaryOp::GreaterEq,
        BinaryOp::GreaterEqStr,
        BinaryOp::Less,
        BinaryOp::LessEq,
        BinaryOp::LessEqStr,
        BinaryOp::Concat,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Minus => "-",
            BinaryOp::Plus => "+",
            BinaryOp::Times => "*",
            BinaryOp::Pow => "**",
            BinaryOp::Div => "/",
            BinaryOp::EqualInt => "==",
            BinaryOp::EqualStr => "===",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::GreaterEqStr => ">==",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::LessEqStr => "<==",
            BinaryOp::Concat => "++",
        }
    }

    fn takes_strings(self) -> bool {
        matches!(
            self,
            BinaryOp::EqualStr | BinaryOp::GreaterEqStr | BinaryOp::LessEqStr | BinaryOp::Concat
        )
    }

    /// Apply to two numbers or two strings, depending on the operator.
    pub fn apply(
        self,
        left: &Value,
        right: &Value,
        interner: &StringInterner,
    ) -> EvalResult<Value> {
        let value = match (self, left, right) {
            (BinaryOp::Minus, Value::Num(a), Value::Num(b)) => Value::Num(a - b),
            (BinaryOp::Plus, Value::Num(a), Value::Num(b)) => Value::Num(a + b),
            (BinaryOp::Times, Value::Num(a), Value::Num(b)) => Value::Num(a * b),
            (BinaryOp::Pow, Value::Num(a), Value::Num(b)) => Value::Num(a.powf(*b)),
            (BinaryOp::Div, Value::Num(a), Value::Num(b)) => Value::Num(a / b),
            (BinaryOp::EqualInt, Value::Num(a), Value::Num(b)) => bool_value(a == b, interner),
            (BinaryOp::Greater, Value::Num(a), Value::Num(b)) => bool_value(a > b, interner),
            (BinaryOp::GreaterEq, Value::Num(a), Value::Num(b)) => bool_value(a >= b, interner),
            (BinaryOp::Less, Value::Num(a), Value::Num(b)) => bool_value(a < b, interner),
            (BinaryOp::LessEq, Value::Num(a), Value::Num(b)) => bool_value(a <= b, interner),
            // Interned, so equal names are equal strings.
            (BinaryOp::EqualStr, Value::Str(a), Value::Str(b)) => bool_value(a == b, interner),
            (BinaryOp::GreaterEqStr, Value::Str(a), Value::Str(b)) => {
                bool_value(interner.lookup(*a) >= interner.lookup(*b), interner)
            }
            (BinaryOp::LessEqStr, Value::Str(a), Value::Str(b)) => {
                bool_value(interner.lookup(*a) <= interner.lookup(*b), interner)
            }
            (BinaryOp::Concat, Value::Str(a), Value::Str(b)) => {
                let joined = format!("{}{}", interner.lookup(*a), interner.lookup(*b));
                Value::Str(interner.intern(&joined))
            }
            _ => {
                let expected = if self.takes_strings() { "Str" } else { "Num" };
                let found = if left.type_name() == expected {
                    right
                } else {
                    left
                };
                return Err(primitive_type_mismatch(
                    self.symbol(),
                    expected,
                    found.type_name(),
                ));
            }
        };
        Ok(value)
    }
}

/// `True` or `False` of the prelude `Bool`.
fn bool_value(b: bool, interner: &StringInterner) -> Value {
    let ctr = interner.intern(if b { "True" } else { "False" });
    Value::data(ctr, [])
}

/// Render a number the way the surface language prints it: integral values
/// without a fractional part, exponent notation (`1e+21`, `1.5e-7`) outside
/// `1e-6 <= |x| < 1e21`, and a single unsigned zero.
pub fn format_num(x: f64) -> String {
    if x.is_infinite() {
        let text = if x > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if x == 0.0 {
        "0".to_string()
    } else if x.abs() >= 1e21 || x.abs() < 1e-6 {
        let text = format!("{x:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        x.to_string()
    }
}
