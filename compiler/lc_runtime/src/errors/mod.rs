//! Error types for evaluation and slicing.
//!
//! `EvalErrorKind` carries the structured data of each failure; the factory
//! functions below are the public way to build an `EvalError` and keep
//! `message` in sync with the kind's `Display` output.
//!
//! Every error is fatal for the call that raised it. Nothing in the
//! evaluator retries or recovers.

use lc_ir::ExprId;

/// Result of an evaluation step.
pub type EvalResult<T> = Result<T, EvalError>;

/// Which part of the failure taxonomy an error belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unbound variable, unregistered constructor or primitive.
    Lookup,
    /// Applying a non-function, non-primitive operands, pattern mismatch.
    Shape,
    /// Too few or too many constructor fields.
    Arity,
    /// Internal consistency failures; unreachable from well-formed input.
    Invariant,
    /// Raised inside a primitive operation.
    Primitive,
}

/// Typed error category for structured diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Lookup
    #[error("variable \"{name}\" not found")]
    UndefinedVariable { name: String },
    #[error("no such constructor: \"{name}\"")]
    UnknownConstructor { name: String },
    #[error("no implementation found for primitive \"{name}\"")]
    UnknownPrimitive { name: String },
    #[error("binary primitive \"{name}\" not found")]
    UnknownBinaryOp { name: String },

    // Shape
    #[error("cannot apply {found}")]
    NotCallable { found: String },
    #[error("applying \"{op}\" to non-primitive value {found}")]
    NonPrimitiveOperand { op: String, found: String },
    #[error("pattern mismatch: found {found}, expected {expected}")]
    PatternMismatch { found: String, expected: String },

    // Arity
    #[error("too many arguments to constructor {ctr}")]
    TooManyFields { ctr: String },
    #[error("too few arguments to constructor {ctr}")]
    TooFewFields { ctr: String },
    #[error("constructor {ctr} expects {expected} arguments, got {got}")]
    ConstructorArity {
        ctr: String,
        expected: usize,
        got: usize,
    },

    // Invariant
    #[error("cannot reclassify {id} from {existing} to {requested}")]
    Reclassify {
        id: String,
        existing: String,
        requested: String,
    },
    #[error("malformed recursive definition group: {reason}")]
    MalformedRecGroup { reason: String },
    #[error("malformed pattern: {reason}")]
    MalformedTrie { reason: String },
    #[error("duplicate constructor \"{name}\"")]
    DuplicateConstructor { name: String },
    #[error("value {id} has no explanation")]
    MissingExplanation { id: String },
    #[error("too many {what} in one session")]
    CapacityExceeded { what: String },

    // Primitive
    #[error("\"{op}\" expects {expected}, got {found}")]
    PrimitiveTypeMismatch {
        op: String,
        expected: String,
        found: String,
    },
    #[error("LambdaCalc error:\n{message}")]
    UserError { message: String },
}

impl EvalErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UndefinedVariable { .. }
            | Self::UnknownConstructor { .. }
            | Self::UnknownPrimitive { .. }
            | Self::UnknownBinaryOp { .. } => ErrorCategory::Lookup,
            Self::NotCallable { .. }
            | Self::NonPrimitiveOperand { .. }
            | Self::PatternMismatch { .. } => ErrorCategory::Shape,
            Self::TooManyFields { .. }
            | Self::TooFewFields { .. }
            | Self::ConstructorArity { .. } => ErrorCategory::Arity,
            Self::Reclassify { .. }
            | Self::MalformedRecGroup { .. }
            | Self::MalformedTrie { .. }
            | Self::DuplicateConstructor { .. }
            | Self::MissingExplanation { .. }
            | Self::CapacityExceeded { .. } => ErrorCategory::Invariant,
            Self::PrimitiveTypeMismatch { .. } | Self::UserError { .. } => {
                ErrorCategory::Primitive
            }
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Expression being evaluated when the error was raised, if known.
    pub expr: Option<ExprId>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            expr: None,
        }
    }

    /// Attach the expression at which the error was raised. The innermost
    /// expression wins.
    #[must_use]
    pub fn with_expr(mut self, expr: ExprId) -> Self {
        self.expr.get_or_insert(expr);
        self
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

// Lookup Errors

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_constructor(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownConstructor {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_primitive(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownPrimitive {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_binary_op(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownBinaryOp {
        name: name.to_string(),
    })
}

// Shape Errors

#[cold]
pub fn not_callable(found: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        found: found.to_string(),
    })
}

#[cold]
pub fn non_primitive_operand(op: &str, found: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonPrimitiveOperand {
        op: op.to_string(),
        found: found.to_string(),
    })
}

/// The scrutinee's shape is not one the pattern can handle.
#[cold]
pub fn pattern_mismatch(found: &str, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PatternMismatch {
        found: found.to_string(),
        expected: expected.to_string(),
    })
}

// Arity Errors

#[cold]
pub fn too_many_fields(ctr: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyFields {
        ctr: ctr.to_string(),
    })
}

#[cold]
pub fn too_few_fields(ctr: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooFewFields {
        ctr: ctr.to_string(),
    })
}

#[cold]
pub fn constructor_arity(ctr: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstructorArity {
        ctr: ctr.to_string(),
        expected,
        got,
    })
}

// Invariant Violations

#[cold]
pub fn reclassify(id: &str, existing: &str, requested: &str) -> EvalError {
    tracing::warn!(id, existing, requested, "identity reused with a different shape");
    EvalError::from_kind(EvalErrorKind::Reclassify {
        id: id.to_string(),
        existing: existing.to_string(),
        requested: requested.to_string(),
    })
}

#[cold]
pub fn malformed_rec_group(reason: &str) -> EvalError {
    tracing::warn!(reason, "malformed recursive definition group");
    EvalError::from_kind(EvalErrorKind::MalformedRecGroup {
        reason: reason.to_string(),
    })
}

#[cold]
pub fn malformed_trie(reason: &str) -> EvalError {
    tracing::warn!(reason, "malformed pattern");
    EvalError::from_kind(EvalErrorKind::MalformedTrie {
        reason: reason.to_string(),
    })
}

#[cold]
pub fn duplicate_constructor(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateConstructor {
        name: name.to_string(),
    })
}

#[cold]
pub fn missing_explanation(id: &str) -> EvalError {
    tracing::warn!(id, "slicing reached a value without an explanation");
    EvalError::from_kind(EvalErrorKind::MissingExplanation { id: id.to_string() })
}

#[cold]
pub fn capacity_exceeded(what: &str) -> EvalError {
    tracing::warn!(what, "id space exhausted");
    EvalError::from_kind(EvalErrorKind::CapacityExceeded {
        what: what.to_string(),
    })
}

// Primitive Errors

#[cold]
pub fn primitive_type_mismatch(op: &str, expected: &str, found: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PrimitiveTypeMismatch {
        op: op.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

/// Raised by the `error` primitive.
#[cold]
pub fn user_error(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UserError {
        message: message.to_string(),
    })
}
