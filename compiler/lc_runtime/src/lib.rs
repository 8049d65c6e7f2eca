//! Runtime substrate for the lambdacalc evaluator.
//!
//! - `Store`: the session-scoped versioned object store, handing out
//!   stable handles (`Vid`, `Tid`) for identities (`Id`)
//! - `Value`, `Env`: runtime values and persistent environments
//! - `Expl`, `Match`: recorded derivations and pattern-match records
//! - `DataTypeRegistry`: constructor layout for pattern matching
//! - `UnaryOp`, `BinaryOp`: the fixed primitive tables
//! - `EvalError`: the failure taxonomy shared by evaluation and slicing

mod datatype;
mod environment;
pub mod errors;
mod expl;
mod id;
mod primitives;
mod store;
mod value;

pub use datatype::{CtrInfo, DataType, DataTypeId, DataTypeRegistry};
pub use environment::Env;
pub use errors::{ErrorCategory, EvalError, EvalErrorKind, EvalResult};
pub use expl::{Expl, ExplDef, ExplValue, Match};
pub use id::{FrameId, Id, RecGroupId, Role, Tid, Vid};
pub use primitives::{format_num, BinaryOp, UnaryOp};
pub use store::{Handle, MemoTable, RecGroup, Shaped, Store};
pub use value::{Closure, DataValue, Fields, Value};
