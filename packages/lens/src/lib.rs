//! # xmlens Lens
//!
//! Interprets change and condition statements against an XML tree.
//!
//! A lens is built from two lists of statements. Building parses each one
//! and resolves its path against the document as it stands, producing
//! either a validation (`get`, `match`) or an operation (`add`, `clear`,
//! `rm`, `set`, `sort`). Running the lens checks every validation and, if
//! all of them pass, applies every operation in order.

pub mod error;
pub mod expression;
pub mod lens;
pub mod modification;
pub mod operation;
pub mod path;
pub mod predicate;
pub mod primitives;
pub mod statement;

pub use error::{LensError, LensResult};
pub use expression::{evaluate_expression, Operator, Value};
pub use lens::{Outcome, XmlLens};
pub use modification::Modification;
pub use operation::{Compiled, Operation, Validation};
pub use path::{build_path, collapse_functions, Path, ResolvedPath};
pub use predicate::evaluate_match;
pub use primitives::{SetTarget, SortKey, SortOrder};
pub use statement::{Command, InsertPosition, Statement};
