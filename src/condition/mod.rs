//! Recursive boolean conditions and their rule-builder editing shape.
//!
//! `Condition` is the canonical, persisted form. `ConditionGroup` is what the
//! rule builder edits; `ConditionGroup::canonicalize` and
//! `ConditionGroup::expand` convert between the two.

mod formatter;
pub mod group;
pub mod model;

pub use group::{ConditionGroup, ConditionRow, ValueHint, parse_value};
pub use model::{Condition, ConditionOperator, LogicalOp};
