//! Value types for modules, fields and workflows.
//!
//! These mirror the persisted document shape. Every editing command produces
//! fresh values of these types; nothing here is mutated once it has been
//! handed to the editor.

pub mod document;
pub mod module;
pub mod value;
pub mod workflow;

pub use document::{DocumentStore, JsonFileStore};
pub use module::{AncestorWalk, Field, FieldOption, Module, ValidationRules, walk_ancestors};
pub use value::Value;
pub use workflow::{
    CONDITION_GROUP_KEY, CONDITION_KEY, ConditionalRule, MODULE_KEY, NodeKind, RuleAction,
    RuleTarget, VisualConnection, VisualNode, Workflow, WorkflowLayout,
};
