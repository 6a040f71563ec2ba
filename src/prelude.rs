//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the formflow crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use formflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let workflow = Workflow::from_json(&std::fs::read_to_string("path/to/workflow.json")?)?;
//! let compiled = GraphCompiler::default().compile(&workflow);
//!
//! for rule in &compiled.workflow.workflow_rules {
//!     println!("{} -> {}: {}", rule.id, rule.target(), rule.condition);
//! }
//! # Ok(())
//! # }
//! ```

// Editor surface
pub use crate::config::EditorConfig;
pub use crate::editor::{
    ChangeEvent, Command, CommandKind, EditorSnapshot, EditorStateController, Notice, NoticeLevel,
    NotificationSink,
};
pub use crate::hierarchy::{Direction, FieldPatch};

// Schema model
pub use crate::schema::{
    ConditionalRule, DocumentStore, Field, JsonFileStore, Module, NodeKind, RuleAction, RuleTarget,
    Value, VisualConnection, VisualNode, Workflow, WorkflowLayout,
};

// Conditions
pub use crate::condition::{
    Condition, ConditionGroup, ConditionOperator, ConditionRow, LogicalOp,
};

// Validation
pub use crate::validation::{
    FieldTypeRegistry, Severity, StandardFieldTypes, ValidationEngine, ValidationIssue,
};

// Graph compilation
pub use crate::compiler::{CompiledWorkflow, DiagramExport, GraphCompiler, IntoLayout};

// Error types
pub use crate::error::{CommandError, DocumentError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
