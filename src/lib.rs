//! # Formflow - Form Schema Editing and Workflow Graph Compilation
//!
//! **Formflow** is the engine behind a visual form and workflow designer. It keeps
//! an editable module of hierarchical fields, validates it, records every change
//! in a bounded undo history, and compiles a drawn workflow diagram into module
//! order and branching rules.
//!
//! ## Core Workflow
//!
//! 1.  **Load a document**: Decode a `Module` (and optionally a `Workflow`) from JSON,
//!     or build one in code.
//! 2.  **Edit through the controller**: `EditorStateController` is the single command
//!     surface. Every accepted command produces a fresh immutable snapshot, re-runs
//!     validation and notifies subscribers.
//! 3.  **Author conditions**: Decision nodes carry a `ConditionGroup` built in the rule
//!     editor; it is canonicalized into a `Condition` tree before storage.
//! 4.  **Compile the graph**: `GraphCompiler` recomputes `moduleIds` and `workflowRules`
//!     from the layout. Diagrams from other editors enter through `IntoLayout`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let module = Module::new("intake", "Patient intake");
//!     let mut editor = EditorStateController::new(module);
//!
//!     let section = editor.add_field("section", None)?;
//!     let name = editor.add_field("text", Some(section.as_str()))?;
//!     editor.add_field("dropdown", Some(section.as_str()))?;
//!
//!     for issue in editor.issues() {
//!         println!("{}", issue);
//!     }
//!
//!     editor.delete_field(&section)?;
//!     assert!(editor.module().field(&name).is_none());
//!
//!     editor.undo()?;
//!     assert!(editor.module().field(&name).is_some());
//!     Ok(())
//! }
//! ```

pub mod clipboard;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod editor;
pub mod error;
pub mod hierarchy;
pub mod history;
pub mod prelude;
pub mod schema;
pub mod validation;
