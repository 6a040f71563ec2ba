use crate::condition::ConditionGroup;
use crate::hierarchy::{Direction, FieldPatch};
use crate::schema::NodeKind;
use serde::{Deserialize, Serialize};

/// The controller's command surface as data, e.g. for replaying a recorded
/// editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    AddField {
        field_type: String,
        #[serde(default)]
        parent_id: Option<String>,
    },
    DeleteField {
        field_id: String,
    },
    DuplicateField {
        field_id: String,
    },
    MoveField {
        field_id: String,
        direction: Direction,
    },
    ChangeFieldParent {
        field_id: String,
        #[serde(default)]
        new_parent_id: Option<String>,
    },
    UpdateField {
        field_id: String,
        patch: FieldPatch,
    },
    SelectField {
        #[serde(default)]
        field_id: Option<String>,
    },
    Copy {
        field_id: String,
    },
    Paste {
        #[serde(default)]
        parent_id: Option<String>,
    },
    Undo,
    Redo,
    RefreshValidation,
    CompileGraph,
    AddNode {
        kind: NodeKind,
        x: f64,
        y: f64,
        #[serde(default)]
        data: serde_json::Value,
    },
    RemoveNode {
        node_id: String,
    },
    MoveNode {
        node_id: String,
        x: f64,
        y: f64,
    },
    Connect {
        source_node_id: String,
        target_node_id: String,
    },
    Disconnect {
        source_node_id: String,
        target_node_id: String,
    },
    SetDecisionCondition {
        node_id: String,
        group: ConditionGroup,
    },
}

/// Which command produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddField,
    DeleteField,
    DuplicateField,
    MoveField,
    ChangeFieldParent,
    UpdateField,
    SelectField,
    Copy,
    Paste,
    Undo,
    Redo,
    RefreshValidation,
    CompileGraph,
    AddNode,
    RemoveNode,
    MoveNode,
    Connect,
    Disconnect,
    SetDecisionCondition,
    LoadModule,
    LoadWorkflow,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::AddField { .. } => CommandKind::AddField,
            Command::DeleteField { .. } => CommandKind::DeleteField,
            Command::DuplicateField { .. } => CommandKind::DuplicateField,
            Command::MoveField { .. } => CommandKind::MoveField,
            Command::ChangeFieldParent { .. } => CommandKind::ChangeFieldParent,
            Command::UpdateField { .. } => CommandKind::UpdateField,
            Command::SelectField { .. } => CommandKind::SelectField,
            Command::Copy { .. } => CommandKind::Copy,
            Command::Paste { .. } => CommandKind::Paste,
            Command::Undo => CommandKind::Undo,
            Command::Redo => CommandKind::Redo,
            Command::RefreshValidation => CommandKind::RefreshValidation,
            Command::CompileGraph => CommandKind::CompileGraph,
            Command::AddNode { .. } => CommandKind::AddNode,
            Command::RemoveNode { .. } => CommandKind::RemoveNode,
            Command::MoveNode { .. } => CommandKind::MoveNode,
            Command::Connect { .. } => CommandKind::Connect,
            Command::Disconnect { .. } => CommandKind::Disconnect,
            Command::SetDecisionCondition { .. } => CommandKind::SetDecisionCondition,
        }
    }
}
