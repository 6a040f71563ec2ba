use crate::editor::NoticeLevel;
use crate::hierarchy::Direction;
use thiserror::Error;

/// Reasons a command is refused before any mutation happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Field '{0}' does not exist in the module")]
    FieldNotFound(String),

    #[error("Cannot attach field '{field_id}': parent '{parent_id}' does not exist")]
    ParentNotFound { field_id: String, parent_id: String },

    #[error("Field '{0}' cannot be its own parent")]
    SelfParent(String),

    #[error(
        "Moving field '{field_id}' under '{parent_id}' would create a circular parent reference"
    )]
    CyclicParent { field_id: String, parent_id: String },

    #[error("Field type '{0}' is not registered")]
    UnknownFieldType(String),

    #[error("Field '{field_id}' cannot move {direction}: it is already at the edge of its group")]
    AlreadyAtBoundary {
        field_id: String,
        direction: Direction,
    },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("The clipboard is empty")]
    ClipboardEmpty,

    #[error("No workflow is loaded")]
    NoWorkflow,

    #[error("Node '{0}' does not exist in the workflow layout")]
    NodeNotFound(String),

    #[error("Node '{0}' is not a decision node")]
    NotADecisionNode(String),

    #[error("There is no connection from '{source_id}' to '{target_id}'")]
    ConnectionNotFound { source_id: String, target_id: String },
}

impl CommandError {
    /// The level at which this rejection is reported to the user.
    pub fn level(&self) -> NoticeLevel {
        match self {
            CommandError::AlreadyAtBoundary { .. } => NoticeLevel::Info,
            CommandError::FieldNotFound(_)
            | CommandError::NothingToUndo
            | CommandError::NothingToRedo
            | CommandError::ClipboardEmpty => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        }
    }
}

/// Errors raised by the bounded snapshot history.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

impl From<HistoryError> for CommandError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NothingToUndo => CommandError::NothingToUndo,
            HistoryError::NothingToRedo => CommandError::NothingToRedo,
        }
    }
}

/// Errors that can occur while reading or writing persisted schema documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

/// Errors that can occur while loading an `EditorConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse editor configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read editor configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures on the OS clipboard side channel. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("System clipboard is unavailable")]
    Unavailable,

    #[error("Permission to access the system clipboard was denied")]
    PermissionDenied,

    #[error("System clipboard error: {0}")]
    Backend(String),
}

/// Errors that can occur when converting a foreign diagram format into a
/// `WorkflowLayout`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutConversionError {
    #[error("Node '{node_id}' has an unsupported type '{type_name}'")]
    UnsupportedNodeType { node_id: String, type_name: String },

    #[error("Connection references unknown node '{0}'")]
    DanglingConnection(String),

    #[error("Invalid diagram: {0}")]
    Invalid(String),
}
