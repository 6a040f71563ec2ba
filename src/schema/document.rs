use super::{Module, Workflow};
use crate::error::DocumentError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Decodes a persisted JSON document.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, DocumentError> {
    Ok(serde_json::from_str(text)?)
}

/// Encodes a value as a pretty-printed JSON document.
pub fn encode<T: Serialize>(value: &T) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(value)?)
}

impl Module {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        decode(text)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        encode(self)
    }
}

impl Workflow {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        decode(text)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        encode(self)
    }
}

/// Load/save boundary for persisted schemas.
pub trait DocumentStore {
    fn load_module(&self, id: &str) -> Result<Module, DocumentError>;
    fn save_module(&self, module: &Module) -> Result<(), DocumentError>;
    fn load_workflow(&self, id: &str) -> Result<Workflow, DocumentError>;
    fn save_workflow(&self, workflow: &Workflow) -> Result<(), DocumentError>;
}

/// Stores each document as `<root>/modules/<id>.json` or
/// `<root>/workflows/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, kind: &str, id: &str) -> PathBuf {
        let file_name: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(kind).join(format!("{}.json", file_name))
    }

    fn read(path: &Path) -> Result<String, DocumentError> {
        fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn write(path: &Path, content: &str) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| DocumentError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl DocumentStore for JsonFileStore {
    fn load_module(&self, id: &str) -> Result<Module, DocumentError> {
        Module::from_json(&Self::read(&self.path_for("modules", id))?)
    }

    fn save_module(&self, module: &Module) -> Result<(), DocumentError> {
        Self::write(&self.path_for("modules", &module.id), &module.to_json()?)
    }

    fn load_workflow(&self, id: &str) -> Result<Workflow, DocumentError> {
        Workflow::from_json(&Self::read(&self.path_for("workflows", id))?)
    }

    fn save_workflow(&self, workflow: &Workflow) -> Result<(), DocumentError> {
        Self::write(&self.path_for("workflows", &workflow.id), &workflow.to_json()?)
    }
}
