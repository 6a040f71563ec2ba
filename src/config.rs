use crate::error::ConfigError;
use crate::history::DEFAULT_CAPACITY;
use serde::Deserialize;
use std::fs;

/// Tunables for the editor controller. Every key is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Number of snapshots kept for undo.
    pub history_capacity: usize,
    /// Prepended to labels by duplicate and paste.
    pub copy_label_prefix: String,
    /// Joins the field type and numeric suffix in generated ids.
    pub id_separator: String,
    pub mirror_to_system_clipboard: bool,
    /// Select the field produced by add, duplicate and paste.
    pub select_new_fields: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            copy_label_prefix: "Copy of ".to_string(),
            id_separator: "_".to_string(),
            mirror_to_system_clipboard: true,
            select_new_fields: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_copy_label_prefix(mut self, prefix: &str) -> Self {
        self.copy_label_prefix = prefix.to_string();
        self
    }

    pub fn with_id_separator(mut self, separator: &str) -> Self {
        self.id_separator = separator.to_string();
        self
    }

    pub fn with_system_clipboard_mirror(mut self, enabled: bool) -> Self {
        self.mirror_to_system_clipboard = enabled;
        self
    }

    pub fn with_select_new_fields(mut self, enabled: bool) -> Self {
        self.select_new_fields = enabled;
        self
    }
}
