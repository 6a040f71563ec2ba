//! Structural and field-level checks over a module.
//!
//! The engine is read-only: it scans a `Module` and returns a flat list of
//! issues. Four passes run every time, in a fixed order: duplicate ids,
//! orphaned parents, circular parent chains, then per-field checks driven by
//! the field-type registry contract.

use crate::condition::ConditionGroup;
use crate::schema::{AncestorWalk, Field, Module, walk_ancestors};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod registry;

pub use registry::{FieldTypeContract, FieldTypeRegistry, StandardFieldTypes, ValueKind};

/// `typeConfig` key referencing an external option set.
pub const OPTION_SET_KEY: &str = "codeSetId";
/// `typeConfig` key declaring an external data dependency.
pub const DATA_SOURCE_KEY: &str = "dataSource";
/// `typeConfig` key naming the external data source.
pub const DATA_SOURCE_ID_KEY: &str = "dataSourceId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub field_id: String,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

impl ValidationIssue {
    pub fn error(field_id: &str, title: &str, detail: String) -> Self {
        Self {
            field_id: field_id.to_string(),
            severity: Severity::Error,
            title: title.to_string(),
            detail,
        }
    }

    pub fn warning(field_id: &str, title: &str, detail: String) -> Self {
        Self {
            field_id: field_id.to_string(),
            severity: Severity::Warning,
            title: title.to_string(),
            detail,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity, self.field_id, self.title, self.detail
        )
    }
}

pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Rule-builder checks for a condition group, reported as warnings.
pub fn check_group(group: &ConditionGroup) -> Vec<ValidationIssue> {
    group.check()
}

pub struct ValidationEngine<'a> {
    registry: &'a dyn FieldTypeRegistry,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(registry: &'a dyn FieldTypeRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, module: &Module) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_duplicate_ids(module, &mut issues);
        self.check_orphans(module, &mut issues);
        self.check_cycles(module, &mut issues);
        for field in &module.fields {
            self.check_field(field, &mut issues);
        }
        issues
    }

    fn check_duplicate_ids(&self, module: &Module, issues: &mut Vec<ValidationIssue>) {
        let counts = module.fields.iter().map(|f| f.id.as_str()).counts();
        for id in module.fields.iter().map(|f| f.id.as_str()).unique() {
            let count = counts[id];
            if count > 1 {
                issues.push(ValidationIssue::error(
                    id,
                    "Duplicate field id",
                    format!("{} fields share the id '{}'", count, id),
                ));
            }
        }
    }

    fn check_orphans(&self, module: &Module, issues: &mut Vec<ValidationIssue>) {
        let ids = module.id_set();
        for field in &module.fields {
            if let Some(parent) = field.parent_id.as_deref() {
                if !ids.contains(parent) {
                    issues.push(ValidationIssue::error(
                        &field.id,
                        "Orphaned field",
                        format!("Parent '{}' does not exist", parent),
                    ));
                }
            }
        }
    }

    fn check_cycles(&self, module: &Module, issues: &mut Vec<ValidationIssue>) {
        let parents = module.parent_index();
        for field in &module.fields {
            if let AncestorWalk::Cycle { at } = walk_ancestors(&parents, &field.id) {
                issues.push(ValidationIssue::error(
                    &field.id,
                    "Circular reference",
                    format!("The parent chain loops back through '{}'", at),
                ));
            }
        }
    }

    fn check_field(&self, field: &Field, issues: &mut Vec<ValidationIssue>) {
        let contract = self.registry.contract(&field.field_type);

        if field.is_required() {
            let has_message = field
                .validation_rules
                .as_ref()
                .and_then(|r| r.error_message.as_deref())
                .is_some_and(|m| !m.trim().is_empty());
            if !has_message {
                issues.push(ValidationIssue::warning(
                    &field.id,
                    "Missing error message",
                    "Required fields should tell the user what is missing".to_string(),
                ));
            }
        }

        let layout_only = contract.as_ref().is_some_and(|c| c.layout_only);
        if !layout_only && field.label.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                &field.id,
                "Empty label",
                format!("The {} field has no label", field.field_type),
            ));
        }

        let Some(contract) = contract else {
            issues.push(ValidationIssue::warning(
                &field.id,
                "Unknown field type",
                format!("'{}' is not a registered field type", field.field_type),
            ));
            return;
        };

        if contract.requires_options {
            let has_inline = field.options.as_ref().is_some_and(|o| !o.is_empty());
            let has_option_set = field.config_str(OPTION_SET_KEY).is_some();
            if !has_inline && !has_option_set {
                issues.push(ValidationIssue::error(
                    &field.id,
                    "Missing options",
                    format!(
                        "{} fields need inline options or an option set reference",
                        contract.display_name
                    ),
                ));
            }
        }

        let needs_source = contract.requires_data_source || field.config_declares(DATA_SOURCE_KEY);
        if needs_source && field.config_str(DATA_SOURCE_ID_KEY).is_none() {
            issues.push(ValidationIssue::error(
                &field.id,
                "Missing data source",
                format!(
                    "The field reads external data but '{}' is not set",
                    DATA_SOURCE_ID_KEY
                ),
            ));
        }
    }
}
