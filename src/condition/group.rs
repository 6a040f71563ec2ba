use super::{Condition, ConditionOperator, LogicalOp};
use crate::schema::Value;
use crate::validation::{FieldTypeRegistry, ValidationIssue, ValueKind};
use serde::{Deserialize, Serialize};

/// The rule-builder's editing shape: one logical operator over leaf rows and
/// nested groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    #[serde(default)]
    pub logical_op: LogicalOp,
    #[serde(default)]
    pub rows: Vec<ConditionRow>,
    #[serde(default)]
    pub groups: Vec<ConditionGroup>,
    /// Set when the user deliberately grouped the rows; such a group is kept
    /// as a branch even with a single child.
    #[serde(default)]
    pub explicit: bool,
}

/// One `field operator value` line as typed in the rule builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRow {
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ConditionOperator>,
    #[serde(default)]
    pub value: String,
    /// Type of the literal this row was expanded from, used when the field
    /// type is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_hint: Option<ValueHint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueHint {
    Number,
    Boolean,
}

impl ConditionRow {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Some(operator),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        match self.operator {
            None => false,
            Some(_) if self.field.trim().is_empty() => false,
            Some(op) => !op.requires_value() || !self.value.trim().is_empty(),
        }
    }

    fn value_kind(&self, registry: &dyn FieldTypeRegistry) -> ValueKind {
        if let Some(contract) = self
            .field_type
            .as_deref()
            .and_then(|t| registry.contract(t))
        {
            return contract.value_kind;
        }
        match self.value_hint {
            Some(ValueHint::Number) => ValueKind::Number,
            Some(ValueHint::Boolean) => ValueKind::Boolean,
            None => ValueKind::Text,
        }
    }

    /// Converts a complete row into a leaf. Incomplete rows yield `None`.
    pub fn to_condition(&self, registry: &dyn FieldTypeRegistry) -> Option<Condition> {
        if !self.is_complete() {
            return None;
        }
        let operator = self.operator?;
        let value = parse_value(&self.value, operator, self.value_kind(registry));
        Some(Condition::Leaf {
            field: self.field.trim().to_string(),
            operator,
            value,
        })
    }

    fn from_leaf(field: &str, operator: ConditionOperator, value: &Value) -> Self {
        let probe = match value {
            Value::List(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        };
        let value_hint = match probe {
            Value::Number(_) => Some(ValueHint::Number),
            Value::Bool(_) => Some(ValueHint::Boolean),
            _ => None,
        };
        Self {
            field: field.to_string(),
            field_type: None,
            operator: Some(operator),
            value: value.to_input_text(),
            value_hint,
        }
    }
}

impl ConditionGroup {
    pub fn new(logical_op: LogicalOp) -> Self {
        Self {
            logical_op,
            ..Default::default()
        }
    }

    pub fn with_row(mut self, row: ConditionRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_group(mut self, group: ConditionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Builds the canonical condition for this group.
    ///
    /// Incomplete rows and empty nested groups are skipped; `None` means no
    /// complete condition remains. A non-explicit group whose only child is a
    /// single row collapses to that leaf.
    pub fn canonicalize(&self, registry: &dyn FieldTypeRegistry) -> Option<Condition> {
        let leaves: Vec<Condition> = self
            .rows
            .iter()
            .filter_map(|row| row.to_condition(registry))
            .collect();
        let nested: Vec<Condition> = self
            .groups
            .iter()
            .filter_map(|group| group.canonicalize(registry))
            .collect();

        if leaves.is_empty() && nested.is_empty() {
            return None;
        }

        let collapsible = !self.explicit
            && self.logical_op != LogicalOp::Not
            && leaves.len() == 1
            && nested.is_empty();
        if collapsible {
            return leaves.into_iter().next();
        }

        let mut conditions = leaves;
        conditions.extend(nested);
        Some(Condition::Branch {
            logical_op: self.logical_op,
            conditions,
        })
    }

    /// Builds the editing shape for a canonical condition.
    pub fn expand(condition: &Condition) -> Self {
        match condition {
            Condition::Leaf {
                field,
                operator,
                value,
            } => ConditionGroup {
                logical_op: LogicalOp::And,
                rows: vec![ConditionRow::from_leaf(field, *operator, value)],
                groups: Vec::new(),
                explicit: false,
            },
            Condition::Branch {
                logical_op,
                conditions,
            } => {
                let mut group = ConditionGroup::new(*logical_op).explicit();
                for child in conditions {
                    match child {
                        Condition::Leaf {
                            field,
                            operator,
                            value,
                        } => group
                            .rows
                            .push(ConditionRow::from_leaf(field, *operator, value)),
                        branch => group.groups.push(ConditionGroup::expand(branch)),
                    }
                }
                group
            }
        }
    }

    /// Rule-builder level checks: incomplete rows and empty groups.
    pub fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_into("group", &mut issues);
        issues
    }

    fn check_into(&self, path: &str, issues: &mut Vec<ValidationIssue>) {
        if self.rows.is_empty() && self.groups.is_empty() {
            issues.push(ValidationIssue::warning(
                path,
                "Empty condition group",
                "The group has no conditions and will be ignored".to_string(),
            ));
        }

        for (i, row) in self.rows.iter().enumerate() {
            let missing = if row.field.trim().is_empty() {
                Some("a field")
            } else {
                match row.operator {
                    None => Some("an operator"),
                    Some(op) if op.requires_value() && row.value.trim().is_empty() => {
                        Some("a value")
                    }
                    Some(_) => None,
                }
            };
            if let Some(missing) = missing {
                let subject = if row.field.trim().is_empty() {
                    format!("{}.rows[{}]", path, i)
                } else {
                    row.field.clone()
                };
                issues.push(ValidationIssue::warning(
                    &subject,
                    "Incomplete condition",
                    format!("Row {} of {} needs {}", i + 1, path, missing),
                ));
            }
        }

        for (i, group) in self.groups.iter().enumerate() {
            group.check_into(&format!("{}.groups[{}]", path, i), issues);
        }
    }
}

/// Parses rule-builder text into a typed literal.
///
/// Presence-only operators always produce `Null`; list operators split on
/// commas. Text that does not parse as the expected kind stays text.
pub fn parse_value(text: &str, operator: ConditionOperator, kind: ValueKind) -> Value {
    if !operator.requires_value() {
        return Value::Null;
    }
    if operator.takes_list() {
        return Value::List(
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|item| parse_scalar(item, kind))
                .collect(),
        );
    }
    parse_scalar(text, kind)
}

fn parse_scalar(text: &str, kind: ValueKind) -> Value {
    let trimmed = text.trim();
    match kind {
        ValueKind::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Number)
            .unwrap_or_else(|| Value::Text(text.to_string())),
        ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Value::Bool(true),
            "false" | "no" | "0" | "off" => Value::Bool(false),
            _ => Value::Text(text.to_string()),
        },
        ValueKind::Text => Value::Text(text.to_string()),
    }
}
