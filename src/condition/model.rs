use crate::error::DocumentError;
use crate::schema::Value;
use serde::{Deserialize, Serialize};

/// A boolean test over form data.
///
/// Either a leaf comparing one field against a literal, or a branch combining
/// child conditions. On the wire both shapes share one object; exactly one set
/// of keys (`field`/`operator`/`value` or `logicalOp`/`conditions`) is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub enum Condition {
    Leaf {
        field: String,
        operator: ConditionOperator,
        value: Value,
    },
    Branch {
        logical_op: LogicalOp,
        conditions: Vec<Condition>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
    #[serde(alias = "NOT")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl ConditionOperator {
    /// Operators that test presence only and never take an operand.
    pub fn requires_value(self) -> bool {
        !matches!(
            self,
            ConditionOperator::IsNull
                | ConditionOperator::IsNotNull
                | ConditionOperator::IsEmpty
                | ConditionOperator::IsNotEmpty
        )
    }

    /// Operators whose operand is a list of candidates.
    pub fn takes_list(self) -> bool {
        matches!(self, ConditionOperator::In | ConditionOperator::NotIn)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConditionOperator::Equals => "=",
            ConditionOperator::NotEquals => "!=",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::GreaterThanOrEqual => ">=",
            ConditionOperator::LessThan => "<",
            ConditionOperator::LessThanOrEqual => "<=",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "does not contain",
            ConditionOperator::StartsWith => "starts with",
            ConditionOperator::EndsWith => "ends with",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not in",
            ConditionOperator::IsNull => "is null",
            ConditionOperator::IsNotNull => "is not null",
            ConditionOperator::IsEmpty => "is empty",
            ConditionOperator::IsNotEmpty => "is not empty",
        }
    }
}

impl Condition {
    pub fn leaf(field: impl Into<String>, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        let value = if operator.requires_value() {
            value.into()
        } else {
            Value::Null
        };
        Condition::Leaf {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::Branch {
            logical_op: LogicalOp::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Branch {
            logical_op: LogicalOp::Or,
            conditions,
        }
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Branch {
            logical_op: LogicalOp::Not,
            conditions: vec![condition],
        }
    }

    /// An empty conjunction, true for any input.
    pub fn always() -> Self {
        Condition::all(Vec::new())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Condition::Leaf { .. })
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::Leaf { .. } => 1,
            Condition::Branch { conditions, .. } => {
                conditions.iter().map(Condition::leaf_count).sum()
            }
        }
    }
}

/// Wire shape shared by both variants.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<ConditionOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logical_op: Option<LogicalOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditions: Option<Vec<Condition>>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = DocumentError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let has_leaf_keys = raw.field.is_some() || raw.operator.is_some();
        let has_branch_keys = raw.logical_op.is_some() || raw.conditions.is_some();

        match (has_leaf_keys, has_branch_keys) {
            (true, true) => Err(DocumentError::InvalidCondition(
                "a condition cannot carry both leaf and branch keys".to_string(),
            )),
            (false, false) => Err(DocumentError::InvalidCondition(
                "a condition needs either field/operator or logicalOp/conditions".to_string(),
            )),
            (true, false) => {
                let field = raw.field.ok_or_else(|| {
                    DocumentError::InvalidCondition("leaf condition is missing 'field'".to_string())
                })?;
                let operator = raw.operator.ok_or_else(|| {
                    DocumentError::InvalidCondition(format!(
                        "leaf condition on '{}' is missing 'operator'",
                        field
                    ))
                })?;
                Ok(Condition::Leaf {
                    field,
                    operator,
                    value: raw.value.unwrap_or_default(),
                })
            }
            (false, true) => {
                let logical_op = raw.logical_op.ok_or_else(|| {
                    DocumentError::InvalidCondition(
                        "branch condition is missing 'logicalOp'".to_string(),
                    )
                })?;
                Ok(Condition::Branch {
                    logical_op,
                    conditions: raw.conditions.unwrap_or_default(),
                })
            }
        }
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Leaf {
                field,
                operator,
                value,
            } => RawCondition {
                field: Some(field),
                operator: Some(operator),
                value: Some(value),
                logical_op: None,
                conditions: None,
            },
            Condition::Branch {
                logical_op,
                conditions,
            } => RawCondition {
                field: None,
                operator: None,
                value: None,
                logical_op: Some(logical_op),
                conditions: Some(conditions),
            },
        }
    }
}
