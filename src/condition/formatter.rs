use super::{Condition, LogicalOp};
use crate::schema::Value;
use std::fmt;

impl Condition {
    fn precedence(&self) -> u8 {
        match self {
            Condition::Branch {
                logical_op: LogicalOp::Or,
                conditions,
            } if conditions.len() > 1 => 1,
            Condition::Branch {
                logical_op: LogicalOp::And,
                conditions,
            } if conditions.len() > 1 => 2,
            _ => 3,
        }
    }

    /// Recursively formats the condition, adding parentheses only when necessary.
    fn format_recursive(&self, parent_precedence: u8) -> String {
        let current_precedence = self.precedence();
        let body = match self {
            Condition::Leaf {
                field,
                operator,
                value,
            } => {
                if operator.requires_value() {
                    format!("{} {} {}", field, operator.symbol(), quote(value))
                } else {
                    format!("{} {}", field, operator.symbol())
                }
            }
            Condition::Branch {
                logical_op,
                conditions,
            } => match (logical_op, conditions.as_slice()) {
                (LogicalOp::And, []) => "always".to_string(),
                (LogicalOp::Or, []) => "never".to_string(),
                (LogicalOp::Not, children) => {
                    let inner = match children {
                        [only] => only.format_recursive(3),
                        _ => Condition::all(children.to_vec()).format_recursive(3),
                    };
                    format!("NOT {}", inner)
                }
                (_, [only]) => only.format_recursive(parent_precedence),
                (op, children) => {
                    let separator = if *op == LogicalOp::Or { " OR " } else { " AND " };
                    children
                        .iter()
                        .map(|c| c.format_recursive(current_precedence))
                        .collect::<Vec<_>>()
                        .join(separator)
                }
            },
        };

        let needs_parens = current_precedence < parent_precedence;
        if needs_parens {
            format!("({})", body)
        } else {
            body
        }
    }
}

fn quote(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_recursive(0))
    }
}
