use crate::condition::{Condition, ConditionGroup};
use crate::schema::{CONDITION_GROUP_KEY, CONDITION_KEY, VisualNode};
use crate::validation::{FieldTypeRegistry, StandardFieldTypes};

/// Extracts the condition attached to a decision node's payload.
///
/// Returning `None` means this parser does not recognise the payload; the
/// compiler then tries the next parser and finally falls back.
pub trait ConditionParser: Send + Sync {
    fn name(&self) -> &str;
    fn parse(&self, node: &VisualNode) -> Option<Condition>;
}

/// Reads a canonical condition stored under `data.condition`.
pub struct CanonicalPayloadParser;

impl ConditionParser for CanonicalPayloadParser {
    fn name(&self) -> &str {
        "canonical"
    }

    fn parse(&self, node: &VisualNode) -> Option<Condition> {
        let raw = node.data.get(CONDITION_KEY)?;
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Reads a rule-builder group stored under `data.conditionGroup`.
pub struct GroupPayloadParser {
    registry: Box<dyn FieldTypeRegistry>,
}

impl GroupPayloadParser {
    pub fn new(registry: Box<dyn FieldTypeRegistry>) -> Self {
        Self { registry }
    }
}

impl Default for GroupPayloadParser {
    fn default() -> Self {
        Self::new(Box::new(StandardFieldTypes::new()))
    }
}

impl ConditionParser for GroupPayloadParser {
    fn name(&self) -> &str {
        "group"
    }

    fn parse(&self, node: &VisualNode) -> Option<Condition> {
        let raw = node.data.get(CONDITION_GROUP_KEY)?;
        let group: ConditionGroup = serde_json::from_value(raw.clone()).ok()?;
        group.canonicalize(self.registry.as_ref())
    }
}

/// Accepts a payload that is itself a condition object.
pub struct InlinePayloadParser;

impl ConditionParser for InlinePayloadParser {
    fn name(&self) -> &str {
        "inline"
    }

    fn parse(&self, node: &VisualNode) -> Option<Condition> {
        if !node.data.is_object() {
            return None;
        }
        serde_json::from_value(node.data.clone()).ok()
    }
}

pub(super) fn default_parsers() -> Vec<Box<dyn ConditionParser>> {
    vec![
        Box::new(CanonicalPayloadParser),
        Box::new(GroupPayloadParser::default()),
        Box::new(InlinePayloadParser),
    ]
}
