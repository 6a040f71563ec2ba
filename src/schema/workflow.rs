use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered, branching sequence of modules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    #[serde(default)]
    pub module_ids: Vec<String>,
    #[serde(default)]
    pub workflow_rules: Vec<ConditionalRule>,
    #[serde(default)]
    pub layout: WorkflowLayout,
}

/// An action triggered when `condition` evaluates true.
///
/// At most one of the three target keys is expected to be set; which one
/// depends on `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_step_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_module_key: Option<String>,
    pub action: RuleAction,
    pub condition: Condition,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleAction {
    Show,
    Hide,
    Enable,
    Disable,
    SetRequired,
    SetOptional,
    SkipStep,
    GoToStep,
    CompleteWorkflow,
}

/// Borrowed view over whichever target key a rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget<'a> {
    Field(&'a str),
    Step(u32),
    Module(&'a str),
    Workflow,
}

impl fmt::Display for RuleTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTarget::Field(id) => write!(f, "field '{}'", id),
            RuleTarget::Step(step) => write!(f, "step {}", step),
            RuleTarget::Module(key) => write!(f, "module '{}'", key),
            RuleTarget::Workflow => write!(f, "workflow"),
        }
    }
}

impl ConditionalRule {
    pub fn new(id: impl Into<String>, action: RuleAction, condition: Condition) -> Self {
        Self {
            id: id.into(),
            target_field_id: None,
            target_step_number: None,
            target_module_key: None,
            action,
            condition,
            priority: 0,
            is_active: true,
        }
    }

    pub fn target(&self) -> RuleTarget<'_> {
        if let Some(field) = &self.target_field_id {
            RuleTarget::Field(field)
        } else if let Some(module) = &self.target_module_key {
            RuleTarget::Module(module)
        } else if let Some(step) = self.target_step_number {
            RuleTarget::Step(step)
        } else {
            RuleTarget::Workflow
        }
    }
}

/// The diagram a user draws; compiled into module order and rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowLayout {
    #[serde(default)]
    pub nodes: Vec<VisualNode>,
    #[serde(default)]
    pub connections: Vec<VisualConnection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Module,
    Decision,
    Start,
    End,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Module => "module",
            NodeKind::Decision => "decision",
            NodeKind::Start => "start",
            NodeKind::End => "end",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConnection {
    pub source_node_id: String,
    pub target_node_id: String,
}

/// Payload key naming the module a `module` node stands for.
pub const MODULE_KEY: &str = "moduleKey";
/// Payload key holding a decision node's canonical condition.
pub const CONDITION_KEY: &str = "condition";
/// Payload key holding a decision node's rule-builder group.
pub const CONDITION_GROUP_KEY: &str = "conditionGroup";

impl VisualNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The module key a module node carries, falling back to the node id.
    pub fn module_key(&self) -> &str {
        self.data
            .get(MODULE_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }
}

impl VisualConnection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_node_id: source.into(),
            target_node_id: target.into(),
        }
    }
}

impl WorkflowLayout {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Outgoing connections of `node_id`, in insertion order.
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a VisualConnection> {
        self.connections
            .iter()
            .filter(move |c| c.source_node_id == node_id)
    }

    pub fn has_connection(&self, source: &str, target: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.source_node_id == source && c.target_node_id == target)
    }
}

impl Workflow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_layout(mut self, layout: WorkflowLayout) -> Self {
        self.layout = layout;
        self
    }
}
