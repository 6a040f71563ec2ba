use crate::error::LayoutConversionError;
use crate::schema::{NodeKind, VisualConnection, VisualNode, WorkflowLayout};
use ahash::AHashSet;
use serde::Deserialize;

/// A trait for diagram formats that can be converted into a `WorkflowLayout`.
///
/// This is the extension point for importing drawings produced by other
/// diagram editors. Implement it on your own deserialized structs to feed the
/// graph compiler.
///
/// # Example
///
/// ```rust,no_run
/// use formflow::compiler::IntoLayout;
/// use formflow::error::LayoutConversionError;
/// use formflow::schema::{NodeKind, VisualNode, WorkflowLayout};
///
/// struct Steps { names: Vec<String> }
///
/// impl IntoLayout for Steps {
///     fn into_layout(self) -> Result<WorkflowLayout, LayoutConversionError> {
///         let nodes = self
///             .names
///             .into_iter()
///             .enumerate()
///             .map(|(i, name)| VisualNode::new(name, NodeKind::Module, 0.0, i as f64 * 120.0))
///             .collect();
///         Ok(WorkflowLayout { nodes, connections: vec![] })
///     }
/// }
/// ```
pub trait IntoLayout {
    /// Consumes the object and converts it into a compiler-ready layout.
    fn into_layout(self) -> Result<WorkflowLayout, LayoutConversionError>;
}

impl IntoLayout for WorkflowLayout {
    fn into_layout(self) -> Result<WorkflowLayout, LayoutConversionError> {
        Ok(self)
    }
}

/// The common node/edge export of browser diagram editors:
/// `{ nodes: [{ id, type, position: { x, y }, data }], edges: [{ source, target }] }`.
#[derive(Debug, Deserialize)]
pub struct DiagramExport {
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
}

#[derive(Debug, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    #[serde(rename = "type", alias = "nodeType")]
    pub node_type: String,
    #[serde(default)]
    pub position: DiagramPosition,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiagramPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct DiagramEdge {
    pub source: String,
    pub target: String,
}

fn node_kind(node: &DiagramNode) -> Result<NodeKind, LayoutConversionError> {
    match node.node_type.to_ascii_lowercase().as_str() {
        "module" | "modulenode" | "step" => Ok(NodeKind::Module),
        "decision" | "decisionnode" | "condition" => Ok(NodeKind::Decision),
        "start" | "startnode" | "input" => Ok(NodeKind::Start),
        "end" | "endnode" | "output" => Ok(NodeKind::End),
        _ => Err(LayoutConversionError::UnsupportedNodeType {
            node_id: node.id.clone(),
            type_name: node.node_type.clone(),
        }),
    }
}

impl IntoLayout for DiagramExport {
    fn into_layout(self) -> Result<WorkflowLayout, LayoutConversionError> {
        let mut seen = AHashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            if !seen.insert(node.id.clone()) {
                return Err(LayoutConversionError::Invalid(format!(
                    "node id '{}' appears more than once",
                    node.id
                )));
            }
            let kind = node_kind(&node)?;
            nodes.push(
                VisualNode::new(node.id, kind, node.position.x, node.position.y)
                    .with_data(node.data),
            );
        }

        let mut connections: Vec<VisualConnection> = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            for end in [&edge.source, &edge.target] {
                if !seen.contains(end) {
                    return Err(LayoutConversionError::DanglingConnection(end.clone()));
                }
            }
            let connection = VisualConnection::new(edge.source, edge.target);
            if !connections.contains(&connection) {
                connections.push(connection);
            }
        }

        Ok(WorkflowLayout { nodes, connections })
    }
}
