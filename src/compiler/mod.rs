//! Compiles a drawn workflow diagram into module order and branching rules.

use crate::condition::Condition;
use crate::schema::{ConditionalRule, NodeKind, RuleAction, VisualNode, Workflow};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod conversion;
pub mod parsing;

pub use conversion::{DiagramEdge, DiagramExport, DiagramNode, DiagramPosition, IntoLayout};
pub use parsing::{
    CanonicalPayloadParser, ConditionParser, GroupPayloadParser, InlinePayloadParser,
};

/// Non-fatal findings produced while compiling a diagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileDiagnostic {
    #[error("Decision '{node_id}' has no readable condition; it will always branch")]
    FallbackCondition { node_id: String },

    #[error("Decision '{node_id}' has no outgoing connection")]
    NoOutgoingConnection { node_id: String },

    #[error("Decision '{node_id}' points at missing node '{target_id}'")]
    MissingTarget { node_id: String, target_id: String },

    #[error("Decision '{node_id}' points at {kind} node '{target_id}', which cannot be a branch target")]
    UnsupportedTarget {
        node_id: String,
        target_id: String,
        kind: NodeKind,
    },
}

/// A workflow with `moduleIds` and `workflowRules` recomputed from its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWorkflow {
    pub workflow: Workflow,
    pub diagnostics: Vec<CompileDiagnostic>,
}

impl CompiledWorkflow {
    pub fn used_fallback(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, CompileDiagnostic::FallbackCondition { .. }))
    }
}

pub struct GraphCompiler {
    parsers: Vec<Box<dyn ConditionParser>>,
    fallback: Condition,
}

pub struct GraphCompilerBuilder {
    parsers: Vec<Box<dyn ConditionParser>>,
    fallback: Condition,
}

impl Default for GraphCompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphCompilerBuilder {
    pub fn new() -> Self {
        Self {
            parsers: parsing::default_parsers(),
            fallback: Condition::always(),
        }
    }

    /// Substituted when a decision node's payload yields no condition.
    pub fn with_fallback_condition(mut self, condition: Condition) -> Self {
        self.fallback = condition;
        self
    }

    /// Registers a parser that is tried before the built-in ones.
    pub fn with_condition_parser(mut self, parser: Box<dyn ConditionParser>) -> Self {
        self.parsers.insert(0, parser);
        self
    }

    pub fn build(self) -> GraphCompiler {
        GraphCompiler {
            parsers: self.parsers,
            fallback: self.fallback,
        }
    }
}

impl Default for GraphCompiler {
    fn default() -> Self {
        GraphCompilerBuilder::new().build()
    }
}

impl GraphCompiler {
    pub fn builder() -> GraphCompilerBuilder {
        GraphCompilerBuilder::new()
    }

    /// Recomputes module order and rules from `workflow.layout`.
    ///
    /// Module order follows node-list order. Each decision node contributes at
    /// most one rule, built from its first outgoing connection: a module
    /// target becomes `goToStep`, an end target `completeWorkflow`, anything
    /// else is skipped. Edges carry no true/false label, so "first connection
    /// wins" is the only branch selection available.
    pub fn compile(&self, workflow: &Workflow) -> CompiledWorkflow {
        let layout = &workflow.layout;
        let mut diagnostics = Vec::new();

        let module_ids: Vec<String> = layout
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Module)
            .map(|n| n.module_key().to_string())
            .collect();

        let mut rules = Vec::new();
        let decisions = layout.nodes.iter().filter(|n| n.kind == NodeKind::Decision);
        for decision in decisions {
            let Some(first) = layout.outgoing(&decision.id).next() else {
                diagnostics.push(CompileDiagnostic::NoOutgoingConnection {
                    node_id: decision.id.clone(),
                });
                continue;
            };
            let Some(target) = layout.node(&first.target_node_id) else {
                diagnostics.push(CompileDiagnostic::MissingTarget {
                    node_id: decision.id.clone(),
                    target_id: first.target_node_id.clone(),
                });
                continue;
            };

            let (action, module_key) = match target.kind {
                NodeKind::Module => (RuleAction::GoToStep, Some(target.module_key().to_string())),
                NodeKind::End => (RuleAction::CompleteWorkflow, None),
                kind => {
                    diagnostics.push(CompileDiagnostic::UnsupportedTarget {
                        node_id: decision.id.clone(),
                        target_id: target.id.clone(),
                        kind,
                    });
                    continue;
                }
            };

            let condition = self.condition_for(decision, &mut diagnostics);
            let mut rule = ConditionalRule::new(format!("rule_{}", decision.id), action, condition);
            rule.target_module_key = module_key;
            rule.priority = rules.len() as i32 + 1;
            rules.push(rule);
        }

        info!(
            workflow_id = %workflow.id,
            modules = module_ids.len(),
            rules = rules.len(),
            diagnostics = diagnostics.len(),
            "Compiled workflow graph"
        );

        CompiledWorkflow {
            workflow: Workflow {
                id: workflow.id.clone(),
                module_ids,
                workflow_rules: rules,
                layout: layout.clone(),
            },
            diagnostics,
        }
    }

    fn condition_for(
        &self,
        decision: &VisualNode,
        diagnostics: &mut Vec<CompileDiagnostic>,
    ) -> Condition {
        for parser in &self.parsers {
            if let Some(condition) = parser.parse(decision) {
                debug!(node_id = %decision.id, parser = parser.name(), "Parsed decision condition");
                return condition;
            }
        }
        warn!(node_id = %decision.id, "Decision node has no usable condition, using fallback");
        diagnostics.push(CompileDiagnostic::FallbackCondition {
            node_id: decision.id.clone(),
        });
        self.fallback.clone()
    }
}
