//! Tests for workflow graph compilation and diagram import.
mod common;
use common::*;
use formflow::compiler::{CompileDiagnostic, ConditionParser};
use formflow::error::LayoutConversionError;
use formflow::prelude::*;

#[test]
fn test_compiler_orders_modules_by_node_list() {
    let compiled = GraphCompiler::default().compile(&create_branching_workflow());
    assert_eq!(
        compiled.workflow.module_ids,
        vec!["personal", "adult", "minor"]
    );
    assert_eq!(compiled.workflow.id, "onboarding");
}

#[test]
fn test_decision_first_connection_becomes_go_to_step() {
    let compiled = GraphCompiler::default().compile(&create_branching_workflow());
    let rules = &compiled.workflow.workflow_rules;

    assert_eq!(rules.len(), 1);
    let rule = &rules[0];
    assert_eq!(rule.id, "rule_d");
    assert_eq!(rule.action, RuleAction::GoToStep);
    assert_eq!(rule.target_module_key.as_deref(), Some("adult"));
    assert_eq!(rule.target(), RuleTarget::Module("adult"));
    assert_eq!(rule.target().to_string(), "module 'adult'");
    assert_eq!(rule.priority, 1);
    assert!(rule.is_active);
    assert_eq!(
        rule.condition,
        Condition::leaf("age", ConditionOperator::GreaterThan, 18.0)
    );
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn test_decision_to_end_completes_workflow() {
    let mut workflow = create_branching_workflow();
    workflow.layout.connections.retain(|c| c.source_node_id != "d");
    workflow
        .layout
        .connections
        .push(VisualConnection::new("d", "end"));

    let compiled = GraphCompiler::default().compile(&workflow);
    let rule = &compiled.workflow.workflow_rules[0];
    assert_eq!(rule.action, RuleAction::CompleteWorkflow);
    assert!(rule.target_module_key.is_none());
    assert_eq!(rule.target(), RuleTarget::Workflow);
}

#[test]
fn test_decision_without_connections_yields_no_rule() {
    let mut workflow = create_branching_workflow();
    workflow.layout.connections.retain(|c| c.source_node_id != "d");

    let compiled = GraphCompiler::default().compile(&workflow);
    assert!(compiled.workflow.workflow_rules.is_empty());
    assert_eq!(
        compiled.diagnostics,
        vec![CompileDiagnostic::NoOutgoingConnection {
            node_id: "d".to_string()
        }]
    );
}

#[test]
fn test_missing_condition_falls_back_to_always() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes[2].data = serde_json::json!({ "note": "todo" });

    let compiled = GraphCompiler::default().compile(&workflow);
    assert_eq!(compiled.workflow.workflow_rules.len(), 1);
    assert!(compiled.workflow.workflow_rules[0].condition.is_always());
    assert!(compiled.used_fallback());
}

#[test]
fn test_custom_fallback_condition() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes[2].data = serde_json::Value::Null;
    let never = Condition::any(vec![]);

    let compiled = GraphCompiler::builder()
        .with_fallback_condition(never.clone())
        .build()
        .compile(&workflow);
    assert_eq!(compiled.workflow.workflow_rules[0].condition, never);
}

#[test]
fn test_group_and_inline_payloads_are_parsed() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes[2].data = serde_json::json!({
        "conditionGroup": {
            "logicalOp": "and",
            "rows": [
                { "field": "age", "fieldType": "number", "operator": "lessThan", "value": "65" }
            ]
        }
    });
    let compiled = GraphCompiler::default().compile(&workflow);
    assert_eq!(
        compiled.workflow.workflow_rules[0].condition,
        Condition::leaf("age", ConditionOperator::LessThan, 65.0)
    );

    workflow.layout.nodes[2].data =
        serde_json::json!({ "field": "consent", "operator": "equals", "value": true });
    let compiled = GraphCompiler::default().compile(&workflow);
    assert_eq!(
        compiled.workflow.workflow_rules[0].condition,
        Condition::leaf("consent", ConditionOperator::Equals, true)
    );
}

struct FlagParser;

impl ConditionParser for FlagParser {
    fn name(&self) -> &str {
        "flag"
    }

    fn parse(&self, node: &VisualNode) -> Option<Condition> {
        let flag = node.data.get("flag")?.as_str()?;
        Some(Condition::leaf(flag, ConditionOperator::Equals, true))
    }
}

#[test]
fn test_custom_parser_runs_first() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes[2].data["flag"] = serde_json::json!("vip");

    let compiler = GraphCompiler::builder()
        .with_condition_parser(Box::new(FlagParser))
        .build();
    let compiled = compiler.compile(&workflow);
    assert_eq!(
        compiled.workflow.workflow_rules[0].condition,
        Condition::leaf("vip", ConditionOperator::Equals, true)
    );
}

#[test]
fn test_unsupported_and_missing_targets_are_diagnosed() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes.push(VisualNode::new("d2", NodeKind::Decision, 0.0, 0.0));
    workflow.layout.connections.push(VisualConnection::new("d2", "start"));
    workflow.layout.nodes.push(VisualNode::new("d3", NodeKind::Decision, 0.0, 0.0));
    workflow.layout.connections.push(VisualConnection::new("d3", "nowhere"));

    let compiled = GraphCompiler::default().compile(&workflow);
    assert_eq!(compiled.workflow.workflow_rules.len(), 1);
    assert!(compiled.diagnostics.contains(&CompileDiagnostic::UnsupportedTarget {
        node_id: "d2".to_string(),
        target_id: "start".to_string(),
        kind: NodeKind::Start,
    }));
    assert!(compiled.diagnostics.contains(&CompileDiagnostic::MissingTarget {
        node_id: "d3".to_string(),
        target_id: "nowhere".to_string(),
    }));
}

#[test]
fn test_priorities_follow_decision_order() {
    let mut workflow = create_branching_workflow();
    workflow.layout.nodes.push(VisualNode::new("d2", NodeKind::Decision, 0.0, 0.0));
    workflow.layout.connections.push(VisualConnection::new("d2", "end"));

    let compiled = GraphCompiler::default().compile(&workflow);
    let priorities: Vec<(&str, i32)> = compiled
        .workflow
        .workflow_rules
        .iter()
        .map(|r| (r.id.as_str(), r.priority))
        .collect();
    assert_eq!(priorities, vec![("rule_d", 1), ("rule_d2", 2)]);
}

#[test]
fn test_compile_is_deterministic() {
    let workflow = create_branching_workflow();
    let first = GraphCompiler::default().compile(&workflow);
    let second = GraphCompiler::default().compile(&first.workflow);
    assert_eq!(first.workflow, second.workflow);
}

#[test]
fn test_diagram_export_converts_to_layout() {
    let export: DiagramExport = serde_json::from_value(serde_json::json!({
        "nodes": [
            { "id": "s", "type": "startNode", "position": { "x": 0, "y": 0 } },
            { "id": "m", "type": "moduleNode", "position": { "x": 0, "y": 100 },
              "data": { "moduleKey": "contact" } },
            { "id": "e", "type": "output" }
        ],
        "edges": [
            { "source": "s", "target": "m" },
            { "source": "m", "target": "e" },
            { "source": "m", "target": "e" }
        ]
    }))
    .unwrap();

    let layout = export.into_layout().unwrap();
    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.nodes[1].kind, NodeKind::Module);
    assert_eq!(layout.nodes[1].module_key(), "contact");
    assert_eq!(layout.nodes[2].kind, NodeKind::End);
    assert_eq!(layout.connections.len(), 2);

    let compiled = GraphCompiler::default().compile(&Workflow::new("w").with_layout(layout));
    assert_eq!(compiled.workflow.module_ids, vec!["contact"]);
}

#[test]
fn test_diagram_export_rejects_bad_graphs() {
    let unknown: DiagramExport = serde_json::from_value(serde_json::json!({
        "nodes": [{ "id": "x", "type": "swimlane" }]
    }))
    .unwrap();
    assert!(matches!(
        unknown.into_layout(),
        Err(LayoutConversionError::UnsupportedNodeType { .. })
    ));

    let dangling: DiagramExport = serde_json::from_value(serde_json::json!({
        "nodes": [{ "id": "x", "type": "module" }],
        "edges": [{ "source": "x", "target": "y" }]
    }))
    .unwrap();
    assert!(matches!(
        dangling.into_layout(),
        Err(LayoutConversionError::DanglingConnection(id)) if id == "y"
    ));
}
