//! Tests for the JSON document boundary, the file store and editor configuration.
mod common;
use common::*;
use formflow::error::{ConfigError, DocumentError};
use formflow::prelude::*;
use std::fs;

#[test]
fn test_module_json_uses_camel_case_keys() {
    let mut module = create_nested_module();
    module.fields[2].type_config = serde_json::json!({ "dataSourceId": "people" })
        .as_object()
        .cloned();

    let value: serde_json::Value = serde_json::from_str(&module.to_json().unwrap()).unwrap();
    let c = &value["fields"][2];
    assert_eq!(c["parentId"], "b");
    assert_eq!(c["fieldType"], "text");
    assert_eq!(c["typeConfig"]["dataSourceId"], "people");
    assert!(c.get("validationRules").is_none());

    assert_eq!(Module::from_json(&module.to_json().unwrap()).unwrap(), module);
}

#[test]
fn test_module_decode_accepts_minimal_fields() {
    let module = Module::from_json(
        r#"{ "id": "m", "title": "M", "fields": [
            { "id": "f", "order": 1, "fieldType": "text" },
            { "id": "g", "order": 1, "fieldType": "email", "parentId": "f",
              "validationRules": { "required": true, "errorMessage": "Needed" } }
        ] }"#,
    )
    .unwrap();
    assert_eq!(module.fields[0].label, "");
    assert!(module.fields[1].is_required());
}

#[test]
fn test_workflow_rules_decode() {
    let workflow = Workflow::from_json(
        r#"{
            "id": "w",
            "moduleIds": ["a", "b"],
            "workflowRules": [{
                "id": "r1",
                "action": "skipStep",
                "targetStepNumber": 2,
                "condition": { "logicalOp": "and", "conditions": [
                    { "field": "age", "operator": "lessThan", "value": 18 }
                ] },
                "priority": 3
            }]
        }"#,
    )
    .unwrap();

    let rule = &workflow.workflow_rules[0];
    assert_eq!(rule.action, RuleAction::SkipStep);
    assert_eq!(rule.target_step_number, Some(2));
    assert_eq!(rule.target(), RuleTarget::Step(2));
    assert!(rule.is_active);
    assert!(workflow.layout.nodes.is_empty());
}

#[test]
fn test_malformed_condition_fails_document_decode() {
    let result = Workflow::from_json(
        r#"{ "id": "w", "workflowRules": [{
            "id": "r1", "action": "hide", "targetFieldId": "f",
            "condition": { "field": "a", "operator": "equals", "logicalOp": "or" }
        }] }"#,
    );
    assert!(matches!(result, Err(DocumentError::Json(_))));
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let module = create_nested_module();
    store.save_module(&module).unwrap();
    assert!(dir.path().join("modules").join("intake.json").exists());
    assert_eq!(store.load_module("intake").unwrap(), module);

    let workflow = GraphCompiler::default()
        .compile(&create_branching_workflow())
        .workflow;
    store.save_workflow(&workflow).unwrap();
    assert_eq!(store.load_workflow("onboarding").unwrap(), workflow);
}

#[test]
fn test_file_store_reports_missing_documents() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    match store.load_module("absent") {
        Err(DocumentError::Io { path, .. }) => assert!(path.ends_with("absent.json")),
        other => panic!("Expected an IO error, got {:?}", other),
    }
}

#[test]
fn test_config_defaults_and_partial_file() {
    let defaults = EditorConfig::default();
    assert_eq!(defaults.history_capacity, 50);
    assert_eq!(defaults.copy_label_prefix, "Copy of ");
    assert_eq!(defaults.id_separator, "_");
    assert!(defaults.mirror_to_system_clipboard);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    fs::write(&path, r#"{ "historyCapacity": 5, "copyLabelPrefix": "Kopie von " }"#).unwrap();

    let config = EditorConfig::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.history_capacity, 5);
    assert_eq!(config.copy_label_prefix, "Kopie von ");
    assert_eq!(config.id_separator, "_");

    let mut editor = EditorStateController::builder(create_flat_module())
        .with_config(config)
        .build();
    let copy = editor.duplicate_field("x").unwrap();
    assert_eq!(editor.module().field(&copy).unwrap().label, "Kopie von X");
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        EditorConfig::from_json("{ historyCapacity: }"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        EditorConfig::from_file("/definitely/not/here.json"),
        Err(ConfigError::Io { .. })
    ));
}
