//! Common test fixtures for building modules, workflows and recording sinks.
use formflow::clipboard::SystemClipboard;
use formflow::error::ClipboardError;
use formflow::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// A three-level chain plus an unrelated root field.
///
/// ```text
/// a (section)
/// └── b (section)
///     └── c (text)
/// d (text)
/// ```
#[allow(dead_code)]
pub fn create_nested_module() -> Module {
    Module::new("intake", "Intake").with_fields(vec![
        Field::new("a", "section", 1).with_label("Section A"),
        Field::new("b", "section", 1)
            .with_parent("a")
            .with_label("Section B"),
        Field::new("c", "text", 1).with_parent("b").with_label("Name"),
        Field::new("d", "text", 2).with_label("Email"),
    ])
}

/// Three root-level siblings `x`, `y`, `z` in that order.
#[allow(dead_code)]
pub fn create_flat_module() -> Module {
    Module::new("flat", "Flat").with_fields(vec![
        Field::new("x", "text", 1).with_label("X"),
        Field::new("y", "number", 2).with_label("Y"),
        Field::new("z", "checkbox", 3).with_label("Z"),
    ])
}

/// `start -> m1 -> d -> {m2, m3}` with `d` testing `age > 18`.
#[allow(dead_code)]
pub fn create_branching_workflow() -> Workflow {
    let condition = serde_json::json!({
        "condition": { "field": "age", "operator": "greaterThan", "value": 18 }
    });
    Workflow::new("onboarding").with_layout(WorkflowLayout {
        nodes: vec![
            VisualNode::new("start", NodeKind::Start, 0.0, 0.0),
            VisualNode::new("m1", NodeKind::Module, 0.0, 100.0)
                .with_data(serde_json::json!({ "moduleKey": "personal" })),
            VisualNode::new("d", NodeKind::Decision, 0.0, 200.0).with_data(condition),
            VisualNode::new("m2", NodeKind::Module, -100.0, 300.0)
                .with_data(serde_json::json!({ "moduleKey": "adult" })),
            VisualNode::new("m3", NodeKind::Module, 100.0, 300.0)
                .with_data(serde_json::json!({ "moduleKey": "minor" })),
            VisualNode::new("end", NodeKind::End, 0.0, 400.0),
        ],
        connections: vec![
            VisualConnection::new("start", "m1"),
            VisualConnection::new("m1", "d"),
            VisualConnection::new("d", "m2"),
            VisualConnection::new("d", "m3"),
            VisualConnection::new("m2", "end"),
            VisualConnection::new("m3", "end"),
        ],
    })
}

/// Collects every notice the controller sends.
#[allow(dead_code)]
pub fn recording_sink() -> (Box<dyn NotificationSink>, Rc<RefCell<Vec<Notice>>>) {
    let notices = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&notices);
    let sink = move |notice: &Notice| handle.borrow_mut().push(notice.clone());
    (Box::new(sink), notices)
}

/// Host clipboard double that records writes, or fails every call.
#[allow(dead_code)]
pub struct RecordingClipboard {
    pub written: Rc<RefCell<Vec<String>>>,
    pub fail: bool,
}

impl SystemClipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> std::result::Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::PermissionDenied);
        }
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }
}

#[allow(dead_code)]
pub fn ids(module: &Module) -> Vec<&str> {
    module.fields.iter().map(|f| f.id.as_str()).collect()
}

/// Ids of the children of `parent`, in display order.
#[allow(dead_code)]
pub fn child_ids<'a>(module: &'a Module, parent: Option<&str>) -> Vec<&'a str> {
    module
        .children(parent)
        .into_iter()
        .map(|f| f.id.as_str())
        .collect()
}
