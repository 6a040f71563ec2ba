//! The editor state controller: the single command surface the UI talks to.
//!
//! The controller holds exactly one current snapshot. Every accepted mutation
//! builds a brand-new snapshot, pushes the previous one onto the undo history,
//! re-runs validation and then notifies observers once. Rejected commands leave
//! the snapshot untouched, report through the notification sink and fire no
//! change event.

use crate::clipboard::{ClipboardBuffer, NoSystemClipboard, SystemClipboard, mirror_text};
use crate::compiler::{CompileDiagnostic, GraphCompiler};
use crate::condition::{Condition, ConditionGroup};
use crate::config::EditorConfig;
use crate::error::{CommandError, DocumentError};
use crate::hierarchy::{Direction, FieldPatch, HierarchyOperations, renumber};
use crate::history::UndoStack;
use crate::schema::{
    CONDITION_GROUP_KEY, CONDITION_KEY, Module, NodeKind, VisualConnection, VisualNode, Workflow,
};
use crate::validation::{
    FieldTypeRegistry, StandardFieldTypes, ValidationEngine, ValidationIssue, check_group,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod command;
pub mod notify;

pub use command::{Command, CommandKind};
pub use notify::{ChangeEvent, Notice, NoticeLevel, NotificationSink, SubscriptionId, TracingSink};

use notify::Observers;

/// An immutable whole-schema value. Cloning shares the underlying data.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSnapshot {
    pub module: Arc<Module>,
    pub workflow: Option<Arc<Workflow>>,
}

impl EditorSnapshot {
    pub fn new(module: Module, workflow: Option<Workflow>) -> Self {
        Self {
            module: Arc::new(module),
            workflow: workflow.map(Arc::new),
        }
    }

    /// Whether both snapshots share the very same module and workflow values.
    pub fn same_as(&self, other: &EditorSnapshot) -> bool {
        Arc::ptr_eq(&self.module, &other.module)
            && match (&self.workflow, &other.workflow) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

pub struct EditorBuilder {
    module: Module,
    workflow: Option<Workflow>,
    config: EditorConfig,
    registry: Box<dyn FieldTypeRegistry>,
    compiler: GraphCompiler,
    sink: Box<dyn NotificationSink>,
    system_clipboard: Box<dyn SystemClipboard>,
}

impl EditorBuilder {
    pub fn new(module: Module) -> Self {
        Self {
            module,
            workflow: None,
            config: EditorConfig::default(),
            registry: Box::new(StandardFieldTypes::new()),
            compiler: GraphCompiler::default(),
            sink: Box::new(TracingSink),
            system_clipboard: Box::new(NoSystemClipboard),
        }
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: Box<dyn FieldTypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_compiler(mut self, compiler: GraphCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_system_clipboard(mut self, clipboard: Box<dyn SystemClipboard>) -> Self {
        self.system_clipboard = clipboard;
        self
    }

    pub fn build(mut self) -> EditorStateController {
        renumber(&mut self.module.fields);
        let current = EditorSnapshot::new(self.module, self.workflow);
        let issues = ValidationEngine::new(self.registry.as_ref()).validate(&current.module);
        EditorStateController {
            history: UndoStack::new(self.config.history_capacity),
            config: self.config,
            registry: self.registry,
            compiler: self.compiler,
            sink: self.sink,
            system_clipboard: self.system_clipboard,
            clipboard: ClipboardBuffer::new(),
            observers: Observers::default(),
            current,
            selected: None,
            issues,
            revision: 0,
        }
    }
}

pub struct EditorStateController {
    config: EditorConfig,
    registry: Box<dyn FieldTypeRegistry>,
    compiler: GraphCompiler,
    sink: Box<dyn NotificationSink>,
    system_clipboard: Box<dyn SystemClipboard>,
    clipboard: ClipboardBuffer,
    observers: Observers,
    history: UndoStack<EditorSnapshot>,
    current: EditorSnapshot,
    selected: Option<String>,
    issues: Vec<ValidationIssue>,
    revision: u64,
}

impl EditorStateController {
    pub fn builder(module: Module) -> EditorBuilder {
        EditorBuilder::new(module)
    }

    pub fn new(module: Module) -> Self {
        EditorBuilder::new(module).build()
    }

    // --- Read accessors ---

    pub fn module(&self) -> &Module {
        &self.current.module
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.current.workflow.as_deref()
    }

    /// The current snapshot; it stays valid and unchanged whatever happens next.
    pub fn snapshot(&self) -> EditorSnapshot {
        self.current.clone()
    }

    pub fn selected_field_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_clipboard_content(&self) -> bool {
        !self.clipboard.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Observers ---

    pub fn subscribe(&mut self, callback: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // --- Field commands ---

    /// Adds a field of `field_type` at the end of `parent_id`'s children and
    /// returns its generated id.
    pub fn add_field(
        &mut self,
        field_type: &str,
        parent_id: Option<&str>,
    ) -> Result<String, CommandError> {
        let result = self.ops().add_field(&self.current.module, field_type, parent_id);
        let edit = result.or_else(|e| self.reject(e))?;
        if self.config.select_new_fields {
            self.selected = Some(edit.field_id.clone());
        }
        self.commit_module(CommandKind::AddField, edit.module);
        Ok(edit.field_id)
    }

    /// Deletes `id` and all of its descendants; returns the removed ids.
    pub fn delete_field(&mut self, id: &str) -> Result<Vec<String>, CommandError> {
        let result = self.ops().delete_field(&self.current.module, id);
        let removal = result.or_else(|e| self.reject(e))?;
        self.commit_module(CommandKind::DeleteField, removal.module);
        Ok(removal.removed)
    }

    pub fn duplicate_field(&mut self, id: &str) -> Result<String, CommandError> {
        let result = self.ops().duplicate_field(&self.current.module, id);
        let edit = result.or_else(|e| self.reject(e))?;
        if self.config.select_new_fields {
            self.selected = Some(edit.field_id.clone());
        }
        self.commit_module(CommandKind::DuplicateField, edit.module);
        Ok(edit.field_id)
    }

    pub fn move_field(&mut self, id: &str, direction: Direction) -> Result<(), CommandError> {
        let result = self.ops().move_field(&self.current.module, id, direction);
        let module = result.or_else(|e| self.reject(e))?;
        self.commit_module(CommandKind::MoveField, module);
        Ok(())
    }

    pub fn change_field_parent(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<(), CommandError> {
        let result = self
            .ops()
            .change_field_parent(&self.current.module, id, new_parent_id);
        let module = result.or_else(|e| self.reject(e))?;
        self.commit_module(CommandKind::ChangeFieldParent, module);
        Ok(())
    }

    pub fn update_field(&mut self, id: &str, patch: &FieldPatch) -> Result<(), CommandError> {
        let result = self.ops().update_field(&self.current.module, id, patch);
        let module = result.or_else(|e| self.reject(e))?;
        self.commit_module(CommandKind::UpdateField, module);
        Ok(())
    }

    /// Changes the selection. Not recorded in history.
    pub fn select_field(&mut self, id: Option<&str>) -> Result<(), CommandError> {
        if let Some(id) = id {
            if !self.current.module.contains(id) {
                return self.reject(CommandError::FieldNotFound(id.to_string()));
            }
        }
        self.selected = id.map(str::to_string);
        self.emit(CommandKind::SelectField);
        Ok(())
    }

    // --- Clipboard ---

    /// Copies `id` and its descendants into the clipboard and mirrors them to
    /// the system clipboard as JSON text.
    pub fn copy(&mut self, id: &str) -> Result<(), CommandError> {
        let Some(subtree) = self.clipboard.copy_from(&self.current.module, id) else {
            return self.reject(CommandError::FieldNotFound(id.to_string()));
        };
        let count = subtree.len();
        let text = serde_json::to_string_pretty(subtree).ok();

        if self.config.mirror_to_system_clipboard {
            if let Some(text) = text {
                mirror_text(self.system_clipboard.as_mut(), &text);
            }
        }
        debug!(field_id = id, count, "Copied field subtree");
        self.sink.notify(&Notice::new(
            NoticeLevel::Success,
            format!("Copied {} field(s)", count),
        ));
        self.emit(CommandKind::Copy);
        Ok(())
    }

    /// Pastes the clipboard content under `parent_id` and returns the new
    /// root id.
    pub fn paste(&mut self, parent_id: Option<&str>) -> Result<String, CommandError> {
        let Some(subtree) = self.clipboard.get() else {
            return self.reject(CommandError::ClipboardEmpty);
        };
        let result = self
            .ops()
            .insert_subtree(&self.current.module, &subtree, parent_id);
        let edit = result.or_else(|e| self.reject(e))?;
        if self.config.select_new_fields {
            self.selected = Some(edit.field_id.clone());
        }
        self.commit_module(CommandKind::Paste, edit.module);
        Ok(edit.field_id)
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<(), CommandError> {
        match self.history.undo(self.current.clone()) {
            Ok(previous) => {
                self.current = previous;
                info!(remaining = self.history.undo_len(), "Undo");
                self.after_change(CommandKind::Undo);
                Ok(())
            }
            Err(err) => self.reject(err.into()),
        }
    }

    pub fn redo(&mut self) -> Result<(), CommandError> {
        match self.history.redo(self.current.clone()) {
            Ok(next) => {
                self.current = next;
                info!(remaining = self.history.redo_len(), "Redo");
                self.after_change(CommandKind::Redo);
                Ok(())
            }
            Err(err) => self.reject(err.into()),
        }
    }

    // --- Validation ---

    pub fn refresh_validation(&mut self) -> &[ValidationIssue] {
        self.revalidate();
        self.emit(CommandKind::RefreshValidation);
        &self.issues
    }

    // --- Workflow commands ---

    /// Recomputes module order and rules from the drawn layout.
    pub fn compile_graph(&mut self) -> Result<Vec<CompileDiagnostic>, CommandError> {
        let workflow = self.require_workflow()?;
        let compiled = self.compiler.compile(workflow);

        for diagnostic in &compiled.diagnostics {
            if matches!(diagnostic, CompileDiagnostic::FallbackCondition { .. }) {
                self.sink
                    .notify(&Notice::new(NoticeLevel::Warning, diagnostic.to_string()));
            }
        }
        self.sink.notify(&Notice::new(
            NoticeLevel::Success,
            format!(
                "Workflow compiled: {} module(s), {} rule(s)",
                compiled.workflow.module_ids.len(),
                compiled.workflow.workflow_rules.len()
            ),
        ));

        if compiled.workflow == *workflow {
            self.emit(CommandKind::CompileGraph);
        } else {
            self.commit_workflow(CommandKind::CompileGraph, compiled.workflow);
        }
        Ok(compiled.diagnostics)
    }

    /// Adds a node and returns its generated id.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        x: f64,
        y: f64,
        data: serde_json::Value,
    ) -> Result<String, CommandError> {
        let workflow = self.require_workflow()?;
        let id = fresh_node_id(workflow, kind);
        let mut next = workflow.clone();
        next.layout
            .nodes
            .push(VisualNode::new(&id, kind, x, y).with_data(data));
        debug!(node_id = %id, %kind, "Added node");
        self.commit_workflow(CommandKind::AddNode, next);
        Ok(id)
    }

    /// Removes a node and every connection touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<(), CommandError> {
        let workflow = self.require_workflow()?;
        if workflow.layout.node(node_id).is_none() {
            return self.reject(CommandError::NodeNotFound(node_id.to_string()));
        }
        let mut next = workflow.clone();
        next.layout.nodes.retain(|n| n.id != node_id);
        next.layout
            .connections
            .retain(|c| c.source_node_id != node_id && c.target_node_id != node_id);
        debug!(node_id, "Removed node");
        self.commit_workflow(CommandKind::RemoveNode, next);
        Ok(())
    }

    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> Result<(), CommandError> {
        let workflow = self.require_workflow()?;
        let Some(position) = workflow.layout.nodes.iter().position(|n| n.id == node_id) else {
            return self.reject(CommandError::NodeNotFound(node_id.to_string()));
        };
        let mut next = workflow.clone();
        next.layout.nodes[position].x = x;
        next.layout.nodes[position].y = y;
        self.commit_workflow(CommandKind::MoveNode, next);
        Ok(())
    }

    /// Adds a directed connection. Returns `false` when it already existed, in
    /// which case nothing is recorded.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<bool, CommandError> {
        let workflow = self.require_workflow()?;
        for end in [source, target] {
            if workflow.layout.node(end).is_none() {
                return self.reject(CommandError::NodeNotFound(end.to_string()));
            }
        }
        if workflow.layout.has_connection(source, target) {
            debug!(source, target, "Connection already present");
            self.emit(CommandKind::Connect);
            return Ok(false);
        }
        let mut next = workflow.clone();
        next.layout
            .connections
            .push(VisualConnection::new(source, target));
        self.commit_workflow(CommandKind::Connect, next);
        Ok(true)
    }

    pub fn disconnect(&mut self, source: &str, target: &str) -> Result<(), CommandError> {
        let workflow = self.require_workflow()?;
        if !workflow.layout.has_connection(source, target) {
            return self.reject(CommandError::ConnectionNotFound {
                source_id: source.to_string(),
                target_id: target.to_string(),
            });
        }
        let mut next = workflow.clone();
        next.layout
            .connections
            .retain(|c| !(c.source_node_id == source && c.target_node_id == target));
        self.commit_workflow(CommandKind::Disconnect, next);
        Ok(())
    }

    /// Stores a rule-builder group on a decision node, together with its
    /// canonical form. Returns the rule-builder issues for the group.
    pub fn set_decision_condition(
        &mut self,
        node_id: &str,
        group: &ConditionGroup,
    ) -> Result<Vec<ValidationIssue>, CommandError> {
        let workflow = self.require_workflow()?;
        let Some(position) = workflow.layout.nodes.iter().position(|n| n.id == node_id) else {
            return self.reject(CommandError::NodeNotFound(node_id.to_string()));
        };
        if workflow.layout.nodes[position].kind != NodeKind::Decision {
            return self.reject(CommandError::NotADecisionNode(node_id.to_string()));
        }

        let issues = check_group(group);
        let condition: Option<Condition> = group.canonicalize(self.registry.as_ref());

        let mut next = workflow.clone();
        let node = &mut next.layout.nodes[position];
        if !node.data.is_object() {
            node.data = serde_json::Value::Object(serde_json::Map::new());
        }
        if let Some(data) = node.data.as_object_mut() {
            match condition.as_ref().and_then(|c| serde_json::to_value(c).ok()) {
                Some(value) => data.insert(CONDITION_KEY.to_string(), value),
                None => data.remove(CONDITION_KEY),
            };
            if let Ok(value) = serde_json::to_value(group) {
                data.insert(CONDITION_GROUP_KEY.to_string(), value);
            }
        }

        if !issues.is_empty() {
            self.sink.notify(&Notice::new(
                NoticeLevel::Warning,
                format!("{} incomplete condition(s) were ignored", issues.len()),
            ));
        }
        self.commit_workflow(CommandKind::SetDecisionCondition, next);
        Ok(issues)
    }

    // --- Loading ---

    /// Replaces the module with a decoded document. On a malformed document
    /// the current state is left untouched.
    pub fn load_module_json(&mut self, text: &str) -> Result<(), DocumentError> {
        match Module::from_json(text) {
            Ok(module) => {
                self.load_module(module);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Rejected module document");
                self.sink.notify(&Notice::new(
                    NoticeLevel::Error,
                    format!("Could not load module: {}", err),
                ));
                Err(err)
            }
        }
    }

    pub fn load_workflow_json(&mut self, text: &str) -> Result<(), DocumentError> {
        match Workflow::from_json(text) {
            Ok(workflow) => {
                self.load_workflow(workflow);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Rejected workflow document");
                self.sink.notify(&Notice::new(
                    NoticeLevel::Error,
                    format!("Could not load workflow: {}", err),
                ));
                Err(err)
            }
        }
    }

    /// Starts a fresh editing session on `module`; history is cleared.
    /// Takes over `module`, renumbering sibling orders to `1..=n`.
    pub fn load_module(&mut self, mut module: Module) {
        renumber(&mut module.fields);
        info!(module_id = %module.id, fields = module.fields.len(), "Loaded module");
        self.current = EditorSnapshot {
            module: Arc::new(module),
            workflow: self.current.workflow.clone(),
        };
        self.history.clear();
        self.selected = None;
        self.after_change(CommandKind::LoadModule);
    }

    pub fn load_workflow(&mut self, workflow: Workflow) {
        info!(workflow_id = %workflow.id, nodes = workflow.layout.nodes.len(), "Loaded workflow");
        self.current = EditorSnapshot {
            module: self.current.module.clone(),
            workflow: Some(Arc::new(workflow)),
        };
        self.history.clear();
        self.after_change(CommandKind::LoadWorkflow);
    }

    // --- Command dispatch ---

    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        debug!(kind = ?command.kind(), "Applying command");
        match command {
            Command::AddField {
                field_type,
                parent_id,
            } => self.add_field(&field_type, parent_id.as_deref()).map(drop),
            Command::DeleteField { field_id } => self.delete_field(&field_id).map(drop),
            Command::DuplicateField { field_id } => self.duplicate_field(&field_id).map(drop),
            Command::MoveField {
                field_id,
                direction,
            } => self.move_field(&field_id, direction),
            Command::ChangeFieldParent {
                field_id,
                new_parent_id,
            } => self.change_field_parent(&field_id, new_parent_id.as_deref()),
            Command::UpdateField { field_id, patch } => self.update_field(&field_id, &patch),
            Command::SelectField { field_id } => self.select_field(field_id.as_deref()),
            Command::Copy { field_id } => self.copy(&field_id),
            Command::Paste { parent_id } => self.paste(parent_id.as_deref()).map(drop),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::RefreshValidation => {
                self.refresh_validation();
                Ok(())
            }
            Command::CompileGraph => self.compile_graph().map(drop),
            Command::AddNode { kind, x, y, data } => self.add_node(kind, x, y, data).map(drop),
            Command::RemoveNode { node_id } => self.remove_node(&node_id),
            Command::MoveNode { node_id, x, y } => self.move_node(&node_id, x, y),
            Command::Connect {
                source_node_id,
                target_node_id,
            } => self.connect(&source_node_id, &target_node_id).map(drop),
            Command::Disconnect {
                source_node_id,
                target_node_id,
            } => self.disconnect(&source_node_id, &target_node_id),
            Command::SetDecisionCondition { node_id, group } => {
                self.set_decision_condition(&node_id, &group).map(drop)
            }
        }
    }

    // --- Internals ---

    fn ops(&self) -> HierarchyOperations<'_> {
        HierarchyOperations::new(self.registry.as_ref(), &self.config)
    }

    fn require_workflow(&self) -> Result<&Workflow, CommandError> {
        match self.current.workflow.as_deref() {
            Some(workflow) => Ok(workflow),
            None => {
                self.notify_rejection(&CommandError::NoWorkflow);
                Err(CommandError::NoWorkflow)
            }
        }
    }

    fn reject<T>(&self, err: CommandError) -> Result<T, CommandError> {
        self.notify_rejection(&err);
        Err(err)
    }

    fn notify_rejection(&self, err: &CommandError) {
        warn!(error = %err, "Command rejected");
        self.sink.notify(&Notice::new(err.level(), err.to_string()));
    }

    fn commit_module(&mut self, kind: CommandKind, module: Module) {
        let next = EditorSnapshot {
            module: Arc::new(module),
            workflow: self.current.workflow.clone(),
        };
        self.commit(kind, next);
    }

    fn commit_workflow(&mut self, kind: CommandKind, workflow: Workflow) {
        let next = EditorSnapshot {
            module: self.current.module.clone(),
            workflow: Some(Arc::new(workflow)),
        };
        self.commit(kind, next);
    }

    /// Swaps in `next`, recording the pre-mutation snapshot for undo.
    fn commit(&mut self, kind: CommandKind, next: EditorSnapshot) {
        let previous = std::mem::replace(&mut self.current, next);
        self.history.save_state(previous);
        self.after_change(kind);
    }

    fn after_change(&mut self, kind: CommandKind) {
        let selection_gone = self
            .selected
            .as_deref()
            .is_some_and(|id| !self.current.module.contains(id));
        if selection_gone {
            self.selected = None;
        }
        self.revalidate();
        self.emit(kind);
    }

    fn revalidate(&mut self) {
        self.issues = ValidationEngine::new(self.registry.as_ref()).validate(&self.current.module);
    }

    fn emit(&mut self, kind: CommandKind) {
        self.revision += 1;
        let event = ChangeEvent {
            kind,
            revision: self.revision,
        };
        self.observers.emit(&event);
    }
}

fn fresh_node_id(workflow: &Workflow, kind: NodeKind) -> String {
    let mut suffix = workflow.layout.nodes.len() + 1;
    loop {
        let candidate = format!("{}_{}", kind, suffix);
        if workflow.layout.node(&candidate).is_none() {
            return candidate;
        }
        suffix += 1;
    }
}
