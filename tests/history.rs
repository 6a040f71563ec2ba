//! Tests for the bounded undo stack and the field clipboard.
mod common;
use common::*;
use formflow::clipboard::{ClipboardBuffer, NoSystemClipboard, SystemClipboard, mirror_text};
use formflow::error::HistoryError;
use formflow::history::UndoStack;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_undo_redo_walks_back_and_forth() {
    let mut stack = UndoStack::new(10);
    stack.save_state(1);
    stack.save_state(2);

    // Current state is 3.
    let current = stack.undo(3).unwrap();
    assert_eq!(current, 2);
    let current = stack.undo(current).unwrap();
    assert_eq!(current, 1);
    assert!(!stack.can_undo());

    let current = stack.redo(current).unwrap();
    assert_eq!(current, 2);
    let current = stack.redo(current).unwrap();
    assert_eq!(current, 3);
    assert!(!stack.can_redo());
}

#[test]
fn test_empty_stacks_report_errors() {
    let mut stack: UndoStack<&str> = UndoStack::new(5);
    assert_eq!(stack.undo("now"), Err(HistoryError::NothingToUndo));
    assert_eq!(stack.redo("now"), Err(HistoryError::NothingToRedo));
}

#[test]
fn test_new_edit_clears_redo() {
    let mut stack = UndoStack::new(5);
    stack.save_state("a");
    let current = stack.undo("b").unwrap();
    assert!(stack.can_redo());

    stack.save_state(current);
    assert!(!stack.can_redo());
    assert_eq!(stack.redo_len(), 0);
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut stack = UndoStack::new(3);
    for state in 0..5 {
        stack.save_state(state);
    }
    assert_eq!(stack.undo_len(), 3);

    let mut current = 5;
    let mut seen = Vec::new();
    while let Ok(previous) = stack.undo(current) {
        seen.push(previous);
        current = previous;
    }
    assert_eq!(seen, vec![4, 3, 2]);
}

#[test]
fn test_zero_capacity_keeps_one_entry() {
    let mut stack = UndoStack::new(0);
    stack.save_state('a');
    stack.save_state('b');
    assert_eq!(stack.capacity(), 1);
    assert_eq!(stack.undo_len(), 1);
}

#[test]
fn test_clipboard_copy_is_independent_of_module() {
    let mut module = create_nested_module();
    let mut clipboard = ClipboardBuffer::new();
    assert!(clipboard.is_empty());

    let copied = clipboard.copy_from(&module, "a").unwrap().to_vec();
    assert_eq!(copied.len(), 3);
    assert_eq!(copied[0].id, "a");

    module.fields[0].label = "Renamed".to_string();
    let mut first = clipboard.get().unwrap();
    assert_eq!(first[0].label, "Section A");

    // Mutating a retrieved copy does not reach the held value either.
    first[0].label = "Scratch".to_string();
    assert_eq!(clipboard.get().unwrap()[0].label, "Section A");
}

#[test]
fn test_clipboard_copy_of_missing_field_keeps_previous_content() {
    let module = create_nested_module();
    let mut clipboard = ClipboardBuffer::new();
    clipboard.copy_from(&module, "d");

    assert!(clipboard.copy_from(&module, "ghost").is_none());
    assert_eq!(clipboard.get().unwrap()[0].id, "d");

    clipboard.clear();
    assert!(clipboard.get().is_none());
}

#[test]
fn test_mirror_swallows_host_failures() {
    assert!(!mirror_text(&mut NoSystemClipboard, "payload"));

    let written = Rc::new(RefCell::new(Vec::new()));
    let mut host = RecordingClipboard {
        written: Rc::clone(&written),
        fail: false,
    };
    assert!(mirror_text(&mut host, "payload"));
    assert_eq!(written.borrow().last().map(String::as_str), Some("payload"));

    let mut broken = RecordingClipboard {
        written,
        fail: true,
    };
    assert!(!mirror_text(&mut broken, "other"));
}
