//! Single-slot field clipboard plus the best-effort OS clipboard mirror.
//!
//! `ClipboardBuffer` is what paste reads from, while a `SystemClipboard` only
//! receives a text rendering for other applications. Failures on the OS side
//! never reach the buffer.

use crate::error::ClipboardError;
use crate::schema::{Field, Module};
use tracing::warn;

/// Holds at most one copied field subtree.
#[derive(Debug, Clone, Default)]
pub struct ClipboardBuffer {
    held: Option<Vec<Field>>,
}

impl ClipboardBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held value with an independent copy of `root` and all of
    /// its descendants in `module`. Returns `None` if `root_id` is unknown.
    pub fn copy_from(&mut self, module: &Module, root_id: &str) -> Option<&[Field]> {
        let ids = module.subtree_ids(root_id);
        let mut subtree = Vec::with_capacity(ids.len());
        for id in &ids {
            subtree.push(module.field(id)?.clone());
        }
        self.held = Some(subtree);
        self.held.as_deref()
    }

    /// A fresh copy of the held subtree, root first.
    pub fn get(&self) -> Option<Vec<Field>> {
        self.held.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    pub fn clear(&mut self) {
        self.held = None;
    }
}

/// Host clipboard text channel.
pub trait SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Used when no host clipboard is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSystemClipboard;

impl SystemClipboard for NoSystemClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// Writes `text` to the host clipboard, logging and discarding any failure.
pub fn mirror_text(clipboard: &mut dyn SystemClipboard, text: &str) -> bool {
    match clipboard.write_text(text) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "System clipboard mirror failed; in-app clipboard unaffected");
            false
        }
    }
}
