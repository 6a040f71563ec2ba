use crate::error::HistoryError;
use std::collections::VecDeque;

/// Default number of snapshots retained on the undo side.
pub const DEFAULT_CAPACITY: usize = 50;

/// Two bounded stacks of whole-state snapshots.
///
/// Snapshots are stored by value. Callers are expected to use immutable or
/// shared (`Arc`) state so that a stored entry can never change afterwards.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    capacity: usize,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> UndoStack<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Records the state that existed before a mutation. Clears the redo side
    /// and evicts the oldest entry once capacity is exceeded.
    pub fn save_state(&mut self, current: T) {
        self.redo.clear();
        self.undo.push_back(current);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    pub fn undo(&mut self, current: T) -> Result<T, HistoryError> {
        let previous = self.undo.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(current);
        Ok(previous)
    }

    pub fn redo(&mut self, current: T) -> Result<T, HistoryError> {
        let next = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.undo.push_back(current);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
