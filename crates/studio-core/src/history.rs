//! Undo/redo history over document snapshots.
//!
//! Snapshots are taken at gesture-commit points only, so one user
//! action maps to one undoable step no matter how many intermediate
//! frames it produced.

use crate::document::EditorState;
use std::time::SystemTime;

/// Maximum number of entries kept on each stack.
pub const MAX_HISTORY: usize = 50;

/// A committed snapshot.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Deep copy of the document state at the commit boundary.
    pub state: EditorState,
    pub timestamp: SystemTime,
    /// Human-readable label of the action that produced the commit.
    pub label: String,
}

impl HistoryEntry {
    fn new(state: &EditorState, label: &str) -> Self {
        Self {
            state: state.clone(),
            timestamp: SystemTime::now(),
            label: label.to_owned(),
        }
    }
}

/// Undo and redo stacks, each capped at [`MAX_HISTORY`] entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl HistoryManager {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed state. Clears the redo stack: a new commit
    /// invalidates previously undone history. The oldest entry is
    /// evicted once the cap is exceeded.
    pub fn push(&mut self, state: &EditorState, label: &str) {
        self.undo_stack.push(HistoryEntry::new(state, label));
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the most recent undo entry, saving `current` for redo.
    /// Returns `None` (and does nothing) when the stack is empty.
    pub fn undo(&mut self, current: &EditorState) -> Option<EditorState> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry::new(current, &entry.label));
        if self.redo_stack.len() > MAX_HISTORY {
            self.redo_stack.remove(0);
        }
        Some(entry.state)
    }

    /// Symmetric to [`undo`](Self::undo).
    pub fn redo(&mut self, current: &EditorState) -> Option<EditorState> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry::new(current, &entry.label));
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        Some(entry.state)
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Label of the next undoable step, for menu display.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.label.as_str())
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
