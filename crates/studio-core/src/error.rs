//! Error types for the editing engine.

use crate::layer::LayerId;
use thiserror::Error;

/// Errors produced by editing operations.
///
/// Unknown-id updates and deletes are deliberately not errors; they are
/// silent no-ops so that idempotent delete semantics hold.
#[derive(Debug, Error)]
pub enum EditorError {
    /// An add collided with an id that already exists in the document tree.
    #[error("duplicate layer id: {0}")]
    DuplicateId(LayerId),
    /// A clipboard or drop payload failed validation. Nothing was applied.
    #[error("invalid payload: {0}")]
    Validation(String),
    /// Clipboard I/O failed. Recoverable; never corrupts document state.
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
