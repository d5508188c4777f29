//! Whole-document serialization for save and handoff.

use crate::document::EditorState;
use crate::error::{EditorError, EditorResult};
use crate::layer::Layer;
use serde::{Deserialize, Serialize};

/// Document format version, bumped on breaking schema changes.
pub const EXPORT_VERSION: &str = "1.0";

/// Canvas dimensions as stored in the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasDimensions {
    pub width: f64,
    pub height: f64,
}

/// A self-contained design document: the layer tree plus the canvas it
/// was authored on. View state (zoom, tool, selection) is deliberately
/// not part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    pub version: String,
    pub canvas: CanvasDimensions,
    pub layers: Vec<Layer>,
}

/// Snapshot the editor's document content for export.
pub fn export_to_document(state: &EditorState) -> DesignDocument {
    DesignDocument {
        version: EXPORT_VERSION.to_owned(),
        canvas: CanvasDimensions {
            width: state.canvas_size.width,
            height: state.canvas_size.height,
        },
        layers: state.layers.clone(),
    }
}

/// Serialize a document to pretty JSON.
pub fn to_json(document: &DesignDocument) -> EditorResult<String> {
    serde_json::to_string_pretty(document).map_err(|e| EditorError::Validation(e.to_string()))
}

/// Parse a previously exported document.
pub fn from_json(text: &str) -> EditorResult<DesignDocument> {
    let document: DesignDocument = serde_json::from_str(text)
        .map_err(|e| EditorError::Validation(format!("document is malformed: {e}")))?;
    if document.version != EXPORT_VERSION {
        return Err(EditorError::Validation(format!(
            "unsupported document version {}",
            document.version
        )));
    }
    Ok(document)
}

/// Load an exported document into a fresh editor state.
pub fn import_document(document: DesignDocument) -> EditorState {
    let mut state = EditorState::new();
    state.canvas_size = kurbo::Size::new(document.canvas.width, document.canvas.height);
    state.layers = document.layers;
    state
}
