//! Studio Core Library
//!
//! Platform-agnostic document model and editing logic for the Creator
//! Studio design editor: the layer tree, selection, transform gestures,
//! undo/redo history, clipboard codec, and canvas coordinate mapping.
//! Rendering and UI live outside this crate.

pub mod clipboard;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod layer;
pub mod mapper;
pub mod selection;
pub mod transform;

pub use clipboard::{ClipboardBackend, MemoryClipboard, PASTE_OFFSET};
pub use document::{Action, EditorMode, EditorState, Tool, MAX_ZOOM, MIN_ZOOM};
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use export::{DesignDocument, EXPORT_VERSION};
pub use history::{HistoryEntry, HistoryManager, MAX_HISTORY};
pub use layer::{Layer, LayerId, LayerKind, LayerPatch, DEFAULT_LAYER_SIZE, MIN_LAYER_SIZE};
pub use mapper::CanvasMapper;
pub use selection::{bounding_box, selection_after_click};
pub use transform::{
    AssetPayload, ResizeHandle, TransformController, drop_asset, nudge_selection, resize_rect,
    wheel_zoom,
};

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
