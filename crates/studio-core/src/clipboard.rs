//! Copy/paste serialization of layer subsets.
//!
//! The payload is plain JSON text through whatever clipboard the host
//! provides; no custom MIME type. Paste is all-or-nothing: a payload
//! that fails validation inserts zero layers.

use crate::error::{EditorError, EditorResult};
use crate::layer::Layer;

/// Document-space offset applied to pasted layers so they are visibly
/// distinguishable from their source.
pub const PASTE_OFFSET: f64 = 20.0;

/// A place to read and write clipboard text.
///
/// The in-memory backend is always available and doubles as the
/// fallback when system clipboard access is denied; the `arboard`
/// backend is behind the `system-clipboard` feature.
pub trait ClipboardBackend {
    /// Write text to the clipboard.
    fn write_text(&mut self, text: &str) -> EditorResult<()>;
    /// Read the clipboard's current text.
    fn read_text(&mut self) -> EditorResult<String>;
}

/// In-memory clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    /// Create an empty in-memory clipboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> EditorResult<()> {
        self.text = Some(text.to_owned());
        Ok(())
    }

    fn read_text(&mut self) -> EditorResult<String> {
        self.text
            .clone()
            .ok_or_else(|| EditorError::Clipboard("clipboard is empty".to_owned()))
    }
}

/// System clipboard through arboard.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Open the system clipboard. Fails when the platform denies
    /// access; callers fall back to [`MemoryClipboard`].
    pub fn new() -> EditorResult<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| EditorError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardBackend for SystemClipboard {
    fn write_text(&mut self, text: &str) -> EditorResult<()> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| EditorError::Clipboard(e.to_string()))
    }

    fn read_text(&mut self) -> EditorResult<String> {
        self.inner
            .get_text()
            .map_err(|e| EditorError::Clipboard(e.to_string()))
    }
}

/// Serialize layers to the clipboard JSON payload.
pub fn encode_layers(layers: &[Layer]) -> EditorResult<String> {
    serde_json::to_string(layers).map_err(|e| EditorError::Clipboard(e.to_string()))
}

/// Parse and validate a clipboard payload.
///
/// The payload must be a JSON array where every element is an object
/// carrying a non-empty `id` and `type`. Anything else is a
/// [`EditorError::Validation`] and nothing is returned.
pub fn decode_layers(text: &str) -> EditorResult<Vec<Layer>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| EditorError::Validation(format!("clipboard payload is not JSON: {e}")))?;
    let items = value
        .as_array()
        .ok_or_else(|| EditorError::Validation("clipboard payload is not an array".to_owned()))?;

    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| EditorError::Validation(format!("element {i} is not an object")))?;
        let id_ok = obj
            .get("id")
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty());
        if !id_ok {
            return Err(EditorError::Validation(format!("element {i} is missing an id")));
        }
        let type_ok = obj
            .get("type")
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty());
        if !type_ok {
            return Err(EditorError::Validation(format!("element {i} is missing a type")));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| EditorError::Validation(format!("clipboard payload is malformed: {e}")))
}

/// Re-identify and offset decoded layers for insertion.
///
/// Every pasted layer (and, for groups, every descendant) gets a fresh
/// unique id; top-level positions shift by [`PASTE_OFFSET`] on both
/// axes.
pub fn prepare_pasted(mut layers: Vec<Layer>) -> Vec<Layer> {
    for layer in &mut layers {
        layer.regenerate_ids();
        layer.translate(PASTE_OFFSET, PASTE_OFFSET);
    }
    layers
}
