//! The editor session: document state plus history, owned by the
//! caller and passed by reference to whatever needs it.
//!
//! View changes (tool, zoom, selection) dispatch directly and are not
//! undoable; document mutations go through the committed paths, which
//! snapshot the pre-mutation state into history exactly once per user
//! action.

use crate::clipboard::{self, ClipboardBackend};
use crate::document::{Action, EditorMode, EditorState, Tool};
use crate::error::EditorResult;
use crate::history::HistoryManager;
use crate::layer::{Layer, LayerId, LayerPatch};
use crate::selection;
use kurbo::{Rect, Size};

/// An editing session over a single design document.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: EditorState,
    history: HistoryManager,
}

impl Editor {
    /// Create a session over an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session over an existing document.
    pub fn with_state(state: EditorState) -> Self {
        Self {
            state,
            history: HistoryManager::new(),
        }
    }

    /// The current document state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The session's history.
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Dispatch an action without touching history.
    pub fn dispatch(&mut self, action: Action) -> EditorResult<()> {
        self.state = self.state.apply(&action)?;
        Ok(())
    }

    /// Apply a batch of actions atomically as one undoable step.
    ///
    /// Either every action applies and the pre-batch state is pushed to
    /// history, or none of them do. A batch that leaves the state
    /// unchanged pushes nothing.
    pub fn dispatch_committed(&mut self, actions: &[Action], label: &str) -> EditorResult<()> {
        let mut next = self.state.clone();
        for action in actions {
            next = next.apply(action)?;
        }
        if next != self.state {
            self.history.push(&self.state, label);
            self.state = next;
        }
        Ok(())
    }

    /// Record a gesture's pre-state as one undoable step. Used by the
    /// transform controller, which mutates state frame by frame and
    /// commits only at pointer-up.
    pub fn commit_snapshot(&mut self, before: EditorState, label: &str) {
        self.history.push(&before, label);
    }

    /// Replace the document state without touching history. Used to
    /// roll back a cancelled gesture.
    pub fn restore_state(&mut self, state: EditorState) {
        self.state = state;
    }

    /// Restore the previous committed state. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.state) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone state. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.state) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    // View state. None of these are undoable.

    /// Switch the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        // Total for well-typed input.
        let _ = self.dispatch(Action::SetTool(tool));
    }

    /// Switch the studio mode.
    pub fn set_mode(&mut self, mode: EditorMode) {
        let _ = self.dispatch(Action::SetMode(mode));
    }

    /// Set the zoom factor, clamped to the allowed range. View state,
    /// not document state: never undoable.
    pub fn set_zoom(&mut self, zoom: f64) {
        let _ = self.dispatch(Action::SetZoom(zoom));
    }

    /// Resize the canvas.
    pub fn set_canvas_size(&mut self, size: Size) {
        let _ = self.dispatch(Action::SetCanvasSize(size));
    }

    /// Click-select a layer: replace the selection, or toggle
    /// membership when `multi` is set.
    pub fn select_layer(&mut self, id: &LayerId, multi: bool) {
        let ids = selection::selection_after_click(&self.state, id, multi);
        let _ = self.dispatch(Action::SetSelection { ids });
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        let _ = self.dispatch(Action::SetSelection { ids: Vec::new() });
    }

    /// Selected layers in tree order.
    pub fn selected_layers(&self) -> Vec<&Layer> {
        self.state.selected_layers()
    }

    /// Aggregate bounding box of the selection, `None` when empty.
    pub fn selection_bounds(&self) -> Option<Rect> {
        selection::bounding_box(self.state.selected_layers())
    }

    // Committed document mutations.

    /// Add a layer to the top level and select it. One undoable step.
    pub fn add_layer(&mut self, layer: Layer) -> EditorResult<LayerId> {
        let id = layer.id.clone();
        self.dispatch_committed(
            &[
                Action::AddLayer {
                    layer,
                    parent: None,
                },
                Action::SetSelection {
                    ids: vec![id.clone()],
                },
            ],
            "add layer",
        )?;
        Ok(id)
    }

    /// Add a layer into a group's children. One undoable step.
    pub fn add_layer_to_group(&mut self, layer: Layer, parent: &LayerId) -> EditorResult<LayerId> {
        let id = layer.id.clone();
        self.dispatch_committed(
            &[Action::AddLayer {
                layer,
                parent: Some(parent.clone()),
            }],
            "add layer",
        )?;
        Ok(id)
    }

    /// Merge a partial update into a layer. Unknown ids are a no-op and
    /// push nothing to history.
    pub fn update_layer(&mut self, id: &LayerId, patch: LayerPatch) -> EditorResult<()> {
        self.dispatch_committed(
            &[Action::UpdateLayer {
                id: id.clone(),
                patch,
            }],
            "update layer",
        )
    }

    /// Delete the given layers (groups recursively). One undoable step.
    pub fn delete_layers(&mut self, ids: Vec<LayerId>) -> EditorResult<()> {
        self.dispatch_committed(&[Action::DeleteLayers { ids }], "delete")
    }

    /// Delete every selected layer.
    pub fn delete_selected(&mut self) -> EditorResult<()> {
        let ids: Vec<LayerId> = self.state.selected_ids.iter().cloned().collect();
        self.delete_layers(ids)
    }

    /// Move a top-level layer to the front of the z-order.
    pub fn bring_to_front(&mut self, id: &LayerId) -> EditorResult<()> {
        self.dispatch_committed(&[Action::BringToFront(id.clone())], "reorder")
    }

    /// Move a top-level layer to the back of the z-order.
    pub fn send_to_back(&mut self, id: &LayerId) -> EditorResult<()> {
        self.dispatch_committed(&[Action::SendToBack(id.clone())], "reorder")
    }

    /// Serialize the selection to the clipboard. Write failures are
    /// reported to the caller and leave document state untouched.
    pub fn copy_selection<B: ClipboardBackend>(&self, backend: &mut B) -> EditorResult<()> {
        let layers: Vec<Layer> = self
            .state
            .selected_layers()
            .into_iter()
            .cloned()
            .collect();
        let text = clipboard::encode_layers(&layers)?;
        backend.write_text(&text).inspect_err(|e| {
            log::warn!("clipboard write failed: {e}");
        })
    }

    /// Paste the clipboard's layers at the top level with fresh ids and
    /// a visible offset, replacing the selection with exactly the
    /// pasted ids. Validation failure inserts nothing.
    pub fn paste<B: ClipboardBackend>(&mut self, backend: &mut B) -> EditorResult<Vec<LayerId>> {
        let text = backend.read_text()?;
        let layers = clipboard::decode_layers(&text)?;
        let layers = clipboard::prepare_pasted(layers);
        self.insert_as_selection(layers, "paste")
    }

    /// Duplicate the selected top-level layers in place, with the same
    /// offset and re-identification as paste.
    pub fn duplicate_selection(&mut self) -> EditorResult<Vec<LayerId>> {
        let copies: Vec<Layer> = self
            .state
            .layers
            .iter()
            .filter(|layer| self.state.selected_ids.contains(&layer.id))
            .cloned()
            .collect();
        let copies = clipboard::prepare_pasted(copies);
        self.insert_as_selection(copies, "duplicate")
    }

    fn insert_as_selection(
        &mut self,
        layers: Vec<Layer>,
        label: &str,
    ) -> EditorResult<Vec<LayerId>> {
        let ids: Vec<LayerId> = layers.iter().map(|layer| layer.id.clone()).collect();
        let mut actions: Vec<Action> = layers
            .into_iter()
            .map(|layer| Action::AddLayer {
                layer,
                parent: None,
            })
            .collect();
        actions.push(Action::SetSelection { ids: ids.clone() });
        self.dispatch_committed(&actions, label)?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::error::EditorError;

    #[test]
    fn test_add_layer_selects_it() {
        let mut editor = Editor::new();
        let id = editor.add_layer(Layer::rect(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(editor.state().layers.len(), 1);
        assert!(editor.state().selected_ids.contains(&id));
        assert!(editor.history().can_undo());
    }

    #[test]
    fn test_update_layer_scenario() {
        let mut editor = Editor::new();
        let id = editor.add_layer(Layer::rect(0.0, 0.0, 100.0, 100.0)).unwrap();
        editor
            .update_layer(&id, LayerPatch {
                x: Some(50.0),
                ..LayerPatch::default()
            })
            .unwrap();
        assert!((editor.state().find_layer(&id).unwrap().x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_unknown_layer_pushes_no_history() {
        let mut editor = Editor::new();
        editor
            .update_layer(&LayerId::from("ghost"), LayerPatch::position(1.0, 1.0))
            .unwrap();
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_undo_redo_scenario() {
        let mut editor = Editor::new();
        let s0 = editor.state().clone();
        editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let s1 = editor.state().clone();
        editor.add_layer(Layer::rect(20.0, 20.0, 10.0, 10.0)).unwrap();

        assert!(editor.undo());
        assert_eq!(editor.state(), &s1);
        assert!(editor.undo());
        assert_eq!(editor.state(), &s0);
        assert!(editor.redo());
        assert_eq!(editor.state(), &s1);
        assert!(editor.history().can_redo());
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut editor = Editor::new();
        editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        editor.delete_selected().unwrap();
        assert!(editor.state().layers.is_empty());
        assert!(editor.state().selected_ids.is_empty());
    }

    #[test]
    fn test_selection_bounds() {
        let mut editor = Editor::new();
        let a = editor.add_layer(Layer::rect(10.0, 10.0, 50.0, 50.0)).unwrap();
        let b = editor.add_layer(Layer::rect(100.0, 100.0, 20.0, 20.0)).unwrap();
        editor.select_layer(&a, false);
        editor.select_layer(&b, true);

        let bounds = editor.selection_bounds().unwrap();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 110.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_copy_paste_round_trip() {
        let mut editor = Editor::new();
        let mut layer = Layer::rect(5.0, 5.0, 50.0, 50.0);
        layer.id = LayerId::from("abc");
        editor
            .dispatch_committed(
                &[
                    Action::AddLayer {
                        layer,
                        parent: None,
                    },
                    Action::SetSelection {
                        ids: vec![LayerId::from("abc")],
                    },
                ],
                "add layer",
            )
            .unwrap();

        let mut clipboard = MemoryClipboard::new();
        editor.copy_selection(&mut clipboard).unwrap();
        let pasted = editor.paste(&mut clipboard).unwrap();

        assert_eq!(pasted.len(), 1);
        let new = editor.state().find_layer(&pasted[0]).unwrap();
        assert_ne!(new.id, LayerId::from("abc"));
        assert!((new.x - 25.0).abs() < f64::EPSILON);
        assert!((new.y - 25.0).abs() < f64::EPSILON);
        // Structurally identical apart from id and position.
        let original = editor.state().find_layer(&LayerId::from("abc")).unwrap();
        assert_eq!(new.width, original.width);
        assert_eq!(new.kind, original.kind);
        assert_eq!(new.fill, original.fill);
        // Selection is exactly the pasted ids.
        assert_eq!(editor.state().selected_ids.len(), 1);
        assert!(editor.state().selected_ids.contains(&pasted[0]));
    }

    #[test]
    fn test_paste_invalid_payload_is_noop() {
        let mut editor = Editor::new();
        let id = editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let before = editor.state().clone();

        let mut clipboard = MemoryClipboard::new();
        clipboard.write_text("not json").unwrap();
        let err = editor.paste(&mut clipboard).unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        // No layers added, selection unchanged.
        assert_eq!(editor.state(), &before);
        assert!(editor.state().selected_ids.contains(&id));
    }

    #[test]
    fn test_paste_empty_clipboard_reports_error() {
        let mut editor = Editor::new();
        let mut clipboard = MemoryClipboard::new();
        let err = editor.paste(&mut clipboard).unwrap_err();
        assert!(matches!(err, EditorError::Clipboard(_)));
    }

    #[test]
    fn test_paste_all_fresh_distinct_ids() {
        let mut editor = Editor::new();
        editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = editor.add_layer(Layer::rect(5.0, 5.0, 10.0, 10.0)).unwrap();
        editor.select_layer(&b, true);
        // Select both.
        let all: Vec<LayerId> = editor.state().layers.iter().map(|l| l.id.clone()).collect();
        editor
            .dispatch(Action::SetSelection { ids: all.clone() })
            .unwrap();

        let mut clipboard = MemoryClipboard::new();
        editor.copy_selection(&mut clipboard).unwrap();
        let pasted = editor.paste(&mut clipboard).unwrap();

        assert_eq!(pasted.len(), 2);
        assert_ne!(pasted[0], pasted[1]);
        for id in &pasted {
            assert!(!all.contains(id));
        }
        assert_eq!(editor.state().layers.len(), 4);
    }

    #[test]
    fn test_duplicate_selection() {
        let mut editor = Editor::new();
        let id = editor.add_layer(Layer::rect(5.0, 5.0, 50.0, 50.0)).unwrap();
        let copies = editor.duplicate_selection().unwrap();

        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], id);
        let copy = editor.state().find_layer(&copies[0]).unwrap();
        assert!((copy.x - 25.0).abs() < f64::EPSILON);
        assert_eq!(editor.state().layers.len(), 2);
    }

    #[test]
    fn test_set_zoom_is_not_undoable() {
        let mut editor = Editor::new();
        editor.set_zoom(3.0);
        assert!((editor.state().zoom - 3.0).abs() < f64::EPSILON);
        assert!(!editor.history().can_undo());
        editor.set_zoom(10.0);
        assert!((editor.state().zoom - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_z_order_committed() {
        let mut editor = Editor::new();
        let a = editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let _b = editor.add_layer(Layer::rect(0.0, 0.0, 10.0, 10.0)).unwrap();

        editor.bring_to_front(&a).unwrap();
        assert_eq!(editor.state().layers[1].id, a);
        assert!(editor.undo());
        assert_eq!(editor.state().layers[0].id, a);
    }
}
