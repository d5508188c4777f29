//! Pointer-driven geometry gestures: drag, resize, rotate, wheel zoom,
//! and asset drops.
//!
//! A gesture spans pointer-down to pointer-up. Intermediate frames
//! mutate document state directly so the UI tracks the pointer, but the
//! pre-gesture snapshot is committed to history exactly once, at
//! pointer-up, and only when the gesture actually changed something.

use crate::document::{Action, EditorState, MAX_ZOOM, MIN_ZOOM};
use crate::editor::Editor;
use crate::error::{EditorError, EditorResult};
use crate::layer::{DEFAULT_LAYER_SIZE, Layer, LayerId, LayerPatch, MIN_LAYER_SIZE};
use crate::mapper::CanvasMapper;
use crate::selection;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Wheel-delta to zoom-delta conversion factor.
pub const WHEEL_ZOOM_FACTOR: f64 = 0.001;

/// The eight resize handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    E,
    W,
}

impl ResizeHandle {
    fn moves_x(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }

    fn moves_y(self) -> bool {
        !matches!(self, Self::E | Self::W)
    }

    /// The document-space point that stays fixed while this handle is
    /// dragged: the opposite corner, or the opposite edge midpoint.
    fn anchor(self, start: Rect) -> Point {
        let x = match self {
            Self::Nw | Self::Sw | Self::W => start.x1,
            Self::Ne | Self::Se | Self::E => start.x0,
            Self::N | Self::S => start.x0,
        };
        let y = match self {
            Self::Nw | Self::Ne | Self::N => start.y1,
            Self::Sw | Self::Se | Self::S => start.y0,
            Self::E | Self::W => start.y0,
        };
        Point::new(x, y)
    }
}

/// Resize a frame by dragging `handle` to `pointer` (document space).
///
/// The anchor edge or corner stays fixed; each moving axis spans from
/// the anchor to the pointer with the minimum size enforced, so
/// dragging a handle across its anchor pins the frame at the minimum
/// instead of flipping it.
pub fn resize_rect(start: Rect, handle: ResizeHandle, pointer: Point) -> Rect {
    let anchor = handle.anchor(start);

    let (x, width) = if handle.moves_x() {
        axis(anchor.x, pointer.x)
    } else {
        (start.x0, start.width())
    };
    let (y, height) = if handle.moves_y() {
        axis(anchor.y, pointer.y)
    } else {
        (start.y0, start.height())
    };

    Rect::new(x, y, x + width, y + height)
}

fn axis(anchor: f64, pointer: f64) -> (f64, f64) {
    let min = anchor.min(pointer);
    let max = anchor.max(pointer);
    let size = (max - min).max(MIN_LAYER_SIZE);
    // Keep the anchor fixed when the pointer crosses it.
    if pointer < anchor {
        (anchor - size, size)
    } else {
        (min, size)
    }
}

#[derive(Debug, Clone)]
enum Session {
    Drag {
        last: Point,
        targets: Vec<LayerId>,
        before: EditorState,
        moved: bool,
    },
    Resize {
        id: LayerId,
        handle: ResizeHandle,
        start: Rect,
        before: EditorState,
        changed: bool,
    },
    Rotate {
        id: LayerId,
        before: EditorState,
        changed: bool,
    },
}

/// Drives drag, resize, and rotate gestures over an [`Editor`].
///
/// At most one gesture is active at a time; starting a new one cancels
/// the previous without committing it.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    session: Option<Session>,
}

impl TransformController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Handle pointer-down on the canvas with the select tool.
    ///
    /// Hit-tests top-level layers front to back (visible only). A hit
    /// layer becomes the selection (or joins it with `multi`, or keeps
    /// an existing multi-selection it is already part of) and a drag
    /// session starts over every selected unlocked layer. A miss clears
    /// the selection and starts nothing.
    pub fn pointer_down(
        &mut self,
        editor: &mut Editor,
        mapper: &CanvasMapper,
        screen: Point,
        multi: bool,
    ) -> EditorResult<()> {
        self.session = None;
        let doc = mapper.screen_to_doc(screen);

        let hit = editor
            .state()
            .layers
            .iter()
            .rev()
            .find(|layer| layer.visible && layer.hit_test(doc))
            .map(|layer| layer.id.clone());

        let Some(hit) = hit else {
            editor.clear_selection();
            return Ok(());
        };

        // Dragging a member of an existing multi-selection moves the
        // whole selection; anything else re-selects first.
        if !editor.state().selected_ids.contains(&hit) || multi {
            let ids = selection::selection_after_click(editor.state(), &hit, multi);
            editor.dispatch(Action::SetSelection { ids })?;
        }

        let before = editor.state().clone();
        let targets: Vec<LayerId> = editor
            .state()
            .selected_layers()
            .iter()
            .filter(|layer| !layer.locked)
            .map(|layer| layer.id.clone())
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        editor.dispatch(Action::SetDragging(true))?;
        self.session = Some(Session::Drag {
            last: screen,
            targets,
            before,
            moved: false,
        });
        Ok(())
    }

    /// Handle pointer movement during a drag.
    ///
    /// The screen delta since the last frame is converted to document
    /// space and applied to every target. Targets deleted mid-gesture
    /// are dropped; the gesture aborts once none remain.
    pub fn pointer_move(
        &mut self,
        editor: &mut Editor,
        mapper: &CanvasMapper,
        screen: Point,
    ) -> EditorResult<()> {
        let Some(Session::Drag {
            last,
            targets,
            moved,
            ..
        }) = &mut self.session
        else {
            return Ok(());
        };

        let delta = mapper.screen_delta_to_doc(screen - *last);
        *last = screen;

        targets.retain(|id| editor.state().contains_id(id));
        if targets.is_empty() {
            self.session = None;
            editor.dispatch(Action::SetDragging(false))?;
            return Ok(());
        }

        if delta.x == 0.0 && delta.y == 0.0 {
            return Ok(());
        }
        *moved = true;

        let patches: Vec<(LayerId, LayerPatch)> = targets
            .iter()
            .filter_map(|id| {
                editor.state().find_layer(id).map(|layer| {
                    (id.clone(), LayerPatch::position(layer.x + delta.x, layer.y + delta.y))
                })
            })
            .collect();
        for (id, patch) in patches {
            editor.dispatch(Action::UpdateLayer { id, patch })?;
        }
        Ok(())
    }

    /// Start a resize gesture on a handle of the given layer. Locked or
    /// missing layers refuse the gesture.
    pub fn begin_resize(
        &mut self,
        editor: &mut Editor,
        id: &LayerId,
        handle: ResizeHandle,
    ) -> EditorResult<()> {
        let Some(layer) = editor.state().find_layer(id) else {
            return Err(EditorError::Validation(format!("layer {id} does not exist")));
        };
        if layer.locked {
            return Err(EditorError::Validation(format!("layer {id} is locked")));
        }

        let start = layer.bounds();
        self.session = Some(Session::Resize {
            id: id.clone(),
            handle,
            start,
            before: editor.state().clone(),
            changed: false,
        });
        editor.dispatch(Action::SetDragging(true))
    }

    /// Handle pointer movement during a resize.
    pub fn resize_move(
        &mut self,
        editor: &mut Editor,
        mapper: &CanvasMapper,
        screen: Point,
    ) -> EditorResult<()> {
        let Some(Session::Resize {
            id,
            handle,
            start,
            changed,
            ..
        }) = &mut self.session
        else {
            return Ok(());
        };

        if !editor.state().contains_id(id) {
            self.session = None;
            return editor.dispatch(Action::SetDragging(false));
        }

        let pointer = mapper.screen_to_doc(screen);
        let frame = resize_rect(*start, *handle, pointer);
        if editor
            .state()
            .find_layer(id)
            .is_some_and(|layer| layer.bounds() == frame)
        {
            return Ok(());
        }
        *changed = true;
        let id = id.clone();
        editor.dispatch(Action::UpdateLayer {
            id,
            patch: LayerPatch::frame(frame),
        })
    }

    /// Start a rotate gesture on the given layer.
    pub fn begin_rotate(&mut self, editor: &mut Editor, id: &LayerId) -> EditorResult<()> {
        let Some(layer) = editor.state().find_layer(id) else {
            return Err(EditorError::Validation(format!("layer {id} does not exist")));
        };
        if layer.locked {
            return Err(EditorError::Validation(format!("layer {id} is locked")));
        }

        self.session = Some(Session::Rotate {
            id: id.clone(),
            before: editor.state().clone(),
            changed: false,
        });
        editor.dispatch(Action::SetDragging(true))
    }

    /// Set the rotation angle during a rotate gesture (degrees,
    /// normalized by the layer).
    pub fn rotate_to(&mut self, editor: &mut Editor, degrees: f64) -> EditorResult<()> {
        let Some(Session::Rotate { id, changed, .. }) = &mut self.session else {
            return Ok(());
        };

        if !editor.state().contains_id(id) {
            self.session = None;
            return editor.dispatch(Action::SetDragging(false));
        }

        *changed = true;
        let id = id.clone();
        editor.dispatch(Action::UpdateLayer {
            id,
            patch: LayerPatch::rotation_degrees(degrees),
        })
    }

    /// End the active gesture, committing it to history as a single
    /// undoable step if it changed anything.
    pub fn pointer_up(&mut self, editor: &mut Editor) -> EditorResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        editor.dispatch(Action::SetDragging(false))?;

        let (before, changed, label) = match session {
            Session::Drag { before, moved, .. } => (before, moved, "move"),
            Session::Resize {
                before, changed, ..
            } => (before, changed, "resize"),
            Session::Rotate {
                before, changed, ..
            } => (before, changed, "rotate"),
        };
        // A gesture that ends back where it started is not a step.
        if changed && editor.state() != &before {
            editor.commit_snapshot(before, label);
        }
        Ok(())
    }

    /// Abandon the active gesture, restoring the pre-gesture state
    /// without touching history.
    pub fn cancel(&mut self, editor: &mut Editor) -> EditorResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let before = match session {
            Session::Drag { before, .. }
            | Session::Resize { before, .. }
            | Session::Rotate { before, .. } => before,
        };
        editor.restore_state(before);
        editor.dispatch(Action::SetDragging(false))
    }
}

/// Apply a mouse-wheel zoom: `zoom + delta * 0.001`, clamped. Only
/// acts while the zoom modifier is held (plain wheel events scroll the
/// host view instead). View state only, never undoable; the mapper is
/// kept in sync.
pub fn wheel_zoom(
    editor: &mut Editor,
    mapper: &mut CanvasMapper,
    wheel_delta: f64,
    modifier_held: bool,
) {
    if !modifier_held {
        return;
    }
    let zoom = (editor.state().zoom + wheel_delta * WHEEL_ZOOM_FACTOR).clamp(MIN_ZOOM, MAX_ZOOM);
    editor.set_zoom(zoom);
    mapper.set_zoom(zoom);
}

/// An asset dragged from the library panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPayload {
    pub label: String,
    pub src: String,
}

/// Handle an asset drop at a screen position: validate the payload,
/// insert an image layer centered on the drop point, select it, and
/// commit one history step.
pub fn drop_asset(
    editor: &mut Editor,
    mapper: &CanvasMapper,
    payload: &str,
    screen: Point,
) -> EditorResult<LayerId> {
    let asset: AssetPayload = serde_json::from_str(payload)
        .map_err(|e| EditorError::Validation(format!("drop payload is malformed: {e}")))?;
    if asset.label.is_empty() || asset.src.is_empty() {
        return Err(EditorError::Validation(
            "drop payload needs a label and a src".to_owned(),
        ));
    }

    let doc = mapper.screen_to_doc(screen);
    let layer = Layer::image(
        asset.src,
        doc.x - DEFAULT_LAYER_SIZE / 2.0,
        doc.y - DEFAULT_LAYER_SIZE / 2.0,
        DEFAULT_LAYER_SIZE,
        DEFAULT_LAYER_SIZE,
    );
    let id = layer.id.clone();
    editor.dispatch_committed(
        &[
            Action::AddLayer {
                layer,
                parent: None,
            },
            Action::SetSelection {
                ids: vec![id.clone()],
            },
        ],
        "insert image",
    )?;
    Ok(id)
}

/// Move every selected unlocked layer by a fixed document-space delta
/// (arrow-key nudge). One undoable step per call.
pub fn nudge_selection(editor: &mut Editor, dx: f64, dy: f64) -> EditorResult<()> {
    let targets: Vec<(LayerId, LayerPatch)> = editor
        .state()
        .selected_layers()
        .iter()
        .filter(|layer| !layer.locked)
        .map(|layer| {
            (
                layer.id.clone(),
                LayerPatch::position(layer.x + dx, layer.y + dy),
            )
        })
        .collect();
    if targets.is_empty() {
        return Ok(());
    }
    let actions: Vec<Action> = targets
        .into_iter()
        .map(|(id, patch)| Action::UpdateLayer { id, patch })
        .collect();
    editor.dispatch_committed(&actions, "move")
}
