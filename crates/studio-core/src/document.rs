//! Document state and the action reducer.
//!
//! All mutations go through [`EditorState::apply`], a pure reduction
//! over a closed [`Action`] set: given the same state and action the
//! result is deterministic and the prior state is never touched, which
//! is what lets the history manager compare snapshots structurally.

use crate::error::{EditorError, EditorResult};
use crate::layer::{Layer, LayerId, LayerKind, LayerPatch};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Default canvas size for new documents.
pub const DEFAULT_CANVAS_SIZE: Size = Size::new(800.0, 600.0);

/// Available editor tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Hand,
    Text,
    Rect,
    Circle,
    Image,
}

/// Top-level studio mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Design,
    Video,
}

/// The document root: view state plus the ordered layer tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub mode: EditorMode,
    pub active_tool: Tool,
    /// Zoom factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    pub canvas_size: Size,
    /// Top-level layers in z-order (back to front). Grouped layers live
    /// exclusively under their parent's children; every id appears in
    /// exactly one place in the tree.
    pub layers: Vec<Layer>,
    /// Always a subset of the ids reachable from `layers`.
    pub selected_ids: HashSet<LayerId>,
    pub is_dragging: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

/// A document mutation. The closed set keeps the reducer exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTool(Tool),
    SetMode(EditorMode),
    /// Clamped to `[MIN_ZOOM, MAX_ZOOM]`; never stores an out-of-range
    /// value. Non-finite input is ignored.
    SetZoom(f64),
    SetCanvasSize(Size),
    SetDragging(bool),
    /// Append a layer to the top-level list, or to the given group's
    /// children. Fails with `DuplicateId` if any incoming id already
    /// exists in the tree.
    AddLayer {
        layer: Layer,
        parent: Option<LayerId>,
    },
    /// Merge a partial update into the layer with the given id, wherever
    /// it lives. Unknown ids are a silent no-op.
    UpdateLayer { id: LayerId, patch: LayerPatch },
    /// Remove the given layers and, for groups, all their descendants.
    /// Removed ids are also pruned from the selection.
    DeleteLayers { ids: Vec<LayerId> },
    /// Replace the selection; ids without a matching layer are dropped.
    SetSelection { ids: Vec<LayerId> },
    /// Move a top-level layer to the front of the z-order.
    BringToFront(LayerId),
    /// Move a top-level layer to the back of the z-order.
    SendToBack(LayerId),
}

impl EditorState {
    /// Create an empty document with default view state.
    pub fn new() -> Self {
        Self {
            mode: EditorMode::default(),
            active_tool: Tool::default(),
            zoom: 1.0,
            canvas_size: DEFAULT_CANVAS_SIZE,
            layers: Vec::new(),
            selected_ids: HashSet::new(),
            is_dragging: false,
        }
    }

    /// Find a layer anywhere in the tree.
    pub fn find_layer(&self, id: &LayerId) -> Option<&Layer> {
        find_in(&self.layers, id)
    }

    /// Find a layer anywhere in the tree, mutably.
    pub fn find_layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        find_in_mut(&mut self.layers, id)
    }

    /// Whether any layer in the tree has the given id.
    pub fn contains_id(&self, id: &LayerId) -> bool {
        self.find_layer(id).is_some()
    }

    /// All ids reachable from the top-level list.
    pub fn all_ids(&self) -> HashSet<LayerId> {
        let mut ids = HashSet::new();
        for layer in &self.layers {
            layer.collect_ids(&mut ids);
        }
        ids
    }

    /// Total number of layers in the tree, nested included.
    pub fn layer_count(&self) -> usize {
        self.layers.iter().map(Layer::node_count).sum()
    }

    /// Selected layers in tree order.
    pub fn selected_layers(&self) -> Vec<&Layer> {
        let mut out = Vec::new();
        collect_selected(&self.layers, &self.selected_ids, &mut out);
        out
    }

    /// Apply an action, producing the next state. Pure: `self` is never
    /// mutated, and well-typed input only fails for duplicate-id adds
    /// and invalid add targets.
    pub fn apply(&self, action: &Action) -> EditorResult<EditorState> {
        let mut next = self.clone();
        match action {
            Action::SetTool(tool) => next.active_tool = *tool,
            Action::SetMode(mode) => next.mode = *mode,
            Action::SetZoom(zoom) => {
                if zoom.is_finite() {
                    next.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
                } else {
                    log::warn!("ignoring non-finite zoom {zoom}");
                }
            }
            Action::SetCanvasSize(size) => next.canvas_size = *size,
            Action::SetDragging(dragging) => next.is_dragging = *dragging,
            Action::AddLayer { layer, parent } => {
                let mut incoming = HashSet::new();
                layer.collect_ids(&mut incoming);
                if incoming.len() != layer.node_count() {
                    return Err(EditorError::DuplicateId(layer.id.clone()));
                }
                if let Some(existing) = incoming.iter().find(|id| next.contains_id(id)) {
                    return Err(EditorError::DuplicateId(existing.clone()));
                }

                let mut layer = layer.clone();
                match parent {
                    None => {
                        layer.index = next.layers.len();
                        next.layers.push(layer);
                    }
                    Some(parent_id) => {
                        let Some(target) = next.find_layer_mut(parent_id) else {
                            return Err(EditorError::Validation(format!(
                                "add target {parent_id} does not exist"
                            )));
                        };
                        let LayerKind::Group { children } = &mut target.kind else {
                            return Err(EditorError::Validation(format!(
                                "add target {parent_id} is not a group"
                            )));
                        };
                        layer.index = children.len();
                        children.push(layer);
                    }
                }
            }
            Action::UpdateLayer { id, patch } => match next.find_layer_mut(id) {
                Some(layer) => layer.apply_patch(patch),
                None => log::debug!("update for unknown layer {id} ignored"),
            },
            Action::DeleteLayers { ids } => {
                let targets: HashSet<LayerId> = ids.iter().cloned().collect();
                let mut removed = HashSet::new();
                remove_layers(&mut next.layers, &targets, &mut removed);
                next.selected_ids.retain(|id| !removed.contains(id));
            }
            Action::SetSelection { ids } => {
                let selection: HashSet<LayerId> = ids
                    .iter()
                    .filter(|id| next.contains_id(id))
                    .cloned()
                    .collect();
                next.selected_ids = selection;
            }
            Action::BringToFront(id) => {
                if let Some(pos) = next.layers.iter().position(|l| &l.id == id) {
                    let layer = next.layers.remove(pos);
                    next.layers.push(layer);
                    reindex(&mut next.layers);
                }
            }
            Action::SendToBack(id) => {
                if let Some(pos) = next.layers.iter().position(|l| &l.id == id) {
                    let layer = next.layers.remove(pos);
                    next.layers.insert(0, layer);
                    reindex(&mut next.layers);
                }
            }
        }
        Ok(next)
    }
}

fn find_in<'a>(layers: &'a [Layer], id: &LayerId) -> Option<&'a Layer> {
    for layer in layers {
        if &layer.id == id {
            return Some(layer);
        }
        if let LayerKind::Group { children } = &layer.kind {
            if let Some(found) = find_in(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_mut<'a>(layers: &'a mut [Layer], id: &LayerId) -> Option<&'a mut Layer> {
    for layer in layers {
        if &layer.id == id {
            return Some(layer);
        }
        if let LayerKind::Group { children } = &mut layer.kind {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_layers(
    layers: &mut Vec<Layer>,
    targets: &HashSet<LayerId>,
    removed: &mut HashSet<LayerId>,
) {
    let len_before = layers.len();
    layers.retain(|layer| {
        if targets.contains(&layer.id) {
            layer.collect_ids(removed);
            false
        } else {
            true
        }
    });
    // Survivors keep index hints in sync with their array position.
    if layers.len() != len_before {
        reindex(layers);
    }
    for layer in layers.iter_mut() {
        if let LayerKind::Group { children } = &mut layer.kind {
            remove_layers(children, targets, removed);
        }
    }
}

fn collect_selected<'a>(
    layers: &'a [Layer],
    selected: &HashSet<LayerId>,
    out: &mut Vec<&'a Layer>,
) {
    for layer in layers {
        if selected.contains(&layer.id) {
            out.push(layer);
        }
        if let LayerKind::Group { children } = &layer.kind {
            collect_selected(children, selected, out);
        }
    }
}

fn reindex(layers: &mut [Layer]) {
    for (i, layer) in layers.iter_mut().enumerate() {
        layer.index = i;
    }
}
