//! Selection semantics and the aggregate bounding box.

use crate::document::EditorState;
use crate::layer::{Layer, LayerId};
use kurbo::Rect;

/// Compute the selection that results from clicking a layer.
///
/// Without `multi` the clicked layer replaces the selection; with it,
/// membership is toggled (added if absent, removed if present).
pub fn selection_after_click(state: &EditorState, id: &LayerId, multi: bool) -> Vec<LayerId> {
    if !multi {
        return vec![id.clone()];
    }
    let mut ids: Vec<LayerId> = state.selected_ids.iter().cloned().collect();
    match ids.iter().position(|existing| existing == id) {
        Some(pos) => {
            ids.remove(pos);
        }
        None => ids.push(id.clone()),
    }
    ids
}

/// Axis-aligned bounding box over the layers' untransformed rectangles.
///
/// Rotation is intentionally ignored, matching the single-layer case
/// where the box equals the layer's own rect. Returns `None` for an
/// empty selection.
pub fn bounding_box<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Option<Rect> {
    layers
        .into_iter()
        .map(Layer::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Action;

    fn state_with(layers: Vec<Layer>) -> EditorState {
        let mut state = EditorState::new();
        for layer in layers {
            state = state
                .apply(&Action::AddLayer {
                    layer,
                    parent: None,
                })
                .unwrap();
        }
        state
    }

    #[test]
    fn test_single_click_replaces_selection() {
        let a = Layer::rect(0.0, 0.0, 10.0, 10.0);
        let b = Layer::rect(20.0, 20.0, 10.0, 10.0);
        let (id_a, id_b) = (a.id.clone(), b.id.clone());
        let state = state_with(vec![a, b]);
        let state = state
            .apply(&Action::SetSelection {
                ids: vec![id_a.clone()],
            })
            .unwrap();

        let ids = selection_after_click(&state, &id_b, false);
        assert_eq!(ids, vec![id_b]);
    }

    #[test]
    fn test_multi_click_toggles_membership() {
        let a = Layer::rect(0.0, 0.0, 10.0, 10.0);
        let b = Layer::rect(20.0, 20.0, 10.0, 10.0);
        let (id_a, id_b) = (a.id.clone(), b.id.clone());
        let state = state_with(vec![a, b]);
        let state = state
            .apply(&Action::SetSelection {
                ids: vec![id_a.clone()],
            })
            .unwrap();

        // Absent: added.
        let mut ids = selection_after_click(&state, &id_b, true);
        ids.sort();
        let mut expected = vec![id_a.clone(), id_b.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        // Present: removed.
        let ids = selection_after_click(&state, &id_a, true);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_bounding_box_single_layer_identity() {
        let layer = Layer::rect(10.0, 20.0, 100.0, 50.0);
        let bounds = bounding_box([&layer]).unwrap();
        assert_eq!(bounds, layer.bounds());
    }

    #[test]
    fn test_bounding_box_aggregate() {
        let a = Layer::rect(10.0, 10.0, 50.0, 50.0);
        let b = Layer::rect(100.0, 100.0, 20.0, 20.0);
        let bounds = bounding_box([&a, &b]).unwrap();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 110.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounding_box_ignores_rotation() {
        let mut layer = Layer::rect(0.0, 0.0, 100.0, 50.0);
        layer.set_rotation(45.0);
        let bounds = bounding_box([&layer]).unwrap();
        assert_eq!(bounds, layer.bounds());
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(bounding_box(std::iter::empty::<&Layer>()).is_none());
    }
}
