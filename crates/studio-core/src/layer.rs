//! Layer definitions for the design document.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Smallest allowed width/height for a layer.
pub const MIN_LAYER_SIZE: f64 = 1.0;

/// Default size for layers created without explicit dimensions
/// (toolbar inserts, asset drops).
pub const DEFAULT_LAYER_SIZE: f64 = 100.0;

/// Opaque unique layer identifier.
///
/// Generated ids are UUID strings, but any non-empty string coming in
/// from a validated clipboard payload is accepted; paste re-generates
/// ids anyway, so external identities never enter the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Generate a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is the empty string (never true for generated ids).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Text decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// The closed set of layer variants. Serialized with a `type` tag so
/// clipboard and export payloads match the original web format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default)]
        text: String,
        #[serde(default = "default_font_size")]
        font_size: f64,
        #[serde(default = "default_font_family")]
        font_family: String,
        #[serde(default)]
        font_weight: FontWeight,
        #[serde(default)]
        font_style: FontStyle,
        #[serde(default)]
        text_align: TextAlign,
        #[serde(default)]
        text_decoration: TextDecoration,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(default)]
        src: String,
    },
    Rect,
    Circle,
    #[serde(rename_all = "camelCase")]
    Group {
        #[serde(default)]
        children: Vec<Layer>,
    },
}

fn default_font_size() -> f64 {
    24.0
}

fn default_font_family() -> String {
    "Arial".to_owned()
}

fn default_size() -> f64 {
    DEFAULT_LAYER_SIZE
}

fn default_opacity() -> f64 {
    1.0
}

fn default_fill() -> String {
    "#3498db".to_owned()
}

fn default_stroke() -> String {
    "#000000".to_owned()
}

fn default_shadow_color() -> String {
    "#000000".to_owned()
}

fn default_true() -> bool {
    true
}

/// A single visual node in the design document.
///
/// Geometry is in document space with `(x, y)` at the top-left.
/// Paint attributes describe how the layer should be drawn; actual
/// rendering lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    #[serde(flatten)]
    pub kind: LayerKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_size")]
    pub width: f64,
    #[serde(default = "default_size")]
    pub height: f64,
    /// Rotation in degrees, normalized to `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub border_radius: f64,
    #[serde(default)]
    pub shadow_enabled: bool,
    #[serde(default = "default_shadow_color")]
    pub shadow_color: String,
    #[serde(default)]
    pub shadow_blur: f64,
    #[serde(default)]
    pub shadow_offset_x: f64,
    #[serde(default)]
    pub shadow_offset_y: f64,
    #[serde(default)]
    pub blur: f64,
    /// Grayscale percentage in `[0, 100]`.
    #[serde(default)]
    pub grayscale: f64,
    /// Invisible layers are excluded from rendering and hit-testing,
    /// not from the model.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Locked layers reject transform mutations.
    #[serde(default)]
    pub locked: bool,
    /// Z-order hint; the canonical order is array position in the
    /// owning list.
    #[serde(default)]
    pub index: usize,
}

impl Layer {
    /// Create a layer of the given kind with a fresh id.
    pub fn new(kind: LayerKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: LayerId::generate(),
            kind,
            x,
            y,
            width: width.max(MIN_LAYER_SIZE),
            height: height.max(MIN_LAYER_SIZE),
            rotation: 0.0,
            opacity: 1.0,
            fill: default_fill(),
            stroke: default_stroke(),
            stroke_width: 0.0,
            border_radius: 0.0,
            shadow_enabled: false,
            shadow_color: default_shadow_color(),
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            blur: 0.0,
            grayscale: 0.0,
            visible: true,
            locked: false,
            index: 0,
        }
    }

    /// Create a rectangle layer.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(LayerKind::Rect, x, y, width, height)
    }

    /// Create a circle (ellipse) layer.
    pub fn circle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(LayerKind::Circle, x, y, width, height)
    }

    /// Create a text layer with default typography.
    pub fn text(content: impl Into<String>, x: f64, y: f64) -> Self {
        let mut layer = Self::new(
            LayerKind::Text {
                text: content.into(),
                font_size: default_font_size(),
                font_family: default_font_family(),
                font_weight: FontWeight::default(),
                font_style: FontStyle::default(),
                text_align: TextAlign::default(),
                text_decoration: TextDecoration::default(),
            },
            x,
            y,
            DEFAULT_LAYER_SIZE,
            DEFAULT_LAYER_SIZE,
        );
        layer.fill = "#000000".to_owned();
        layer
    }

    /// Create an image layer.
    pub fn image(src: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(LayerKind::Image { src: src.into() }, x, y, width, height)
    }

    /// Create a group layer tightly bounding its children.
    pub fn group(children: Vec<Layer>) -> Self {
        let bounds = children
            .iter()
            .map(Layer::bounds)
            .reduce(|acc, b| acc.union(b))
            .unwrap_or(Rect::ZERO);
        Self::new(
            LayerKind::Group { children },
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height(),
        )
    }

    /// The layer's untransformed bounding rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Hit test a document-space point against the layer.
    ///
    /// Circles test against the inscribed ellipse; everything else uses
    /// the bounding rectangle. Rotation is ignored, matching the
    /// aggregate-box semantics of selection.
    pub fn hit_test(&self, point: Point) -> bool {
        match self.kind {
            LayerKind::Circle => {
                let rx = self.width / 2.0;
                let ry = self.height / 2.0;
                let dx = (point.x - (self.x + rx)) / rx;
                let dy = (point.y - (self.y + ry)) / ry;
                dx * dx + dy * dy <= 1.0
            }
            _ => self.bounds().contains(point),
        }
    }

    /// Whether this layer is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    /// The group's children, if this layer is a group.
    pub fn children(&self) -> Option<&[Layer]> {
        match &self.kind {
            LayerKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Move the layer by a document-space delta. Children live in
    /// document space too, so a moved group carries them along.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        if let LayerKind::Group { children } = &mut self.kind {
            for child in children {
                child.translate(dx, dy);
            }
        }
    }

    /// Replace the layer's frame, clamping width/height to the minimum.
    pub fn set_frame(&mut self, frame: Rect) {
        self.x = frame.x0;
        self.y = frame.y0;
        self.width = frame.width().max(MIN_LAYER_SIZE);
        self.height = frame.height().max(MIN_LAYER_SIZE);
    }

    /// Set rotation in degrees, normalized to `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_rotation(degrees);
    }

    /// Assign fresh ids to this layer and all descendants.
    pub fn regenerate_ids(&mut self) {
        self.id = LayerId::generate();
        if let LayerKind::Group { children } = &mut self.kind {
            for child in children {
                child.regenerate_ids();
            }
        }
    }

    /// Collect the ids of this layer and all descendants into `out`.
    pub fn collect_ids(&self, out: &mut HashSet<LayerId>) {
        out.insert(self.id.clone());
        if let LayerKind::Group { children } = &self.kind {
            for child in children {
                child.collect_ids(out);
            }
        }
    }

    /// Number of nodes in this subtree (self included).
    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            LayerKind::Group { children } => children.iter().map(Layer::node_count).sum(),
            _ => 0,
        }
    }

    /// Merge a partial update into the layer, clamping out-of-range
    /// values. Type-specific fields are ignored when the kind does not
    /// match.
    pub fn apply_patch(&mut self, patch: &LayerPatch) {
        let dx = patch.x.map_or(0.0, |x| x - self.x);
        let dy = patch.y.map_or(0.0, |y| y - self.y);
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        // A repositioned group carries its children, which are stored
        // in document space.
        if dx != 0.0 || dy != 0.0 {
            if let LayerKind::Group { children } = &mut self.kind {
                for child in children.iter_mut() {
                    child.translate(dx, dy);
                }
            }
        }
        if let Some(width) = patch.width {
            self.width = width.max(MIN_LAYER_SIZE);
        }
        if let Some(height) = patch.height {
            self.height = height.max(MIN_LAYER_SIZE);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(fill) = &patch.fill {
            self.fill = fill.clone();
        }
        if let Some(stroke) = &patch.stroke {
            self.stroke = stroke.clone();
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width.max(0.0);
        }
        if let Some(border_radius) = patch.border_radius {
            self.border_radius = border_radius.max(0.0);
        }
        if let Some(shadow_enabled) = patch.shadow_enabled {
            self.shadow_enabled = shadow_enabled;
        }
        if let Some(shadow_color) = &patch.shadow_color {
            self.shadow_color = shadow_color.clone();
        }
        if let Some(shadow_blur) = patch.shadow_blur {
            self.shadow_blur = shadow_blur.max(0.0);
        }
        if let Some(shadow_offset_x) = patch.shadow_offset_x {
            self.shadow_offset_x = shadow_offset_x;
        }
        if let Some(shadow_offset_y) = patch.shadow_offset_y {
            self.shadow_offset_y = shadow_offset_y;
        }
        if let Some(blur) = patch.blur {
            self.blur = blur.max(0.0);
        }
        if let Some(grayscale) = patch.grayscale {
            self.grayscale = grayscale.clamp(0.0, 100.0);
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }

        if let LayerKind::Text {
            text,
            font_size,
            font_family,
            font_weight,
            font_style,
            text_align,
            text_decoration,
        } = &mut self.kind
        {
            if let Some(new_text) = &patch.text {
                *text = new_text.clone();
            }
            if let Some(new_size) = patch.font_size {
                *font_size = new_size.max(1.0);
            }
            if let Some(new_family) = &patch.font_family {
                *font_family = new_family.clone();
            }
            if let Some(new_weight) = patch.font_weight {
                *font_weight = new_weight;
            }
            if let Some(new_style) = patch.font_style {
                *font_style = new_style;
            }
            if let Some(new_align) = patch.text_align {
                *text_align = new_align;
            }
            if let Some(new_decoration) = patch.text_decoration {
                *text_decoration = new_decoration;
            }
        }

        if let LayerKind::Image { src } = &mut self.kind {
            if let Some(new_src) = &patch.src {
                *src = new_src.clone();
            }
        }
    }
}

/// A partial layer update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub border_radius: Option<f64>,
    pub shadow_enabled: Option<bool>,
    pub shadow_color: Option<String>,
    pub shadow_blur: Option<f64>,
    pub shadow_offset_x: Option<f64>,
    pub shadow_offset_y: Option<f64>,
    pub blur: Option<f64>,
    pub grayscale: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub text_decoration: Option<TextDecoration>,
    pub src: Option<String>,
}

impl LayerPatch {
    /// A patch that moves a layer to an absolute position.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// A patch that replaces the full frame.
    pub fn frame(rect: Rect) -> Self {
        Self {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    /// A patch that sets rotation (degrees).
    pub fn rotation_degrees(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_creation() {
        let layer = Layer::rect(10.0, 20.0, 100.0, 50.0);
        assert!(!layer.id.is_empty());
        assert!((layer.x - 10.0).abs() < f64::EPSILON);
        assert!((layer.width - 100.0).abs() < f64::EPSILON);
        assert!(layer.visible);
        assert!(!layer.locked);
    }

    #[test]
    fn test_size_clamped_on_creation() {
        let layer = Layer::rect(0.0, 0.0, 0.0, -5.0);
        assert!((layer.width - MIN_LAYER_SIZE).abs() < f64::EPSILON);
        assert!((layer.height - MIN_LAYER_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let layer = Layer::rect(10.0, 20.0, 100.0, 50.0);
        let bounds = layer.bounds();
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_hit_test() {
        let layer = Layer::rect(0.0, 0.0, 100.0, 100.0);
        assert!(layer.hit_test(Point::new(50.0, 50.0)));
        assert!(!layer.hit_test(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_circle_hit_test() {
        let layer = Layer::circle(0.0, 0.0, 100.0, 100.0);
        assert!(layer.hit_test(Point::new(50.0, 50.0)));
        // Corner of the bounding box is outside the ellipse.
        assert!(!layer.hit_test(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_patch_clamps_geometry() {
        let mut layer = Layer::rect(0.0, 0.0, 100.0, 100.0);
        layer.apply_patch(&LayerPatch {
            width: Some(-10.0),
            height: Some(0.0),
            opacity: Some(3.0),
            ..LayerPatch::default()
        });
        assert!((layer.width - MIN_LAYER_SIZE).abs() < f64::EPSILON);
        assert!((layer.height - MIN_LAYER_SIZE).abs() < f64::EPSILON);
        assert!((layer.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_ignores_mismatched_kind_fields() {
        let mut layer = Layer::rect(0.0, 0.0, 100.0, 100.0);
        layer.apply_patch(&LayerPatch {
            text: Some("hello".to_owned()),
            src: Some("asset.png".to_owned()),
            ..LayerPatch::default()
        });
        assert_eq!(layer.kind, LayerKind::Rect);
    }

    #[test]
    fn test_rotation_normalization() {
        let mut layer = Layer::rect(0.0, 0.0, 10.0, 10.0);
        layer.set_rotation(360.0);
        assert!(layer.rotation.abs() < f64::EPSILON);
        layer.set_rotation(-90.0);
        assert!((layer.rotation - 270.0).abs() < f64::EPSILON);
        layer.set_rotation(725.0);
        assert!((layer.rotation - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_regenerate_ids_recurses() {
        let child = Layer::rect(0.0, 0.0, 10.0, 10.0);
        let child_id = child.id.clone();
        let mut group = Layer::group(vec![child]);
        let group_id = group.id.clone();

        group.regenerate_ids();
        assert_ne!(group.id, group_id);
        let new_child_id = &group.children().unwrap()[0].id;
        assert_ne!(*new_child_id, child_id);
    }

    #[test]
    fn test_translate_moves_group_children() {
        let inner = Layer::rect(0.0, 0.0, 10.0, 10.0);
        let mut group = Layer::group(vec![Layer::group(vec![inner])]);

        group.translate(50.0, 50.0);
        let nested = &group.children().unwrap()[0];
        assert!((nested.x - 50.0).abs() < f64::EPSILON);
        let inner = &nested.children().unwrap()[0];
        assert!((inner.x - 50.0).abs() < f64::EPSILON);
        assert!((inner.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_patch_carries_group_children() {
        let child = Layer::rect(5.0, 5.0, 10.0, 10.0);
        let mut group = Layer::group(vec![child]);

        group.apply_patch(&LayerPatch::position(100.0, 100.0));
        let child = &group.children().unwrap()[0];
        assert!((child.x - 100.0).abs() < f64::EPSILON);
        assert!((child.y - 100.0).abs() < f64::EPSILON);
        // The child stays inside the group frame.
        assert!(group.bounds().contains(Point::new(child.x + 5.0, child.y + 5.0)));
    }

    #[test]
    fn test_group_bounds_from_children() {
        let a = Layer::rect(10.0, 10.0, 50.0, 50.0);
        let b = Layer::rect(100.0, 100.0, 20.0, 20.0);
        let group = Layer::group(vec![a, b]);
        assert!((group.x - 10.0).abs() < f64::EPSILON);
        assert!((group.width - 110.0).abs() < f64::EPSILON);
        assert!((group.height - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_round_trip_tagged_kind() {
        let layer = Layer::text("Title", 5.0, 6.0);
        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"fontSize\""));
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let json = r#"{"id":"abc","type":"rect","x":5.0,"y":5.0}"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.id, LayerId::from("abc"));
        assert!((layer.width - DEFAULT_LAYER_SIZE).abs() < f64::EPSILON);
        assert!((layer.opacity - 1.0).abs() < f64::EPSILON);
        assert!(layer.visible);
    }
}
