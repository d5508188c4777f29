//! Screen-space to document-space conversion.
//!
//! All hit-testing, drag deltas, and drop insertion route through this
//! mapping so that interaction behaves identically at any zoom level:
//! `doc = (screen - origin) / zoom` and its inverse.

use crate::document::{MAX_ZOOM, MIN_ZOOM};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Maps between on-screen pixels and document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasMapper {
    /// On-screen top-left of the canvas element. Recomputed whenever the
    /// canvas is scrolled, resized, or panned.
    origin: Point,
    /// Must be kept in sync with the document's zoom.
    zoom: f64,
}

impl Default for CanvasMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasMapper {
    /// Identity mapping: origin at zero, zoom 1.
    pub fn new() -> Self {
        Self {
            origin: Point::ZERO,
            zoom: 1.0,
        }
    }

    /// Create a mapper with an explicit origin and zoom.
    pub fn with_origin(origin: Point, zoom: f64) -> Self {
        Self {
            origin,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Current canvas origin in screen space.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Update the origin after a scroll or resize of the host canvas.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Update the zoom factor, clamped like the document's.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Shift the origin by a screen-space delta (hand tool).
    pub fn pan(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    /// Convert a screen point to document coordinates.
    pub fn screen_to_doc(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.origin.x) / self.zoom,
            (screen.y - self.origin.y) / self.zoom,
        )
    }

    /// Convert a document point to screen coordinates.
    pub fn doc_to_screen(&self, doc: Point) -> Point {
        Point::new(
            doc.x * self.zoom + self.origin.x,
            doc.y * self.zoom + self.origin.y,
        )
    }

    /// Convert a screen-space delta to a document-space delta.
    pub fn screen_delta_to_doc(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }
}
