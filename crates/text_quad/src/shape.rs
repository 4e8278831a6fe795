//! The rectangle a text quad is drawn onto

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Axis-aligned rectangle with a rotation about its own center
///
/// `position` is the bottom-left corner in data space; the same value is
/// used as the raster anchor when glyphs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Bottom-left corner
    pub position: Vec2,
    /// Width and height
    pub extent: Vec2,
    /// Rotation in radians about the axis perpendicular to the screen
    pub rotation: f32,
}

impl Rect {
    /// Unrotated rectangle
    pub const fn new(position: Vec2, extent: Vec2) -> Self {
        Self {
            position,
            extent,
            rotation: 0.0,
        }
    }

    /// Same rectangle with a rotation
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        self.position + self.extent / 2.0
    }

    /// Scale position and extent by `factor`
    pub fn scale(&mut self, factor: f32) {
        self.position *= factor;
        self.extent *= factor;
    }

    /// Add `delta` radians to the rotation
    pub fn rotate_by(&mut self, delta: f32) {
        self.rotation += delta;
    }
}
