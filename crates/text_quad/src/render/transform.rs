//! Model transform for a text quad
//!
//! The quad is built in data space with its bottom-left corner at the shape's
//! position. Rotation must pivot around the quad's center and the raster's
//! y-down rows must be flipped to match texture sampling, so the matrix is
//! composed (applied right to left) as:
//!
//! ```text
//! T(-1,-1) · S(2) · T(c) · Rz(θ) · Rx(π) · T(-c)
//! ```
//!
//! where `c` is the center of the rectangle and `θ` its rotation. The first
//! four factors from the right form the pivot; the last two map a `[0,1]²`
//! data space into normalized device coordinates. Reordering them moves the
//! visual pivot.

use std::f32::consts::PI;

use crate::foundation::math::{Mat4, Vec2, Vec3};

/// Rotation by `rotation` radians about the rectangle's center, with the
/// vertical flip applied first
pub fn pivot_matrix(position: Vec2, extent: Vec2, rotation: f32) -> Mat4 {
    let center = position + extent / 2.0;
    let center = Vec3::new(center.x, center.y, 0.0);

    Mat4::new_translation(&center)
        * Mat4::new_rotation(Vec3::new(0.0, 0.0, rotation))
        * Mat4::new_rotation(Vec3::new(PI, 0.0, 0.0))
        * Mat4::new_translation(&-center)
}

/// Map data space `[0,1]²` onto normalized device space `[-1,1]²`
pub fn ndc_matrix() -> Mat4 {
    Mat4::new_translation(&Vec3::new(-1.0, -1.0, 0.0)) * Mat4::new_scaling(2.0)
}

/// Full model transform for a rectangle
pub fn model_matrix(position: Vec2, extent: Vec2, rotation: f32) -> Mat4 {
    ndc_matrix() * pivot_matrix(position, extent, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn apply(m: &Mat4, x: f32, y: f32) -> Point3 {
        m.transform_point(&Point3::new(x, y, 0.0))
    }

    #[test]
    fn test_center_is_fixed_point() {
        let position = Vec2::new(0.2, 0.1);
        let extent = Vec2::new(0.4, 0.6);
        let center = position + extent / 2.0;

        for rotation in [0.0, 0.3, FRAC_PI_2, PI, -1.7] {
            let m = pivot_matrix(position, extent, rotation);
            assert_relative_eq!(
                apply(&m, center.x, center.y),
                Point3::new(center.x, center.y, 0.0),
                epsilon = EPSILON
            );
        }
    }

    #[test]
    fn test_flip_swaps_top_and_bottom() {
        let position = Vec2::new(0.0, 0.0);
        let extent = Vec2::new(10.0, 20.0);
        let m = pivot_matrix(position, extent, 0.0);

        assert_relative_eq!(apply(&m, 0.0, 0.0), Point3::new(0.0, 20.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(apply(&m, 10.0, 20.0), Point3::new(10.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_quarter_turn_about_center() {
        let position = Vec2::new(0.0, 0.0);
        let extent = Vec2::new(2.0, 2.0);
        let m = pivot_matrix(position, extent, FRAC_PI_2);

        // (2, 1) flips to (2, 1), then rotates a quarter turn about (1, 1)
        assert_relative_eq!(apply(&m, 2.0, 1.0), Point3::new(1.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_unit_square_fills_ndc() {
        let m = model_matrix(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0.0);

        assert_relative_eq!(apply(&m, 0.5, 0.5), Point3::new(0.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(apply(&m, 0.0, 0.0), Point3::new(-1.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(apply(&m, 1.0, 1.0), Point3::new(1.0, -1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_center_maps_through_ndc() {
        let position = Vec2::new(0.1, 0.2);
        let extent = Vec2::new(0.3, 0.3);
        let center = position + extent / 2.0;
        let m = model_matrix(position, extent, 1.2);

        assert_relative_eq!(
            apply(&m, center.x, center.y),
            Point3::new(2.0 * center.x - 1.0, 2.0 * center.y - 1.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_composition_order() {
        let position = Vec2::new(0.1, 0.2);
        let extent = Vec2::new(0.3, 0.4);
        let rotation = 0.7;
        let c = Vec3::new(0.25, 0.4, 0.0);

        let expected = Mat4::new_translation(&Vec3::new(-1.0, -1.0, 0.0))
            * Mat4::new_scaling(2.0)
            * Mat4::new_translation(&c)
            * Mat4::new_rotation(Vec3::z() * rotation)
            * Mat4::new_rotation(Vec3::x() * PI)
            * Mat4::new_translation(&-c);

        assert_relative_eq!(model_matrix(position, extent, rotation), expected, epsilon = EPSILON);
    }
}
