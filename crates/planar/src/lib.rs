//! # planar 🧭
//!
//! planar is a small library for homogeneous planar coordinate frame math,
//! built on top of [`nalgebra`]'s fixed-size types.
//!
//! The walking core expresses every quantity in one of a handful of planar
//! frames (inertial, support foot, step origin, center of mass) and moves
//! between them with 3×3 homogeneous matrices over `f32`. A vector `v` in
//! frame `A` is taken to frame `B` by `m_b_a * v`, so compositions read
//! right-to-left:
//!
//! ```
//! use planar::{rotation, translation, vector};
//!
//! // first translate, then rotate
//! let m = rotation(std::f32::consts::FRAC_PI_2) * translation(10.0, 0.0);
//! let p = m * vector(0.0, 0.0);
//! assert!((p.y - 10.0).abs() < 1e-5);
//! ```
//!
//! A 4-D variant with selectable axes exists for rotating inertial
//! measurements into the world frame.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// A planar homogeneous transform.
pub type Transform = Matrix3<f32>;

/// A planar point or direction in homogeneous coordinates.
pub type Vector = Vector3<f32>;

/// Rotation axes for the 4-D homogeneous helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A planar rotation by `angle` radians, counterclockwise.
#[must_use]
pub fn rotation(angle: f32) -> Transform {
    if angle == 0.0 {
        return identity();
    }

    let (sin, cos) = angle.sin_cos();
    Matrix3::new(
        cos, -sin, 0.0, //
        sin, cos, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// A planar translation by `(dx, dy)`.
#[must_use]
pub fn translation(dx: f32, dy: f32) -> Transform {
    Matrix3::new(
        1.0, 0.0, dx, //
        0.0, 1.0, dy, //
        0.0, 0.0, 1.0,
    )
}

/// A homogeneous planar point at `(x, y)`.
#[must_use]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector3::new(x, y, 1.0)
}

/// The identity transform.
#[must_use]
pub fn identity() -> Transform {
    Matrix3::identity()
}

/// Reads the rotation angle out of a planar homogeneous transform.
///
/// Only valid for matrices built from [`rotation`] and [`translation`]
/// compositions, where the `(1, 0)` entry is `sin(angle)`.
#[must_use]
pub fn rotation_angle(m: &Transform) -> f32 {
    safe_asin(m[(1, 0)])
}

/// `asin` with the argument clamped into its domain, so accumulated float
/// error in a rotation matrix can never produce a NaN angle.
#[must_use]
pub fn safe_asin(value: f32) -> f32 {
    value.clamp(-1.0, 1.0).asin()
}

/// A 3-D rotation about `axis` in 4-D homogeneous coordinates.
#[must_use]
pub fn rotation4(axis: Axis, angle: f32) -> Matrix4<f32> {
    let (sin, cos) = angle.sin_cos();
    let mut m = Matrix4::identity();

    match axis {
        Axis::X => {
            m[(1, 1)] = cos;
            m[(1, 2)] = -sin;
            m[(2, 1)] = sin;
            m[(2, 2)] = cos;
        }
        Axis::Y => {
            m[(0, 0)] = cos;
            m[(0, 2)] = sin;
            m[(2, 0)] = -sin;
            m[(2, 2)] = cos;
        }
        Axis::Z => {
            m[(0, 0)] = cos;
            m[(0, 1)] = -sin;
            m[(1, 0)] = sin;
            m[(1, 1)] = cos;
        }
    }

    m
}

/// A homogeneous 3-D point at `(x, y, z)`.
#[must_use]
pub fn vector4(x: f32, y: f32, z: f32) -> Vector4<f32> {
    Vector4::new(x, y, z, 1.0)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rotation_composes_to_identity() {
        let m = rotation(FRAC_PI_3) * rotation(-FRAC_PI_3);
        assert_relative_eq!(m, identity(), epsilon = 1e-6);
    }

    #[test]
    fn translation_moves_points() {
        let p = translation(3.0, -2.0) * vector(1.0, 1.0);
        assert_relative_eq!(p.x, 4.0);
        assert_relative_eq!(p.y, -1.0);
        assert_relative_eq!(p.z, 1.0);
    }

    #[test]
    fn composition_is_right_to_left() {
        // translate first, rotate second
        let m = rotation(FRAC_PI_2) * translation(10.0, 0.0);
        let p = m * vector(0.0, 0.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_angle_round_trips() {
        for angle in [-1.2f32, -0.4, 0.0, 0.3, 1.5] {
            assert_relative_eq!(
                rotation_angle(&(rotation(angle) * translation(5.0, 6.0))),
                angle,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn safe_asin_clamps_out_of_domain() {
        assert_relative_eq!(safe_asin(1.0 + 1e-6), FRAC_PI_2);
        assert_relative_eq!(safe_asin(-2.0), -FRAC_PI_2);
    }

    #[test]
    fn rotation4_rotates_about_each_axis() {
        let p = rotation4(Axis::X, FRAC_PI_2) * vector4(0.0, 1.0, 0.0);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-5);

        let p = rotation4(Axis::Y, FRAC_PI_2) * vector4(1.0, 0.0, 0.0);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-5);

        let p = rotation4(Axis::Z, PI) * vector4(1.0, 0.0, 0.0);
        assert_relative_eq!(p.x, -1.0, epsilon = 1e-5);
    }
}
