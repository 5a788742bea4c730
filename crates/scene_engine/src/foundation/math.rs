//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene and collision work.

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Epsilon used for near-zero length and denominator checks
    pub const GEOMETRY_EPSILON: f32 = 1e-6;
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a perspective frustum projection matrix
    ///
    /// Maps the viewing volume `[left, right] x [bottom, top]` at `near`
    /// out to `far`, OpenGL clip-space conventions.
    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Extract the translation column as a vector
    fn translation_part(&self) -> super::math::Vec3;
}

impl Mat4Ext for Mat4 {
    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let rl = right - left;
        let tb = top - bottom;
        let fln = far - near;

        Mat4::new(
            (2.0 * near) / rl, 0.0, (right + left) / rl, 0.0,
            0.0, (2.0 * near) / tb, (top + bottom) / tb, 0.0,
            0.0, 0.0, -(far + near) / fln, -(2.0 * far * near) / fln,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn translation_part(&self) -> Vec3 {
        Vec3::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }
}

use self::constants::GEOMETRY_EPSILON;

/// Build an orthonormal (right, forward, up) basis from a forward and a
/// reference up vector.
///
/// The forward direction wins: up is re-orthogonalized against it. If the
/// two are parallel a fallback reference axis is substituted so the basis
/// never collapses.
pub fn orthonormal_basis(forward: Vec3, up_hint: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = if forward.norm_squared() > GEOMETRY_EPSILON {
        forward.normalize()
    } else {
        Vec3::y()
    };

    let mut right = forward.cross(&up_hint);
    if right.norm_squared() <= GEOMETRY_EPSILON {
        // forward parallel to the hint; pick whichever world axis is least aligned
        let fallback = if forward.z.abs() < 0.9 { Vec3::z() } else { Vec3::x() };
        right = forward.cross(&fallback);
    }
    let right = right.normalize();
    let up = right.cross(&forward);

    (right, forward, up)
}
