// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation/rotation/scale transform with a lazily rebuilt matrix.
//!
//! [`Transform`] stores its components separately and only recomposes the
//! 4×4 matrix when it is read after a change. Matrices are column-major
//! `glam::Mat4`, composed as `T * R * S`.

use core::cell::Cell;
use core::ops::Mul;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// A local transform: translation, rotation and scale.
#[derive(Clone, Debug)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Cell<Option<Mat4>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

impl Transform {
    /// Returns the identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Cell::new(Some(Mat4::IDENTITY)),
        }
    }

    /// Creates a transform from its components.
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            matrix: Cell::new(None),
        }
    }

    /// Creates a pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, Vec3::ONE)
    }

    /// Creates a transform by decomposing `matrix`.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let mut t = Self::identity();
        t.set_matrix(matrix);
        t
    }

    /// Replaces all components by decomposing `matrix`.
    ///
    /// Shear and perspective are discarded.
    pub fn set_matrix(&mut self, matrix: Mat4) -> &mut Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self.matrix.set(None);
        self
    }

    /// Sets the translation.
    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self.matrix.set(None);
        self
    }

    /// Sets the x and y translation, keeping z.
    pub fn set_translation_2d(&mut self, translation: Vec2) -> &mut Self {
        self.set_translation(translation.extend(self.translation.z))
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation;
        self.matrix.set(None);
        self
    }

    /// Sets the rotation from XYZ Euler angles in radians.
    pub fn set_euler_rotation(&mut self, radians: Vec3) -> &mut Self {
        self.set_rotation(Quat::from_euler(EulerRot::XYZ, radians.x, radians.y, radians.z))
    }

    /// Sets the scale.
    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self.matrix.set(None);
        self
    }

    /// Returns the translation.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Returns the rotation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Returns the rotation as XYZ Euler angles in radians.
    #[must_use]
    pub fn euler_rotation(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Returns the scale.
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Returns the composed matrix, rebuilding it if a component changed.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        if let Some(m) = self.matrix.get() {
            return m;
        }
        let m = Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.matrix.set(Some(m));
        m
    }

    /// Offsets the translation.
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.set_translation(self.translation + delta)
    }

    /// Multiplies the scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) -> &mut Self {
        self.set_scale(self.scale * factor)
    }

    /// Adds XYZ Euler angles (radians) to the current rotation.
    pub fn rotate_euler(&mut self, radians: Vec3) -> &mut Self {
        self.set_euler_rotation(self.euler_rotation() + radians)
    }

    /// Rotates about the Z axis by `radians`.
    pub fn rotate_z(&mut self, radians: f32) -> &mut Self {
        self.set_rotation(Quat::from_rotation_z(radians) * self.rotation)
    }

    /// Maps a point through the matrix.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix().transform_point3(point)
    }
}

impl Mul for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Transform {
        Transform::from_matrix(self.matrix() * rhs.matrix())
    }
}

impl Mul<Mat4> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Mat4) -> Transform {
        Transform::from_matrix(self.matrix() * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_rebuilds_after_change() {
        let mut t = Transform::default();
        let before = t.matrix();
        t.set_translation(Vec3::new(1.0, 2.0, 3.0));
        let after = t.matrix();
        assert_ne!(before, after, "stale matrix after set");
        assert!(approx(t.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn scale_then_rotate_then_translate() {
        let mut t = Transform::default();
        t.set_scale(Vec3::splat(2.0))
            .set_rotation(Quat::from_rotation_z(FRAC_PI_2))
            .set_translation(Vec3::new(10.0, 0.0, 0.0));
        // (1,0,0) -> scale (2,0,0) -> rotate (0,2,0) -> translate (10,2,0)
        assert!(approx(t.transform_point(Vec3::X), Vec3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn set_matrix_decomposes() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::IDENTITY,
            Vec3::new(4.0, 5.0, 6.0),
        );
        let t = Transform::from_matrix(m);
        assert!(approx(t.translation(), Vec3::new(4.0, 5.0, 6.0)));
        assert!(approx(t.scale(), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn composition_multiplies_matrices() {
        let parent = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let child = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let scene = &parent * &child;
        assert!(approx(scene.transform_point(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn relative_helpers() {
        let mut t = Transform::default();
        t.translate(Vec3::X).translate(Vec3::Y);
        t.scale_by(Vec3::splat(3.0));
        t.set_translation_2d(Vec2::new(5.0, 6.0));
        assert!(approx(t.translation(), Vec3::new(5.0, 6.0, 0.0)));
        assert!(approx(t.scale(), Vec3::splat(3.0)));
        t.rotate_euler(Vec3::new(0.0, 0.0, 0.5));
        assert!((t.euler_rotation().z - 0.5).abs() < 1e-5, "z rotation accumulated");
    }
}
