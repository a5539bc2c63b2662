// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid frames: an origin plus an attitude matrix whose columns are the local axes

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Coordinate axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Local frame of a primitive embedded in world space.
///
/// Column `i` of `att` is the unit direction of local axis `i`. After a mirror
/// the attitude is a reflection (determinant -1); it stays orthonormal, so
/// its transpose is still its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame3D {
    pub pos: Point3<f64>,
    pub att: Matrix3<f64>,
}

impl Frame3D {
    pub fn new(pos: Point3<f64>, att: Matrix3<f64>) -> Self {
        Self { pos, att }
    }

    pub fn identity() -> Self {
        Self::new(Point3::origin(), Matrix3::identity())
    }

    pub fn from_translation(pos: Point3<f64>) -> Self {
        Self::new(pos, Matrix3::identity())
    }

    /// Build a frame from three axis directions, normalizing each of them.
    ///
    /// A zero-length axis is kept as zero rather than producing NaN.
    pub fn from_axes(
        pos: Point3<f64>,
        ax: &Vector3<f64>,
        ay: &Vector3<f64>,
        az: &Vector3<f64>,
    ) -> Self {
        Self::new(
            pos,
            Matrix3::from_columns(&[normalize_or_zero(ax), normalize_or_zero(ay), normalize_or_zero(az)]),
        )
    }

    /// Right-handed frame whose local Z is along `axis`.
    ///
    /// The local X is picked perpendicular to the least aligned world axis, so
    /// the result is well-defined for any non-zero direction.
    pub fn from_z_axis(pos: Point3<f64>, axis: &Vector3<f64>) -> Self {
        let z = match axis.try_normalize(f64::EPSILON) {
            Some(z) => z,
            None => return Self::from_translation(pos),
        };
        let arbitrary = if z.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let x = arbitrary.cross(&z).normalize();
        let y = z.cross(&x);
        Self::new(pos, Matrix3::from_columns(&[x, y, z]))
    }

    pub fn axis(&self, axis: Axis) -> Vector3<f64> {
        self.att.column(axis.index()).into_owned()
    }

    pub fn set_axis(&mut self, axis: Axis, dir: &Vector3<f64>) {
        self.att.set_column(axis.index(), &normalize_or_zero(dir));
    }

    /// Local point to world.
    pub fn xform(&self, p: &Point3<f64>) -> Point3<f64> {
        self.pos + self.att * p.coords
    }

    /// World point to local.
    pub fn xform_inv(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.att.tr_mul(&(p - self.pos)))
    }

    /// Local direction to world.
    pub fn xform_vec(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.att * v
    }

    /// World direction to local.
    pub fn xform_vec_inv(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.att.tr_mul(v)
    }

    /// Frame obtained by expressing `local` (given relative to `self`) in world space.
    pub fn cascade(&self, local: &Frame3D) -> Frame3D {
        Frame3D::new(self.xform(&local.pos), self.att * local.att)
    }

    /// Frame of `self` expressed relative to `f`.
    pub fn relative_to(&self, f: &Frame3D) -> Frame3D {
        Frame3D::new(f.xform_inv(&self.pos), f.att.tr_mul(&self.att))
    }

    pub fn inverse(&self) -> Frame3D {
        let att = self.att.transpose();
        Frame3D::new(Point3::from(-(att * self.pos.coords)), att)
    }

    /// Reflect the frame across the plane orthogonal to `axis`.
    ///
    /// Negates the `axis` component of the origin and of every local axis;
    /// applying it twice restores the frame exactly.
    pub fn mirror(&self, axis: Axis) -> Frame3D {
        let i = axis.index();
        let mut mirrored = *self;
        mirrored.pos[i] = -mirrored.pos[i];
        for mut col in mirrored.att.column_iter_mut() {
            col[i] = -col[i];
        }
        mirrored
    }

    /// Whether the attitude flips handedness.
    pub fn is_reflection(&self) -> bool {
        self.att.determinant() < 0.0
    }

    /// Rotate a local tensor into world orientation: `R · I · Rᵀ`.
    pub fn rotate_tensor(&self, local: &Matrix3<f64>) -> Matrix3<f64> {
        self.att * local * self.att.transpose()
    }
}

impl Default for Frame3D {
    fn default() -> Self {
        Self::identity()
    }
}

fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn rotated() -> Frame3D {
        let rot = Rotation3::from_euler_angles(0.3, -1.1, 2.0);
        Frame3D::new(Point3::new(1.0, -2.0, 0.5), *rot.matrix())
    }

    #[test]
    fn test_xform_roundtrip() {
        let f = rotated();
        let p = Point3::new(0.7, 3.0, -4.0);
        assert_relative_eq!(f.xform_inv(&f.xform(&p)), p, epsilon = 1e-12);
        assert_relative_eq!(f.xform(&f.xform_inv(&p)), p, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_matches_xform_inv() {
        let f = rotated();
        let inv = f.inverse();
        let p = Point3::new(-1.0, 2.0, 5.0);
        assert_relative_eq!(inv.xform(&p), f.xform_inv(&p), epsilon = 1e-12);
    }

    #[test]
    fn test_cascade_and_relative() {
        let f = rotated();
        let g = Frame3D::new(
            Point3::new(0.0, 1.0, 0.0),
            *Rotation3::from_axis_angle(&Vector3::z_axis(), 0.4).matrix(),
        );
        let h = f.cascade(&g);
        assert_relative_eq!(h.relative_to(&f).pos, g.pos, epsilon = 1e-12);
        assert_relative_eq!(h.relative_to(&f).att, g.att, epsilon = 1e-12);
    }

    #[test]
    fn test_from_z_axis_is_right_handed() {
        for dir in [
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-0.3, 0.8, 0.1),
        ] {
            let f = Frame3D::from_z_axis(Point3::origin(), &dir);
            assert_relative_eq!(f.axis(Axis::Z), dir.normalize(), epsilon = 1e-12);
            assert_relative_eq!(f.att.determinant(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(f.att.transpose() * f.att, Matrix3::identity(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mirror_twice_is_exact() {
        let f = rotated();
        for axis in Axis::ALL {
            let m = f.mirror(axis);
            assert!(m.is_reflection());
            assert_eq!(m.mirror(axis), f);
        }
    }

    #[test]
    fn test_from_axes_normalizes() {
        let f = Frame3D::from_axes(
            Point3::origin(),
            &Vector3::new(2.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, -5.0),
        );
        assert_relative_eq!(f.axis(Axis::X), Vector3::x(), epsilon = 1e-15);
        assert_eq!(f.axis(Axis::Y), Vector3::zeros());
        assert_relative_eq!(f.axis(Axis::Z), -Vector3::z(), epsilon = 1e-15);
    }
}
