// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Right circular cone given by its base center, apex and base radius

use super::{div_or_default, mass, Closest, Primitive, DEFAULT_DIV, TOL};
use crate::error::{Result, ShapeError};
use crate::geometry::{Axis, Frame3D, Mesh, Triangle};
use crate::io::{self, Field};
use nalgebra::{Matrix3, Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cone3D {
    /// Center of the base disk
    pub center: Point3<f64>,
    /// Apex
    pub vert: Point3<f64>,
    pub radius: f64,
    /// Number of base-ring vertices in the tessellation
    pub div: u32,
}

impl Cone3D {
    pub fn new(center: Point3<f64>, vert: Point3<f64>, radius: f64, div: u32) -> Self {
        Self {
            center,
            vert,
            radius: radius.abs(),
            div: div_or_default(div),
        }
    }

    /// Base to apex.
    pub fn axis(&self) -> nalgebra::Vector3<f64> {
        self.vert - self.center
    }

    pub fn height(&self) -> f64 {
        self.axis().norm()
    }

    /// Right-handed frame at the base center with local Z toward the apex.
    pub fn frame(&self) -> Frame3D {
        Frame3D::from_z_axis(self.center, &self.axis())
    }

    /// Nearest point of the meridian triangle `(0,0) (r,0) (0,h)` boundary
    /// to `q = (ρ, z)`, ignoring the axis edge.
    fn closest_meridian(&self, q: &Point2<f64>) -> Point2<f64> {
        let r = self.radius;
        let h = self.height();

        let base_rim = Point2::new(r, 0.0);
        let apex = Point2::new(0.0, h);
        let generator: Vector2<f64> = apex - base_rim;
        let len2 = generator.norm_squared();
        let t = if len2 > 0.0 {
            ((q - base_rim).dot(&generator) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let candidates = [
            base_rim + generator * t,
            Point2::new(q.x.min(r), 0.0),
            apex,
        ];
        // first strict minimum wins, so ties go to the lateral surface
        let mut best = candidates[0];
        let mut best_dist = nalgebra::distance_squared(q, &best);
        for candidate in &candidates[1..] {
            let dist = nalgebra::distance_squared(q, candidate);
            if dist < best_dist {
                best = *candidate;
                best_dist = dist;
            }
        }
        best
    }
}

impl Default for Cone3D {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin(), 0.0, DEFAULT_DIV)
    }
}

impl Primitive for Cone3D {
    fn name(&self) -> &'static str {
        "cone"
    }

    fn init(&mut self) {
        *self = Self::default();
    }

    fn mirror(&self, axis: Axis) -> Self {
        let i = axis.index();
        let mut mirrored = self.clone();
        mirrored.center[i] = -mirrored.center[i];
        mirrored.vert[i] = -mirrored.vert[i];
        mirrored
    }

    fn xform(&self, frame: &Frame3D) -> Self {
        Self {
            center: frame.xform(&self.center),
            vert: frame.xform(&self.vert),
            ..self.clone()
        }
    }

    fn xform_inv(&self, frame: &Frame3D) -> Self {
        Self {
            center: frame.xform_inv(&self.center),
            vert: frame.xform_inv(&self.vert),
            ..self.clone()
        }
    }

    fn closest(&self, p: &Point3<f64>) -> Result<Closest> {
        if self.is_inside(p, true) {
            return Ok(Closest::inside(p));
        }
        let frame = self.frame();
        let local = frame.xform_inv(p);
        let rho = local.x.hypot(local.y);
        let (ux, uy) = if rho > 0.0 {
            (local.x / rho, local.y / rho)
        } else {
            (1.0, 0.0)
        };

        let m = self.closest_meridian(&Point2::new(rho, local.z));
        let cp = Point3::new(m.x * ux, m.x * uy, m.y);
        Ok(Closest::new(p, frame.xform(&cp)))
    }

    fn is_inside(&self, p: &Point3<f64>, rim: bool) -> bool {
        let h = self.height();
        let local = self.frame().xform_inv(p);
        let slack = if rim { TOL } else { 0.0 };
        if local.z < -slack || local.z > h + slack {
            return false;
        }
        let taper = if h > 0.0 { 1.0 - local.z / h } else { 1.0 };
        local.x.hypot(local.y) <= self.radius * taper + slack
    }

    fn volume(&self) -> f64 {
        mass::cone_volume(self.radius, self.height())
    }

    fn barycenter(&self) -> Point3<f64> {
        self.center + self.axis() * 0.25
    }

    fn inertia(&self) -> Matrix3<f64> {
        self.frame()
            .rotate_tensor(&mass::cone_inertia(self.radius, self.height()))
    }

    /// Base ring, apex last; lateral fan to the apex plus a base fan.
    fn to_mesh(&self) -> Result<Mesh> {
        let d = self.div;
        if d < 3 {
            return Err(ShapeError::InvalidDivision(d));
        }
        let n = d as usize;
        let mut mesh = Mesh::try_with_capacity(n.saturating_add(1), 2 * n - 2)?;

        for j in 0..n {
            let theta = 2.0 * PI * j as f64 / d as f64;
            let (s, c) = theta.sin_cos();
            mesh.add_vertex(Point3::new(self.radius * c, self.radius * s, 0.0));
        }
        let apex = mesh.add_vertex(Point3::new(0.0, 0.0, self.height()));

        for j in 0..n {
            mesh.add_triangle(Triangle::new([j, (j + 1) % n, apex]));
        }
        for k in 1..n - 1 {
            mesh.add_triangle(Triangle::new([0, k + 1, k]));
        }

        mesh.transform(&self.frame());
        debug!(div = d, triangles = mesh.triangle_count(), "tessellated cone");
        Ok(mesh)
    }

    fn division(&self) -> Option<u32> {
        Some(self.div)
    }

    fn set_division(&mut self, div: u32) {
        self.div = div;
    }

    fn scan_field(&mut self, field: &Field) -> Result<bool> {
        match field.key.as_str() {
            "center" => self.center = field.point3()?,
            "vert" => self.vert = field.point3()?,
            "radius" => self.radius = field.real()?.abs(),
            "div" => self.div = field.integer()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        io::write_vector_field(out, "center", &self.center.coords)?;
        io::write_vector_field(out, "vert", &self.vert.coords)?;
        io::write_real_field(out, "radius", self.radius)?;
        io::write_int_field(out, "div", self.div)
    }
}
