// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented box

use super::{mass, scan_frame_axis, write_frame, Closest, Primitive, TOL};
use crate::error::Result;
use crate::geometry::{Axis, Frame3D, Mesh, Triangle};
use crate::io::{self, Field};
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Corner quads, counter-clockwise seen from outside. Corner `i` sits at
/// `+x` when bit 0 is set, `+y` for bit 1 and `+z` for bit 2.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 4, 6, 2], // -x
    [1, 3, 7, 5], // +x
    [0, 1, 5, 4], // -y
    [2, 6, 7, 3], // +y
    [0, 2, 3, 1], // -z
    [4, 5, 7, 6], // +z
];

/// Box centered at its frame origin, with full extents along the local axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Box3D {
    pub frame: Frame3D,
    /// Extent along local X
    pub depth: f64,
    /// Extent along local Y
    pub width: f64,
    /// Extent along local Z
    pub height: f64,
}

impl Box3D {
    pub fn new(
        center: Point3<f64>,
        ax: &Vector3<f64>,
        ay: &Vector3<f64>,
        az: &Vector3<f64>,
        depth: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            frame: Frame3D::from_axes(center, ax, ay, az),
            depth: depth.abs(),
            width: width.abs(),
            height: height.abs(),
        }
    }

    /// Box whose axes coincide with the world axes.
    pub fn aligned(center: Point3<f64>, depth: f64, width: f64, height: f64) -> Self {
        Self::new(center, &Vector3::x(), &Vector3::y(), &Vector3::z(), depth, width, height)
    }

    pub fn center(&self) -> Point3<f64> {
        self.frame.pos
    }

    pub fn axis(&self, axis: Axis) -> Vector3<f64> {
        self.frame.axis(axis)
    }

    /// Full extent along a local axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.depth,
            Axis::Y => self.width,
            Axis::Z => self.height,
        }
    }

    pub fn half_extents(&self) -> Vector3<f64> {
        Vector3::new(self.depth, self.width, self.height) * 0.5
    }

    fn vertex_local(&self, i: usize) -> Point3<f64> {
        let h = self.half_extents();
        let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
        Point3::new(sign(1) * h.x, sign(2) * h.y, sign(4) * h.z)
    }

    /// Corner `i` (0..8) in world coordinates.
    pub fn vertex(&self, i: usize) -> Point3<f64> {
        self.frame.xform(&self.vertex_local(i))
    }
}

impl Default for Box3D {
    fn default() -> Self {
        Self::aligned(Point3::origin(), 0.0, 0.0, 0.0)
    }
}

impl Primitive for Box3D {
    fn name(&self) -> &'static str {
        "box"
    }

    fn init(&mut self) {
        *self = Self::default();
    }

    fn mirror(&self, axis: Axis) -> Self {
        Self {
            frame: self.frame.mirror(axis),
            ..self.clone()
        }
    }

    fn xform(&self, frame: &Frame3D) -> Self {
        Self {
            frame: frame.cascade(&self.frame),
            ..self.clone()
        }
    }

    fn xform_inv(&self, frame: &Frame3D) -> Self {
        Self {
            frame: self.frame.relative_to(frame),
            ..self.clone()
        }
    }

    /// Clamping is exact here because the box is separable per local axis.
    /// Interior points clamp to themselves.
    fn closest(&self, p: &Point3<f64>) -> Result<Closest> {
        let local = self.frame.xform_inv(p);
        let h = self.half_extents();
        let clamped = Point3::new(
            local.x.clamp(-h.x, h.x),
            local.y.clamp(-h.y, h.y),
            local.z.clamp(-h.z, h.z),
        );
        Ok(Closest::new(p, self.frame.xform(&clamped)))
    }

    fn is_inside(&self, p: &Point3<f64>, rim: bool) -> bool {
        let local = self.frame.xform_inv(p);
        let slack = if rim { TOL } else { 0.0 };
        Axis::ALL.iter().all(|&axis| {
            let limit = 0.5 * self.extent(axis) + slack;
            local[axis.index()].abs() <= limit
        })
    }

    fn volume(&self) -> f64 {
        mass::box_volume(self.depth, self.width, self.height)
    }

    fn barycenter(&self) -> Point3<f64> {
        self.center()
    }

    fn inertia(&self) -> Matrix3<f64> {
        self.frame
            .rotate_tensor(&mass::box_inertia(self.depth, self.width, self.height))
    }

    fn to_mesh(&self) -> Result<Mesh> {
        let mut mesh = Mesh::try_with_capacity(8, 12)?;
        for i in 0..8 {
            mesh.add_vertex(self.vertex_local(i));
        }
        for [a, b, c, d] in BOX_FACES {
            mesh.add_triangle(Triangle::new([a, b, c]));
            mesh.add_triangle(Triangle::new([a, c, d]));
        }
        mesh.transform(&self.frame);
        Ok(mesh)
    }

    fn scan_field(&mut self, field: &Field) -> Result<bool> {
        match field.key.as_str() {
            "center" => self.frame.pos = field.point3()?,
            "ax" => scan_frame_axis(&mut self.frame, Axis::X, field)?,
            "ay" => scan_frame_axis(&mut self.frame, Axis::Y, field)?,
            "az" => scan_frame_axis(&mut self.frame, Axis::Z, field)?,
            "depth" => self.depth = field.real()?.abs(),
            "width" => self.width = field.real()?.abs(),
            "height" => self.height = field.real()?.abs(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_frame(out, &self.frame)?;
        io::write_real_field(out, "depth", self.depth)?;
        io::write_real_field(out, "width", self.width)?;
        io::write_real_field(out, "height", self.height)
    }
}
