// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::{BoundingBox, Frame3D};
use crate::error::{Result, ShapeError};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices, counter-clockwise seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// Same triangle with the opposite orientation.
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.indices;
        Self::new([a, c, b])
    }

    /// Directed edges in winding order.
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Reserve exact room for a mesh of known size.
    ///
    /// Tessellation always knows its final counts up front; a failed
    /// reservation is reported instead of aborting the process.
    pub fn try_with_capacity(vertex_count: usize, triangle_count: usize) -> Result<Self> {
        let mut mesh = Self::new();
        mesh.vertices
            .try_reserve_exact(vertex_count)
            .map_err(|e| ShapeError::allocation("mesh vertices", e))?;
        mesh.triangles
            .try_reserve_exact(triangle_count)
            .map_err(|e| ShapeError::allocation("mesh triangles", e))?;
        Ok(mesh)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of a triangle.
    pub fn triangle_points(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        let [a, b, c] = triangle.indices;
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Unnormalized face normal, `(v1 - v0) × (v2 - v0)`; its length is twice the area.
    pub fn face_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let [v0, v1, v2] = self.triangle_points(triangle);
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit face normals, one per triangle. Degenerate faces get a zero vector.
    pub fn face_normals(&self) -> Vec<Vector3<f64>> {
        self.triangles
            .iter()
            .map(|t| {
                self.face_normal(t)
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect()
    }

    /// Whether every triangle references an existing vertex.
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.triangles
            .iter()
            .all(|t| t.indices.iter().all(|&i| i < n))
    }

    /// Map every vertex from `frame`-local to world coordinates.
    ///
    /// A reflecting frame reverses the winding so faces keep pointing outward.
    pub fn transform(&mut self, frame: &Frame3D) {
        for vertex in &mut self.vertices {
            *vertex = frame.xform(vertex);
        }
        if frame.is_reflection() {
            self.flip_winding();
        }
    }

    /// Reverse the orientation of every triangle.
    pub fn flip_winding(&mut self) {
        for triangle in &mut self.triangles {
            *triangle = triangle.flipped();
        }
    }

    /// Append another mesh, re-indexing its triangles.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            let [a, b, c] = triangle.indices;
            self.triangles
                .push(Triangle::new([a + offset, b + offset, c + offset]));
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }
}
