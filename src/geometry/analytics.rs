// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::{BoundingBox, Mesh};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Signed enclosed volume; positive for outward-wound closed meshes
    pub volume: f64,
    /// Total surface area
    pub surface_area: f64,
    pub bbox: BoundingBox,
    /// Center of mass of the enclosed solid
    pub centroid: Point3<f64>,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge is shared by exactly two faces traversing it in opposite directions
    pub is_watertight: bool,
    /// Faces whose corners are (numerically) collinear
    pub degenerate_count: usize,
}

impl GeometryStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: BoundingBox::empty(),
            centroid: Point3::origin(),
            vertex_count: 0,
            triangle_count: 0,
            is_watertight: false,
            degenerate_count: 0,
        }
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return GeometryStats::empty();
    }

    GeometryStats {
        volume: signed_volume(mesh),
        surface_area: surface_area(mesh),
        bbox: mesh.bounding_box(),
        centroid: centroid(mesh),
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        is_watertight: is_watertight(mesh),
        degenerate_count: degenerate_triangles(mesh, 0.0).len(),
    }
}

/// Enclosed volume by the divergence theorem: sum of signed tetrahedra
/// spanned by the origin and each face.
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|t| {
            let [v0, v1, v2] = mesh.triangle_points(t);
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

/// Calculate total surface area
pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|t| mesh.face_normal(t).norm() / 2.0)
        .sum()
}

/// Volume-weighted centroid of the enclosed solid.
///
/// Falls back to the vertex average when the mesh encloses no volume.
pub fn centroid(mesh: &Mesh) -> Point3<f64> {
    let mut volume = 0.0;
    let mut moment = Vector3::zeros();
    for triangle in &mesh.triangles {
        let [v0, v1, v2] = mesh.triangle_points(triangle);
        let tet = v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
        volume += tet;
        moment += (v0.coords + v1.coords + v2.coords) * (tet / 4.0);
    }

    if volume.abs() > f64::EPSILON {
        return Point3::from(moment / volume);
    }
    if mesh.vertices.is_empty() {
        return Point3::origin();
    }
    let sum = mesh
        .vertices
        .iter()
        .fold(Vector3::zeros(), |acc, v| acc + v.coords);
    Point3::from(sum / mesh.vertices.len() as f64)
}

/// A mesh is watertight and consistently wound when every directed edge
/// appears exactly once and its reverse appears exactly once.
pub fn is_watertight(mesh: &Mesh) -> bool {
    let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
    for triangle in &mesh.triangles {
        for edge in triangle.edges() {
            *directed.entry(edge).or_insert(0) += 1;
        }
    }

    directed
        .iter()
        .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
}

/// Indices of triangles whose area is at most `area_epsilon`.
pub fn degenerate_triangles(mesh: &Mesh, area_epsilon: f64) -> Vec<usize> {
    mesh.triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            let [a, b, c] = t.indices;
            a == b || b == c || c == a || mesh.face_normal(t).norm() / 2.0 <= area_epsilon
        })
        .map(|(i, _)| i)
        .collect()
}
