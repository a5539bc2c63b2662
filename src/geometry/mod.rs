// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - frames, meshes, polynomials and mesh analytics

mod analytics;
mod bbox;
mod frame;
mod mesh;
mod polynomial;

pub use analytics::{
    analyze, centroid, degenerate_triangles, is_watertight, signed_volume, surface_area,
    GeometryStats,
};
pub use bbox::BoundingBox;
pub use frame::{Axis, Frame3D};
pub use mesh::{Mesh, Triangle};
pub use polynomial::Polynomial;
