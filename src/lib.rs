// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shapekit
//!
//! Parametric solid primitives (box, ellipsoid, cone) with exact closest-point,
//! containment and mass-property queries, tessellation to triangle meshes and a
//! line-oriented `key: value` text format.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod primitive;
pub mod shape;

pub use config::{ShapeConfig, UnknownKeyPolicy};
pub use error::{Result, ShapeError};
pub use geometry::{Axis, Frame3D, Mesh, Triangle};
pub use io::{export_stl, read_shape_file, write_shape_file};
pub use primitive::{
    Box3D, Closest, Cone3D, Ellipsoid3D, MassProperties, Primitive, DEFAULT_DIV, TOL,
};
pub use shape::{Shape, ShapeKind};
