// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed-form mass properties (unit density)

use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Volume, center of mass and inertia of a solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub volume: f64,
    pub barycenter: Point3<f64>,
    /// About the barycenter, world orientation
    pub inertia: Matrix3<f64>,
}

/// Principal inertia from the second moments `∫x²`, `∫y²`, `∫z²`.
pub(crate) fn principal_inertia(xx: f64, yy: f64, zz: f64) -> Matrix3<f64> {
    Matrix3::from_diagonal(&nalgebra::Vector3::new(yy + zz, zz + xx, xx + yy))
}

pub(crate) fn box_volume(depth: f64, width: f64, height: f64) -> f64 {
    depth * width * height
}

pub(crate) fn box_inertia(depth: f64, width: f64, height: f64) -> Matrix3<f64> {
    let c = box_volume(depth, width, height) / 12.0;
    principal_inertia(depth * depth * c, width * width * c, height * height * c)
}

pub(crate) fn ellipsoid_volume(rx: f64, ry: f64, rz: f64) -> f64 {
    4.0 * PI * rx * ry * rz / 3.0
}

pub(crate) fn ellipsoid_inertia(rx: f64, ry: f64, rz: f64) -> Matrix3<f64> {
    let c = 0.2 * ellipsoid_volume(rx, ry, rz);
    principal_inertia(rx * rx * c, ry * ry * c, rz * rz * c)
}

pub(crate) fn cone_volume(radius: f64, height: f64) -> f64 {
    PI * radius * radius * height / 3.0
}

/// About the barycenter, axis along local Z.
pub(crate) fn cone_inertia(radius: f64, height: f64) -> Matrix3<f64> {
    let v = cone_volume(radius, height);
    let r2 = radius * radius;
    let lateral = v * (0.15 * r2 + 0.0375 * height * height);
    Matrix3::from_diagonal(&nalgebra::Vector3::new(lateral, lateral, 0.3 * v * r2))
}
