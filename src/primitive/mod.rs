// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parametric solid primitives and the capability set they share

mod box3d;
mod cone;
mod ellipsoid;
mod mass;

pub use box3d::Box3D;
pub use cone::Cone3D;
pub use ellipsoid::{ellipsoid_sextic, Ellipsoid3D};
pub use mass::MassProperties;

use crate::config::{ShapeConfig, UnknownKeyPolicy};
use crate::error::{Result, ShapeError};
use crate::geometry::{Axis, Frame3D, Mesh};
use crate::io::{self, Field};
use nalgebra::{Matrix3, Point3};
use std::fmt;
use tracing::warn;

/// Slack added to boundary comparisons in rim mode.
pub const TOL: f64 = 1e-12;

/// Tessellation resolution used when a division of zero is supplied.
pub const DEFAULT_DIV: u32 = 32;

/// Result of a closest-point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closest {
    /// Nearest point of the solid, in world coordinates
    pub point: Point3<f64>,
    /// Euclidean distance from the query point to `point`
    pub distance: f64,
}

impl Closest {
    pub fn new(query: &Point3<f64>, point: Point3<f64>) -> Self {
        Self {
            point,
            distance: nalgebra::distance(query, &point),
        }
    }

    /// The query point is its own answer.
    pub fn inside(query: &Point3<f64>) -> Self {
        Self {
            point: *query,
            distance: 0.0,
        }
    }
}

/// Operations every primitive provides.
///
/// Mass properties assume unit density, so mass equals volume. Mutating
/// operations come in two flavours: value-returning (`mirror`, `xform`) and
/// explicit `*_in_place` variants on an owned instance.
pub trait Primitive: Clone {
    /// Short type name used in text documents.
    fn name(&self) -> &'static str;

    /// Reset to the zero-sized primitive at the world origin.
    fn init(&mut self);

    /// Reflect across the plane orthogonal to `axis`.
    fn mirror(&self, axis: Axis) -> Self;

    fn mirror_in_place(&mut self, axis: Axis) {
        *self = self.mirror(axis);
    }

    /// Move the primitive from `frame`-local to world coordinates.
    fn xform(&self, frame: &Frame3D) -> Self;

    /// Express the primitive relative to `frame`.
    fn xform_inv(&self, frame: &Frame3D) -> Self;

    fn xform_in_place(&mut self, frame: &Frame3D) {
        *self = self.xform(frame);
    }

    fn closest(&self, p: &Point3<f64>) -> Result<Closest>;

    fn distance(&self, p: &Point3<f64>) -> Result<f64> {
        Ok(self.closest(p)?.distance)
    }

    /// Point-in-solid test; `rim` counts points within [`TOL`] of the boundary as inside.
    fn is_inside(&self, p: &Point3<f64>, rim: bool) -> bool;

    fn volume(&self) -> f64;

    fn barycenter(&self) -> Point3<f64>;

    /// Inertia tensor about the barycenter, in world orientation.
    fn inertia(&self) -> Matrix3<f64>;

    fn bary_inertia(&self) -> (Point3<f64>, Matrix3<f64>) {
        (self.barycenter(), self.inertia())
    }

    fn mass_properties(&self) -> MassProperties {
        let (barycenter, inertia) = self.bary_inertia();
        MassProperties {
            volume: self.volume(),
            barycenter,
            inertia,
        }
    }

    fn to_mesh(&self) -> Result<Mesh>;

    /// Tessellation resolution, for primitives that have one.
    fn division(&self) -> Option<u32> {
        None
    }

    fn set_division(&mut self, _div: u32) {}

    /// Consume one text field. `Ok(false)` means the key is not handled here.
    fn scan_field(&mut self, field: &Field) -> Result<bool>;

    /// Print every field, in the order `scan_field` accepts them.
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Build a primitive from already tokenized fields.
    fn read_fields(fields: &[Field], config: &ShapeConfig) -> Result<Self>
    where
        Self: Default,
    {
        let mut prim = Self::default();
        prim.set_division(0);
        scan_fields(&mut prim, fields, config)?;
        if prim.division() == Some(0) {
            prim.set_division(config.default_div);
        }
        Ok(prim)
    }

    /// Parse a primitive from its text form.
    fn read_text(text: &str, config: &ShapeConfig) -> Result<Self>
    where
        Self: Default,
    {
        let fields = io::parse_fields(text)?;
        Self::read_fields(&fields, config)
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out).ok();
        out
    }
}

/// Feed fields to `prim`, applying the configured policy to keys it does not handle.
pub(crate) fn scan_fields<P: Primitive>(
    prim: &mut P,
    fields: &[Field],
    config: &ShapeConfig,
) -> Result<()> {
    for field in fields {
        if prim.scan_field(field)? {
            continue;
        }
        match config.unknown_keys {
            UnknownKeyPolicy::Reject => {
                return Err(ShapeError::UnknownKey {
                    line: field.line,
                    key: field.key.clone(),
                })
            }
            UnknownKeyPolicy::Skip => {
                warn!(key = %field.key, line = field.line, shape = prim.name(), "skipping unknown key");
            }
        }
    }
    Ok(())
}

/// Read one axis of `frame` from a field holding three reals or `auto`.
///
/// `auto` derives the axis from the other two by the right-hand rule
/// (x = y × z, y = z × x, z = x × y).
pub(crate) fn scan_frame_axis(frame: &mut Frame3D, axis: Axis, field: &Field) -> Result<()> {
    let dir = if field.is_word("auto") {
        let (a, b) = match axis {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        };
        frame.axis(a).cross(&frame.axis(b))
    } else {
        field.vector3()?
    };
    frame.set_axis(axis, &dir);
    Ok(())
}

/// Print the center and the three axes of `frame`.
pub(crate) fn write_frame(out: &mut dyn fmt::Write, frame: &Frame3D) -> fmt::Result {
    io::write_vector_field(out, "center", &frame.pos.coords)?;
    io::write_vector_field(out, "ax", &frame.axis(Axis::X))?;
    io::write_vector_field(out, "ay", &frame.axis(Axis::Y))?;
    io::write_vector_field(out, "az", &frame.axis(Axis::Z))
}

/// Division count with zero replaced by [`DEFAULT_DIV`].
pub(crate) fn div_or_default(div: u32) -> u32 {
    if div == 0 {
        DEFAULT_DIV
    } else {
        div
    }
}
