// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Type-erased primitive: one enum variant per primitive kind

use crate::config::ShapeConfig;
use crate::error::{Result, ShapeError};
use crate::geometry::{Axis, Frame3D, Mesh};
use crate::io::{self, Field};
use crate::primitive::{Box3D, Closest, Cone3D, Ellipsoid3D, Primitive};
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Primitive kinds known to the text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Ellipsoid,
    Cone,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Box, ShapeKind::Ellipsoid, ShapeKind::Cone];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Ellipsoid => "ellipsoid",
            ShapeKind::Cone => "cone",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Box(Box3D),
    Ellipsoid(Ellipsoid3D),
    Cone(Cone3D),
}

/// Forward a call to the wrapped primitive.
macro_rules! dispatch {
    ($shape:expr, $prim:ident => $body:expr) => {
        match $shape {
            Shape::Box($prim) => $body,
            Shape::Ellipsoid($prim) => $body,
            Shape::Cone($prim) => $body,
        }
    };
}

/// Same as `dispatch!`, rewrapping a primitive result in its variant.
macro_rules! dispatch_map {
    ($shape:expr, $prim:ident => $body:expr) => {
        match $shape {
            Shape::Box($prim) => Shape::Box($body),
            Shape::Ellipsoid($prim) => Shape::Ellipsoid($body),
            Shape::Cone($prim) => Shape::Cone($body),
        }
    };
}

impl Shape {
    /// Default-initialized primitive of the given kind.
    pub fn alloc(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Box => Shape::Box(Box3D::default()),
            ShapeKind::Ellipsoid => Shape::Ellipsoid(Ellipsoid3D::default()),
            ShapeKind::Cone => Shape::Cone(Cone3D::default()),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box(_) => ShapeKind::Box,
            Shape::Ellipsoid(_) => ShapeKind::Ellipsoid,
            Shape::Cone(_) => ShapeKind::Cone,
        }
    }

    /// Build a shape from fields whose first entry is `type: <kind>`.
    pub fn from_fields(fields: &[Field], config: &ShapeConfig) -> Result<Self> {
        let (head, rest) = fields
            .split_first()
            .ok_or_else(|| ShapeError::malformed(1, "empty shape document"))?;
        if head.key != "type" {
            return Err(ShapeError::malformed(
                head.line,
                format!("expected 'type' as the first field, found '{}'", head.key),
            ));
        }
        let kind = ShapeKind::ALL
            .into_iter()
            .find(|kind| head.is_word(kind.name()))
            .ok_or_else(|| ShapeError::malformed(head.line, "unknown shape type"))?;

        let shape = match kind {
            ShapeKind::Box => Shape::Box(Box3D::read_fields(rest, config)?),
            ShapeKind::Ellipsoid => Shape::Ellipsoid(Ellipsoid3D::read_fields(rest, config)?),
            ShapeKind::Cone => Shape::Cone(Cone3D::read_fields(rest, config)?),
        };
        debug!(%kind, fields = rest.len(), "read shape");
        Ok(shape)
    }

    pub fn from_text(text: &str, config: &ShapeConfig) -> Result<Self> {
        Self::from_fields(&io::parse_fields(text)?, config)
    }
}

impl From<Box3D> for Shape {
    fn from(b: Box3D) -> Self {
        Shape::Box(b)
    }
}

impl From<Ellipsoid3D> for Shape {
    fn from(e: Ellipsoid3D) -> Self {
        Shape::Ellipsoid(e)
    }
}

impl From<Cone3D> for Shape {
    fn from(c: Cone3D) -> Self {
        Shape::Cone(c)
    }
}

impl Primitive for Shape {
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn init(&mut self) {
        dispatch!(self, p => p.init())
    }

    fn mirror(&self, axis: Axis) -> Self {
        dispatch_map!(self, p => p.mirror(axis))
    }

    fn xform(&self, frame: &Frame3D) -> Self {
        dispatch_map!(self, p => p.xform(frame))
    }

    fn xform_inv(&self, frame: &Frame3D) -> Self {
        dispatch_map!(self, p => p.xform_inv(frame))
    }

    fn closest(&self, p: &Point3<f64>) -> Result<Closest> {
        dispatch!(self, prim => prim.closest(p))
    }

    fn is_inside(&self, p: &Point3<f64>, rim: bool) -> bool {
        dispatch!(self, prim => prim.is_inside(p, rim))
    }

    fn volume(&self) -> f64 {
        dispatch!(self, p => p.volume())
    }

    fn barycenter(&self) -> Point3<f64> {
        dispatch!(self, p => p.barycenter())
    }

    fn inertia(&self) -> Matrix3<f64> {
        dispatch!(self, p => p.inertia())
    }

    fn bary_inertia(&self) -> (Point3<f64>, Matrix3<f64>) {
        dispatch!(self, p => p.bary_inertia())
    }

    fn to_mesh(&self) -> Result<Mesh> {
        dispatch!(self, p => p.to_mesh())
    }

    fn division(&self) -> Option<u32> {
        dispatch!(self, p => p.division())
    }

    fn set_division(&mut self, div: u32) {
        dispatch!(self, p => p.set_division(div))
    }

    fn scan_field(&mut self, field: &Field) -> Result<bool> {
        dispatch!(self, p => p.scan_field(field))
    }

    /// Prefixed with the `type` field so [`Shape::from_text`] reads it back.
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        io::write_word_field(out, "type", self.name())?;
        dispatch!(self, p => p.write_text(out))
    }

    /// Same as [`Shape::from_fields`]: the leading `type` field picks the variant.
    fn read_fields(fields: &[Field], config: &ShapeConfig) -> Result<Self>
    where
        Self: Default,
    {
        Self::from_fields(fields, config)
    }

    fn read_text(text: &str, config: &ShapeConfig) -> Result<Self>
    where
        Self: Default,
    {
        Self::from_text(text, config)
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::alloc(ShapeKind::Box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownKeyPolicy;
    use approx::assert_relative_eq;

    fn samples() -> Vec<Shape> {
        vec![
            Box3D::aligned(Point3::new(1.0, 0.0, 0.0), 2.0, 1.0, 3.0).into(),
            Ellipsoid3D::aligned(Point3::new(0.0, 2.0, 0.0), 1.0, 2.0, 3.0, 12).into(),
            Cone3D::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 1.0, 10).into(),
        ]
    }

    #[test]
    fn test_alloc_and_kind() {
        for kind in ShapeKind::ALL {
            let shape = Shape::alloc(kind);
            assert_eq!(shape.kind(), kind);
            assert_eq!(shape.name(), kind.name());
            assert_eq!(ShapeKind::from_name(kind.name()), Some(kind));
            assert_eq!(shape.volume(), 0.0);
        }
        assert_eq!(ShapeKind::from_name("torus"), None);
    }

    #[test]
    fn test_dispatch_matches_variant() {
        for shape in samples() {
            let p = Point3::new(5.0, 5.0, 5.0);
            let direct = match &shape {
                Shape::Box(b) => b.closest(&p).unwrap(),
                Shape::Ellipsoid(e) => e.closest(&p).unwrap(),
                Shape::Cone(c) => c.closest(&p).unwrap(),
            };
            assert_eq!(shape.closest(&p).unwrap(), direct);
            assert_eq!(shape.bary_inertia(), (shape.barycenter(), shape.inertia()));
        }
    }

    #[test]
    fn test_text_roundtrip() {
        for shape in samples() {
            let text = shape.to_text();
            assert!(text.starts_with(&format!("type: {}\n", shape.name())));
            let read = Shape::from_text(&text, &ShapeConfig::default()).unwrap();
            assert_eq!(read.kind(), shape.kind());
            assert_eq!(read.division(), shape.division());
            assert_relative_eq!(read.volume(), shape.volume(), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_trait_readers_agree() {
        let config = ShapeConfig::default();
        let doc = "type: cone\ncenter: 0 0 0\nvert: 0 0 1\nradius: 1\n";
        let fields = io::parse_fields(doc).unwrap();
        let shape = <Shape as Primitive>::read_fields(&fields, &config).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Cone);
        assert_relative_eq!(shape.volume(), std::f64::consts::PI / 3.0, epsilon = 1e-12);
        assert_eq!(<Shape as Primitive>::read_text(doc, &config).unwrap(), shape);

        let untyped = io::parse_fields("center: 0 0 0\nvert: 0 0 1\nradius: 1\n").unwrap();
        assert!(matches!(
            <Shape as Primitive>::read_fields(&untyped, &config),
            Err(ShapeError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_or_unknown_type() {
        let config = ShapeConfig::default();
        assert!(matches!(
            Shape::from_text("radius: 1\n", &config),
            Err(ShapeError::MalformedInput { line: 1, .. })
        ));
        assert!(matches!(
            Shape::from_text("\ntype: torus\n", &config),
            Err(ShapeError::MalformedInput { line: 2, .. })
        ));
        assert!(Shape::from_text("", &config).is_err());
    }

    #[test]
    fn test_unknown_key_policy() {
        let doc = "type: cone\nvert: 0 0 1\nradius: 1\ncolor: red\n";
        let err = Shape::from_text(doc, &ShapeConfig::default()).unwrap_err();
        assert!(matches!(err, ShapeError::UnknownKey { line: 4, ref key } if key == "color"));

        let lenient = ShapeConfig {
            unknown_keys: UnknownKeyPolicy::Skip,
            ..ShapeConfig::default()
        };
        let shape = Shape::from_text(doc, &lenient).unwrap();
        assert_relative_eq!(shape.volume(), std::f64::consts::PI / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_configured_default_division() {
        let config = ShapeConfig {
            default_div: 7,
            ..ShapeConfig::default()
        };
        let shape = Shape::from_text("type: ellipsoid\nrx: 1\nry: 1\nrz: 1\n", &config).unwrap();
        assert_eq!(shape.division(), Some(7));
        let shape = Shape::from_text("type: ellipsoid\nrx: 1\nry: 1\nrz: 1\ndiv: 0\n", &config).unwrap();
        assert_eq!(shape.division(), Some(7));
        assert_eq!(Shape::alloc(ShapeKind::Box).division(), None);
    }

    #[test]
    fn test_serde_tagged() {
        let shape = samples().remove(2);
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"cone\""));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_mirror_and_xform_keep_variant() {
        let frame = Frame3D::from_translation(Point3::new(1.0, 2.0, 3.0));
        for shape in samples() {
            assert_eq!(shape.mirror(Axis::Z).mirror(Axis::Z), shape);
            let moved = shape.xform(&frame);
            assert_eq!(moved.kind(), shape.kind());
            assert_relative_eq!(
                moved.barycenter(),
                shape.barycenter() + frame.pos.coords,
                epsilon = 1e-12
            );
        }
    }
}
