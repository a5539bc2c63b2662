// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape document file reader and writer

use crate::config::ShapeConfig;
use crate::primitive::Primitive;
use crate::shape::Shape;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a shape document (leading `type:` field) from a file.
pub fn read_shape_file(path: impl AsRef<Path>, config: &ShapeConfig) -> Result<Shape> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shape file: {}", path.display()))?;

    Shape::from_text(&source, config)
        .with_context(|| format!("Failed to parse shape file: {}", path.display()))
}

/// Write a shape document, `type:` field first.
pub fn write_shape_file(shape: &Shape, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, shape.to_text())
        .with_context(|| format!("Failed to write shape file: {}", path.display()))
}
