// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh export to STL

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Export a mesh to STL.
///
/// A `.stl` extension selects binary output; anything else is written as ASCII.
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let binary = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"));

    let written = if binary {
        export_stl_binary(mesh, path)
    } else {
        export_stl_ascii(mesh, path)
    };
    written.with_context(|| format!("Failed to export STL file: {}", path.display()))?;

    debug!(path = %path.display(), binary, triangles = mesh.triangle_count(), "exported STL");
    Ok(())
}

fn export_stl_binary(mesh: &Mesh, path: &Path) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let vertex = |p: &nalgebra::Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .zip(mesh.face_normals())
        .map(|(tri, n)| {
            let [v0, v1, v2] = mesh.triangle_points(tri);
            StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(&v0), vertex(&v1), vertex(&v2)],
            }
        })
        .collect();

    let mut file = BufWriter::new(File::create(path).context("Failed to create STL file")?);
    stl_io::write_stl(&mut file, triangles.iter()).context("Failed to write STL file")?;
    file.flush()?;
    Ok(())
}

fn export_stl_ascii(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path).context("Failed to create STL file")?);

    writeln!(file, "solid mesh")?;
    for (tri, n) in mesh.triangles.iter().zip(mesh.face_normals()) {
        writeln!(file, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(file, "    outer loop")?;
        for v in mesh.triangle_points(tri) {
            writeln!(file, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(file, "    endloop")?;
        writeln!(file, "  endfacet")?;
    }
    writeln!(file, "endsolid mesh")?;

    file.flush()?;
    Ok(())
}
