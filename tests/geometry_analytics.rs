// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tessellation checked against closed-form mass properties

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use shapekit::geometry::{analyze, degenerate_triangles};
use shapekit::{Axis, Box3D, Cone3D, Ellipsoid3D, Primitive};
use std::f64::consts::PI;

#[test]
fn test_box_volume_and_surface_area() -> Result<()> {
    let b = Box3D::aligned(Point3::origin(), 10.0, 10.0, 10.0);
    let stats = analyze(&b.to_mesh()?);

    println!("Box 10×10×10:");
    println!("  Volume: {:.2} (expected: 1000)", stats.volume);
    println!("  Surface area: {:.2} (expected: 600)", stats.surface_area);

    assert!((stats.volume - 1000.0).abs() < 1e-9);
    assert!((stats.surface_area - 600.0).abs() < 1e-9);
    assert_eq!(stats.vertex_count, 8);
    assert_eq!(stats.triangle_count, 12);
    assert!(stats.is_watertight);
    assert_eq!(stats.degenerate_count, 0);
    assert!((b.volume() - stats.volume).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_box_faces_non_collinear() -> Result<()> {
    let b = Box3D::new(
        Point3::new(3.0, -2.0, 1.0),
        &Vector3::new(1.0, 1.0, 0.0),
        &Vector3::new(-1.0, 1.0, 0.0),
        &Vector3::new(0.0, 0.0, 1.0),
        1.0,
        2.0,
        0.5,
    );
    let mesh = b.to_mesh()?;
    assert!(degenerate_triangles(&mesh, 1e-12).is_empty());
    Ok(())
}

#[test]
fn test_ellipsoid_volume_converges() -> Result<()> {
    let exact = 8.0 * PI;
    let mut errors = Vec::new();

    for div in [8, 16, 32, 64] {
        let e = Ellipsoid3D::aligned(Point3::origin(), 1.0, 2.0, 3.0, div);
        let stats = analyze(&e.to_mesh()?);
        let error = (stats.volume - exact).abs() / exact;
        println!("Ellipsoid div {div}: volume {:.4} (expected {:.4})", stats.volume, exact);

        let d = div as usize;
        assert_eq!(stats.vertex_count, d * (d - 1) + 2);
        assert_eq!(stats.triangle_count, 2 * d * (d - 1));
        assert!(stats.is_watertight);
        assert!(stats.volume > 0.0);
        errors.push(error);
    }

    assert!(errors.windows(2).all(|w| w[1] < w[0]));
    assert!(errors[3] < 0.005);
    assert!((Ellipsoid3D::aligned(Point3::origin(), 1.0, 2.0, 3.0, 8).volume() / exact - 1.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_cone_mesh_matches_closed_form() -> Result<()> {
    let cone = Cone3D::new(Point3::new(0.0, 1.0, 0.0), Point3::new(3.0, 1.0, 4.0), 2.0, 128);
    let stats = analyze(&cone.to_mesh()?);

    println!("Cone r=2 h=5:");
    println!("  Volume: {:.4} (expected {:.4})", stats.volume, cone.volume());
    println!("  Centroid: {:?} (expected {:?})", stats.centroid, cone.barycenter());

    assert!(stats.is_watertight);
    assert!((stats.volume - cone.volume()).abs() / cone.volume() < 1e-3);
    assert!((stats.centroid - cone.barycenter()).norm() < 1e-3);
    assert!((cone.volume() - 20.0 * PI / 3.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_mirrored_meshes_stay_outward() -> Result<()> {
    let shapes: Vec<shapekit::Shape> = vec![
        Box3D::aligned(Point3::new(1.0, 2.0, 3.0), 1.0, 2.0, 3.0).into(),
        Ellipsoid3D::aligned(Point3::new(-1.0, 0.0, 2.0), 1.0, 0.5, 2.0, 12).into(),
        Cone3D::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 3.0, 2.0), 0.7, 12).into(),
    ];

    for shape in &shapes {
        for axis in Axis::ALL {
            let mirrored = shape.mirror(axis);
            let stats = analyze(&mirrored.to_mesh()?);
            assert!(stats.is_watertight, "{} mirrored in {:?}", shape.name(), axis);
            assert!(stats.volume > 0.0, "{} mirrored in {:?}", shape.name(), axis);
            assert!((mirrored.volume() - shape.volume()).abs() < 1e-12);
        }
    }

    Ok(())
}
