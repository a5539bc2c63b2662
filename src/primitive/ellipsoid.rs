// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triaxial ellipsoid and its closest-point solver

use super::{
    div_or_default, mass, scan_frame_axis, write_frame, Closest, Primitive, DEFAULT_DIV, TOL,
};
use crate::error::{Result, ShapeError};
use crate::geometry::{Axis, Frame3D, Mesh, Polynomial, Triangle};
use crate::io::{self, Field};
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::{debug, error, warn};

/// Relative bound on the imaginary part of a root accepted as real.
const ROOT_IMAG_TOL: f64 = 1e-8;
const NEWTON_MAX_ITERATIONS: usize = 200;

/// Ellipsoid centered at its frame origin with semi-axes along the local axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid3D {
    pub frame: Frame3D,
    pub radii: Vector3<f64>,
    /// Tessellation resolution (rings and sectors)
    pub div: u32,
}

impl Ellipsoid3D {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        center: Point3<f64>,
        ax: &Vector3<f64>,
        ay: &Vector3<f64>,
        az: &Vector3<f64>,
        rx: f64,
        ry: f64,
        rz: f64,
        div: u32,
    ) -> Self {
        Self {
            frame: Frame3D::from_axes(center, ax, ay, az),
            radii: Vector3::new(rx.abs(), ry.abs(), rz.abs()),
            div: div_or_default(div),
        }
    }

    pub fn aligned(center: Point3<f64>, rx: f64, ry: f64, rz: f64, div: u32) -> Self {
        Self::new(center, &Vector3::x(), &Vector3::y(), &Vector3::z(), rx, ry, rz, div)
    }

    pub fn sphere(center: Point3<f64>, radius: f64, div: u32) -> Self {
        Self::aligned(center, radius, radius, radius, div)
    }

    pub fn center(&self) -> Point3<f64> {
        self.frame.pos
    }

    pub fn radius(&self, axis: Axis) -> f64 {
        self.radii[axis.index()]
    }

    /// `(x/rx)² + (y/ry)² + (z/rz)²` of a local point.
    fn quadric(&self, local: &Point3<f64>) -> f64 {
        local.coords.component_div(&self.radii).norm_squared()
    }

    fn closest_local(&self, v: &Point3<f64>) -> Result<Point3<f64>> {
        let r = self.radii;
        if !r.iter().all(|x| x.is_finite() && *x > 0.0) {
            error!(radii = ?r, "degenerate ellipsoid radii");
            return Err(ShapeError::numeric(format!(
                "ellipsoid radii must be positive, got ({}, {}, {})",
                r.x, r.y, r.z
            )));
        }

        if self.quadric(v) <= 1.0 {
            error!(point = ?v, "ellipsoid solver called on an interior point");
            return Err(ShapeError::numeric(
                "ellipsoid closest point requested for an interior point",
            ));
        }

        let sextic = ellipsoid_sextic(&r, v);
        let roots = sextic.roots().inspect_err(|e| {
            error!(point = ?v, error = %e, "ellipsoid sextic root finding failed");
        })?;
        let lambda = roots
            .iter()
            .filter(|z| {
                let bound = ROOT_IMAG_TOL * (1.0 + z.norm());
                z.im.abs() <= bound && z.re >= -bound
            })
            .min_by(|a, b| a.norm().total_cmp(&b.norm()))
            .map(|z| z.re.max(0.0))
            .unwrap_or_else(|| {
                // the multiplier is the only root right of -min(p)
                let seed = roots.iter().map(|z| z.re).fold(0.0, f64::max);
                warn!(point = ?v, ?roots, seed, "no real sextic root accepted, bracketing instead");
                seed
            });

        let lambda = polish_multiplier(lambda, &r, v);
        if !lambda.is_finite() {
            error!(point = ?v, "ellipsoid multiplier diverged");
            return Err(ShapeError::numeric("ellipsoid multiplier is not finite"));
        }
        debug!(lambda, "ellipsoid closest point multiplier");

        Ok(Point3::from(Vector3::from_fn(|i, _| {
            v[i] / (1.0 + lambda / (r[i] * r[i]))
        })))
    }
}

/// Sextic in the Lagrange multiplier λ whose non-negative root locates the
/// point of the ellipsoid closest to the exterior local point `v`.
///
/// With `p, q, r` the squared radii and `a, b, c` the squared normalized
/// coordinates, it is `(p+λ)²(q+λ)²(r+λ)²` minus
/// `a·p²(q+λ)²(r+λ)² + b·q²(r+λ)²(p+λ)² + c·r²(p+λ)²(q+λ)²`, expanded.
pub fn ellipsoid_sextic(radii: &Vector3<f64>, v: &Point3<f64>) -> Polynomial {
    let (p, q, r) = (radii.x * radii.x, radii.y * radii.y, radii.z * radii.z);
    let a = v.x * v.x / p;
    let b = v.y * v.y / q;
    let c = v.z * v.z / r;
    let pqr = p * q * r;

    Polynomial::from_descending(&[
        1.0,
        2.0 * (p + q + r),
        (1.0 - a) * p * p + (1.0 - b) * q * q + (1.0 - c) * r * r + 4.0 * (p * q + q * r + r * p),
        2.0 * (1.0 - a) * (q + r) * p * p
            + 2.0 * (1.0 - b) * (r + p) * q * q
            + 2.0 * (1.0 - c) * (p + q) * r * r
            + 8.0 * pqr,
        (1.0 - a - b) * p * p * q * q
            + (1.0 - a - c) * p * p * r * r
            + (1.0 - b - c) * q * q * r * r
            + 4.0 * pqr * ((1.0 - a) * p + (1.0 - b) * q + (1.0 - c) * r),
        2.0 * pqr * ((1.0 - a - b) * p * q + (1.0 - a - c) * r * p + (1.0 - b - c) * q * r),
        (1.0 - a - b - c) * pqr * pqr,
    ])
}

/// `g(λ) = Σ aᵢpᵢ²/(pᵢ+λ)² − 1` and its derivative.
fn stationarity(lambda: f64, radii: &Vector3<f64>, v: &Point3<f64>) -> (f64, f64) {
    let mut g = -1.0;
    let mut dg = 0.0;
    for i in 0..3 {
        let p = radii[i] * radii[i];
        let s = p + lambda;
        // aᵢpᵢ² = vᵢ²pᵢ
        let num = v[i] * v[i] * p;
        g += num / (s * s);
        dg -= 2.0 * num / (s * s * s);
    }
    (g, dg)
}

/// Refine `seed` to the root of `g`, which is convex and decreasing for
/// λ ≥ 0. Newton steps are kept inside the bracket `[0, |v|·max r]` and
/// replaced by bisection when they leave it.
fn polish_multiplier(seed: f64, radii: &Vector3<f64>, v: &Point3<f64>) -> f64 {
    if stationarity(0.0, radii, v).0 <= 0.0 {
        return 0.0;
    }
    // every term of g drops below vᵢ²/|v|² there, so g(hi) < 0
    let mut lo = 0.0;
    let mut hi = v.coords.norm() * radii.max();
    let mut lambda = if seed.is_nan() { lo } else { seed.clamp(lo, hi) };

    for _ in 0..NEWTON_MAX_ITERATIONS {
        let (g, dg) = stationarity(lambda, radii, v);
        if g == 0.0 {
            break;
        }
        if g > 0.0 {
            lo = lambda;
        } else {
            hi = lambda;
        }
        let newton = lambda - g / dg;
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        let step = (next - lambda).abs();
        lambda = next;
        if step <= f64::EPSILON * (1.0 + lambda) || hi - lo <= f64::EPSILON * (1.0 + hi) {
            break;
        }
    }
    lambda
}

impl Default for Ellipsoid3D {
    fn default() -> Self {
        Self::aligned(Point3::origin(), 0.0, 0.0, 0.0, DEFAULT_DIV)
    }
}

impl Primitive for Ellipsoid3D {
    fn name(&self) -> &'static str {
        "ellipsoid"
    }

    fn init(&mut self) {
        *self = Self::default();
    }

    fn mirror(&self, axis: Axis) -> Self {
        Self {
            frame: self.frame.mirror(axis),
            ..self.clone()
        }
    }

    fn xform(&self, frame: &Frame3D) -> Self {
        Self {
            frame: frame.cascade(&self.frame),
            ..self.clone()
        }
    }

    fn xform_inv(&self, frame: &Frame3D) -> Self {
        Self {
            frame: self.frame.relative_to(frame),
            ..self.clone()
        }
    }

    fn closest(&self, p: &Point3<f64>) -> Result<Closest> {
        if self.is_inside(p, true) {
            return Ok(Closest::inside(p));
        }
        let local = self.frame.xform_inv(p);
        let cp = self.closest_local(&local)?;
        Ok(Closest::new(p, self.frame.xform(&cp)))
    }

    fn is_inside(&self, p: &Point3<f64>, rim: bool) -> bool {
        let l = self.quadric(&self.frame.xform_inv(p));
        if rim {
            l < 1.0 + TOL
        } else {
            l < 1.0
        }
    }

    fn volume(&self) -> f64 {
        mass::ellipsoid_volume(self.radii.x, self.radii.y, self.radii.z)
    }

    fn barycenter(&self) -> Point3<f64> {
        self.center()
    }

    fn inertia(&self) -> Matrix3<f64> {
        self.frame.rotate_tensor(&mass::ellipsoid_inertia(
            self.radii.x,
            self.radii.y,
            self.radii.z,
        ))
    }

    /// UV sphere: north pole, `div - 1` rings of `div` vertices, south pole.
    fn to_mesh(&self) -> Result<Mesh> {
        let d = self.div;
        if d < 3 {
            return Err(ShapeError::InvalidDivision(d));
        }
        let n = d as usize;
        let ring_count = n.saturating_mul(n - 1);
        let mut mesh = Mesh::try_with_capacity(
            ring_count.saturating_add(2),
            ring_count.saturating_mul(2),
        )?;

        let r = self.radii;
        mesh.add_vertex(Point3::new(0.0, 0.0, r.z));
        for i in 1..n {
            let theta = PI * i as f64 / d as f64;
            let (st, ct) = theta.sin_cos();
            for j in 0..n {
                let phi = 2.0 * PI * j as f64 / d as f64;
                let (sp, cp) = phi.sin_cos();
                mesh.add_vertex(Point3::new(r.x * st * cp, r.y * st * sp, r.z * ct));
            }
        }
        let south = mesh.add_vertex(Point3::new(0.0, 0.0, -r.z));

        let ring = |i: usize, j: usize| 1 + (i - 1) * n + j % n;
        for j in 0..n {
            mesh.add_triangle(Triangle::new([0, ring(1, j), ring(1, j + 1)]));
        }
        for i in 1..n - 1 {
            for j in 0..n {
                let (a, b) = (ring(i, j), ring(i, j + 1));
                let (c, e) = (ring(i + 1, j), ring(i + 1, j + 1));
                mesh.add_triangle(Triangle::new([a, c, e]));
                mesh.add_triangle(Triangle::new([a, e, b]));
            }
        }
        for j in 0..n {
            mesh.add_triangle(Triangle::new([south, ring(n - 1, j + 1), ring(n - 1, j)]));
        }

        mesh.transform(&self.frame);
        debug!(
            div = d,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "tessellated ellipsoid"
        );
        Ok(mesh)
    }

    fn division(&self) -> Option<u32> {
        Some(self.div)
    }

    fn set_division(&mut self, div: u32) {
        self.div = div;
    }

    fn scan_field(&mut self, field: &Field) -> Result<bool> {
        match field.key.as_str() {
            "center" => self.frame.pos = field.point3()?,
            "ax" => scan_frame_axis(&mut self.frame, Axis::X, field)?,
            "ay" => scan_frame_axis(&mut self.frame, Axis::Y, field)?,
            "az" => scan_frame_axis(&mut self.frame, Axis::Z, field)?,
            "rx" => self.radii.x = field.real()?.abs(),
            "ry" => self.radii.y = field.real()?.abs(),
            "rz" => self.radii.z = field.real()?.abs(),
            "div" => self.div = field.integer()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_frame(out, &self.frame)?;
        io::write_real_field(out, "rx", self.radii.x)?;
        io::write_real_field(out, "ry", self.radii.y)?;
        io::write_real_field(out, "rz", self.radii.z)?;
        io::write_int_field(out, "div", self.div)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{is_watertight, signed_volume};
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn tilted() -> Ellipsoid3D {
        let rot = nalgebra::Rotation3::from_euler_angles(-0.6, 0.9, 0.25);
        let m = rot.matrix();
        Ellipsoid3D::new(
            Point3::new(0.5, -1.0, 2.0),
            &m.column(0).into_owned(),
            &m.column(1).into_owned(),
            &m.column(2).into_owned(),
            1.0,
            2.0,
            3.0,
            16,
        )
    }

    #[test]
    fn test_sextic_matches_factored_form() {
        let radii = Vector3::new(1.5, 0.7, 2.2);
        let v = Point3::new(2.0, -1.0, 0.5);
        let poly = ellipsoid_sextic(&radii, &v);
        assert_eq!(poly.degree(), 6);

        let p = radii.component_mul(&radii);
        let a = v.coords.component_mul(&v.coords).component_div(&p);
        for lambda in [-0.3, 0.0, 0.8, 2.5] {
            let s = p.add_scalar(lambda);
            let all = (s.x * s.y * s.z).powi(2);
            let minus = a.x * p.x * p.x * (s.y * s.z).powi(2)
                + a.y * p.y * p.y * (s.z * s.x).powi(2)
                + a.z * p.z * p.z * (s.x * s.y).powi(2);
            assert_relative_eq!(poly.eval(lambda), all - minus, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_unit_sphere_closest() {
        let s = Ellipsoid3D::sphere(Point3::origin(), 1.0, 0);
        assert_eq!(s.div, DEFAULT_DIV);
        let c = s.closest(&Point3::new(2.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(c.point, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(c.distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closest_on_axis_of_elongated_ellipsoid() {
        let e = Ellipsoid3D::aligned(Point3::origin(), 1.0, 2.0, 3.0, 8);
        let c = e.closest(&Point3::new(0.0, 0.0, 5.0)).unwrap();
        assert_relative_eq!(c.point, Point3::new(0.0, 0.0, 3.0), epsilon = 1e-10);
        assert_relative_eq!(c.distance, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_closest_random_exterior_points() {
        let e = tilted();
        let mesh = Ellipsoid3D { div: 48, ..e.clone() }.to_mesh().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let offset = Vector3::new(
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
            );
            let p = e.center() + offset;
            if e.quadric(&e.frame.xform_inv(&p)) < 1.01 {
                continue;
            }
            let c = e.closest(&p).unwrap();
            assert!(e.is_inside(&c.point, true));
            assert_relative_eq!(c.distance, (p - c.point).norm(), epsilon = 1e-12);

            // on the surface, and p - cp along the surface normal
            let local = e.frame.xform_inv(&c.point);
            assert_relative_eq!(e.quadric(&local), 1.0, epsilon = 1e-9);
            let normal = e
                .frame
                .xform_vec(&local.coords.component_div(&e.radii.component_mul(&e.radii)));
            assert!((p - c.point).normalize().cross(&normal.normalize()).norm() < 1e-6);

            // no tessellation vertex is closer
            let nearest_vertex = mesh
                .vertices
                .iter()
                .map(|v| (p - v).norm())
                .fold(f64::INFINITY, f64::min);
            assert!(c.distance <= nearest_vertex + 1e-9);
        }
    }

    #[test]
    fn test_closest_on_needle_ellipsoid() {
        let e = Ellipsoid3D::aligned(Point3::origin(), 0.168, 0.157, 9.43, 8);
        let p = Point3::new(0.0173, -0.148, 5.67);
        assert!(e.quadric(&p) > 1.0);
        let c = e.closest(&p).unwrap();
        assert_relative_eq!(e.quadric(&c.point), 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.distance, (p - c.point).norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_polish_recovers_from_any_seed() {
        let radii = Vector3::new(0.05, 3.0, 40.0);
        let v = Point3::new(0.3, -2.0, 25.0);
        let reference = polish_multiplier(0.0, &radii, &v);
        assert_relative_eq!(stationarity(reference, &radii, &v).0, 0.0, epsilon = 1e-12);
        for seed in [-5.0, 1e-3, 10.0, 1e6, f64::INFINITY] {
            assert_relative_eq!(
                polish_multiplier(seed, &radii, &v),
                reference,
                max_relative = 1e-12
            );
        }
        // interior points need no multiplier
        assert_eq!(polish_multiplier(3.0, &radii, &Point3::new(0.0, 0.0, 1.0)), 0.0);
    }

    #[test]
    fn test_interior_point_is_its_own_closest() {
        let e = tilted();
        let p = e.frame.xform(&Point3::new(0.2, 0.5, -1.0));
        let c = e.closest(&p).unwrap();
        assert_eq!(c.point, p);
        assert_eq!(c.distance, 0.0);
    }

    #[test]
    fn test_degenerate_radius_is_fatal() {
        let e = Ellipsoid3D::aligned(Point3::origin(), 0.0, 1.0, 1.0, 8);
        let err = e.closest(&Point3::new(2.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, ShapeError::FatalNumericInconsistency(_)));
    }

    #[test]
    fn test_is_inside_rim() {
        let s = Ellipsoid3D::sphere(Point3::origin(), 1.0, 8);
        let on = Point3::new(1.0, 0.0, 0.0);
        assert!(!s.is_inside(&on, false));
        assert!(s.is_inside(&on, true));
        assert!(s.is_inside(&Point3::new(0.5, 0.5, 0.5), false));
        assert!(!s.is_inside(&Point3::new(0.0, 1.0 + 1e-9, 0.0), true));
    }

    #[test]
    fn test_volume_and_inertia() {
        let e = tilted();
        assert_relative_eq!(e.volume(), 8.0 * PI, max_relative = 1e-9);
        assert_eq!(e.barycenter(), e.center());
        let i = e.inertia();
        let z = e.frame.axis(Axis::Z);
        let izz = (z.transpose() * i * z)[0];
        assert_relative_eq!(izz, 0.2 * 8.0 * PI * (1.0 + 4.0), max_relative = 1e-10);
    }

    #[test]
    fn test_mesh_counts_and_orientation() {
        for d in [3u32, 4, 9] {
            let e = Ellipsoid3D { div: d, ..tilted() };
            let mesh = e.to_mesh().unwrap();
            let n = d as usize;
            assert_eq!(mesh.vertex_count(), n * (n - 1) + 2);
            assert_eq!(mesh.triangle_count(), 2 * n * (n - 1));
            assert!(mesh.indices_valid());
            assert!(is_watertight(&mesh));
            assert!(signed_volume(&mesh) > 0.0);
        }
    }

    #[test]
    fn test_mesh_volume_converges() {
        let exact = 8.0 * PI;
        let mut previous = f64::INFINITY;
        for d in [8u32, 16, 32, 64] {
            let e = Ellipsoid3D { div: d, ..tilted() };
            let err = (signed_volume(&e.to_mesh().unwrap()) - exact).abs() / exact;
            assert!(err < previous);
            previous = err;
        }
        assert!(previous < 0.005);
    }

    #[test]
    fn test_mesh_vertices_on_surface() {
        let e = tilted();
        let mesh = e.to_mesh().unwrap();
        for v in &mesh.vertices {
            assert_relative_eq!(e.quadric(&e.frame.xform_inv(v)), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_invalid_division() {
        let e = Ellipsoid3D { div: 2, ..tilted() };
        assert!(matches!(e.to_mesh(), Err(ShapeError::InvalidDivision(2))));
    }

    #[test]
    fn test_mirror_twice_exact() {
        let e = tilted();
        for axis in Axis::ALL {
            let m = e.mirror(axis);
            let volume = signed_volume(&m.to_mesh().unwrap());
            assert_relative_eq!(volume, signed_volume(&e.to_mesh().unwrap()), max_relative = 1e-12);
            assert_eq!(m.mirror(axis), e);
        }
    }

    #[test]
    fn test_text_roundtrip_keeps_div() {
        let e = tilted();
        let text = e.to_text();
        assert!(text.contains("div: 16\n"));
        let read = Ellipsoid3D::read_text(&text, &Default::default()).unwrap();
        assert_eq!(read.div, 16);
        assert_relative_eq!(read.radii, e.radii, max_relative = 1e-9);
    }
}
