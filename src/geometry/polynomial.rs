// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Real polynomials and their complex roots

use crate::error::{Result, ShapeError};
use nalgebra::{Complex, DMatrix, Schur};
use tracing::trace;

const SCHUR_MAX_ITERATIONS: usize = 500;

/// Dense real polynomial, coefficients in ascending order of degree.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// `coeffs[k]` is the coefficient of `x^k`. Trailing zeros are dropped.
    pub fn new(mut coeffs: Vec<f64>) -> Self {
        while coeffs.len() > 1 && coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(0.0);
        }
        Self { coeffs }
    }

    /// Build from coefficients listed from the highest degree down.
    pub fn from_descending(coeffs: &[f64]) -> Self {
        Self::new(coeffs.iter().rev().copied().collect())
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn eval_complex(&self, z: Complex<f64>) -> Complex<f64> {
        self.coeffs
            .iter()
            .rev()
            .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    /// All complex roots, found as eigenvalues of the companion matrix.
    ///
    /// The variable is rescaled by the Cauchy-style bound of the monic
    /// coefficients first, which keeps the companion entries close to unity.
    pub fn roots(&self) -> Result<Vec<Complex<f64>>> {
        let n = self.degree();
        if n == 0 {
            return Ok(Vec::new());
        }
        if !self.is_finite() {
            return Err(ShapeError::numeric("polynomial has non-finite coefficients"));
        }
        let lead = self.coeffs[n];
        let monic: Vec<f64> = self.coeffs[..n].iter().map(|c| c / lead).collect();

        let scale = monic
            .iter()
            .enumerate()
            .map(|(k, c)| c.abs().powf(1.0 / (n - k) as f64))
            .fold(0.0, f64::max);
        let scale = if scale > 0.0 { scale } else { 1.0 };

        // x = scale * y: the coefficient of y^k becomes c_k / scale^(n-k)
        let mut companion = DMatrix::<f64>::zeros(n, n);
        for k in 0..n {
            companion[(0, n - 1 - k)] = -monic[k] / scale.powi((n - k) as i32);
        }
        for i in 1..n {
            companion[(i, i - 1)] = 1.0;
        }

        let schur = Schur::try_new(companion, f64::EPSILON, SCHUR_MAX_ITERATIONS)
            .ok_or_else(|| ShapeError::numeric("companion matrix eigenvalues did not converge"))?;
        let roots: Vec<Complex<f64>> = schur
            .complex_eigenvalues()
            .iter()
            .map(|z| *z * scale)
            .collect();
        trace!(degree = n, scale, ?roots, "polynomial roots");
        Ok(roots)
    }
}
