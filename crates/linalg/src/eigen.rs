// This code is part of Qiskit.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Eigen-decomposition of general (non-Hermitian) complex matrices.
//!
//! The matrix is reduced to upper-Hessenberg form by Householder reflections and then to
//! complex Schur form `A = Z T Z*` by single-shift QR sweeps of Givens rotations.  Eigenvectors
//! are recovered by back-substitution on the triangular factor.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use num_complex::Complex64;
use tracing::trace;

use crate::error::LinalgError;
use crate::matrix::ComplexMatrix;
use crate::scalar::ComplexScalar;
use crate::util::{C_ONE, C_ZERO};

/// QR sweeps allowed per row of the input before giving up.
const MAX_SWEEPS_PER_ROW: usize = 30;
/// Every this many sweeps without deflation, an ad-hoc shift replaces the Wilkinson shift.
const EXCEPTIONAL_SHIFT_PERIOD: usize = 10;

/// A complex Schur form `A = Z T Z*`, where `Z` is unitary and `T` is upper triangular with the
/// eigenvalues of `A` on its diagonal.
#[derive(Clone, Debug)]
pub struct SchurDecomposition {
    pub t: ComplexMatrix,
    pub z: ComplexMatrix,
}

/// Eigenvalues in Schur order, with the matching unit-norm eigenvectors as matrix columns.
#[derive(Clone, Debug)]
pub struct EigenDecomposition {
    pub values: Vec<Complex64>,
    pub vectors: ComplexMatrix,
}

impl EigenDecomposition {
    /// The eigenvector belonging to `self.values[index]`.
    pub fn vector(&self, index: usize) -> ArrayView1<Complex64> {
        self.vectors.view().index_axis_move(Axis(1), index)
    }
}

#[inline]
fn norm2<'a, I: IntoIterator<Item = &'a Complex64>>(values: I) -> f64 {
    values.into_iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

/// Reduce to upper-Hessenberg form, returning `(H, Q)` with `A = Q H Q*`.
fn hessenberg(a: ArrayView2<Complex64>) -> (Array2<Complex64>, Array2<Complex64>) {
    let dim = a.nrows();
    let mut h = a.to_owned();
    let mut q = Array2::<Complex64>::eye(dim);
    for k in 0..dim.saturating_sub(2) {
        let mut v = h.slice(s![k + 1.., k]).to_owned();
        let norm = norm2(&v);
        let lead = v[0].norm();
        if norm == 0. || norm - lead <= f64::EPSILON * norm {
            continue;
        }
        let phase = if lead > 0. { v[0] / lead } else { C_ONE };
        v[0] += phase * norm;
        let v_norm = norm2(&v);
        v.mapv_inplace(|x| x / v_norm);
        let len = v.len();

        // H <- (I - 2 v v*) H on rows k+1..
        for j in 0..dim {
            let proj: Complex64 = (0..len).map(|i| v[i].conj() * h[[k + 1 + i, j]]).sum();
            for i in 0..len {
                h[[k + 1 + i, j]] -= 2. * v[i] * proj;
            }
        }
        // H <- H (I - 2 v v*) and Q <- Q (I - 2 v v*) on columns k+1..
        for target in [&mut h, &mut q] {
            for i in 0..dim {
                let proj: Complex64 = (0..len).map(|j| target[[i, k + 1 + j]] * v[j]).sum();
                for j in 0..len {
                    target[[i, k + 1 + j]] -= 2. * proj * v[j].conj();
                }
            }
        }
        for i in k + 2..dim {
            h[[i, k]] = C_ZERO;
        }
    }
    (h, q)
}

/// The rotation `(c, s)`, `c` real, for which `[[c, s], [-s*, c]] · [a, b]ᵀ = [r, 0]ᵀ`.
#[inline]
fn givens(a: Complex64, b: Complex64) -> (f64, Complex64) {
    if b == C_ZERO {
        return (1., C_ZERO);
    }
    if a == C_ZERO {
        return (0., b.conj() / b.norm());
    }
    let (abs_a, abs_b) = (a.norm(), b.norm());
    let norm = abs_a.hypot(abs_b);
    (abs_a / norm, (a / abs_a) * b.conj() / norm)
}

/// Apply a rotation from the right to columns `k` and `k + 1`.
#[inline]
fn rotate_columns(mat: &mut Array2<Complex64>, k: usize, c: f64, s: Complex64) {
    for i in 0..mat.nrows() {
        let (x, y) = (mat[[i, k]], mat[[i, k + 1]]);
        mat[[i, k]] = x * c + y * s.conj();
        mat[[i, k + 1]] = -x * s + y * c;
    }
}

/// The eigenvalue of `[[a, b], [c, d]]` closest to `d`.
#[inline]
fn wilkinson_shift(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Complex64 {
    let half_trace = (a + d) * 0.5;
    let disc = (half_trace * half_trace - (a * d - b * c)).principal_sqrt();
    let (plus, minus) = (half_trace + disc, half_trace - disc);
    if (plus - d).norm() < (minus - d).norm() {
        plus
    } else {
        minus
    }
}

pub(crate) fn complex_schur(
    a: ArrayView2<Complex64>,
) -> Result<(Array2<Complex64>, Array2<Complex64>), LinalgError> {
    let dim = a.nrows();
    let (mut t, mut z) = hessenberg(a);
    let max_sweeps = MAX_SWEEPS_PER_ROW * dim;
    let mut hi = dim.saturating_sub(1);
    let mut sweeps = 0;
    while hi > 0 {
        // Find the top of the unreduced block ending at `hi`.
        let mut lo = hi;
        while lo > 0 {
            let mut scale = t[[lo - 1, lo - 1]].norm() + t[[lo, lo]].norm();
            if scale == 0. {
                scale = 1.;
            }
            if t[[lo, lo - 1]].norm() <= f64::EPSILON * scale {
                t[[lo, lo - 1]] = C_ZERO;
                break;
            }
            lo -= 1;
        }
        if lo == hi {
            trace!(row = hi, sweeps, "deflated eigenvalue");
            hi -= 1;
            sweeps = 0;
            continue;
        }
        sweeps += 1;
        if sweeps > max_sweeps {
            return Err(LinalgError::NoConvergence {
                iterations: max_sweeps,
            });
        }
        let shift = if sweeps % EXCEPTIONAL_SHIFT_PERIOD == 0 {
            let sub = t[[hi, hi - 1]];
            t[[hi, hi]] + sub.re.abs() + sub.im.abs()
        } else {
            wilkinson_shift(
                t[[hi - 1, hi - 1]],
                t[[hi - 1, hi]],
                t[[hi, hi - 1]],
                t[[hi, hi]],
            )
        };

        for k in lo..=hi {
            t[[k, k]] -= shift;
        }
        let mut rotations = Vec::with_capacity(hi - lo);
        for k in lo..hi {
            let (c, s) = givens(t[[k, k]], t[[k + 1, k]]);
            rotations.push((c, s));
            for j in 0..dim {
                let (x, y) = (t[[k, j]], t[[k + 1, j]]);
                t[[k, j]] = x * c + s * y;
                t[[k + 1, j]] = -s.conj() * x + y * c;
            }
            t[[k + 1, k]] = C_ZERO;
        }
        for (k, (c, s)) in (lo..hi).zip(rotations) {
            rotate_columns(&mut t, k, c, s);
            rotate_columns(&mut z, k, c, s);
        }
        for k in lo..=hi {
            t[[k, k]] += shift;
        }
    }
    Ok((t, z))
}

pub(crate) fn eig(
    a: ArrayView2<Complex64>,
) -> Result<(Vec<Complex64>, Array2<Complex64>), LinalgError> {
    let (t, z) = complex_schur(a)?;
    let dim = t.nrows();
    let scale = t.iter().map(|x| x.norm()).fold(0., f64::max);
    let scale = if scale == 0. { 1. } else { scale };
    // Near-equal eigenvalues would put a vanishing denominator into the back-substitution.
    let min_denominator = (f64::EPSILON * scale).max(f64::MIN_POSITIVE);

    let values = t.diag().to_vec();
    let mut vectors = Array2::<Complex64>::zeros((dim, dim));
    for (k, &lambda) in values.iter().enumerate() {
        let mut x = Array1::<Complex64>::zeros(dim);
        x[k] = C_ONE;
        for i in (0..k).rev() {
            let acc: Complex64 = (i + 1..=k).map(|j| t[[i, j]] * x[j]).sum();
            let mut denominator = t[[i, i]] - lambda;
            if denominator.norm() < min_denominator {
                denominator = Complex64::new(min_denominator, 0.);
            }
            x[i] = -acc / denominator;
        }
        let v = z.dot(&x);
        let v_norm = norm2(&v);
        vectors.column_mut(k).assign(&v.mapv(|x| x / v_norm));
    }
    Ok((values, vectors))
}
