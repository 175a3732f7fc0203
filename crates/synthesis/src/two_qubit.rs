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

use std::f64::consts::PI;

use cartan_linalg::gate_matrix::{MAGIC_BASIS, MAGIC_BASIS_DAGGER};
use cartan_linalg::util::c64;
use cartan_linalg::{ComplexMatrix, ComplexScalar, LinalgError};
use itertools::Itertools;
use nalgebra::Matrix4;
use ndarray::prelude::*;
use num_complex::Complex64;
use tracing::debug;

use crate::error::DecompositionError;
use crate::isoclinic::{
    angles_from_factors, isoclinic_factors, positive_su2_su2, real_part, to_complex, SignCase,
};
use crate::one_qubit::{decompose_one_qubit, yzy_matrix};
use crate::{fork_join, getenv_use_multiple_threads};

/// A partial trace normalized by less than this is taken to have vanished.
const FACTOR_NORM_TOL: f64 = 1e-6;
/// Eigenvalues of `Gᵀ G` closer than this share a real eigenbasis.
const EIGENVALUE_GROUP_TOL: f64 = 1e-6;
/// How close the sum of the half eigen-phases must be to `±π` to count as that branch.
const BRANCH_TOL: f64 = 1e-5;

/// One of the two qubits of a two-qubit operator, where the first qubit is the left factor of
/// the Kronecker product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subsystem {
    First,
    Second,
}

impl Subsystem {
    #[inline]
    fn other(self) -> Self {
        match self {
            Subsystem::First => Subsystem::Second,
            Subsystem::Second => Subsystem::First,
        }
    }
}

/// Trace the subsystem `traced_out` out of a 4x4 operator.
///
/// For `M = P ⊗ Q`, tracing out the second subsystem gives `tr(Q) · P` and tracing out the first
/// gives `tr(P) · Q`.
pub fn partial_trace(
    unitary: &ComplexMatrix,
    traced_out: Subsystem,
) -> Result<ComplexMatrix, DecompositionError> {
    DecompositionError::check_dimension(4, unitary.dim())?;
    let m = |row: usize, col: usize| unitary[[row, col]];
    let out = match traced_out {
        Subsystem::Second => [
            [m(0, 0) + m(1, 1), m(0, 2) + m(1, 3)],
            [m(2, 0) + m(3, 1), m(2, 2) + m(3, 3)],
        ],
        Subsystem::First => [
            [m(0, 0) + m(2, 2), m(0, 1) + m(2, 3)],
            [m(1, 0) + m(3, 2), m(1, 1) + m(3, 3)],
        ],
    };
    Ok(ComplexMatrix::from_gate(&out))
}

/// The norm `sqrt(|x|² + |y|²)` of a column `(x, y)`.
#[inline]
pub fn sap2(x: Complex64, y: Complex64) -> f64 {
    ((x * x).magnitude() + (y * y).magnitude()).sqrt()
}

/// The 2x2 blocks of `unitary` that are each a multiple of the factor acting on `kept`.
fn factor_blocks(unitary: &ComplexMatrix, kept: Subsystem) -> [ComplexMatrix; 4] {
    [(0, 0), (0, 1), (1, 0), (1, 1)].map(|(i, j)| {
        ComplexMatrix::from_fn(2, |row, col| match kept {
            Subsystem::First => unitary[[2 * row + i, 2 * col + j]],
            Subsystem::Second => unitary[[2 * i + row, 2 * j + col]],
        })
    })
}

#[inline]
fn frobenius_sq(mat: &ComplexMatrix) -> f64 {
    mat.view().iter().map(|x| x.norm_sqr()).sum()
}

/// Pull the single-qubit factor acting on `kept` out of a product operator, up to sign.
fn local_factor(
    unitary: &ComplexMatrix,
    kept: Subsystem,
) -> Result<ComplexMatrix, DecompositionError> {
    let reduced = partial_trace(unitary, kept.other())?;
    let norm = sap2(reduced[[0, 0]], reduced[[1, 0]]);
    if norm >= FACTOR_NORM_TOL {
        return Ok(reduced.checked_div_scalar(c64(norm, 0))?);
    }
    // The other factor is traceless.  Every block is still a multiple of the wanted factor, so
    // take the largest one and scale it to unit determinant.
    debug!(?kept, norm, "vanishing partial trace, extracting the factor from a block");
    let block = factor_blocks(unitary, kept)
        .into_iter()
        .max_by(|a, b| frobenius_sq(a).total_cmp(&frobenius_sq(b)))
        .ok_or(LinalgError::DivisionByZero)?;
    Ok(block.checked_div_scalar(block.determinant().principal_sqrt())?)
}

/// Decompose a product `P ⊗ Q` of single-qubit special unitaries into the angles of `P` followed
/// by those of `Q`.  The two factors are decomposed concurrently.
pub fn decompose_su2_su2(unitary: &ComplexMatrix) -> Result<[f64; 6], DecompositionError> {
    decompose_su2_su2_inner(unitary, getenv_use_multiple_threads())
}

pub fn decompose_su2_su2_inner(
    unitary: &ComplexMatrix,
    run_in_parallel: bool,
) -> Result<[f64; 6], DecompositionError> {
    DecompositionError::check_dimension(4, unitary.dim())?;
    let (first, second) = fork_join(
        run_in_parallel,
        || decompose_one_qubit(&local_factor(unitary, Subsystem::First)?),
        || decompose_one_qubit(&local_factor(unitary, Subsystem::Second)?),
    );
    let (first, second) = (first?, second?);
    Ok([first[0], first[1], first[2], second[0], second[1], second[2]])
}

/// `YZY(angles[0..3]) ⊗ YZY(angles[3..6])`.
pub fn compose_su2_su2(angles: &[f64; 6]) -> ComplexMatrix {
    yzy_matrix(angles[0], angles[1], angles[2]).kron(&yzy_matrix(angles[3], angles[4], angles[5]))
}

/// Conjugate by the magic basis: `B · U · B*`, or `B* · U · B` if `reverse` is set.
pub fn transform_from_magic_basis(
    unitary: &ComplexMatrix,
    reverse: bool,
) -> Result<ComplexMatrix, DecompositionError> {
    DecompositionError::check_dimension(4, unitary.dim())?;
    let b = aview2(&MAGIC_BASIS);
    let b_dagger = aview2(&MAGIC_BASIS_DAGGER);
    let out = if reverse {
        b_dagger.dot(&unitary.view()).dot(&b)
    } else {
        b.dot(&unitary.view()).dot(&b_dagger)
    };
    Ok(ComplexMatrix::from_array(out)?)
}

/// A real orthonormal eigenbasis, column `k` for `values[k]`, of a complex-symmetric unitary.
///
/// Such a matrix is `O D Oᵀ` for real orthogonal `O`, so the real and imaginary parts of its
/// eigenvectors are eigenvectors too.  Eigenvalues closer than [`EIGENVALUE_GROUP_TOL`] are
/// treated as one eigenspace, whose basis is rebuilt by pivoted Gram-Schmidt over the real and
/// imaginary parts of the solver's vectors.
fn real_eigenbasis(
    values: &[Complex64],
    vectors: ArrayView2<Complex64>,
) -> Result<Array2<f64>, DecompositionError> {
    let dim = values.len();
    let mut basis = Array2::<f64>::zeros((dim, dim));
    let mut assigned = vec![false; dim];
    for start in 0..dim {
        if assigned[start] {
            continue;
        }
        let group = (start..dim)
            .filter(|&k| !assigned[k] && (values[k] - values[start]).norm() < EIGENVALUE_GROUP_TOL)
            .collect::<Vec<_>>();
        let candidates = group
            .iter()
            .flat_map(|&k| {
                let column = vectors.column(k);
                [column.mapv(|x| x.re), column.mapv(|x| x.im)]
            })
            .collect::<Vec<_>>();
        let mut chosen: Vec<Array1<f64>> = Vec::with_capacity(group.len());
        for &slot in &group {
            assigned[slot] = true;
            let (residual, norm) = candidates
                .iter()
                .map(|candidate| {
                    let mut residual = candidate.clone();
                    for prev in &chosen {
                        let overlap = residual.dot(prev);
                        residual.scaled_add(-overlap, prev);
                    }
                    let norm = residual.dot(&residual).sqrt();
                    (residual, norm)
                })
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .ok_or(LinalgError::DivisionByZero)?;
            if norm == 0. {
                return Err(LinalgError::DivisionByZero.into());
            }
            let vector = residual / norm;
            basis.column_mut(slot).assign(&vector);
            chosen.push(vector);
        }
    }
    Ok(basis)
}

/// The KAK decomposition `U ∝ K1 · B · A · B* · K2` of a two-qubit unitary.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoQubitKakDecomposition {
    /// Angles of the outer local factor `K1`, first qubit first.
    pub k1: [f64; 6],
    /// The interaction angles `((t0 + t1) / 2, (t1 + t3) / 2, (t0 + t3) / 2)`.
    pub interaction: [f64; 3],
    /// Angles of the inner local factor `K2`, first qubit first.
    pub k2: [f64; 6],
    /// The phases `t0..t3` of the diagonal `A`, after branch resolution.
    pub eigenphases: [f64; 4],
    /// The sign case taken while canonicalizing `K2`.
    pub sign_case: SignCase,
}

impl TwoQubitKakDecomposition {
    /// The flat 15-angle form: `K1`, then the interaction, then `K2`.
    pub fn angles(&self) -> [f64; 15] {
        let mut out = [0.; 15];
        out[..6].copy_from_slice(&self.k1);
        out[6..9].copy_from_slice(&self.interaction);
        out[9..].copy_from_slice(&self.k2);
        out
    }
}

/// Decompose a two-qubit unitary into 15 angles: six for `K1`, three interaction angles, and
/// six for `K2`, such that [`compose_su4`] rebuilds it up to a global phase.
pub fn decompose_su4(unitary: &ComplexMatrix) -> Result<[f64; 15], DecompositionError> {
    Ok(decompose_su4_detailed(unitary)?.angles())
}

pub fn decompose_su4_detailed(
    unitary: &ComplexMatrix,
) -> Result<TwoQubitKakDecomposition, DecompositionError> {
    decompose_su4_inner(unitary, getenv_use_multiple_threads())
}

pub fn decompose_su4_inner(
    unitary: &ComplexMatrix,
    run_in_parallel: bool,
) -> Result<TwoQubitKakDecomposition, DecompositionError> {
    DecompositionError::check_dimension(4, unitary.dim())?;
    let special = unitary.to_special_unitary()?;
    let g = transform_from_magic_basis(&special, true)?;
    let m2 = g.transpose().dot(&g)?;
    let eigen = m2.eigen()?;
    let real_vectors = real_eigenbasis(&eigen.values, eigen.vectors.view())?;

    let half_phases = eigen
        .values
        .iter()
        .map(|value| value.argument() / 2.)
        .collect::<Vec<_>>();
    let order = (0..4)
        .sorted_by(|&a, &b| half_phases[a].total_cmp(&half_phases[b]))
        .collect::<Vec<_>>();
    let mut t = [0, 1, 2, 3].map(|k| half_phases[order[k]]);
    // `A` must square to the eigenvalues and have unit determinant, so a sum of `±π` is moved
    // back to zero by shifting one phase by `π`.
    let total = t.iter().sum::<f64>();
    if (total - PI).abs() < BRANCH_TOL {
        debug!(total, "half-phase sum on the +π branch");
        t[3] -= PI;
    } else if (total + PI).abs() < BRANCH_TOL {
        debug!(total, "half-phase sum on the -π branch");
        t[0] += PI;
    }
    let mut p = Matrix4::from_fn(|row, col| real_vectors[[row, order[col]]]);
    if p.determinant() < 0. {
        for row in 0..4 {
            p[(row, 3)] = -p[(row, 3)];
        }
    }

    let canonical = positive_su2_su2(&p.transpose());
    let k2 = angles_from_factors(&canonical.factors, run_in_parallel)?;
    let a_dagger = ComplexMatrix::from_phases(&t.map(|phase| -phase));
    let k1_magic = ComplexMatrix::product(&[
        &g,
        &to_complex(&canonical.matrix.transpose()),
        &a_dagger,
    ])?;
    let k1 = angles_from_factors(
        &isoclinic_factors(&real_part(&k1_magic)),
        run_in_parallel,
    )?;

    Ok(TwoQubitKakDecomposition {
        k1,
        interaction: [(t[0] + t[1]) / 2., (t[1] + t[3]) / 2., (t[0] + t[3]) / 2.],
        k2,
        eigenphases: t,
        sign_case: canonical.sign_case,
    })
}

/// Rebuild `K1 · B · A · B* · K2` from the 15 angles of [`decompose_su4`].
pub fn compose_su4(angles: &[f64; 15]) -> Result<ComplexMatrix, DecompositionError> {
    let mut k1 = [0.; 6];
    let mut k2 = [0.; 6];
    k1.copy_from_slice(&angles[..6]);
    k2.copy_from_slice(&angles[9..]);
    let [x, y, z] = [angles[6], angles[7], angles[8]];
    let (t0, t1, t3) = (x - y + z, x + y - z, -x + y + z);
    let t2 = -(t0 + t1 + t3);
    let interaction =
        transform_from_magic_basis(&ComplexMatrix::from_phases(&[t0, t1, t2, t3]), false)?;
    Ok(ComplexMatrix::product(&[
        &compose_su2_su2(&k1),
        &interaction,
        &compose_su2_su2(&k2),
    ])?)
}
