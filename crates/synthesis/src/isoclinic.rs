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

//! Splitting of `SO(4)` rotations into commuting left- and right-isoclinic factors.
//!
//! Every `O ∈ SO(4)` factors as `O = L(l) · R(r)`, where `L(l)` is left multiplication by the
//! unit quaternion `l = (a, b, c, d)` and `R(r)` is right multiplication by `r = (p, q, s, t)`.  The
//! pair is unique up to a simultaneous sign flip.  In the magic basis `L(l)` becomes `I ⊗ P` and
//! `R(r)` becomes `Q ⊗ I` for single-qubit `P` and `Q`, which is how `SO(4)` angles are read off.

use std::fmt;

use cartan_linalg::util::c64;
use cartan_linalg::ComplexMatrix;
use nalgebra::{Matrix4, Quaternion};
use tracing::debug;

use crate::error::DecompositionError;
use crate::fork_join;
use crate::getenv_use_multiple_threads;
use crate::two_qubit::{decompose_su2_su2_inner, transform_from_magic_basis};

/// Below this, the leading entry of the associate matrix is not trusted as the sign pivot.
const PIVOT_TOL: f64 = 1e-6;

/// Sign used for the isoclinic factors, taking `+0.0` and `-0.0` as positive.
#[inline]
fn sign(value: f64) -> f64 {
    if value < 0. {
        -1.
    } else {
        1.
    }
}

/// The left and right quaternions of an `SO(4)` rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoclinicPair {
    pub left: Quaternion<f64>,
    pub right: Quaternion<f64>,
}

impl IsoclinicPair {
    /// The product of the two scalar parts.
    #[inline]
    pub fn scalar_product(&self) -> f64 {
        self.left.w * self.right.w
    }

    /// The dot product of the two vector parts.
    #[inline]
    pub fn vector_product(&self) -> f64 {
        self.left.imag().dot(&self.right.imag())
    }

    /// Rebuild `L(left) · R(right)`.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        left_isoclinic_matrix(&self.left) * right_isoclinic_matrix(&self.right)
    }
}

/// Which signs the scalar product and the vector product of an [`IsoclinicPair`] have.  The
/// first sign is the scalar product's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignCase {
    PlusPlus,
    PlusMinus,
    MinusPlus,
    MinusMinus,
}

impl SignCase {
    pub fn classify(pair: &IsoclinicPair) -> Self {
        match (pair.scalar_product() >= 0., pair.vector_product() >= 0.) {
            (true, true) => SignCase::PlusPlus,
            (true, false) => SignCase::PlusMinus,
            (false, true) => SignCase::MinusPlus,
            (false, false) => SignCase::MinusMinus,
        }
    }
}

impl fmt::Display for SignCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignCase::PlusPlus => "++",
            SignCase::PlusMinus => "+-",
            SignCase::MinusPlus => "-+",
            SignCase::MinusMinus => "--",
        };
        f.write_str(label)
    }
}

/// `L(l)`, the matrix of `x ↦ l · x` on quaternions written as `(w, i, j, k)` column vectors.
pub fn left_isoclinic_matrix(l: &Quaternion<f64>) -> Matrix4<f64> {
    let (a, b, c, d) = (l.w, l.i, l.j, l.k);
    #[rustfmt::skip]
    let out = Matrix4::new(
        a, -b, -c, -d,
        b,  a, -d,  c,
        c,  d,  a, -b,
        d, -c,  b,  a,
    );
    out
}

/// `R(r)`, the matrix of `x ↦ x · r` on quaternions written as `(w, i, j, k)` column vectors.
pub fn right_isoclinic_matrix(r: &Quaternion<f64>) -> Matrix4<f64> {
    let (p, q, s, t) = (r.w, r.i, r.j, r.k);
    #[rustfmt::skip]
    let out = Matrix4::new(
        p, -q, -s, -t,
        q,  p,  t, -s,
        s, -t,  p,  q,
        t,  s, -q,  p,
    );
    out
}

/// The associate matrix of `O`, which for `O = L(l) · R(r)` is the outer product `l rᵀ`.
pub fn associate_matrix(orthogonal: &Matrix4<f64>) -> Matrix4<f64> {
    let m = |row: usize, col: usize| orthogonal[(row, col)];
    #[rustfmt::skip]
    let out = Matrix4::new(
        m(0, 0) + m(1, 1) + m(2, 2) + m(3, 3),
        -m(0, 1) + m(1, 0) + m(2, 3) - m(3, 2),
        -m(0, 2) - m(1, 3) + m(2, 0) + m(3, 1),
        -m(0, 3) + m(1, 2) - m(2, 1) + m(3, 0),

        -m(0, 1) + m(1, 0) - m(2, 3) + m(3, 2),
        -m(0, 0) - m(1, 1) + m(2, 2) + m(3, 3),
        m(0, 3) - m(1, 2) - m(2, 1) + m(3, 0),
        -m(0, 2) - m(1, 3) - m(2, 0) - m(3, 1),

        -m(0, 2) + m(1, 3) + m(2, 0) - m(3, 1),
        -m(0, 3) - m(1, 2) - m(2, 1) - m(3, 0),
        -m(0, 0) + m(1, 1) - m(2, 2) + m(3, 3),
        m(0, 1) + m(1, 0) - m(2, 3) - m(3, 2),

        -m(0, 3) - m(1, 2) + m(2, 1) + m(3, 0),
        m(0, 2) - m(1, 3) + m(2, 0) - m(3, 1),
        -m(0, 1) - m(1, 0) - m(2, 3) - m(3, 2),
        -m(0, 0) + m(1, 1) + m(2, 2) - m(3, 3),
    );
    out * 0.25
}

/// Extract the isoclinic factors of an `SO(4)` matrix.
///
/// The magnitudes come from the row and column norms of the associate matrix.  The signs are read
/// off a pivot column and row, normally the first ones, and the right factor is negated if the
/// pivot entry itself is negative so that the product reproduces the associate matrix.
pub fn isoclinic_factors(orthogonal: &Matrix4<f64>) -> IsoclinicPair {
    let assoc = associate_matrix(orthogonal);
    let (pivot_row, pivot_col) = if assoc[(0, 0)].abs() < PIVOT_TOL {
        let pivot = assoc.iamax_full();
        debug!(?pivot, "small leading associate entry, moving the sign pivot");
        pivot
    } else {
        (0, 0)
    };
    let [a, b, c, d] =
        [0, 1, 2, 3].map(|row| sign(assoc[(row, pivot_col)]) * assoc.row(row).norm());
    let [p, q, r, t] =
        [0, 1, 2, 3].map(|col| sign(assoc[(pivot_row, col)]) * assoc.column(col).norm());
    let left = Quaternion::new(a, b, c, d);
    let right = Quaternion::new(p, q, r, t);
    let right = if assoc[(pivot_row, pivot_col)] < 0. {
        -right
    } else {
        right
    };
    IsoclinicPair { left, right }
}

/// An `SO(4)` matrix brought into canonical sign form by [`positive_su2_su2`].
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalSo4 {
    /// The matrix itself, negated if the canonicalization required it.
    pub matrix: Matrix4<f64>,
    /// Its isoclinic factors, both with non-negative scalar parts.
    pub factors: IsoclinicPair,
    /// The sign case of the input before canonicalization.
    pub sign_case: SignCase,
}

/// Canonicalize the signs of an `SO(4)` matrix and its isoclinic factors.
///
/// If the scalar parts of the two factors have opposite signs, the matrix is negated along with
/// its left factor, which is still a valid `SO(4)` element with the same local content up to a
/// global phase.  The pair is then flipped as a whole if needed so that both scalar parts are
/// non-negative.
pub fn positive_su2_su2(orthogonal: &Matrix4<f64>) -> CanonicalSo4 {
    let mut factors = isoclinic_factors(orthogonal);
    let sign_case = SignCase::classify(&factors);
    debug!(%sign_case, "canonicalizing isoclinic signs");
    let mut matrix = *orthogonal;
    match sign_case {
        SignCase::MinusPlus | SignCase::MinusMinus => {
            matrix = -matrix;
            factors.left = -factors.left;
        }
        SignCase::PlusPlus | SignCase::PlusMinus => (),
    }
    if factors.left.w < 0. {
        factors.left = -factors.left;
        factors.right = -factors.right;
    }
    CanonicalSo4 {
        matrix,
        factors,
        sign_case,
    }
}

#[inline]
pub(crate) fn real_part(mat: &ComplexMatrix) -> Matrix4<f64> {
    Matrix4::from_fn(|row, col| mat[[row, col]].re)
}

#[inline]
pub(crate) fn to_complex(mat: &Matrix4<f64>) -> ComplexMatrix {
    ComplexMatrix::from_fn(4, |row, col| c64(mat[(row, col)], 0))
}

/// The six local angles of `B · L(l) · R(r) · B*`: three for the first qubit, read from the
/// right factor, then three for the second qubit, read from the left factor.
pub(crate) fn angles_from_factors(
    factors: &IsoclinicPair,
    run_in_parallel: bool,
) -> Result<[f64; 6], DecompositionError> {
    let left = to_complex(&left_isoclinic_matrix(&factors.left));
    let right = to_complex(&right_isoclinic_matrix(&factors.right));
    let (first, second) = fork_join(
        run_in_parallel,
        || {
            let local = transform_from_magic_basis(&right, false)?;
            decompose_su2_su2_inner(&local, run_in_parallel)
        },
        || {
            let local = transform_from_magic_basis(&left, false)?;
            decompose_su2_su2_inner(&local, run_in_parallel)
        },
    );
    let (first, second) = (first?, second?);
    Ok([first[0], first[1], first[2], second[3], second[4], second[5]])
}

/// Decompose a real orthogonal `O` into the angles of the two single-qubit factors of
/// `B · O · B*`, first qubit first.
///
/// Only the real part of the input is read.
pub fn decompose_so4(orthogonal: &ComplexMatrix) -> Result<[f64; 6], DecompositionError> {
    decompose_so4_inner(orthogonal, getenv_use_multiple_threads())
}

pub fn decompose_so4_inner(
    orthogonal: &ComplexMatrix,
    run_in_parallel: bool,
) -> Result<[f64; 6], DecompositionError> {
    DecompositionError::check_dimension(4, orthogonal.dim())?;
    let factors = isoclinic_factors(&real_part(orthogonal));
    angles_from_factors(&factors, run_in_parallel)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::one_qubit::yzy_matrix;
    use crate::test::{phase_distance, random_su2};
    use crate::two_qubit::compose_su2_su2;
    use approx::{abs_diff_eq, assert_abs_diff_eq};
    use nalgebra::Vector4;
    use rand::prelude::*;
    use rand_distr::StandardNormal;
    use rand_pcg::Pcg64Mcg;

    fn random_unit_quaternion(rng: &mut Pcg64Mcg) -> Quaternion<f64> {
        let raw: [f64; 4] = [(); 4].map(|_| rng.sample(StandardNormal));
        Quaternion::new(raw[0], raw[1], raw[2], raw[3]).normalize()
    }

    fn wijk(q: &Quaternion<f64>) -> Vector4<f64> {
        Vector4::new(q.w, q.i, q.j, q.k)
    }

    fn same_up_to_sign(a: &Matrix4<f64>, b: &Matrix4<f64>) -> bool {
        abs_diff_eq!(a, b, epsilon = 1e-9) || abs_diff_eq!(a, &-b, epsilon = 1e-9)
    }

    #[test]
    fn isoclinic_matrices_commute_and_are_orthogonal() {
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let l = left_isoclinic_matrix(&random_unit_quaternion(&mut rng));
        let r = right_isoclinic_matrix(&random_unit_quaternion(&mut rng));
        assert!(abs_diff_eq!(l * r, r * l, epsilon = 1e-12));
        assert!(abs_diff_eq!(
            l.transpose() * l,
            Matrix4::identity(),
            epsilon = 1e-12
        ));
        assert_abs_diff_eq!((l * r).determinant(), 1., epsilon = 1e-12);
    }

    #[test]
    fn associate_matrix_is_outer_product() {
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        for _ in 0..20 {
            let pair = IsoclinicPair {
                left: random_unit_quaternion(&mut rng),
                right: random_unit_quaternion(&mut rng),
            };
            let assoc = associate_matrix(&pair.to_matrix());
            let outer = wijk(&pair.left) * wijk(&pair.right).transpose();
            assert!(abs_diff_eq!(assoc, outer, epsilon = 1e-12));
        }
    }

    #[test]
    fn factors_reproduce_the_matrix() {
        let mut rng = Pcg64Mcg::seed_from_u64(10);
        for _ in 0..50 {
            let orthogonal = IsoclinicPair {
                left: random_unit_quaternion(&mut rng),
                right: random_unit_quaternion(&mut rng),
            }
            .to_matrix();
            let factors = isoclinic_factors(&orthogonal);
            assert!(abs_diff_eq!(factors.to_matrix(), orthogonal, epsilon = 1e-12));
        }
    }

    #[test]
    fn small_leading_entry_moves_the_pivot() {
        // Scalar part of the left factor is zero, so the whole first row of the associate matrix
        // vanishes.
        let pair = IsoclinicPair {
            left: Quaternion::new(0., 0.6, 0., 0.8),
            right: Quaternion::new(0.5, -0.5, 0.5, 0.5),
        };
        let orthogonal = pair.to_matrix();
        let factors = isoclinic_factors(&orthogonal);
        assert!(abs_diff_eq!(factors.to_matrix(), orthogonal, epsilon = 1e-12));
    }

    fn pair(left: [f64; 4], right: [f64; 4]) -> IsoclinicPair {
        IsoclinicPair {
            left: Quaternion::new(left[0], left[1], left[2], left[3]),
            right: Quaternion::new(right[0], right[1], right[2], right[3]),
        }
    }

    #[test]
    fn each_sign_case_is_canonicalized() {
        let positive = [0.5, 0.5, 0.5, 0.5];
        let negative_vector = [0.5, -0.5, -0.5, -0.5];
        let negative_scalar = [-0.5, 0.5, 0.5, 0.5];
        let cases = [
            (pair(positive, positive), SignCase::PlusPlus, false),
            (pair(positive, negative_vector), SignCase::PlusMinus, false),
            (pair(negative_scalar, positive), SignCase::MinusPlus, true),
            (pair(negative_scalar, negative_vector), SignCase::MinusMinus, true),
        ];
        for (input, expected_case, negated) in cases {
            let orthogonal = input.to_matrix();
            let canonical = positive_su2_su2(&orthogonal);
            assert_eq!(canonical.sign_case, expected_case);
            let expected_matrix = if negated { -orthogonal } else { orthogonal };
            assert!(abs_diff_eq!(canonical.matrix, expected_matrix, epsilon = 1e-12));
            assert!(canonical.factors.left.w >= 0.);
            assert!(canonical.factors.right.w >= 0.);
            assert!(abs_diff_eq!(
                canonical.factors.to_matrix(),
                canonical.matrix,
                epsilon = 1e-12
            ));
            // The canonical factors still describe the same local operation.
            let angles = angles_from_factors(&canonical.factors, false).unwrap();
            let local = transform_from_magic_basis(&to_complex(&canonical.matrix), false).unwrap();
            assert!(phase_distance(&compose_su2_su2(&angles), &local) < 1e-9);
        }
    }

    #[test]
    fn so4_of_local_gate_recovers_angles() {
        let first = [0.5, 0.2, 0.1];
        let second = [0.2, 0.3, 0.4];
        let local = yzy_matrix(first[0], first[1], first[2])
            .kron(&yzy_matrix(second[0], second[1], second[2]));
        let orthogonal = transform_from_magic_basis(&local, true).unwrap();
        let angles = decompose_so4_inner(&orthogonal, false).unwrap();
        for (actual, expected) in angles.iter().zip(first.iter().chain(second.iter())) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn so4_round_trip() {
        let mut rng = Pcg64Mcg::seed_from_u64(77);
        for _ in 0..50 {
            let local = random_su2(&mut rng).kron(&random_su2(&mut rng));
            let orthogonal = transform_from_magic_basis(&local, true).unwrap();
            assert!(orthogonal.view().iter().all(|x| x.im.abs() < 1e-12));
            let angles = decompose_so4(&orthogonal).unwrap();
            assert!(same_up_to_sign(
                &real_part(&transform_from_magic_basis(&compose_su2_su2(&angles), true).unwrap()),
                &real_part(&orthogonal),
            ));
        }
    }
}
