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

use cartan_linalg::gate_matrix::{rx_gate, ry_gate, rz_gate, Y_GATE};
use cartan_linalg::util::{GateArray1Q, C_ZERO};
use cartan_linalg::ComplexMatrix;
use tracing::debug;

use crate::error::DecompositionError;

/// Below this, `sin(2b)` is treated as zero and the last angle is pinned to zero.
const DEGENERATE_SIN_TOL: f64 = 1e-9;

#[inline]
fn dot_1q(left: &GateArray1Q, right: &GateArray1Q) -> GateArray1Q {
    let mut out = [[C_ZERO; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = left[i][0] * right[0][j] + left[i][1] * right[1][j];
        }
    }
    out
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1., 1.)
}

pub fn rx_matrix(theta: f64) -> ComplexMatrix {
    ComplexMatrix::from_gate(&rx_gate(theta))
}

pub fn ry_matrix(theta: f64) -> ComplexMatrix {
    ComplexMatrix::from_gate(&ry_gate(theta))
}

pub fn rz_matrix(theta: f64) -> ComplexMatrix {
    ComplexMatrix::from_gate(&rz_gate(theta))
}

/// `Ry(a) · Rz(b) · Ry(c)`.
pub fn yzy_matrix(a: f64, b: f64, c: f64) -> ComplexMatrix {
    ComplexMatrix::from_gate(&dot_1q(&dot_1q(&ry_gate(a), &rz_gate(b)), &ry_gate(c)))
}

/// Decompose a special-unitary `G` into angles `[a, b, c]` with `G = ±Ry(a) · Rz(b) · Ry(c)`.
///
/// `b` is recovered from `M² = Y · G* · Y · G`, which only depends on `Rz(b) · Ry(c)`, and `c`
/// from the phase of its top-left entry.  When `sin(2b)` vanishes, `M²` is `±I` and every `c`
/// is valid, so zero is used.  The returned angles lie in `a ∈ [0, π)`, `b ∈ [0, π/2]` and
/// `c ∈ [0, π)`.
pub fn decompose_one_qubit(unitary: &ComplexMatrix) -> Result<[f64; 3], DecompositionError> {
    DecompositionError::check_dimension(2, unitary.dim())?;
    let y = ComplexMatrix::from_gate(&Y_GATE);
    let m2 = ComplexMatrix::product(&[&y, &unitary.adjoint(), &y, unitary])?;

    let b = clamp_unit(m2[[0, 0]].re).acos() / 2.;
    let sin_2b = (2. * b).sin();
    let c_raw = if sin_2b.abs() < DEGENERATE_SIN_TOL {
        debug!(b, "degenerate one-qubit decomposition, pinning c to zero");
        0.
    } else {
        let c_raw = clamp_unit(m2[[0, 0]].im / sin_2b).acos();
        if m2[[0, 1]].im < 0. {
            2. * PI - c_raw
        } else {
            c_raw
        }
    };
    let c = c_raw / 2.;

    let tp = ComplexMatrix::product(&[unitary, &ry_matrix(c).adjoint(), &rz_matrix(b).adjoint()])?;
    let mut a = tp[[0, 1]].re.atan2(tp[[0, 0]].re);
    if a < 0. {
        a += PI;
    }
    Ok([a, b, c])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{phase_distance, random_su2};
    use approx::assert_abs_diff_eq;
    use cartan_linalg::gate_matrix::{X_GATE, Z_GATE};
    use cartan_linalg::util::IM;
    use rand::prelude::*;
    use rand_pcg::Pcg64Mcg;
    use std::f64::consts::FRAC_PI_2;

    fn assert_angles(actual: [f64; 3], expected: [f64; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn pauli_x_up_to_phase() {
        let ix = ComplexMatrix::from_gate(&X_GATE).scaled(IM);
        let angles = decompose_one_qubit(&ix).unwrap();
        assert_angles(angles, [FRAC_PI_2, FRAC_PI_2, 0.]);
        let rebuilt = yzy_matrix(angles[0], angles[1], angles[2]);
        assert!(phase_distance(&rebuilt, &ix) < 1e-9);
    }

    #[test]
    fn degenerate_inputs_pin_c_to_zero() {
        assert_angles(
            decompose_one_qubit(&ComplexMatrix::identity(2)).unwrap(),
            [0., 0., 0.],
        );
        let iz = ComplexMatrix::from_gate(&Z_GATE).scaled(IM);
        let angles = decompose_one_qubit(&iz).unwrap();
        assert_angles(angles, [0., FRAC_PI_2, 0.]);
        assert!(phase_distance(&yzy_matrix(angles[0], angles[1], angles[2]), &iz) < 1e-9);
        let iy = ry_matrix(FRAC_PI_2);
        assert_angles(decompose_one_qubit(&iy).unwrap(), [FRAC_PI_2, 0., 0.]);
    }

    #[test]
    fn recovers_canonical_angles() {
        for angles in [[0.5, 0.2, 0.1], [2., 1., 0.5], [0.1, 1.5, 3.]] {
            let unitary = yzy_matrix(angles[0], angles[1], angles[2]);
            assert_angles(decompose_one_qubit(&unitary).unwrap(), angles);
        }
    }

    #[test]
    fn random_round_trip() {
        let mut rng = Pcg64Mcg::seed_from_u64(1234);
        for _ in 0..200 {
            let unitary = random_su2(&mut rng);
            let [a, b, c] = decompose_one_qubit(&unitary).unwrap();
            assert!((0. ..PI).contains(&a));
            assert!((0. ..=FRAC_PI_2).contains(&b));
            assert!(phase_distance(&yzy_matrix(a, b, c), &unitary) < 1e-6);
        }
    }

    #[test]
    fn rotation_generators() {
        let theta = 0.7;
        let rx = rx_matrix(theta);
        assert!(rx.is_unitary(1e-14));
        assert_abs_diff_eq!(rx.determinant().re, 1., epsilon = 1e-14);
        let composed = ry_matrix(0.3).dot(&ry_matrix(0.4)).unwrap();
        assert!(composed.approx_eq(&ry_matrix(0.7)).unwrap());
        let composed = rz_matrix(0.3).dot(&rz_matrix(0.4)).unwrap();
        assert!(composed.approx_eq(&rz_matrix(0.7)).unwrap());
    }

    #[test]
    fn wrong_dimension() {
        assert_eq!(
            decompose_one_qubit(&ComplexMatrix::identity(4)),
            Err(DecompositionError::ExpectedDimension {
                expected: 2,
                found: 4
            })
        );
    }
}
