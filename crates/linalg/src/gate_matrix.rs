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

use std::f64::consts::FRAC_1_SQRT_2;

use crate::util::{c64, GateArray1Q, GateArray2Q, C_M_ONE, C_ONE, C_ZERO, IM, M_IM};

pub static ONE_QUBIT_IDENTITY: GateArray1Q = [[C_ONE, C_ZERO], [C_ZERO, C_ONE]];

pub static X_GATE: GateArray1Q = [[C_ZERO, C_ONE], [C_ONE, C_ZERO]];

pub static Y_GATE: GateArray1Q = [[C_ZERO, M_IM], [IM, C_ZERO]];

pub static Z_GATE: GateArray1Q = [[C_ONE, C_ZERO], [C_ZERO, C_M_ONE]];

pub static CX_GATE: GateArray2Q = [
    [C_ONE, C_ZERO, C_ZERO, C_ZERO],
    [C_ZERO, C_ONE, C_ZERO, C_ZERO],
    [C_ZERO, C_ZERO, C_ZERO, C_ONE],
    [C_ZERO, C_ZERO, C_ONE, C_ZERO],
];

pub static CZ_GATE: GateArray2Q = [
    [C_ONE, C_ZERO, C_ZERO, C_ZERO],
    [C_ZERO, C_ONE, C_ZERO, C_ZERO],
    [C_ZERO, C_ZERO, C_ONE, C_ZERO],
    [C_ZERO, C_ZERO, C_ZERO, C_M_ONE],
];

pub static SWAP_GATE: GateArray2Q = [
    [C_ONE, C_ZERO, C_ZERO, C_ZERO],
    [C_ZERO, C_ZERO, C_ONE, C_ZERO],
    [C_ZERO, C_ONE, C_ZERO, C_ZERO],
    [C_ZERO, C_ZERO, C_ZERO, C_ONE],
];

const S: f64 = FRAC_1_SQRT_2;

/// The magic basis `B`.  Conjugating by it maps `SU(2) ⊗ SU(2)` onto `SO(4)`: for local `K`,
/// `B* K B` is real orthogonal.
pub static MAGIC_BASIS: GateArray2Q = [
    [c64!(S, 0), c64!(0, 0), c64!(0, 0), c64!(0, S)],
    [c64!(0, 0), c64!(0, S), c64!(S, 0), c64!(0, 0)],
    [c64!(0, 0), c64!(0, S), c64!(-S, 0), c64!(0, 0)],
    [c64!(S, 0), c64!(0, 0), c64!(0, 0), c64!(0, -S)],
];

pub static MAGIC_BASIS_DAGGER: GateArray2Q = [
    [c64!(S, 0), c64!(0, 0), c64!(0, 0), c64!(S, 0)],
    [c64!(0, 0), c64!(0, -S), c64!(0, -S), c64!(0, 0)],
    [c64!(0, 0), c64!(S, 0), c64!(-S, 0), c64!(0, 0)],
    [c64!(0, -S), c64!(0, 0), c64!(0, 0), c64!(0, S)],
];

// The rotation generators below use the full angle, so `rz_gate(θ)` is `diag(e^{iθ}, e^{-iθ})`.

#[inline]
pub fn rx_gate(theta: f64) -> GateArray1Q {
    let (sin, cos) = theta.sin_cos();
    let cos = c64(cos, 0);
    let isin = c64(0, sin);
    [[cos, isin], [isin, cos]]
}

#[inline]
pub fn ry_gate(theta: f64) -> GateArray1Q {
    let (sin, cos) = theta.sin_cos();
    let cos = c64(cos, 0);
    let sin = c64(sin, 0);
    [[cos, sin], [-sin, cos]]
}

#[inline]
pub fn rz_gate(theta: f64) -> GateArray1Q {
    let ilam = c64(0, theta);
    [[ilam.exp(), C_ZERO], [C_ZERO, (-ilam).exp()]]
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::abs_diff_eq;
    use ndarray::aview2;

    #[test]
    fn magic_basis_is_unitary() {
        let b = aview2(&MAGIC_BASIS);
        let b_dag = aview2(&MAGIC_BASIS_DAGGER);
        let expected = b.t().mapv(|x| x.conj());
        assert!(abs_diff_eq!(b_dag, expected.view(), epsilon = 1e-15));
        let prod = b.dot(&b_dag);
        for i in 0..4 {
            for j in 0..4 {
                let target = if i == j { C_ONE } else { C_ZERO };
                assert!(abs_diff_eq!(prod[[i, j]], target, epsilon = 1e-15));
            }
        }
    }

    #[test]
    fn rotations_at_quarter_turn() {
        let quarter = std::f64::consts::FRAC_PI_2;
        assert!(abs_diff_eq!(
            aview2(&rx_gate(quarter)),
            aview2(&[[C_ZERO, IM], [IM, C_ZERO]]),
            epsilon = 1e-15
        ));
        assert!(abs_diff_eq!(
            aview2(&ry_gate(quarter)),
            aview2(&[[C_ZERO, C_ONE], [C_M_ONE, C_ZERO]]),
            epsilon = 1e-15
        ));
        assert!(abs_diff_eq!(
            aview2(&rz_gate(quarter)),
            aview2(&[[IM, C_ZERO], [C_ZERO, M_IM]]),
            epsilon = 1e-15
        ));
    }
}
