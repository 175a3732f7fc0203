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

//! Scalar operations on [`Complex64`] that the matrix and decomposition layers rely on, beyond
//! what `num_complex` provides directly.

use num_complex::Complex64;

use crate::error::LinalgError;
use crate::util::C_ZERO;

/// Extension methods on [`Complex64`].
///
/// Addition, subtraction, multiplication, negation and conjugation, in both the compound
/// (`+=`, `-=`, `*=`) and the value-returning forms, come straight from [`num_complex`].  This
/// trait adds the operations whose branch or failure behavior we need to pin down ourselves.
pub trait ComplexScalar: Sized {
    /// Divide by `rhs`, failing if `rhs` has zero magnitude.
    fn checked_div(self, rhs: Self) -> Result<Self, LinalgError>;

    /// The magnitude `|z|`, computed by scaling with the larger component so that the squares
    /// cannot overflow.
    fn magnitude(self) -> f64;

    /// The principal square root.
    ///
    /// The result has a non-negative real part.  When the input's real part is negative, the
    /// result's imaginary part carries the sign of the input's imaginary part, with `-0.0`
    /// counted as non-negative.
    fn principal_sqrt(self) -> Self;

    /// The argument `atan2(im, re)`, in `(-π, π]`.
    fn argument(self) -> f64;

    /// The unit complex number `cos θ + i sin θ`.
    fn from_angle(theta: f64) -> Self;
}

impl ComplexScalar for Complex64 {
    #[inline]
    fn checked_div(self, rhs: Self) -> Result<Self, LinalgError> {
        if rhs.magnitude() == 0. {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(self / rhs)
    }

    #[inline]
    fn magnitude(self) -> f64 {
        let (re, im) = (self.re.abs(), self.im.abs());
        let (big, small) = if re >= im { (re, im) } else { (im, re) };
        if big == 0. {
            return 0.;
        }
        let ratio = small / big;
        big * (1. + ratio * ratio).sqrt()
    }

    fn principal_sqrt(self) -> Self {
        if self.re == 0. && self.im == 0. {
            return C_ZERO;
        }
        let (x, y) = (self.re.abs(), self.im.abs());
        let w = if x >= y {
            let ratio = y / x;
            x.sqrt() * (0.5 * (1. + (1. + ratio * ratio).sqrt())).sqrt()
        } else {
            let ratio = x / y;
            y.sqrt() * (0.5 * (ratio + (1. + ratio * ratio).sqrt())).sqrt()
        };
        if self.re >= 0. {
            Complex64::new(w, self.im / (2. * w))
        } else {
            let w = if self.im < 0. { -w } else { w };
            Complex64::new(self.im / (2. * w), w)
        }
    }

    #[inline]
    fn argument(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    fn from_angle(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Complex64::new(cos, sin)
    }
}

/// Sum an arbitrary number of complex values.
#[inline]
pub fn sum_of<I: IntoIterator<Item = Complex64>>(values: I) -> Complex64 {
    values.into_iter().fold(C_ZERO, |acc, value| acc + value)
}

/// The argument of each value, in order.
pub fn angles(values: &[Complex64]) -> Vec<f64> {
    values.iter().map(|value| value.argument()).collect()
}
