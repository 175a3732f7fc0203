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

use std::fmt;
use std::ops::Index;

use approx::AbsDiffEq;
use ndarray::linalg::kron;
use ndarray::{aview2, Array1, Array2, ArrayView2};
use num_complex::Complex64;
use tracing::debug;

use crate::eigen::{self, EigenDecomposition, SchurDecomposition};
use crate::error::LinalgError;
use crate::scalar::{sum_of, ComplexScalar};
use crate::util::{C_ONE, C_ZERO, DEFAULT_ATOL, SINGULAR_PIVOT_TOL};

/// A dense square matrix of [`Complex64`].
///
/// Element `(row, col)` addresses row `row` and column `col` everywhere, including the Kronecker
/// product, which places `A[i][j] * B[k][l]` at `(i * dim(B) + k, j * dim(B) + l)`.
///
/// Operations come in pairs: a method returning a new matrix and a `*_in_place` method that only
/// mutates its receiver.  Binary operations fail with [`LinalgError::DimensionMismatch`] if the
/// operands differ in size.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexMatrix {
    pub(crate) data: Array2<Complex64>,
}

impl ComplexMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: Array2::zeros((dim, dim)),
        }
    }

    pub fn identity(dim: usize) -> Self {
        Self {
            data: Array2::eye(dim),
        }
    }

    /// Wrap an owned array, which must be square.
    pub fn from_array(data: Array2<Complex64>) -> Result<Self, LinalgError> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(LinalgError::MalformedShape { rows, cols });
        }
        Ok(Self { data })
    }

    /// Copy a fixed-size gate array, such as the statics in [`crate::gate_matrix`].
    pub fn from_gate<const N: usize>(gate: &[[Complex64; N]; N]) -> Self {
        Self {
            data: aview2(gate).to_owned(),
        }
    }

    /// Build from a list of rows, each of which must be as long as the list itself.
    pub fn from_rows<R: AsRef<[Complex64]>>(rows: &[R]) -> Result<Self, LinalgError> {
        let dim = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.as_ref().len() != dim) {
            return Err(LinalgError::MalformedShape {
                rows: dim,
                cols: bad.as_ref().len(),
            });
        }
        Ok(Self {
            data: Array2::from_shape_fn((dim, dim), |(i, j)| rows[i].as_ref()[j]),
        })
    }

    /// Build a `dim x dim` matrix whose entry `(row, col)` is `f(row, col)`.
    pub fn from_fn<F: FnMut(usize, usize) -> Complex64>(dim: usize, mut f: F) -> Self {
        Self {
            data: Array2::from_shape_fn((dim, dim), |(row, col)| f(row, col)),
        }
    }

    /// Promote a square real matrix.
    pub fn from_real(real: ArrayView2<f64>) -> Result<Self, LinalgError> {
        Self::from_array(real.mapv(|x| Complex64::new(x, 0.)))
    }

    pub fn from_diagonal(diagonal: &[Complex64]) -> Self {
        Self {
            data: Array2::from_diag(&Array1::from(diagonal.to_vec())),
        }
    }

    /// The diagonal matrix `diag(e^{iθ_0}, e^{iθ_1}, ...)`.
    pub fn from_phases(phases: &[f64]) -> Self {
        let diagonal = phases
            .iter()
            .map(|&theta| Complex64::from_angle(theta))
            .collect::<Vec<_>>();
        Self::from_diagonal(&diagonal)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<Complex64> {
        self.data.view()
    }

    #[inline]
    pub fn into_array(self) -> Array2<Complex64> {
        self.data
    }

    #[inline]
    fn check_index(&self, row: usize, col: usize) -> Result<(), LinalgError> {
        let dim = self.dim();
        if row >= dim || col >= dim {
            return Err(LinalgError::IndexOutOfRange { row, col, dim });
        }
        Ok(())
    }

    #[inline]
    fn check_dim(&self, other: &Self) -> Result<(), LinalgError> {
        if self.dim() != other.dim() {
            return Err(LinalgError::DimensionMismatch {
                left: self.dim(),
                right: other.dim(),
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Complex64, LinalgError> {
        self.check_index(row, col)?;
        Ok(self.data[[row, col]])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Complex64) -> Result<(), LinalgError> {
        self.check_index(row, col)?;
        self.data[[row, col]] = value;
        Ok(())
    }

    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    pub fn transpose_in_place(&mut self) {
        let dim = self.dim();
        for i in 0..dim {
            for j in i + 1..dim {
                self.data.swap([i, j], [j, i]);
            }
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            data: self.data.mapv(|x| x.conj()),
        }
    }

    pub fn conjugate_in_place(&mut self) {
        self.data.mapv_inplace(|x| x.conj());
    }

    /// The conjugate transpose.
    pub fn adjoint(&self) -> Self {
        Self {
            data: self.data.t().mapv(|x| x.conj()),
        }
    }

    pub fn adjoint_in_place(&mut self) {
        self.conjugate_in_place();
        self.transpose_in_place();
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check_dim(other)?;
        Ok(Self {
            data: &self.data + &other.data,
        })
    }

    pub fn add_in_place(&mut self, other: &Self) -> Result<(), LinalgError> {
        self.check_dim(other)?;
        self.data += &other.data;
        Ok(())
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check_dim(other)?;
        Ok(Self {
            data: &self.data - &other.data,
        })
    }

    pub fn sub_in_place(&mut self, other: &Self) -> Result<(), LinalgError> {
        self.check_dim(other)?;
        self.data -= &other.data;
        Ok(())
    }

    pub fn scaled(&self, factor: Complex64) -> Self {
        Self {
            data: self.data.mapv(|x| x * factor),
        }
    }

    pub fn scale_in_place(&mut self, factor: Complex64) {
        self.data.mapv_inplace(|x| x * factor);
    }

    /// Divide every entry by `divisor`, failing if it has zero magnitude.
    pub fn checked_div_scalar(&self, divisor: Complex64) -> Result<Self, LinalgError> {
        if divisor.magnitude() == 0. {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(Self {
            data: self.data.mapv(|x| x / divisor),
        })
    }

    /// The matrix product `self · other`.
    pub fn dot(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check_dim(other)?;
        Ok(Self {
            data: self.data.dot(&other.data),
        })
    }

    /// Replace `self` with `self · other`.
    pub fn dot_in_place(&mut self, other: &Self) -> Result<(), LinalgError> {
        self.check_dim(other)?;
        self.data = self.data.dot(&other.data);
        Ok(())
    }

    /// The left-to-right product of a non-empty list of matrices.
    pub fn product(factors: &[&Self]) -> Result<Self, LinalgError> {
        let (first, rest) = factors.split_first().ok_or(LinalgError::EmptyProduct)?;
        rest.iter().try_fold((*first).clone(), |mut acc, factor| {
            acc.dot_in_place(factor)?;
            Ok(acc)
        })
    }

    /// The tensor (Kronecker) product `self ⊗ other`.  Operands may differ in size.
    pub fn kron(&self, other: &Self) -> Self {
        Self {
            data: kron(&self.data, &other.data),
        }
    }

    /// The determinant, by Gaussian elimination with partial pivoting.
    ///
    /// If a pivot smaller than [`SINGULAR_PIVOT_TOL`] in magnitude is met, the matrix is singular
    /// and zero is returned without finishing the elimination.
    pub fn determinant(&self) -> Complex64 {
        let dim = self.dim();
        if dim == 0 {
            return C_ONE;
        }
        let mut work = self.data.clone();
        // Row swaps are tracked through this permutation rather than by moving data.
        let mut rows = (0..dim).collect::<Vec<_>>();
        let mut det = C_ONE;
        for k in 0..dim - 1 {
            let mut pivot_index = k;
            let mut pivot_abs = work[[rows[k], k]].magnitude();
            for i in k + 1..dim {
                let candidate = work[[rows[i], k]].magnitude();
                if candidate > pivot_abs {
                    pivot_index = i;
                    pivot_abs = candidate;
                }
            }
            if pivot_index != k {
                rows.swap(k, pivot_index);
                det = -det;
            }
            if pivot_abs < SINGULAR_PIVOT_TOL {
                debug!(column = k, pivot_abs, "singular pivot in determinant");
                return C_ZERO;
            }
            let pivot_row = rows[k];
            let pivot = work[[pivot_row, k]];
            det *= pivot;
            for j in k + 1..dim {
                work[[pivot_row, j]] /= pivot;
            }
            for &row in &rows[k + 1..] {
                let factor = work[[row, k]];
                for j in k + 1..dim {
                    let update = factor * work[[pivot_row, j]];
                    work[[row, j]] -= update;
                }
            }
        }
        det * work[[rows[dim - 1], dim - 1]]
    }

    pub fn trace(&self) -> Complex64 {
        sum_of(self.data.diag().iter().copied())
    }

    pub fn row_sum(&self, row: usize) -> Result<Complex64, LinalgError> {
        self.check_index(row, 0)?;
        Ok(sum_of(self.data.row(row).iter().copied()))
    }

    pub fn col_sum(&self, col: usize) -> Result<Complex64, LinalgError> {
        self.check_index(0, col)?;
        Ok(sum_of(self.data.column(col).iter().copied()))
    }

    /// Whether `self* · self` is the identity to within `atol` per component.
    pub fn is_unitary(&self, atol: f64) -> bool {
        let gram = self.adjoint().data.dot(&self.data);
        gram.abs_diff_eq(&Array2::<Complex64>::eye(self.dim()), atol)
    }

    /// Rescale by `det^{-1/N}` (principal branch) so that the determinant becomes one.
    pub fn to_special_unitary(&self) -> Result<Self, LinalgError> {
        // Adding zero turns a `-0.0` component into `0.0`, so the branch of the root below does
        // not depend on the sign of a zero.
        let det = self.determinant() + Complex64::new(0., 0.);
        if det.magnitude() == 0. {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(self.scaled(det.powf(-1. / self.dim() as f64)))
    }

    /// Entrywise comparison with the default tolerance of `1e-6` on both the real and the
    /// imaginary part.
    pub fn approx_eq(&self, other: &Self) -> Result<bool, LinalgError> {
        self.check_dim(other)?;
        Ok(self.abs_diff_eq(other, DEFAULT_ATOL))
    }

    /// The complex Schur form `self = Z T Z*`.
    pub fn schur(&self) -> Result<SchurDecomposition, LinalgError> {
        let (t, z) = eigen::complex_schur(self.view())?;
        Ok(SchurDecomposition {
            t: Self { data: t },
            z: Self { data: z },
        })
    }

    /// Eigenvalues, and unit-norm eigenvectors as the columns of a matrix.
    pub fn eigen(&self) -> Result<EigenDecomposition, LinalgError> {
        let (values, vectors) = eigen::eig(self.view())?;
        Ok(EigenDecomposition {
            values,
            vectors: Self { data: vectors },
        })
    }
}

impl Index<[usize; 2]> for ComplexMatrix {
    type Output = Complex64;

    #[inline]
    fn index(&self, index: [usize; 2]) -> &Complex64 {
        &self.data[index]
    }
}

impl AbsDiffEq for ComplexMatrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        DEFAULT_ATOL
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.dim() == other.dim()
            && self.data.iter().zip(other.data.iter()).all(|(a, b)| {
                (a.re - b.re).abs() <= epsilon && (a.im - b.im).abs() <= epsilon
            })
    }
}

impl fmt::Display for ComplexMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.rows() {
            write!(f, "[")?;
            for (col, value) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
