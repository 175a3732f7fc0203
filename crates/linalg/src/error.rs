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

use thiserror::Error;

/// Failures of the dense complex linear-algebra layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("dimension mismatch: {left}x{left} against {right}x{right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("index ({row}, {col}) out of range for a {dim}x{dim} matrix")]
    IndexOutOfRange { row: usize, col: usize, dim: usize },
    #[error("division by a complex number of zero magnitude")]
    DivisionByZero,
    #[error("expected a square matrix, got shape {rows}x{cols}")]
    MalformedShape { rows: usize, cols: usize },
    #[error("eigenvalue iteration failed to converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
    #[error("cannot take the product of an empty list of matrices")]
    EmptyProduct,
}
