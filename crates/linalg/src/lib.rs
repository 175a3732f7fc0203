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

//! Dense complex linear algebra for one- and two-qubit unitaries.

#[macro_use]
pub mod util;

pub mod eigen;
pub mod error;
pub mod gate_matrix;
pub mod matrix;
pub mod scalar;

pub use eigen::{EigenDecomposition, SchurDecomposition};
pub use error::LinalgError;
pub use matrix::ComplexMatrix;
pub use scalar::ComplexScalar;
