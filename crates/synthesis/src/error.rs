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

use cartan_linalg::LinalgError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecompositionError {
    #[error(transparent)]
    Linalg(#[from] LinalgError),
    #[error("expected a {expected}x{expected} matrix, got {found}x{found}")]
    ExpectedDimension { expected: usize, found: usize },
}

impl DecompositionError {
    /// Fail unless `found` is `expected`.
    #[inline]
    pub(crate) fn check_dimension(expected: usize, found: usize) -> Result<(), Self> {
        if expected != found {
            return Err(Self::ExpectedDimension { expected, found });
        }
        Ok(())
    }
}
