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

//! Cartan (KAK) decompositions of one- and two-qubit unitaries into rotation angles.

use std::env;

pub mod error;
pub mod isoclinic;
pub mod one_qubit;
pub mod two_qubit;

#[cfg(test)]
mod test;

pub use error::DecompositionError;

/// Whether the independent halves of a decomposition should be run on separate threads.
///
/// `CARTAN_IN_PARALLEL=TRUE` marks the caller as already running inside a parallel context, in
/// which case the halves run one after the other.  `CARTAN_FORCE_THREADS=TRUE` overrides that.
#[inline]
pub fn getenv_use_multiple_threads() -> bool {
    let parallel_context = env::var("CARTAN_IN_PARALLEL")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    let force_threads = env::var("CARTAN_FORCE_THREADS")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    !parallel_context || force_threads
}

/// Run two closures to completion and return both results, on the rayon pool if
/// `run_in_parallel` is set and sequentially on the calling thread otherwise.
#[inline]
pub(crate) fn fork_join<A, B, RA, RB>(run_in_parallel: bool, oper_a: A, oper_b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if run_in_parallel {
        rayon::join(oper_a, oper_b)
    } else {
        (oper_a(), oper_b())
    }
}
