// This code is part of Qiskit.
//
// (C) Copyright IBM 2023
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use cartan_linalg::scalar::sum_of;
use cartan_linalg::ComplexMatrix;
use num_complex::Complex64;
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;

/// Run `worker` inside a freshly built rayon pool that is torn down on return, so the fork-join
/// paths are exercised on real worker threads without touching the global pool.
pub fn in_scoped_thread_pool<F, T>(worker: F) -> Result<T, ::rayon::ThreadPoolBuildError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    ::rayon::ThreadPoolBuilder::new()
        .build_scoped(::rayon::ThreadBuilder::run, |pool| pool.install(worker))
}

#[inline]
fn random_complex(rng: &mut Pcg64Mcg) -> Complex64 {
    Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
}

/// A Haar-random element of `SU(2)`, from a uniformly random unit quaternion.
pub fn random_su2(rng: &mut Pcg64Mcg) -> ComplexMatrix {
    let (alpha, beta) = (random_complex(rng), random_complex(rng));
    let norm = (alpha.norm_sqr() + beta.norm_sqr()).sqrt();
    let (alpha, beta) = (alpha / norm, beta / norm);
    ComplexMatrix::from_fn(2, |row, col| match (row, col) {
        (0, 0) => alpha,
        (0, 1) => -beta.conj(),
        (1, 0) => beta,
        _ => alpha.conj(),
    })
}

/// A Haar-random unitary, by Gram-Schmidt on the columns of a complex Gaussian matrix.
pub fn random_unitary(rng: &mut Pcg64Mcg, dim: usize) -> ComplexMatrix {
    let mut columns: Vec<Vec<Complex64>> = Vec::with_capacity(dim);
    for _ in 0..dim {
        let mut column = (0..dim).map(|_| random_complex(rng)).collect::<Vec<_>>();
        for prev in &columns {
            let overlap = sum_of(prev.iter().zip(&column).map(|(p, c)| p.conj() * c));
            column
                .iter_mut()
                .zip(prev)
                .for_each(|(c, p)| *c -= overlap * p);
        }
        let norm = column.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        columns.push(column.into_iter().map(|c| c / norm).collect());
    }
    ComplexMatrix::from_fn(dim, |row, col| columns[col][row])
}

/// The largest entrywise difference between `actual` and `expected` once the global phase of
/// `expected` is aligned to `actual`.
pub fn phase_distance(actual: &ComplexMatrix, expected: &ComplexMatrix) -> f64 {
    let (actual, expected) = (actual.view(), expected.view());
    let overlap = sum_of(actual.iter().zip(expected.iter()).map(|(a, e)| e.conj() * a));
    let phase = overlap / overlap.norm();
    actual
        .iter()
        .zip(expected.iter())
        .map(|(a, e)| (a - phase * e).norm())
        .fold(0., f64::max)
}
