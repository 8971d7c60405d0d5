/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::linalg::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Symmetric matrix of the condensed Newton system, accumulated entry by entry and stored in the
/// variable order of the problem so that the Cholesky factor of a staged program stays banded.
#[derive(Clone, Debug)]
pub(crate) struct CondensedMatrix {
    /// Position of each variable in the factorization order
    position: Vec<usize>,
    /// Permuted entries, both triangles
    entries: Vec<(usize, usize, f64)>,
}

impl CondensedMatrix {
    /// `order` lists every variable exactly once, in the order to factorize them.
    pub fn new(order: &[usize]) -> Self {
        let mut position = vec![0; order.len()];
        for (pos, var) in order.iter().enumerate() {
            position[*var] = pos;
        }
        Self {
            position,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.position.len()
    }

    /// Adds `value` to the entries (i, j) and (j, i).
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        let (pi, pj) = (self.position[i], self.position[j]);
        self.entries.push((pi, pj, value));
        if pi != pj {
            self.entries.push((pj, pi, value));
        }
    }

    /// Adds `weight · a aᵀ` where `a` is a sparse row of the constraint Jacobian.
    pub fn add_outer(&mut self, row: &[(usize, f64)], weight: f64) {
        for (k, (i, vi)) in row.iter().enumerate() {
            for (j, vj) in &row[..=k] {
                self.add(*i, *j, weight * vi * vj);
            }
        }
    }

    /// Factorizes this matrix plus `shift` times the identity.
    ///
    /// Returns None unless the shifted matrix is positive definite.
    pub fn factor(&self, shift: f64) -> Option<Factorization> {
        let n = self.dim();
        let mut coo = CooMatrix::new(n, n);
        for (i, j, v) in &self.entries {
            coo.push(*i, *j, *v);
        }
        // The diagonal must be part of the pattern even where it is structurally zero
        for i in 0..n {
            coo.push(i, i, shift);
        }
        let csc = CscMatrix::from(&coo);
        let cholesky = CscCholesky::factor(&csc).ok()?;
        Some(Factorization {
            cholesky,
            position: self.position.clone(),
        })
    }
}

/// Cholesky factor of a positive definite [`CondensedMatrix`]
pub(crate) struct Factorization {
    cholesky: CscCholesky<f64>,
    position: Vec<usize>,
}

impl Factorization {
    /// Solves the system for `rhs`, given and returned in the variable order of the problem.
    ///
    /// Returns None if the solution is not finite.
    pub fn solve(&self, rhs: &DVector<f64>) -> Option<DVector<f64>> {
        let n = self.position.len();
        let mut permuted = DMatrix::zeros(n, 1);
        for (var, pos) in self.position.iter().enumerate() {
            permuted[(*pos, 0)] = rhs[var];
        }
        let sol = self.cholesky.solve(&permuted);
        let out = DVector::from_fn(n, |var, _| sol[(self.position[var], 0)]);
        if out.iter().all(|v| v.is_finite()) {
            Some(out)
        } else {
            None
        }
    }
}
