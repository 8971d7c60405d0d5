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

/// Relative step of the finite differences of the default Lagrangian Hessian
const HESSIAN_STEP: f64 = 1e-6;

/// Lower triangle of a symmetric matrix as `(row, column, value)` entries with row ≥ column.
/// Repeated entries add up.
pub type LowerTriangle = Vec<(usize, usize, f64)>;

/// A constraint Jacobian stored row by row, each row holding its `(column, value)` nonzeros.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseJacobian {
    pub n_cols: usize,
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl SparseJacobian {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, entries: Vec<(usize, f64)>) {
        self.rows.push(entries);
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored nonzeros
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    /// Returns J·v
    pub fn mul(&self, v: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.n_rows(),
            self.rows
                .iter()
                .map(|row| row.iter().map(|(j, val)| val * v[*j]).sum::<f64>()),
        )
    }

    /// Returns Jᵀ·w
    pub fn tr_mul(&self, w: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(self.n_cols);
        for (row, wi) in self.rows.iter().zip(w.iter()) {
            for (j, val) in row {
                out[*j] += val * wi;
            }
        }
        out
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.n_rows(), self.n_cols);
        for (i, row) in self.rows.iter().enumerate() {
            for (j, val) in row {
                dense[(i, *j)] += val;
            }
        }
        dense
    }
}

/// A nonlinear program: minimize f(x) subject to lb ≤ c(x) ≤ ub and x_lb ≤ x ≤ x_ub.
///
/// Equality rows have lb == ub. Infinite bounds are allowed on either side.
pub trait NonlinearProgram {
    /// Length of the decision vector
    fn n_vars(&self) -> usize;

    /// Number of constraint rows
    fn n_rows(&self) -> usize;

    fn objective(&self, x: &DVector<f64>) -> f64;

    fn objective_gradient(&self, x: &DVector<f64>) -> DVector<f64>;

    fn constraints(&self, x: &DVector<f64>) -> DVector<f64>;

    fn constraint_jacobian(&self, x: &DVector<f64>) -> SparseJacobian;

    /// Lower and upper bounds of the constraint rows
    fn row_bounds(&self) -> (&DVector<f64>, &DVector<f64>);

    /// Lower and upper bounds of the decision variables
    fn variable_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        (
            DVector::from_element(self.n_vars(), f64::NEG_INFINITY),
            DVector::from_element(self.n_vars(), f64::INFINITY),
        )
    }

    fn initial_guess(&self) -> DVector<f64>;

    /// Lower triangle of the Hessian of the Lagrangian `f(x) + Σ yᵢ cᵢ(x)`.
    ///
    /// Defaults to central differences of the gradient of the Lagrangian, one variable at a time.
    fn lagrangian_hessian(&self, x: &DVector<f64>, multipliers: &DVector<f64>) -> LowerTriangle {
        let n = self.n_vars();
        let gradient = |x: &DVector<f64>| {
            self.objective_gradient(x) + self.constraint_jacobian(x).tr_mul(multipliers)
        };
        let mut shifted = x.clone();
        let mut columns = Vec::with_capacity(n);
        for j in 0..n {
            let step = HESSIAN_STEP * x[j].abs().max(1.0);
            shifted[j] = x[j] + step;
            let plus = gradient(&shifted);
            shifted[j] = x[j] - step;
            let minus = gradient(&shifted);
            shifted[j] = x[j];
            columns.push((plus - minus) / (2.0 * step));
        }
        let mut entries = Vec::new();
        for j in 0..n {
            for i in j..n {
                let value = 0.5 * (columns[j][i] + columns[i][j]);
                if value != 0.0 {
                    entries.push((i, j, value));
                }
            }
        }
        entries
    }

    /// Order in which the solver eliminates the variables from its Newton systems. Listing coupled
    /// variables next to each other keeps the factorization sparse.
    fn variable_order(&self) -> Vec<usize> {
        (0..self.n_vars()).collect()
    }

    /// Largest distance of any constraint row to its bounds (zero when feasible)
    fn max_violation(&self, x: &DVector<f64>) -> f64 {
        let (lb, ub) = self.row_bounds();
        bound_violation(&self.constraints(x), lb, ub)
    }
}

/// Infinity norm of the distance of `c` to the box [lb, ub]
pub fn bound_violation(c: &DVector<f64>, lb: &DVector<f64>, ub: &DVector<f64>) -> f64 {
    c.iter()
        .zip(lb.iter().zip(ub.iter()))
        .map(|(ci, (l, u))| (l - ci).max(ci - u).max(0.0))
        .fold(0.0, f64::max)
}
