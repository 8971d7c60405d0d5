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

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// SolverOptions stores the tolerances and iteration limits of the interior point solver.
///
/// Every constraint row is made elastic with a penalty of `elastic_penalty` per unit of violation.
/// When the solver settles on a point which still violates the rows, the penalty is raised tenfold.
/// The problem is declared locally infeasible once that no longer reduces the violation, or once
/// the penalty reaches `max_penalty`.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
#[serde(default)]
pub struct SolverOptions {
    /// Maximum allowed distance of any constraint row to its bounds
    #[builder(default = 1e-8)]
    pub constraint_tolerance: f64,
    /// Maximum allowed scaled dual infeasibility and complementarity
    #[builder(default = 1e-6)]
    pub optimality_tolerance: f64,
    /// Relaxed optimality tolerance, met for `acceptable_iterations` in a row by a feasible point
    #[builder(default = 1e-3)]
    pub acceptable_tolerance: f64,
    #[builder(default = 15)]
    pub acceptable_iterations: usize,
    #[builder(default = 3000)]
    pub max_iterations: usize,
    /// Barrier parameter of the first iteration
    #[builder(default = 0.1)]
    pub initial_barrier: f64,
    #[builder(default = 100.0)]
    pub elastic_penalty: f64,
    #[builder(default = 1e6)]
    pub max_penalty: f64,
    /// Largest sum of the row residuals accepted by the line search
    #[builder(default = 100.0)]
    pub max_filter_violation: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for SolverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ctol: {:e}, otol: {:e} (acceptable {:e} x{}), max iter: {}, μ0: {:e}, ρ: {:e} (up to {:e})",
            self.constraint_tolerance,
            self.optimality_tolerance,
            self.acceptable_tolerance,
            self.acceptable_iterations,
            self.max_iterations,
            self.initial_barrier,
            self.elastic_penalty,
            self.max_penalty
        )
    }
}

#[test]
fn test_options() {
    let opts = SolverOptions::default();
    assert!((opts.constraint_tolerance - 1e-8).abs() < f64::EPSILON);
    assert!((opts.optimality_tolerance - 1e-6).abs() < f64::EPSILON);
    assert_eq!(opts.max_iterations, 3000);
    assert_eq!(opts.acceptable_iterations, 15);

    let opts = SolverOptions::builder()
        .max_iterations(5)
        .elastic_penalty(1.0)
        .build();
    assert_eq!(opts.max_iterations, 5);
    assert!((opts.elastic_penalty - 1.0).abs() < f64::EPSILON);
    assert!((opts.max_penalty - 1e6).abs() < f64::EPSILON);

    let opts = SolverOptions::builder().constraint_tolerance(1e-6).build();
    assert!((opts.constraint_tolerance - 1e-6).abs() < f64::EPSILON);
    assert!((opts.initial_barrier - 0.1).abs() < f64::EPSILON);
}
