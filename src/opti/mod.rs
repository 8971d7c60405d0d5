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

use snafu::prelude::*;

/// Algebraic description of a nonlinear program, as consumed by any solver.
mod problem;
pub use self::problem::*;

/// Options of the solvers, built with defaults.
pub mod options;
pub use self::options::SolverOptions;

mod solution;
pub use self::solution::NlpSolution;

mod filter;
mod kkt;

/// The in-crate solver backend.
mod interior_point;
pub use self::interior_point::InteriorPoint;

/// A solver of nonlinear programs. Bindings to third-party solvers implement this trait.
pub trait NlpSolver {
    /// Solves the problem starting from its initial guess. Failure to converge is an error.
    fn solve<P: NonlinearProgram>(&self, problem: &P) -> Result<NlpSolution, SolverError>;
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SolverError {
    #[snafu(display(
        "solver did not converge after {iterations} iterations (max violation {violation:e})"
    ))]
    MaxIterReached { iterations: usize, violation: f64 },
    #[snafu(display(
        "problem is locally infeasible at step #{iteration} (max violation {violation:e})"
    ))]
    LocallyInfeasible { iteration: usize, violation: f64 },
    #[snafu(display("step #{iteration} is singular even with maximum damping"))]
    SingularStep { iteration: usize },
    #[snafu(display("objective or constraints became non-finite at step #{iteration}"))]
    NonFiniteIterate { iteration: usize },
    #[snafu(display("{action}: expected length {expected} but got {got}"))]
    ProblemSize {
        action: &'static str,
        expected: usize,
        got: usize,
    },
}
