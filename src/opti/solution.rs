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

use crate::linalg::DVector;
use std::fmt;
use std::time::Duration;

/// Defines the solution of a nonlinear program
#[derive(Clone, Debug)]
pub struct NlpSolution {
    /// The decision vector at the solution
    pub x: DVector<f64>,
    /// Objective value at the solution
    pub objective: f64,
    /// Constraint rows evaluated at the solution
    pub constraints: DVector<f64>,
    /// Lagrange multiplier estimates of the constraint rows
    pub multipliers: DVector<f64>,
    /// Largest distance of any constraint row to its bounds
    pub violation: f64,
    /// Infinity norm of the gradient of the Lagrangian in the decision variables
    pub stationarity: f64,
    /// Number of Newton iterations
    pub iterations: usize,
    /// Total number of trial points evaluated by the line search
    pub trial_points: usize,
    /// Computation duration
    pub computation_dur: Duration,
}

impl fmt::Display for NlpSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "NLP solution with {} variables and {} constraints (converged in {:.3} seconds, {} iterations, {} trial points):\n\tobjective = {:.9}\n\tmax violation = {:.3e}\n\tstationarity = {:.3e}\n\t|λ|∞ = {:.3e}",
            self.x.len(),
            self.constraints.len(),
            self.computation_dur.as_secs_f64(),
            self.iterations,
            self.trial_points,
            self.objective,
            self.violation,
            self.stationarity,
            self.multipliers.iter().fold(0.0_f64, |m, l| m.max(l.abs()))
        )
    }
}
