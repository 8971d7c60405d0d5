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

use super::{Scenario, TranscriptionError};
use crate::cosmic::StateLayout;
use crate::linalg::{DMatrix, DVector};
use std::fmt;

/// A decoded solution of the transcription, extended past the horizon by a zero control
/// terminal simulation.
#[derive(Clone, Debug)]
pub struct Solution {
    pub layout: StateLayout,
    /// N + 1 rows of states
    pub trajectory: DMatrix<f64>,
    /// N rows of controls
    pub controls: DMatrix<f64>,
    /// Trajectory followed by the terminal simulation
    pub extended_trajectory: DMatrix<f64>,
    /// Controls padded with zeros, as many rows as the extended trajectory
    pub extended_controls: DMatrix<f64>,
    pub step_size: f64,
    pub orbital_velocity: f64,
    pub target_radius: f64,
    pub thrust_max: f64,
}

impl Solution {
    /// Splits the flat decision vector `z` at the state/control boundary, reshapes both blocks
    /// and propagates the final state with zero control for the terminal steps of the scenario.
    pub fn decode(scenario: &Scenario, z: &DVector<f64>) -> Result<Self, TranscriptionError> {
        let layout = scenario.layout();
        if z.len() != layout.n_vars() {
            return Err(TranscriptionError::DecisionVectorSize {
                expected: layout.n_vars(),
                got: z.len(),
            });
        }
        let ss = layout.state_size();
        let cs = layout.control_size();
        let n = layout.nodes;

        let trajectory = DMatrix::from_fn(n + 1, ss, |node, c| z[node * ss + c]);
        let controls = DMatrix::from_fn(n, cs, |k, c| z[layout.control_offset() + k * cs + c]);

        let terminal = trajectory.row(n).transpose();
        let tail = scenario
            .propagator()
            .coast(&terminal, scenario.terminal_steps)
            .map_err(|source| TranscriptionError::TranscriptionPropagation {
                action: "simulating past the horizon",
                source,
            })?;

        let rows = n + 1 + scenario.terminal_steps;
        let mut extended_trajectory = DMatrix::zeros(rows, ss);
        extended_trajectory.rows_mut(0, n + 1).copy_from(&trajectory);
        for (step, state) in tail.iter().enumerate().skip(1) {
            extended_trajectory.set_row(n + step, &state.transpose());
        }

        // One zero control after the horizon, then one per terminal step
        let mut extended_controls = DMatrix::zeros(rows, cs);
        extended_controls.rows_mut(0, n).copy_from(&controls);

        let me = Self {
            layout,
            trajectory,
            controls,
            extended_trajectory,
            extended_controls,
            step_size: scenario.step_size(),
            orbital_velocity: scenario.orbital_velocity(),
            target_radius: scenario.target_radius,
            thrust_max: scenario.thrust_max,
        };
        info!(
            "terminal radius {:.6} (target {}), drifts by at most {:.3e} over {} coasting steps",
            me.radius(n),
            me.target_radius,
            me.radius_drift(),
            scenario.terminal_steps
        );
        Ok(me)
    }

    /// Distance of the actuated body from the origin at row `row` of the extended trajectory
    pub fn radius(&self, row: usize) -> f64 {
        self.extended_trajectory
            .row(row)
            .columns(0, self.layout.dim())
            .norm()
    }

    /// Speed of the actuated body at row `row` of the extended trajectory
    pub fn speed(&self, row: usize) -> f64 {
        self.extended_trajectory
            .row(row)
            .columns(self.layout.velocity_offset(0), self.layout.dim())
            .norm()
    }

    /// State at the end of the horizon
    pub fn terminal_state(&self) -> DVector<f64> {
        self.trajectory.row(self.layout.nodes).transpose()
    }

    /// Largest distance to the target radius over the terminal simulation
    pub fn radius_drift(&self) -> f64 {
        (self.layout.nodes..self.extended_trajectory.nrows())
            .map(|row| (self.radius(row) - self.target_radius).abs())
            .fold(0.0, f64::max)
    }

    /// Total impulse Σ h·r_k, the objective value of this solution
    pub fn total_impulse(&self) -> f64 {
        self.controls.column(0).sum() * self.step_size
    }

    /// Thrust magnitude of each control divided by the maximum thrust
    pub fn normalized_thrust(&self) -> Vec<f64> {
        self.controls
            .column(0)
            .iter()
            .map(|r| r.abs() / self.thrust_max)
            .collect()
    }

    /// Time of each row of the extended trajectory
    pub fn epochs(&self) -> Vec<f64> {
        (0..self.extended_trajectory.nrows())
            .map(|row| row as f64 * self.step_size)
            .collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.layout.nodes;
        let peak = self
            .normalized_thrust()
            .iter()
            .fold(0.0_f64, |peak, r| peak.max(*r));
        writeln!(
            f,
            "Insertion solution over {} intervals (h = {:.6}):\n\tterminal radius = {:.6} (wanted {})\n\tterminal speed = {:.6} (wanted {:.6})\n\ttotal impulse = {:.6e} (peak thrust {:.1}% of max)\n\tradius drift over {} coasting steps = {:.3e}",
            n,
            self.step_size,
            self.radius(n),
            self.target_radius,
            self.speed(n),
            self.orbital_velocity,
            self.total_impulse(),
            peak * 100.0,
            self.extended_trajectory.nrows() - n - 1,
            self.radius_drift()
        )
    }
}
