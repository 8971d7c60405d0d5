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
use crate::linalg::DVector;

/// A dynamically consistent starting point of the solver: the states are the RK4 rollout of the
/// controls, so every dynamics row of the transcription is exactly zero on it.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialGuess {
    /// N + 1 states
    pub states: Vec<DVector<f64>>,
    /// N controls
    pub controls: Vec<DVector<f64>>,
}

impl InitialGuess {
    /// Rolls out the guess of the scenario: from its guess state (or its initial state) under
    /// its constant guess control (or a zero control).
    pub fn rollout(scenario: &Scenario) -> Result<Self, TranscriptionError> {
        let initial = scenario
            .guess_state
            .clone()
            .unwrap_or_else(|| scenario.initial_state.clone());
        let control = scenario
            .guess_control
            .clone()
            .unwrap_or_else(|| DVector::zeros(scenario.layout().control_size()));
        Self::from_controls(scenario, &initial, vec![control; scenario.nodes])
    }

    /// Rolls out the provided controls from `initial`.
    pub fn from_controls(
        scenario: &Scenario,
        initial: &DVector<f64>,
        controls: Vec<DVector<f64>>,
    ) -> Result<Self, TranscriptionError> {
        let states = scenario
            .propagator()
            .rollout(initial, &controls)
            .map_err(|source| TranscriptionError::TranscriptionPropagation {
                action: "rolling out the initial guess",
                source,
            })?;
        debug!(
            "initial guess ends {} away from the origin",
            states
                .last()
                .map(|x| x.rows(0, scenario.dimension().size()).norm())
                .unwrap_or_default()
        );
        Ok(Self { states, controls })
    }

    /// Flattens the guess into a decision vector: all states, then all controls.
    pub fn to_decision_vector(&self, layout: &StateLayout) -> DVector<f64> {
        let mut z = DVector::zeros(layout.n_vars());
        for (node, state) in self.states.iter().enumerate() {
            z.rows_mut(layout.state_range(node).start, layout.state_size())
                .copy_from(state);
        }
        for (interval, control) in self.controls.iter().enumerate() {
            z.rows_mut(layout.control_range(interval).start, layout.control_size())
                .copy_from(control);
        }
        z
    }
}
