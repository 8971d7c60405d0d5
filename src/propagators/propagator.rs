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

use super::{rk4_step, PropagationError};
use crate::dynamics::Dynamics;
use crate::linalg::DVector;
use std::fmt;

/// A fixed step propagator of some dynamics, holding the control constant over each step.
#[derive(Clone, Debug)]
pub struct Propagator<'a, D: Dynamics> {
    pub dynamics: &'a D,
    /// Step size, in time units
    pub step_size: f64,
}

impl<'a, D: Dynamics> Propagator<'a, D> {
    pub fn new(dynamics: &'a D, step_size: f64) -> Self {
        Self {
            dynamics,
            step_size,
        }
    }

    /// Performs exactly one RK4 step from `state` under `control`.
    pub fn step(&self, state: &DVector<f64>, control: &DVector<f64>) -> DVector<f64> {
        rk4_step(self.dynamics, state, control, self.step_size)
    }

    /// Propagates `initial` through each control of `controls` in turn. The returned trajectory
    /// starts with the initial state and holds `controls.len() + 1` states.
    pub fn rollout(
        &self,
        initial: &DVector<f64>,
        controls: &[DVector<f64>],
    ) -> Result<Vec<DVector<f64>>, PropagationError> {
        let state_size = self.dynamics.state_size();
        if initial.len() != state_size {
            return Err(PropagationError::StateSize {
                expected: state_size,
                got: initial.len(),
            });
        }

        let mut trajectory = Vec::with_capacity(controls.len() + 1);
        trajectory.push(initial.clone());
        for (step, control) in controls.iter().enumerate() {
            if control.len() != self.dynamics.control_size() {
                return Err(PropagationError::ControlSize {
                    expected: self.dynamics.control_size(),
                    got: control.len(),
                });
            }
            let next = self.step(&trajectory[step], control);
            if next.iter().any(|x| !x.is_finite()) {
                return Err(PropagationError::NonFiniteState { step });
            }
            trajectory.push(next);
        }

        debug!(
            "propagated {} steps of size {} for a state of length {}",
            controls.len(),
            self.step_size,
            self.dynamics.state_size()
        );
        Ok(trajectory)
    }

    /// Propagates `initial` for `steps` steps with a zero control.
    pub fn coast(
        &self,
        initial: &DVector<f64>,
        steps: usize,
    ) -> Result<Vec<DVector<f64>>, PropagationError> {
        let zero = DVector::zeros(self.dynamics.control_size());
        self.rollout(initial, &vec![zero; steps])
    }
}

impl<'a, D: Dynamics> fmt::Display for Propagator<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RK4 fixed step propagator (h = {})", self.step_size)
    }
}
