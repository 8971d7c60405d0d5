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

use crate::cosmic::{Dimension, OrbitalPlane, StateLayout};
use crate::dynamics::NBodyDynamics;
use crate::linalg::DVector;
use crate::propagators::Propagator;
use std::f64::consts::PI;
use std::fmt;

/// An immutable, validated orbit insertion scenario: the run-start constants shared by the
/// dynamics, the transcription, the initial guess and the decoder.
///
/// Build it from a [`crate::io::ScenarioConfig`], which validates every field.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Time horizon T
    pub horizon: f64,
    /// Number of transcription intervals N
    pub nodes: usize,
    pub dynamics: NBodyDynamics,
    /// Maximum thrust of the actuated body
    pub thrust_max: f64,
    /// Fixed state at node 0
    pub initial_state: DVector<f64>,
    /// Radius of the target circular orbit
    pub target_radius: f64,
    /// Plane of the target orbit (3D only)
    pub plane: Option<OrbitalPlane>,
    /// Number of zero-control steps simulated after the horizon
    pub terminal_steps: usize,
    /// State from which the initial guess is rolled out, defaults to `initial_state`
    pub guess_state: Option<DVector<f64>>,
    /// Constant control of the initial guess, defaults to zero
    pub guess_control: Option<DVector<f64>>,
}

impl Scenario {
    pub fn dimension(&self) -> Dimension {
        self.dynamics.dimension
    }

    pub fn layout(&self) -> StateLayout {
        self.dynamics.layout(self.nodes)
    }

    /// Step size h = T / (N - 1)
    pub fn step_size(&self) -> f64 {
        self.horizon / (self.nodes - 1) as f64
    }

    /// Speed of the target circular orbit
    pub fn orbital_velocity(&self) -> f64 {
        self.dynamics
            .primary
            .circular_velocity(self.dynamics.grav_const, self.target_radius)
    }

    /// Maximum change of thrust between two consecutive controls
    pub fn thrust_slew_limit(&self) -> f64 {
        self.step_size() * self.thrust_max / 60.0
    }

    /// Maximum change of any direction angle between two consecutive controls
    pub fn angle_slew_limit(&self) -> f64 {
        self.step_size() * PI / 48.0
    }

    pub fn propagator(&self) -> Propagator<'_, NBodyDynamics> {
        Propagator::new(&self.dynamics, self.step_size())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} insertion into r = {} (v = {:.6}) over T = {} with N = {} (h = {:.6}), thrust ≤ {:e}",
            self.dimension(),
            self.target_radius,
            self.orbital_velocity(),
            self.horizon,
            self.nodes,
            self.step_size(),
            self.thrust_max
        )?;
        if let Some(plane) = &self.plane {
            write!(f, " in {plane}")?;
        }
        Ok(())
    }
}
