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

use super::{ConfigError, ConfigRepr};
use crate::cosmic::{state_from_angles, Body, Dimension, OrbitalPlane, Primary};
use crate::dynamics::NBodyDynamics;
use crate::linalg::DVector;
use crate::md::Scenario;
use crate::opti::SolverOptions;
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_8, PI};

/// An orbiting body and its state at node 0. The first body of a scenario is the actuated one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
}

/// The target circular orbit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub radius: f64,
    /// Plane of the orbit, 3D only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plane: Option<OrbitalPlane>,
}

/// Overrides of the initial guess rollout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuessConfig {
    /// State from which the guess is rolled out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<f64>>,
    /// Control held during the whole rollout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<Vec<f64>>,
}

fn default_terminal_steps() -> usize {
    210
}

/// Speed of the initial guess of the presets, above the circular speed at the surface
fn seed_speed() -> f64 {
    (0.3_f64.powi(2) + 3.0_f64.powi(2)).sqrt()
}

/// Serializable representation of a [`Scenario`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Time horizon T
    pub horizon: f64,
    /// Number of transcription intervals N
    pub nodes: usize,
    pub grav_const: f64,
    pub dimension: Dimension,
    pub primary: Primary,
    pub bodies: Vec<BodyConfig>,
    pub thrust_max: f64,
    pub target: TargetConfig,
    #[serde(default = "default_terminal_steps")]
    pub terminal_steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guess: Option<GuessConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverOptions>,
}

impl ConfigRepr for ScenarioConfig {}

impl ScenarioConfig {
    /// Insertion of a single body into a circular orbit of radius 190 in the plane.
    ///
    /// The guess is rolled out from the surface of the primary, on a wider ellipse than the
    /// initial orbit.
    pub fn planar() -> Self {
        let speed = 2.412;
        let seed = seed_speed();
        Self {
            horizon: 700.0,
            nodes: 176,
            grav_const: 0.0008,
            dimension: Dimension::Planar,
            primary: Primary {
                mass: 1e6,
                radius: 100.0,
            },
            bodies: vec![BodyConfig {
                mass: 0.05,
                position: vec![110.0, 0.0],
                velocity: vec![speed * FRAC_PI_4.cos(), speed * FRAC_PI_4.sin()],
            }],
            thrust_max: 0.0003,
            target: TargetConfig {
                radius: 190.0,
                plane: None,
            },
            terminal_steps: 210,
            guess: Some(GuessConfig {
                state: Some(vec![
                    100.0,
                    0.0,
                    seed * FRAC_PI_3.cos(),
                    seed * FRAC_PI_3.sin(),
                ]),
                control: None,
            }),
            solver: None,
        }
    }

    /// Insertion of a single body into a circular orbit of radius 190 in a tilted plane.
    pub fn spatial() -> Self {
        let state = state_from_angles(110.0, 0.0, FRAC_PI_2, 2.412, FRAC_PI_8, PI / 2.1);
        let seed = state_from_angles(110.0, 0.0, FRAC_PI_2, seed_speed(), FRAC_PI_4, PI / 2.1);
        Self {
            horizon: 850.0,
            nodes: 99,
            grav_const: 0.0008,
            dimension: Dimension::Spatial,
            primary: Primary {
                mass: 1e6,
                radius: 100.0,
            },
            bodies: vec![BodyConfig {
                mass: 0.05,
                position: state[..3].to_vec(),
                velocity: state[3..].to_vec(),
            }],
            thrust_max: 0.0004,
            target: TargetConfig {
                radius: 190.0,
                plane: Some(OrbitalPlane::new(0.3, 0.2, -0.2)),
            },
            terminal_steps: 500,
            guess: Some(GuessConfig {
                state: Some(seed.to_vec()),
                control: None,
            }),
            solver: None,
        }
    }

    /// Solver options of this scenario, or the defaults
    pub fn solver_options(&self) -> SolverOptions {
        self.solver.unwrap_or_default()
    }

    /// Validates this configuration and builds the immutable scenario.
    pub fn into_scenario(&self) -> Result<Scenario, ConfigError> {
        let d = self.dimension.size();

        ensure_that(!self.bodies.is_empty(), || {
            "at least one orbiting body is required".to_string()
        })?;
        ensure_that(self.nodes >= 2, || {
            format!("at least two intervals are required, got {}", self.nodes)
        })?;
        ensure_positive("horizon", self.horizon)?;
        ensure_positive("gravitational constant", self.grav_const)?;
        ensure_positive("primary mass", self.primary.mass)?;
        ensure_positive("primary radius", self.primary.radius)?;
        ensure_positive("maximum thrust", self.thrust_max)?;

        for (i, body) in self.bodies.iter().enumerate() {
            ensure_positive("body mass", body.mass)?;
            ensure_that(body.position.len() == d && body.velocity.len() == d, || {
                format!("body #{i} needs a {d} component position and velocity")
            })?;
        }

        let safety_radius = self.primary.safety_radius();
        ensure_that(self.target.radius > safety_radius, || {
            format!(
                "target radius {} is within the safety radius {} of the primary",
                self.target.radius, safety_radius
            )
        })?;
        ensure_that(
            self.target.plane.is_none() || self.dimension == Dimension::Spatial,
            || "an orbital plane is only meaningful in 3D".to_string(),
        )?;

        let dynamics = NBodyDynamics::new(
            self.dimension,
            self.grav_const,
            self.primary,
            self.bodies.iter().map(|b| Body { mass: b.mass }).collect(),
        );
        let layout = dynamics.layout(self.nodes);

        let initial_state = DVector::from_iterator(
            layout.state_size(),
            self.bodies
                .iter()
                .flat_map(|b| b.position.iter())
                .chain(self.bodies.iter().flat_map(|b| b.velocity.iter()))
                .copied(),
        );

        let guess = self.guess.clone().unwrap_or_default();
        if let Some(state) = &guess.state {
            ensure_that(state.len() == layout.state_size(), || {
                format!(
                    "guess state needs {} components, got {}",
                    layout.state_size(),
                    state.len()
                )
            })?;
        }
        if let Some(control) = &guess.control {
            ensure_that(control.len() == layout.control_size(), || {
                format!(
                    "guess control needs {} components, got {}",
                    layout.control_size(),
                    control.len()
                )
            })?;
        }

        let scenario = Scenario {
            horizon: self.horizon,
            nodes: self.nodes,
            dynamics,
            thrust_max: self.thrust_max,
            initial_state,
            target_radius: self.target.radius,
            plane: self.target.plane,
            terminal_steps: self.terminal_steps,
            guess_state: guess.state.map(DVector::from_vec),
            guess_control: guess.control.map(DVector::from_vec),
        };
        debug!("{scenario}");
        Ok(scenario)
    }
}

fn ensure_that(condition: bool, msg: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig { msg: msg() })
    }
}

fn ensure_positive(what: &str, value: f64) -> Result<(), ConfigError> {
    ensure_that(value.is_finite() && value > 0.0, || {
        format!("{what} must be positive, got {value}")
    })
}

#[cfg(test)]
mod ut_scenario_config {
    use super::*;

    fn invalid(cfg: &ScenarioConfig) -> String {
        match cfg.into_scenario() {
            Err(ConfigError::InvalidConfig { msg }) => msg,
            other => panic!("expected an invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn presets_are_valid() {
        let planar = ScenarioConfig::planar().into_scenario().unwrap();
        assert_eq!(planar.layout().state_size(), 4);
        assert!((planar.initial_state[2] - 1.7055).abs() < 1e-4);
        assert!(planar.plane.is_none());

        let spatial = ScenarioConfig::spatial().into_scenario().unwrap();
        assert_eq!(spatial.layout().state_size(), 6);
        assert!((spatial.initial_state.rows(0, 3).norm() - 110.0).abs() < 1e-12);
        assert!((spatial.initial_state.rows(3, 3).norm() - 2.412).abs() < 1e-12);
        assert_eq!(spatial.terminal_steps, 500);
    }

    #[test]
    fn rejects_degenerate_configurations() {
        let mut cfg = ScenarioConfig::planar();
        cfg.target.radius = 105.0;
        assert!(invalid(&cfg).contains("safety radius"));

        let mut cfg = ScenarioConfig::planar();
        cfg.nodes = 1;
        invalid(&cfg);

        let mut cfg = ScenarioConfig::planar();
        cfg.thrust_max = 0.0;
        assert!(invalid(&cfg).contains("maximum thrust"));

        let mut cfg = ScenarioConfig::planar();
        cfg.bodies[0].mass = -1.0;
        invalid(&cfg);

        let mut cfg = ScenarioConfig::planar();
        cfg.bodies[0].velocity.push(0.0);
        assert!(invalid(&cfg).contains("body #0"));

        let mut cfg = ScenarioConfig::planar();
        cfg.target.plane = Some(OrbitalPlane::new(0.0, 0.0, 0.0));
        invalid(&cfg);

        let mut cfg = ScenarioConfig::planar();
        cfg.guess = Some(GuessConfig {
            state: None,
            control: Some(vec![0.0; 3]),
        });
        invalid(&cfg);

        let mut cfg = ScenarioConfig::planar();
        cfg.bodies.clear();
        invalid(&cfg);
    }

    #[test]
    fn multi_body_state_order() {
        let mut cfg = ScenarioConfig::planar();
        cfg.bodies.push(BodyConfig {
            mass: 0.01,
            position: vec![-150.0, 0.0],
            velocity: vec![0.0, -2.0],
        });
        // The preset guess state only covers one body
        assert!(cfg.clone().into_scenario().is_err());
        cfg.guess = None;
        let scenario = cfg.into_scenario().unwrap();
        // Positions of every body first, then velocities
        assert_eq!(scenario.initial_state.len(), 8);
        assert_eq!(scenario.initial_state[2], -150.0);
        assert_eq!(scenario.initial_state[7], -2.0);
    }
}
