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

use super::guidance::thrust_acceleration;
use super::Dynamics;
use crate::cosmic::{Body, Dimension, Primary, StateLayout};
use crate::dual::{norm, Real};
use crate::linalg::DVector;
use std::fmt;

/// `NBodyDynamics` provides the equations of motion of point masses orbiting a fixed primary.
///
/// Each orbiting body is attracted by the primary and by every other orbiting body (Newton's law
/// of gravitation). Body 0 is the actuated body: its control vector adds a thrust acceleration of
/// magnitude `thrust / mass` along the direction given by the control angles.
#[derive(Clone, Debug, PartialEq)]
pub struct NBodyDynamics {
    pub dimension: Dimension,
    pub grav_const: f64,
    pub primary: Primary,
    pub bodies: Vec<Body>,
}

impl NBodyDynamics {
    pub fn new(dimension: Dimension, grav_const: f64, primary: Primary, bodies: Vec<Body>) -> Self {
        Self {
            dimension,
            grav_const,
            primary,
            bodies,
        }
    }

    /// Layout of the state and control vectors of this model, for `nodes` transcription intervals.
    pub fn layout(&self, nodes: usize) -> StateLayout {
        StateLayout::new(self.dimension, self.bodies.len(), nodes)
    }

    /// Gravitational acceleration of body `i` due to the primary and every other orbiting body.
    pub fn gravity<T: Real>(&self, state: &[T], i: usize) -> Vec<T> {
        let d = self.dimension.size();
        let pos_i = &state[i * d..(i + 1) * d];
        let mut accel = vec![T::zero(); d];

        // Pull of the other orbiting bodies
        for (j, body_j) in self.bodies.iter().enumerate() {
            if i == j {
                continue;
            }
            let pos_j = &state[j * d..(j + 1) * d];
            let diff: Vec<T> = pos_j.iter().zip(pos_i).map(|(pj, pi)| *pj - *pi).collect();
            let coeff = T::constant(self.grav_const * body_j.mass) / norm(&diff).powi(3);
            for (a, r) in accel.iter_mut().zip(&diff) {
                *a = *a + coeff * *r;
            }
        }

        // Pull of the primary, at the origin
        let coeff = T::constant(-self.grav_const * self.primary.mass) / norm(pos_i).powi(3);
        for (a, r) in accel.iter_mut().zip(pos_i) {
            *a = *a + coeff * *r;
        }

        accel
    }
}

impl Dynamics for NBodyDynamics {
    fn state_size(&self) -> usize {
        2 * self.dimension.size() * self.bodies.len()
    }

    fn control_size(&self) -> usize {
        self.dimension.size()
    }

    fn eom<T: Real>(&self, state: &DVector<T>, control: &DVector<T>) -> DVector<T> {
        let d = self.dimension.size();
        let n = self.bodies.len();
        let vel_offset = n * d;
        let x = state.as_slice();

        let mut d_x = DVector::from_element(x.len(), T::zero());
        for i in 0..n {
            let mut accel = self.gravity(x, i);

            if i == 0 {
                let thrust =
                    thrust_acceleration(self.dimension, control.as_slice(), self.bodies[0].mass);
                for (a, t) in accel.iter_mut().zip(thrust.iter()) {
                    *a = *a + *t;
                }
            }

            for c in 0..d {
                d_x[i * d + c] = x[vel_offset + i * d + c];
                d_x[vel_offset + i * d + c] = accel[c];
            }
        }

        d_x
    }
}

impl fmt::Display for NBodyDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} N-body dynamics (G = {}) about {} with {} orbiting bodies",
            self.dimension,
            self.grav_const,
            self.primary,
            self.bodies.len()
        )
    }
}
