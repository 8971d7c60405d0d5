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

/// The fixed massive body at the origin of the coordinate system. It never moves.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primary {
    /// Mass of the primary
    pub mass: f64,
    /// Physical radius of the primary, used for the safety altitude
    pub radius: f64,
}

impl Primary {
    /// Minimum distance from the origin any node of the actuated body may have.
    pub fn safety_radius(&self) -> f64 {
        1.1 * self.radius
    }

    /// Speed of a circular orbit of radius `orbit_radius` around this primary.
    pub fn circular_velocity(&self, grav_const: f64, orbit_radius: f64) -> f64 {
        (grav_const * self.mass / orbit_radius).sqrt()
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "primary (m = {:e}, R = {})", self.mass, self.radius)
    }
}

/// An orbiting point mass. Body 0 of a system is the actuated one, all others are passive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mass: f64,
}

/// Returns the position and velocity built from spherical angles, in the axis convention where
/// the polar angle `theta` is measured from the Y axis and the azimuth `phi` lies in the X-Z plane.
///
/// The output is ordered `[x, y, z, vx, vy, vz]`.
pub fn state_from_angles(
    radius: f64,
    phi: f64,
    theta: f64,
    speed: f64,
    phi_v: f64,
    theta_v: f64,
) -> [f64; 6] {
    [
        radius * phi.cos() * theta.sin(),
        radius * theta.cos(),
        radius * phi.sin() * theta.sin(),
        speed * phi_v.cos() * theta_v.sin(),
        speed * theta_v.cos(),
        speed * phi_v.sin() * theta_v.sin(),
    ]
}
