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

use crate::cosmic::Dimension;
use crate::dual::Real;

/// Converts the in-plane angle `phi` to the planar unit vector `[cos φ, sin φ]`.
pub fn unit_vector_from_plane_angle<T: Real>(phi: T) -> [T; 2] {
    [phi.cos(), phi.sin()]
}

/// Converts the spherical angles to the unit vector `[sin φ cos θ, sin φ sin θ, cos φ]`,
/// where `phi` is the polar angle from the Z axis and `theta` the azimuth in the X-Y plane.
pub fn unit_vector_from_spherical_angles<T: Real>(phi: T, theta: T) -> [T; 3] {
    [phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()]
}

/// Returns the thrust acceleration of a body of mass `mass` given its control vector
/// `[thrust, angles..]`. Only the first `dimension.size()` entries of the output are meaningful.
pub fn thrust_acceleration<T: Real>(dimension: Dimension, control: &[T], mass: f64) -> [T; 3] {
    let accel = control[0] / T::constant(mass);
    match dimension {
        Dimension::Planar => {
            let [ux, uy] = unit_vector_from_plane_angle(control[1]);
            [accel * ux, accel * uy, T::zero()]
        }
        Dimension::Spatial => {
            let [ux, uy, uz] = unit_vector_from_spherical_angles(control[1], control[2]);
            [accel * ux, accel * uy, accel * uz]
        }
    }
}

#[cfg(test)]
mod ut_guidance {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn planar_direction() {
        let acc = thrust_acceleration(Dimension::Planar, &[0.5, FRAC_PI_2], 0.25);
        assert!(acc[0].abs() < 1e-15);
        assert!((acc[1] - 2.0).abs() < 1e-15);
        assert_eq!(acc[2], 0.0);
    }

    #[test]
    fn spatial_direction() {
        // Polar angle of zero thrusts along +Z regardless of azimuth
        let acc = thrust_acceleration(Dimension::Spatial, &[1.0, 0.0, 1.234], 1.0);
        assert!(acc[0].abs() < 1e-15);
        assert!(acc[1].abs() < 1e-15);
        assert!((acc[2] - 1.0).abs() < 1e-15);

        let [ux, uy, uz] = unit_vector_from_spherical_angles(0.7, -2.1);
        assert!((ux * ux + uy * uy + uz * uz - 1.0).abs() < 1e-14);

        // Polar angle of π/2 and azimuth of π thrusts along -X
        let [ux, uy, uz] = unit_vector_from_spherical_angles(FRAC_PI_2, PI);
        assert!((ux + 1.0).abs() < 1e-15);
        assert!(uy.abs() < 1e-15);
        assert!(uz.abs() < 1e-15);
    }
}
