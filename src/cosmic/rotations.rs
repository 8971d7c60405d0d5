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

use crate::linalg::{Matrix3, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Defines an elementary (active) rotation, angle must be in radians
#[derive(Clone, Copy, Debug)]
pub enum EulerRotation {
    /// Rotation about the X axis
    R1(f64),
    /// Rotation about the Y axis
    R2(f64),
    /// Rotation about the Z axis
    R3(f64),
}

impl EulerRotation {
    /// Get the rotation matrix of this Euler rotation
    pub fn matrix(&self) -> Matrix3<f64> {
        match *self {
            Self::R1(angle) => {
                let (s, c) = angle.sin_cos();
                Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
            }
            Self::R2(angle) => {
                let (s, c) = angle.sin_cos();
                Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
            }
            Self::R3(angle) => {
                let (s, c) = angle.sin_cos();
                Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
            }
        }
    }
}

/// The plane in which the target orbit must lie, in 3D only.
///
/// The plane is defined by the rotation Q = R1(θx)·R2(θy)·R3(θz): its normal is Qᵀ·ŷ, so that
/// without rotation the target orbit lies in the X-Z plane.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalPlane {
    /// Rotation angles about X, Y and Z, in radians
    pub angles: [f64; 3],
}

impl OrbitalPlane {
    pub fn new(theta_x: f64, theta_y: f64, theta_z: f64) -> Self {
        Self {
            angles: [theta_x, theta_y, theta_z],
        }
    }

    /// Rotation matrix Q of this plane
    pub fn rotation(&self) -> Matrix3<f64> {
        EulerRotation::R1(self.angles[0]).matrix()
            * EulerRotation::R2(self.angles[1]).matrix()
            * EulerRotation::R3(self.angles[2]).matrix()
    }

    /// Unit normal of this plane
    pub fn normal(&self) -> Vector3<f64> {
        self.rotation().transpose() * Vector3::y()
    }
}

impl fmt::Display for OrbitalPlane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.normal();
        write!(
            f,
            "orbital plane (θx = {:.3}, θy = {:.3}, θz = {:.3}) with normal [{:.4}, {:.4}, {:.4}]",
            self.angles[0], self.angles[1], self.angles[2], n[0], n[1], n[2]
        )
    }
}

#[cfg(test)]
mod ut_rotations {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn elementary_rotations() {
        let x = Vector3::x();
        assert_abs_diff_eq!(
            EulerRotation::R3(FRAC_PI_2).matrix() * x,
            Vector3::y(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            EulerRotation::R2(FRAC_PI_2).matrix() * Vector3::z(),
            x,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            EulerRotation::R1(FRAC_PI_2).matrix() * Vector3::y(),
            Vector3::z(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn plane_normal() {
        let flat = OrbitalPlane::new(0.0, 0.0, 0.0);
        assert_abs_diff_eq!(flat.normal(), Vector3::y(), epsilon = 1e-15);

        let tilted = OrbitalPlane::new(0.3, 0.2, -0.2);
        let q = tilted.rotation();
        assert_abs_diff_eq!(q * q.transpose(), Matrix3::identity(), epsilon = 1e-14);
        assert_abs_diff_eq!(tilted.normal().norm(), 1.0, epsilon = 1e-14);
        // The normal is the second row of Q
        assert_abs_diff_eq!(tilted.normal(), q.row(1).transpose(), epsilon = 1e-15);
    }
}
