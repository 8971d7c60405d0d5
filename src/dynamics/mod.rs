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

use crate::dual::Real;
use crate::linalg::DVector;

/// Gravitational N-body dynamics about a fixed primary, with thrust on the actuated body.
///
/// Ensure the state layout of the caller matches [`crate::cosmic::StateLayout`].
pub mod nbody;
pub use self::nbody::*;

/// Thrust direction decomposition of the control vector.
pub mod guidance;

/// A trait for models with equations of motion that can be integrated with a control held
/// constant over the integration step.
///
/// The equations of motion are generic over the scalar type so that the same model provides
/// both the values and, through dual numbers, the partial derivatives needed by the solver.
pub trait Dynamics {
    /// Length of the state vector
    fn state_size(&self) -> usize;

    /// Length of the control vector
    fn control_size(&self) -> usize;

    /// Defines the equations of motion, i.e. returns the time derivative of `state` under `control`.
    ///
    /// No guard is placed on singular configurations (coincident bodies, or a body at the
    /// origin): those yield non-finite derivatives.
    fn eom<T: Real>(&self, state: &DVector<T>, control: &DVector<T>) -> DVector<T>;
}
