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
use crate::dynamics::Dynamics;
use crate::linalg::DVector;

/// Advances `state` by exactly one step of size `step` with the classical fourth order Runge
/// Kutta scheme, holding `control` constant over the step (zero-order hold).
///
/// k1 = f(x), k2 = f(x + h/2 k1), k3 = f(x + h/2 k2), k4 = f(x + h k3)
/// and the step returns x + h/6 (k1 + 2 k2 + 2 k3 + k4).
pub fn rk4_step<D: Dynamics, T: Real>(
    dynamics: &D,
    state: &DVector<T>,
    control: &DVector<T>,
    step: T,
) -> DVector<T> {
    let half_step = step * T::constant(0.5);
    let two = T::constant(2.0);

    let k1 = dynamics.eom(state, control);
    let k2 = dynamics.eom(&stage(state, half_step, &k1), control);
    let k3 = dynamics.eom(&stage(state, half_step, &k2), control);
    let k4 = dynamics.eom(&stage(state, step, &k3), control);

    let sixth = step / T::constant(6.0);
    DVector::from_fn(state.len(), |i, _| {
        state[i] + sixth * (k1[i] + two * k2[i] + two * k3[i] + k4[i])
    })
}

/// Intermediate stage x + a * k
fn stage<T: Real>(state: &DVector<T>, a: T, k: &DVector<T>) -> DVector<T> {
    state.zip_map(k, |x, ki| x + a * ki)
}
