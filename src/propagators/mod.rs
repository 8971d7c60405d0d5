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

use snafu::prelude::*;

/// The classical fixed step fourth order Runge Kutta scheme.
mod rk4;
pub use self::rk4::*;

mod propagator;
pub use self::propagator::*;

#[derive(Debug, PartialEq, Snafu)]
pub enum PropagationError {
    #[snafu(display(
        "state became non-finite at step #{step}, the dynamics likely hit a singular configuration"
    ))]
    NonFiniteState { step: usize },
    #[snafu(display("expected a state of length {expected} but got {got}"))]
    StateSize { expected: usize, got: usize },
    #[snafu(display("expected a control of length {expected} but got {got}"))]
    ControlSize { expected: usize, got: usize },
}
