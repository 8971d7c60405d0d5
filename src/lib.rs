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

/*! # orbit-insertion

Minimum-fuel low-thrust insertion of a body into a circular orbit around a primary, solved by
direct transcription: the continuous optimal control problem is discretized on N intervals of an
explicit RK4 scheme, and handed over as a sparse nonlinear program to a constrained optimizer.

The typical flow is:
1. load a [`io::ScenarioConfig`] (or use one of its presets) and validate it into a [`Scenario`];
2. build the [`md::ProblemInstance`] with [`md::Transcription`];
3. solve it with the [`opti::InteriorPoint`] solver;
4. decode the optimal decision vector into a [`md::Solution`] and export it with [`io::export_csv`].
*/

/// Scalar abstraction for forward-mode automatic differentiation of the constraints.
pub mod dual;

/// Point masses, state layout and orbital plane geometry.
pub mod cosmic;

/// Equations of motion of the bodies orbiting the primary, and the thrust guidance.
pub mod dynamics;

/// Fixed step RK4 integration of the dynamics.
pub mod propagators;

/// The transcription of the insertion problem, its initial guess and the decoding of its solution.
pub mod md;

/// Sparse nonlinear programs and their solver.
pub mod opti;

/// Scenario configurations and solution export.
pub mod io;

mod errors;
/// Functions which may fail return an error, none of them panic on user input.
pub use self::errors::InsertionError;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::linalg::{Cholesky, SVD};
}

/// Re-export some useful things
pub use self::md::{Scenario, Solution};
