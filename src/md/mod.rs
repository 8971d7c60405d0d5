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

use crate::propagators::PropagationError;
use snafu::prelude::*;

/// The validated run configuration.
mod scenario;
pub use self::scenario::Scenario;

/// Blocks of constraint rows, created together with their bounds.
pub mod constraints;
pub use self::constraints::{ConstraintGroup, ConstraintKind};

pub mod objective;
pub use self::objective::Objective;

/// Direct transcription of the orbit insertion into a nonlinear program.
mod transcription;
pub use self::transcription::{ProblemInstance, Transcription};

mod guess;
pub use self::guess::InitialGuess;

/// Decoding of the solver output and terminal simulation.
mod solution;
pub use self::solution::Solution;

#[derive(Debug, PartialEq, Snafu)]
pub enum TranscriptionError {
    #[snafu(display("{kind} has {rows} rows but {lower} lower and {upper} upper bounds"))]
    BoundMismatch {
        kind: ConstraintKind,
        rows: usize,
        lower: usize,
        upper: usize,
    },
    #[snafu(display("row #{row} of {kind} has a lower bound above its upper bound"))]
    EmptyBounds { kind: ConstraintKind, row: usize },
    #[snafu(display("problem has {rows} rows but {lower} lower and {upper} upper bounds"))]
    RowMismatch {
        rows: usize,
        lower: usize,
        upper: usize,
    },
    #[snafu(display("decision vector should have {expected} entries but has {got}"))]
    DecisionVectorSize { expected: usize, got: usize },
    #[snafu(display("{action} encountered {source}"))]
    TranscriptionPropagation {
        action: &'static str,
        source: PropagationError,
    },
}
