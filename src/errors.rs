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

use crate::io::{ConfigError, ExportError};
use crate::md::TranscriptionError;
use crate::opti::SolverError;
use snafu::prelude::*;

/// Any failure of an orbit insertion run. None of them are recoverable: the run aborts.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InsertionError {
    #[snafu(display("scenario configuration failed: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("transcription failed: {source}"))]
    Transcription { source: TranscriptionError },
    #[snafu(display("solver failed: {source}"))]
    Solver { source: SolverError },
    #[snafu(display("export failed: {source}"))]
    Export { source: ExportError },
}

impl From<ConfigError> for InsertionError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<TranscriptionError> for InsertionError {
    fn from(source: TranscriptionError) -> Self {
        Self::Transcription { source }
    }
}

impl From<SolverError> for InsertionError {
    fn from(source: SolverError) -> Self {
        Self::Solver { source }
    }
}

impl From<ExportError> for InsertionError {
    fn from(source: ExportError) -> Self {
        Self::Export { source }
    }
}
