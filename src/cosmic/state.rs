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
use std::ops::Range;

/// Spatial dimension of the problem.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Motion in a plane, the control is a thrust and one direction angle.
    Planar,
    /// Motion in space, the control is a thrust and two direction angles.
    Spatial,
}

impl Dimension {
    /// Number of coordinates of a position (or velocity) vector.
    pub const fn size(self) -> usize {
        match self {
            Self::Planar => 2,
            Self::Spatial => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}D", self.size())
    }
}

/// Layout of the per-node state and control vectors, and of the flat decision vector made of
/// `nodes + 1` states followed by `nodes` controls.
///
/// A state is ordered as `[pos_0 .. pos_{n-1}, vel_0 .. vel_{n-1}]`, a control as
/// `[thrust, angle_1 .. angle_{D-1}]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    pub dimension: Dimension,
    /// Number of orbiting bodies
    pub n_body: usize,
    /// Number of transcription intervals (N)
    pub nodes: usize,
}

impl StateLayout {
    pub fn new(dimension: Dimension, n_body: usize, nodes: usize) -> Self {
        Self {
            dimension,
            n_body,
            nodes,
        }
    }

    /// Spatial dimension D
    pub fn dim(&self) -> usize {
        self.dimension.size()
    }

    /// Length of one state vector, 2·D·n_body
    pub fn state_size(&self) -> usize {
        2 * self.dim() * self.n_body
    }

    /// Length of one control vector, D
    pub fn control_size(&self) -> usize {
        self.dim()
    }

    /// Number of direction angles in a control vector
    pub fn angle_count(&self) -> usize {
        self.dim() - 1
    }

    /// Offset of the first control in the decision vector
    pub fn control_offset(&self) -> usize {
        (self.nodes + 1) * self.state_size()
    }

    /// Total length of the decision vector
    pub fn n_vars(&self) -> usize {
        self.control_offset() + self.nodes * self.control_size()
    }

    /// Offset of the position of `body` inside one state vector
    pub fn position_offset(&self, body: usize) -> usize {
        body * self.dim()
    }

    /// Offset of the velocity of `body` inside one state vector
    pub fn velocity_offset(&self, body: usize) -> usize {
        (self.n_body + body) * self.dim()
    }

    /// Range of state node `node` in the decision vector
    pub fn state_range(&self, node: usize) -> Range<usize> {
        let start = node * self.state_size();
        start..start + self.state_size()
    }

    /// Range of the position of `body` at state node `node` in the decision vector
    pub fn position_range(&self, node: usize, body: usize) -> Range<usize> {
        let start = node * self.state_size() + self.position_offset(body);
        start..start + self.dim()
    }

    /// Range of the velocity of `body` at state node `node` in the decision vector
    pub fn velocity_range(&self, node: usize, body: usize) -> Range<usize> {
        let start = node * self.state_size() + self.velocity_offset(body);
        start..start + self.dim()
    }

    /// Range of control `interval` in the decision vector
    pub fn control_range(&self, interval: usize) -> Range<usize> {
        let start = self.control_offset() + interval * self.control_size();
        start..start + self.control_size()
    }

    /// Index of the thrust magnitude of control `interval` in the decision vector
    pub fn thrust_index(&self, interval: usize) -> usize {
        self.control_offset() + interval * self.control_size()
    }

    /// Index of direction angle `angle` (zero based) of control `interval` in the decision vector
    pub fn angle_index(&self, interval: usize, angle: usize) -> usize {
        self.thrust_index(interval) + 1 + angle
    }
}

impl fmt::Display for StateLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} layout with {} orbiting bodies, {} intervals ({} states of {}, {} controls of {})",
            self.dimension,
            self.n_body,
            self.nodes,
            self.nodes + 1,
            self.state_size(),
            self.nodes,
            self.control_size()
        )
    }
}
