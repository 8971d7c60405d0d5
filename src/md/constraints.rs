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

use super::TranscriptionError;
use crate::cosmic::StateLayout;
use std::fmt;

/// The kind of a block of constraint rows of the transcription.
///
/// Blocks are fine grained so that each one only depends on a handful of decision variables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// State node 0 minus the fixed initial state
    InitialCondition,
    /// State node k+1 minus the RK4 step of node k under control k
    Dynamics { interval: usize },
    /// Distance of the actuated body from the origin at a node
    Safety { node: usize },
    /// Thrust magnitude of a control
    Thrust { interval: usize },
    /// Change of thrust between control k and k+1
    ThrustSlew { interval: usize },
    /// Change of one direction angle between control k and k+1
    AngleSlew { angle: usize, interval: usize },
    /// Terminal speed minus the circular orbit speed
    TerminalSpeed,
    /// Terminal velocity dotted with the terminal position
    TerminalRadialVelocity,
    /// Terminal velocity dotted with the orbital plane normal
    TerminalVelocityInPlane,
    /// Terminal position dotted with the orbital plane normal
    TerminalPositionInPlane,
    /// Terminal distance from the origin minus the target radius
    TerminalRadius,
}

impl ConstraintKind {
    /// Number of rows of this block
    pub fn rows(&self, layout: &StateLayout) -> usize {
        match self {
            Self::InitialCondition | Self::Dynamics { .. } => layout.state_size(),
            _ => 1,
        }
    }

    /// Sorted indices of the decision variables the rows of this block depend on
    pub fn dependencies(&self, layout: &StateLayout) -> Vec<usize> {
        match *self {
            Self::InitialCondition => layout.state_range(0).collect(),
            Self::Dynamics { interval } => layout
                .state_range(interval)
                .chain(layout.state_range(interval + 1))
                .chain(layout.control_range(interval))
                .collect(),
            Self::Safety { node } => layout.position_range(node, 0).collect(),
            Self::Thrust { interval } => vec![layout.thrust_index(interval)],
            Self::ThrustSlew { interval } => vec![
                layout.thrust_index(interval),
                layout.thrust_index(interval + 1),
            ],
            Self::AngleSlew { angle, interval } => vec![
                layout.angle_index(interval, angle),
                layout.angle_index(interval + 1, angle),
            ],
            Self::TerminalSpeed
            | Self::TerminalRadialVelocity
            | Self::TerminalVelocityInPlane
            | Self::TerminalPositionInPlane
            | Self::TerminalRadius => layout
                .position_range(layout.nodes, 0)
                .chain(layout.velocity_range(layout.nodes, 0))
                .collect(),
        }
    }

    /// Whether the rows of this block are affine in the decision variables
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            Self::InitialCondition
                | Self::Thrust { .. }
                | Self::ThrustSlew { .. }
                | Self::AngleSlew { .. }
                | Self::TerminalVelocityInPlane
                | Self::TerminalPositionInPlane
        )
    }

    /// Whether this block is a terminal orbit insertion condition
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TerminalSpeed
                | Self::TerminalRadialVelocity
                | Self::TerminalVelocityInPlane
                | Self::TerminalPositionInPlane
                | Self::TerminalRadius
        )
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InitialCondition => write!(f, "initial condition"),
            Self::Dynamics { interval } => write!(f, "dynamics of interval #{interval}"),
            Self::Safety { node } => write!(f, "safety altitude at node #{node}"),
            Self::Thrust { interval } => write!(f, "thrust of control #{interval}"),
            Self::ThrustSlew { interval } => write!(f, "thrust slew after control #{interval}"),
            Self::AngleSlew { angle, interval } => {
                write!(f, "angle #{angle} slew after control #{interval}")
            }
            Self::TerminalSpeed => write!(f, "terminal speed"),
            Self::TerminalRadialVelocity => write!(f, "terminal radial velocity"),
            Self::TerminalVelocityInPlane => write!(f, "terminal velocity in orbital plane"),
            Self::TerminalPositionInPlane => write!(f, "terminal position in orbital plane"),
            Self::TerminalRadius => write!(f, "terminal radius"),
        }
    }
}

/// A block of constraint rows together with their bounds.
///
/// The bounds can only be set when the block is created, and creation fails unless there is
/// exactly one pair of bounds per row: rows and bounds cannot get out of step.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintGroup {
    kind: ConstraintKind,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ConstraintGroup {
    pub fn new(
        kind: ConstraintKind,
        lower: Vec<f64>,
        upper: Vec<f64>,
        layout: &StateLayout,
    ) -> Result<Self, TranscriptionError> {
        let rows = kind.rows(layout);
        if lower.len() != rows || upper.len() != rows {
            return Err(TranscriptionError::BoundMismatch {
                kind,
                rows,
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        if let Some(row) = lower.iter().zip(&upper).position(|(lb, ub)| lb > ub) {
            return Err(TranscriptionError::EmptyBounds { kind, row });
        }
        Ok(Self { kind, lower, upper })
    }

    /// Rows which must all be zero
    pub fn equality(
        kind: ConstraintKind,
        layout: &StateLayout,
    ) -> Result<Self, TranscriptionError> {
        let rows = kind.rows(layout);
        Self::new(kind, vec![0.0; rows], vec![0.0; rows], layout)
    }

    /// Rows which must all lie within `[lower, upper]`
    pub fn within(
        kind: ConstraintKind,
        lower: f64,
        upper: f64,
        layout: &StateLayout,
    ) -> Result<Self, TranscriptionError> {
        let rows = kind.rows(layout);
        Self::new(kind, vec![lower; rows], vec![upper; rows], layout)
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn rows(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn is_equality(&self) -> bool {
        self.lower.iter().zip(&self.upper).all(|(lb, ub)| lb == ub)
    }
}
