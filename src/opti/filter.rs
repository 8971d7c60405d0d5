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

/// Required relative decrease of the violation
pub(crate) const GAMMA_THETA: f64 = 1e-5;
/// Required decrease of the barrier objective, relative to the violation
pub(crate) const GAMMA_PHI: f64 = 1e-8;
/// Armijo factor of the steps which target the barrier objective
pub(crate) const ETA_PHI: f64 = 1e-8;
const SWITCH_DELTA: f64 = 1.0;
const SWITCH_S_THETA: f64 = 1.1;
const SWITCH_S_PHI: f64 = 2.3;
/// Below this violation, descent steps of the barrier objective are Armijo steps
pub(crate) const THETA_MIN: f64 = 1e-4;

/// Outcome of the test of a trial point
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Acceptance {
    Rejected,
    /// Sufficient decrease of the barrier objective, the filter is left unchanged
    Armijo,
    /// Sufficient decrease of the violation or of the objective, the filter must be augmented
    Filter,
}

/// Filter of the line search: the pairs (violation, barrier objective) which trial points must
/// improve upon.
#[derive(Clone, Debug)]
pub(crate) struct Filter {
    entries: Vec<(f64, f64)>,
    max_violation: f64,
}

impl Filter {
    pub fn new(max_violation: f64) -> Self {
        Self {
            entries: Vec::new(),
            max_violation,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn admits(&self, theta: f64, phi: f64) -> bool {
        theta.is_finite()
            && phi.is_finite()
            && theta <= self.max_violation
            && self
                .entries
                .iter()
                .all(|(t, p)| theta < *t || phi < *p)
    }

    /// Adds the margins around the current point (violation `theta`, barrier objective `phi`).
    pub fn augment(&mut self, theta: f64, phi: f64) {
        self.entries
            .push(((1.0 - GAMMA_THETA) * theta, phi - GAMMA_PHI * theta));
    }

    /// Whether the search direction is a descent direction of the barrier objective that dominates
    /// the violation `theta`, for a step of length `alpha` and directional derivative `slope`.
    fn switching(theta: f64, slope: f64, alpha: f64) -> bool {
        slope < 0.0
            && alpha * (-slope).powf(SWITCH_S_PHI) > SWITCH_DELTA * theta.powf(SWITCH_S_THETA)
    }

    /// Smallest step length worth trying before the line search gives up.
    pub fn min_step(theta: f64, slope: f64) -> f64 {
        let alpha = if slope < 0.0 {
            let mut alpha = GAMMA_THETA.min(GAMMA_PHI * theta / -slope);
            if theta <= THETA_MIN {
                alpha = alpha.min(
                    SWITCH_DELTA * theta.powf(SWITCH_S_THETA) / (-slope).powf(SWITCH_S_PHI),
                );
            }
            alpha
        } else {
            GAMMA_THETA
        };
        0.05 * alpha
    }

    /// Tests the trial point (`theta_t`, `phi_t`) reached with step `alpha` from the current
    /// point (`theta`, `phi`) along a direction of slope `slope`.
    pub fn accept(
        &self,
        (theta, phi): (f64, f64),
        (theta_t, phi_t): (f64, f64),
        slope: f64,
        alpha: f64,
    ) -> Acceptance {
        if !self.admits(theta_t, phi_t) {
            Acceptance::Rejected
        } else if theta <= THETA_MIN && Self::switching(theta, slope, alpha) {
            if phi_t <= phi + ETA_PHI * alpha * slope {
                Acceptance::Armijo
            } else {
                Acceptance::Rejected
            }
        } else if theta_t <= (1.0 - GAMMA_THETA) * theta || phi_t <= phi - GAMMA_PHI * theta {
            Acceptance::Filter
        } else {
            Acceptance::Rejected
        }
    }
}
