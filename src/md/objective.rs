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

use crate::cosmic::StateLayout;
use crate::dual::Real;
use crate::linalg::DVector;
use std::fmt;

/// Discretized fuel cost: the rectangle rule Σ h·r_k over the thrust magnitude of every control.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Objective {
    pub step_size: f64,
    pub layout: StateLayout,
}

impl Objective {
    pub fn new(step_size: f64, layout: StateLayout) -> Self {
        Self { step_size, layout }
    }

    /// Evaluates the cost, where `var(i)` returns decision variable `i`.
    pub fn evaluate<T: Real>(&self, var: impl Fn(usize) -> T) -> T {
        let h = T::constant(self.step_size);
        (0..self.layout.nodes).fold(T::zero(), |cost, k| {
            cost + h * var(self.layout.thrust_index(k))
        })
    }

    /// The cost is linear, so its gradient is constant.
    pub fn gradient(&self) -> DVector<f64> {
        let mut grad = DVector::zeros(self.layout.n_vars());
        for k in 0..self.layout.nodes {
            grad[self.layout.thrust_index(k)] = self.step_size;
        }
        grad
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "minimize Σ h·r_k over {} controls (h = {})",
            self.layout.nodes, self.step_size
        )
    }
}

#[cfg(test)]
mod ut_objective {
    use super::*;
    use crate::cosmic::Dimension;
    use crate::dual::{derivative, seed, Dual};

    #[test]
    fn rectangle_rule() {
        let layout = StateLayout::new(Dimension::Planar, 1, 3);
        let objective = Objective::new(0.5, layout);
        let mut z = DVector::from_element(layout.n_vars(), 7.0);
        for k in 0..3 {
            z[layout.thrust_index(k)] = (k + 1) as f64;
        }
        // Only the thrust components contribute
        assert!((objective.evaluate(|i| z[i]) - 3.0).abs() < f64::EPSILON);

        let grad = objective.gradient();
        assert_eq!(grad.iter().filter(|g| **g != 0.0).count(), 3);
        let j = layout.thrust_index(1);
        let dual = objective.evaluate(|i| {
            if i == j {
                seed(z[i])
            } else {
                Dual::constant(z[i])
            }
        });
        assert!((derivative(&dual) - grad[j]).abs() < f64::EPSILON);
    }
}
