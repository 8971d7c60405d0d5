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

//! Scalar abstraction shared by the dynamics, the integrator and the constraint expressions.
//!
//! Every expression of the transcription is written once, generically over [`Real`], and is
//! evaluated either with plain `f64` (constraint values) or with [`Dual`] numbers (partial
//! derivatives by forward-mode automatic differentiation).

use crate::linalg::{Scalar, U2};
use hyperdual::{Float, OHyperdual};

/// Dual number carrying one directional derivative.
pub type Dual = OHyperdual<f64, U2>;

/// A floating point scalar which can flow through the equations of motion.
pub trait Real: Float + Scalar {
    /// Lifts a constant into this scalar type (zero derivative).
    fn constant(value: f64) -> Self;

    /// The real (non-derivative) part of this scalar.
    fn value(&self) -> f64;
}

impl Real for f64 {
    fn constant(value: f64) -> Self {
        value
    }

    fn value(&self) -> f64 {
        *self
    }
}

impl Real for Dual {
    fn constant(value: f64) -> Self {
        Dual::from_real(value)
    }

    fn value(&self) -> f64 {
        self.real()
    }
}

/// Returns a dual number whose derivative part is set to one, i.e. the variable we differentiate with respect to.
pub fn seed(value: f64) -> Dual {
    Dual::from_slice(&[value, 1.0])
}

/// Returns the derivative part of a dual number.
pub fn derivative(x: &Dual) -> f64 {
    x[1]
}

/// Euclidean norm of a slice of scalars.
pub fn norm<T: Real>(v: &[T]) -> T {
    dot(v, v).sqrt()
}

/// Dot product of two slices of equal length.
pub fn dot<T: Real>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (ai, bi)| acc + *ai * *bi)
}

#[cfg(test)]
mod ut_dual {
    use super::*;

    #[test]
    fn norm_derivative() {
        // d/dx sqrt(x^2 + 4^2) at x = 3 is 3/5
        let v = [seed(3.0), Dual::constant(4.0)];
        let n = norm(&v);
        assert!((n.value() - 5.0).abs() < 1e-14);
        assert!((derivative(&n) - 0.6).abs() < 1e-14);
    }

    #[test]
    fn plain_f64() {
        let v = [1.0, 2.0, 2.0];
        assert!((norm(&v) - 3.0).abs() < f64::EPSILON);
        assert!((dot(&v, &[1.0, 0.0, -1.0]) + 1.0).abs() < f64::EPSILON);
    }
}
