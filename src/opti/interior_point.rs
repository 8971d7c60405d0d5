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

use super::filter::{Acceptance, Filter};
use super::kkt::CondensedMatrix;
use super::{
    bound_violation, LocallyInfeasibleSnafu, NlpSolution, NlpSolver, NonFiniteIterateSnafu,
    NonlinearProgram, ProblemSizeSnafu, SingularStepSnafu, SolverError, SolverOptions,
};
use crate::linalg::DVector;
use snafu::prelude::*;
use std::fmt;
use std::time::Instant;

/// Relative distance by which the initial slacks and variables are pushed inside their bounds
const BOUND_PUSH: f64 = 1e-2;
/// Relative relaxation of variables fixed by equal bounds
const FIXED_RELAX: f64 = 1e-8;
const KAPPA_EPSILON: f64 = 10.0;
const KAPPA_MU: f64 = 0.2;
const THETA_MU: f64 = 1.5;
/// Bound multipliers stay within this factor of their central value μ / gap
const KAPPA_SIGMA: f64 = 1e10;
/// Optimality measures are scaled down once the average multiplier exceeds this value
const S_MAX: f64 = 100.0;
const MAX_SHIFT: f64 = 1e40;
const MAX_BACKTRACKS: usize = 60;
/// The elastic penalty is only raised once the barrier parameter is below this value
const PENALTY_BARRIER: f64 = 1e-6;
/// Barrier parameter from which the solver restarts after raising the penalty
const RESTART_BARRIER: f64 = 1e-4;
/// The elastic variables hold the violation once it exceeds the row residuals by this factor
const ELASTIC_SHARE: f64 = 10.0;
/// A raised penalty must bring the violation below this fraction of its previous value
const STALL_RATIO: f64 = 0.99;

/// Primal-dual interior point solver with elastic constraint rows and a filter line search.
///
/// Row i reads `cᵢ(x) - sᵢ - pᵢ + nᵢ = 0`. The slack sᵢ lies strictly within the row bounds (it is
/// fixed on equality rows) and the elastic variables pᵢ, nᵢ are positive and penalized by ρ in the
/// objective, so every iterate is a feasible point of the relaxed problem. Variable bounds are
/// handled by logarithmic barriers and are never crossed.
///
/// Newton steps eliminate every row to a symmetric system in the decision variables only, with the
/// Hessian of the Lagrangian and the rows weighted by their barrier terms. It is factorized by a
/// sparse Cholesky decomposition in the order given by [`NonlinearProgram::variable_order`], and
/// shifted along its diagonal until it is positive definite.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteriorPoint {
    pub options: SolverOptions,
}

impl InteriorPoint {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl fmt::Display for InteriorPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "interior point solver ({})", self.options)
    }
}

/// Primal-dual iterate, also used for the search directions.
#[derive(Clone, Debug)]
struct Iterate {
    x: DVector<f64>,
    s: DVector<f64>,
    p: DVector<f64>,
    n: DVector<f64>,
    /// Multipliers of the rows
    y: DVector<f64>,
    zp: DVector<f64>,
    zn: DVector<f64>,
    /// Multipliers of the row bounds
    zl: DVector<f64>,
    zu: DVector<f64>,
    /// Multipliers of the variable bounds
    vl: DVector<f64>,
    vu: DVector<f64>,
}

impl Iterate {
    fn zeros(n: usize, m: usize) -> Self {
        Self {
            x: DVector::zeros(n),
            s: DVector::zeros(m),
            p: DVector::zeros(m),
            n: DVector::zeros(m),
            y: DVector::zeros(m),
            zp: DVector::zeros(m),
            zn: DVector::zeros(m),
            zl: DVector::zeros(m),
            zu: DVector::zeros(m),
            vl: DVector::zeros(n),
            vu: DVector::zeros(n),
        }
    }

    /// Moves the primal variables along `dir`.
    fn primal_step(&self, dir: &Iterate, alpha: f64) -> Self {
        let mut next = self.clone();
        next.x += alpha * &dir.x;
        next.s += alpha * &dir.s;
        next.p += alpha * &dir.p;
        next.n += alpha * &dir.n;
        next
    }
}

/// Which sides of a bound are finite
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Sides {
    lower: bool,
    upper: bool,
}

impl Sides {
    fn of(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.is_finite(),
            upper: upper.is_finite(),
        }
    }

    fn any(&self) -> bool {
        self.lower || self.upper
    }
}

/// Kind of a constraint row
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Row {
    Equality,
    Inequality(Sides),
    /// Unbounded on both sides, hence ignored
    Free,
}

/// Moves `value` inside the finite bounds among `lower` and `upper`.
fn push_inside(value: f64, lower: f64, upper: f64) -> f64 {
    let mut push_l = BOUND_PUSH * lower.abs().max(1.0);
    let mut push_u = BOUND_PUSH * upper.abs().max(1.0);
    if lower.is_finite() && upper.is_finite() {
        push_l = push_l.min(BOUND_PUSH * (upper - lower));
        push_u = push_u.min(BOUND_PUSH * (upper - lower));
    }
    let mut value = value;
    if lower.is_finite() {
        value = value.max(lower + push_l);
    }
    if upper.is_finite() {
        value = value.min(upper - push_u);
    }
    value
}

/// Shrinks `alpha` so that `value + alpha · delta` keeps a fraction `tau` of `value`.
fn to_boundary(alpha: &mut f64, value: f64, delta: f64, tau: f64) {
    if delta < 0.0 {
        *alpha = alpha.min(-tau * value / delta);
    }
}

/// Adds `alpha · delta` to the bound multiplier `z`, kept within a factor of its central value.
fn safeguarded(z: f64, delta: f64, alpha: f64, mu: f64, gap: f64) -> f64 {
    let central = mu / gap;
    (z + alpha * delta)
        .min(KAPPA_SIGMA * central)
        .max(central / KAPPA_SIGMA)
}

/// The bounds of a problem and the current elastic penalty
struct Barrier<'a> {
    lb: &'a DVector<f64>,
    ub: &'a DVector<f64>,
    rows: Vec<Row>,
    xl: DVector<f64>,
    xu: DVector<f64>,
    vars: Vec<Sides>,
    /// Variable bounds as given by the problem
    given_xl: DVector<f64>,
    given_xu: DVector<f64>,
    rho: f64,
}

impl<'a> Barrier<'a> {
    fn new(
        lb: &'a DVector<f64>,
        ub: &'a DVector<f64>,
        given_xl: DVector<f64>,
        given_xu: DVector<f64>,
        rho: f64,
    ) -> Self {
        let rows = lb
            .iter()
            .zip(ub.iter())
            .map(|(l, u)| {
                let sides = Sides::of(*l, *u);
                if l == u {
                    Row::Equality
                } else if sides.any() {
                    Row::Inequality(sides)
                } else {
                    Row::Free
                }
            })
            .collect();
        let mut xl = given_xl.clone();
        let mut xu = given_xu.clone();
        for k in 0..xl.len() {
            if xl[k] == xu[k] {
                let relax = FIXED_RELAX * xl[k].abs().max(1.0);
                xl[k] -= relax;
                xu[k] += relax;
            }
        }
        let vars = xl
            .iter()
            .zip(xu.iter())
            .map(|(l, u)| Sides::of(*l, *u))
            .collect();
        Self {
            lb,
            ub,
            rows,
            xl,
            xu,
            vars,
            given_xl,
            given_xu,
            rho,
        }
    }

    /// First iterate: the variables and slacks are pushed inside their bounds, then the elastic
    /// variables absorb the remaining residuals.
    fn initial(&self, x0: &DVector<f64>, c: &DVector<f64>, mu: f64) -> Iterate {
        let n = x0.len();
        let m = c.len();
        let mut it = Iterate::zeros(n, m);
        for k in 0..n {
            it.x[k] = push_inside(x0[k], self.xl[k], self.xu[k]);
            if self.vars[k].lower {
                it.vl[k] = 1.0;
            }
            if self.vars[k].upper {
                it.vu[k] = 1.0;
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            match row {
                Row::Equality => it.s[i] = self.lb[i],
                Row::Inequality(sides) => {
                    it.s[i] = push_inside(c[i], self.lb[i], self.ub[i]);
                    if sides.lower {
                        it.zl[i] = 1.0;
                    }
                    if sides.upper {
                        it.zu[i] = 1.0;
                    }
                }
                Row::Free => {
                    it.s[i] = c[i];
                    it.p[i] = 1.0;
                    it.n[i] = 1.0;
                }
            }
        }
        self.reset_elastic(&mut it, c, mu);
        for (i, row) in self.rows.iter().enumerate() {
            if *row != Row::Free {
                it.y[i] = self.rho - it.zp[i];
            }
        }
        it
    }

    /// Sets the elastic variables of every row to cancel its residual, with their multipliers
    /// centered on the barrier parameter `mu`. The row multipliers are left untouched.
    fn reset_elastic(&self, it: &mut Iterate, c: &DVector<f64>, mu: f64) {
        let rho = self.rho;
        for (i, row) in self.rows.iter().enumerate() {
            if *row == Row::Free {
                continue;
            }
            let r = c[i] - it.s[i];
            let q = (rho * rho * r * r + mu * mu).sqrt();
            let (p, n) = if r > 0.0 {
                let p = (mu + rho * r + q) / (2.0 * rho);
                let n = mu * mu / (2.0 * rho * rho * p);
                (r + n, n)
            } else if r < 0.0 {
                let n = (mu - rho * r + q) / (2.0 * rho);
                let p = mu * mu / (2.0 * rho * rho * n);
                (p, p - r)
            } else {
                (mu / rho, mu / rho)
            };
            it.p[i] = p;
            it.n[i] = n;
            it.zp[i] = mu / p;
            it.zn[i] = mu / n;
        }
    }

    /// Residuals `c - s - p + n` of the rows
    fn residual(&self, c: &DVector<f64>, it: &Iterate) -> DVector<f64> {
        DVector::from_fn(c.len(), |i, _| {
            if self.rows[i] == Row::Free {
                0.0
            } else {
                c[i] - it.s[i] - it.p[i] + it.n[i]
            }
        })
    }

    /// Violation measure of the line search
    fn theta(&self, c: &DVector<f64>, it: &Iterate) -> f64 {
        self.residual(c, it).lp_norm(1)
    }

    /// Penalized barrier objective, infinite outside of the bounds
    fn phi(&self, f: f64, it: &Iterate, mu: f64) -> f64 {
        let mut phi = f;
        for (i, row) in self.rows.iter().enumerate() {
            if *row == Row::Free {
                continue;
            }
            if it.p[i] <= 0.0 || it.n[i] <= 0.0 {
                return f64::INFINITY;
            }
            phi += self.rho * (it.p[i] + it.n[i]) - mu * (it.p[i].ln() + it.n[i].ln());
            if let Row::Inequality(sides) = row {
                if sides.lower {
                    phi -= mu * log_gap(it.s[i] - self.lb[i]);
                }
                if sides.upper {
                    phi -= mu * log_gap(self.ub[i] - it.s[i]);
                }
            }
        }
        for (k, sides) in self.vars.iter().enumerate() {
            if sides.lower {
                phi -= mu * log_gap(it.x[k] - self.xl[k]);
            }
            if sides.upper {
                phi -= mu * log_gap(self.xu[k] - it.x[k]);
            }
        }
        // NaN if a gap closed
        if phi.is_nan() {
            f64::INFINITY
        } else {
            phi
        }
    }

    /// Scaling factors of the dual infeasibility and of the complementarity
    fn scaling(&self, it: &Iterate) -> (f64, f64) {
        let mut sum_y = 0.0;
        let mut sum_z = 0.0;
        let mut rows = 0;
        let mut count_z = 0;
        for (i, row) in self.rows.iter().enumerate() {
            if *row == Row::Free {
                continue;
            }
            rows += 1;
            sum_y += it.y[i].abs();
            sum_z += it.zp[i] + it.zn[i];
            count_z += 2;
            if let Row::Inequality(sides) = row {
                if sides.lower {
                    sum_z += it.zl[i];
                    count_z += 1;
                }
                if sides.upper {
                    sum_z += it.zu[i];
                    count_z += 1;
                }
            }
        }
        for (k, sides) in self.vars.iter().enumerate() {
            if sides.lower {
                sum_z += it.vl[k];
                count_z += 1;
            }
            if sides.upper {
                sum_z += it.vu[k];
                count_z += 1;
            }
        }
        let s_d = (sum_y + sum_z) / (rows + count_z).max(1) as f64;
        let s_c = sum_z / count_z.max(1) as f64;
        (s_d.max(S_MAX) / S_MAX, s_c.max(S_MAX) / S_MAX)
    }

    /// Infinity norm of the gradients of the Lagrangian, `rd` being its gradient in x
    fn dual_infeasibility(&self, it: &Iterate, rd: &DVector<f64>) -> f64 {
        let mut err = rd.amax();
        for (i, row) in self.rows.iter().enumerate() {
            if *row == Row::Free {
                continue;
            }
            err = err
                .max((self.rho - it.y[i] - it.zp[i]).abs())
                .max((self.rho + it.y[i] - it.zn[i]).abs());
            if let Row::Inequality(_) = row {
                err = err.max((it.y[i] + it.zl[i] - it.zu[i]).abs());
            }
        }
        err
    }

    /// Largest deviation of the complementarity products from `mu`
    fn complementarity(&self, it: &Iterate, mu: f64) -> f64 {
        let mut err: f64 = 0.0;
        for (i, row) in self.rows.iter().enumerate() {
            if *row == Row::Free {
                continue;
            }
            err = err
                .max((it.p[i] * it.zp[i] - mu).abs())
                .max((it.n[i] * it.zn[i] - mu).abs());
            if let Row::Inequality(sides) = row {
                if sides.lower {
                    err = err.max(((it.s[i] - self.lb[i]) * it.zl[i] - mu).abs());
                }
                if sides.upper {
                    err = err.max(((self.ub[i] - it.s[i]) * it.zu[i] - mu).abs());
                }
            }
        }
        for (k, sides) in self.vars.iter().enumerate() {
            if sides.lower {
                err = err.max(((it.x[k] - self.xl[k]) * it.vl[k] - mu).abs());
            }
            if sides.upper {
                err = err.max(((self.xu[k] - it.x[k]) * it.vu[k] - mu).abs());
            }
        }
        err
    }

    /// Largest distance of the rows and of the variables to their bounds
    fn violation(&self, c: &DVector<f64>, x: &DVector<f64>) -> f64 {
        bound_violation(c, self.lb, self.ub).max(bound_violation(
            x,
            &self.given_xl,
            &self.given_xu,
        ))
    }
}

fn log_gap(gap: f64) -> f64 {
    if gap > 0.0 {
        gap.ln()
    } else {
        f64::NAN
    }
}

impl NlpSolver for InteriorPoint {
    fn solve<P: NonlinearProgram>(&self, problem: &P) -> Result<NlpSolution, SolverError> {
        let opts = &self.options;
        let n = problem.n_vars();
        let m = problem.n_rows();

        let (lb, ub) = problem.row_bounds();
        ensure!(
            lb.len() == m && ub.len() == m,
            ProblemSizeSnafu {
                action: "row bounds",
                expected: m,
                got: lb.len().min(ub.len()),
            }
        );
        let (xl, xu) = problem.variable_bounds();
        ensure!(
            xl.len() == n && xu.len() == n,
            ProblemSizeSnafu {
                action: "variable bounds",
                expected: n,
                got: xl.len().min(xu.len()),
            }
        );
        let x0 = problem.initial_guess();
        ensure!(
            x0.len() == n,
            ProblemSizeSnafu {
                action: "initial guess",
                expected: n,
                got: x0.len(),
            }
        );
        let order = problem.variable_order();
        let mut seen = vec![false; n];
        for var in &order {
            if let Some(flag) = seen.get_mut(*var) {
                *flag = true;
            }
        }
        let distinct = seen.iter().filter(|flag| **flag).count();
        ensure!(
            order.len() == n && distinct == n,
            ProblemSizeSnafu {
                action: "variable order",
                expected: n,
                got: distinct,
            }
        );

        let start_instant = Instant::now();
        let tol = opts.constraint_tolerance;
        let min_barrier = tol / 10.0;
        let mut barrier = Barrier::new(lb, ub, xl, xu, opts.elastic_penalty);
        let mut mu = opts.initial_barrier;
        let mut it = {
            let c = problem.constraints(&x0);
            ensure!(
                c.iter().all(|ci| ci.is_finite()),
                NonFiniteIterateSnafu { iteration: 0_usize }
            );
            barrier.initial(&x0, &c, mu)
        };
        let mut filter = Filter::new(opts.max_filter_violation);
        let mut last_shift: f64 = 0.0;
        let mut acceptable = 0;
        let mut trials = 0;
        let mut stalled_violation = f64::INFINITY;

        info!(
            "IPM -- {} variables, {} rows, initial violation {:.3e} -- {}",
            n,
            m,
            problem.max_violation(&it.x),
            opts
        );

        for iteration in 0..opts.max_iterations {
            let f = problem.objective(&it.x);
            let c = problem.constraints(&it.x);
            ensure!(
                f.is_finite() && c.iter().all(|ci| ci.is_finite()),
                NonFiniteIterateSnafu { iteration }
            );
            let g = problem.objective_gradient(&it.x);
            let jac = problem.constraint_jacobian(&it.x);

            let rd = &g + jac.tr_mul(&it.y) - &it.vl + &it.vu;
            let (s_d, s_c) = barrier.scaling(&it);
            let dual = barrier.dual_infeasibility(&it, &rd) / s_d;
            let primal = barrier.residual(&c, &it).amax();
            let compl = barrier.complementarity(&it, 0.0) / s_c;
            let violation = barrier.violation(&c, &it.x);

            debug!(
                "IPM -- #{iteration}: f = {f:.9e}, violation = {violation:.3e}, dual = {dual:.3e}, compl = {compl:.3e}, μ = {mu:.1e}, δ = {last_shift:.1e}"
            );

            let feasible = violation <= tol && primal <= tol;
            let done = if feasible
                && dual <= opts.optimality_tolerance
                && compl <= opts.optimality_tolerance
            {
                info!("IPM -- CONVERGED in {iteration} iterations");
                true
            } else if feasible
                && dual <= opts.acceptable_tolerance
                && compl <= opts.acceptable_tolerance
            {
                acceptable += 1;
                if acceptable >= opts.acceptable_iterations {
                    info!(
                        "IPM -- acceptable point after {iteration} iterations (dual {dual:.3e})"
                    );
                }
                acceptable >= opts.acceptable_iterations
            } else {
                acceptable = 0;
                false
            };
            if done {
                return Ok(NlpSolution {
                    objective: f,
                    x: it.x,
                    constraints: c,
                    multipliers: it.y,
                    violation,
                    stationarity: rd.amax(),
                    iterations: iteration,
                    trial_points: trials,
                    computation_dur: start_instant.elapsed(),
                });
            }

            // Stationary point of the elastic problem whose violation is held by the elastic
            // variables. Unless a larger penalty reduced the violation since the previous such
            // point, it is a local minimizer of the violation.
            if !feasible
                && primal <= opts.acceptable_tolerance
                && violation > ELASTIC_SHARE * primal.max(tol)
                && mu <= PENALTY_BARRIER
                && dual <= opts.acceptable_tolerance
                && barrier.complementarity(&it, mu) / s_c <= opts.acceptable_tolerance
            {
                ensure!(
                    barrier.rho < opts.max_penalty && violation < STALL_RATIO * stalled_violation,
                    LocallyInfeasibleSnafu {
                        iteration,
                        violation
                    }
                );
                stalled_violation = violation;
                barrier.rho = (barrier.rho * 10.0).min(opts.max_penalty);
                info!(
                    "IPM -- #{iteration}: violation {violation:.3e} persists, elastic penalty raised to {:.1e}",
                    barrier.rho
                );
                mu = mu.max(RESTART_BARRIER);
                barrier.reset_elastic(&mut it, &c, mu);
                filter.clear();
                acceptable = 0;
                continue;
            }

            while mu > min_barrier
                && dual
                    .max(primal)
                    .max(barrier.complementarity(&it, mu) / s_c)
                    <= KAPPA_EPSILON * mu
            {
                mu = min_barrier.max((KAPPA_MU * mu).min(mu.powf(THETA_MU)));
                filter.clear();
            }
            let tau = (1.0 - mu).max(0.99);
            let rho = barrier.rho;

            // Each row condenses to a weight 1/D and a shift e of its multiplier step
            let mut d_inv = DVector::<f64>::zeros(m);
            let mut shift_e = DVector::<f64>::zeros(m);
            let mut slack_grad = DVector::<f64>::zeros(m);
            let mut slack_sigma = DVector::<f64>::zeros(m);
            for (i, row) in barrier.rows.iter().enumerate() {
                if *row == Row::Free {
                    continue;
                }
                let (p, nn, zp, zn, y) = (it.p[i], it.n[i], it.zp[i], it.zn[i], it.y[i]);
                let mut d = p / zp + nn / zn;
                let mut e = (p / zp) * (y - rho) + mu / zp + (nn / zn) * (y + rho) - mu / zn;
                if let Row::Inequality(sides) = row {
                    let mut sigma = 0.0;
                    let mut grad = y;
                    if sides.lower {
                        let gap = it.s[i] - lb[i];
                        sigma += it.zl[i] / gap;
                        grad += mu / gap;
                    }
                    if sides.upper {
                        let gap = ub[i] - it.s[i];
                        sigma += it.zu[i] / gap;
                        grad -= mu / gap;
                    }
                    slack_sigma[i] = sigma;
                    slack_grad[i] = grad;
                    d += 1.0 / sigma;
                    e += grad / sigma;
                }
                d_inv[i] = 1.0 / d;
                shift_e[i] = e;
            }

            let mut matrix = CondensedMatrix::new(&order);
            for (i, j, v) in problem.lagrangian_hessian(&it.x, &it.y) {
                matrix.add(i, j, v);
            }
            for (i, row) in jac.rows.iter().enumerate() {
                if d_inv[i] != 0.0 {
                    matrix.add_outer(row, d_inv[i]);
                }
            }
            let rc = barrier.residual(&c, &it);
            let weights = DVector::from_fn(m, |i, _| d_inv[i] * (rc[i] - shift_e[i]));
            let mut rhs = -(&g + jac.tr_mul(&it.y) + jac.tr_mul(&weights));
            for (k, sides) in barrier.vars.iter().enumerate() {
                let mut sigma = 0.0;
                if sides.lower {
                    let gap = it.x[k] - barrier.xl[k];
                    sigma += it.vl[k] / gap;
                    rhs[k] += mu / gap;
                }
                if sides.upper {
                    let gap = barrier.xu[k] - it.x[k];
                    sigma += it.vu[k] / gap;
                    rhs[k] -= mu / gap;
                }
                if sigma != 0.0 {
                    matrix.add(k, k, sigma);
                }
            }

            // Inertia correction: smallest diagonal shift which makes the system positive definite
            let mut shift = 0.0;
            let factorization = loop {
                if let Some(factorization) = matrix.factor(shift) {
                    break factorization;
                }
                shift = if shift == 0.0 {
                    if last_shift == 0.0 {
                        1e-4
                    } else {
                        (last_shift / 3.0).max(1e-20)
                    }
                } else if last_shift == 0.0 {
                    shift * 100.0
                } else {
                    shift * 8.0
                };
                ensure!(shift <= MAX_SHIFT, SingularStepSnafu { iteration });
            };
            if shift > 0.0 {
                last_shift = shift;
            }
            let dx = factorization
                .solve(&rhs)
                .context(SingularStepSnafu { iteration })?;

            let jdx = jac.mul(&dx);
            let mut dir = Iterate::zeros(n, m);
            for (i, row) in barrier.rows.iter().enumerate() {
                if *row == Row::Free {
                    continue;
                }
                let (p, nn, zp, zn, y) = (it.p[i], it.n[i], it.zp[i], it.zn[i], it.y[i]);
                let dy = d_inv[i] * (jdx[i] + rc[i] - shift_e[i]);
                let dp = (p / zp) * (dy - rho + y + mu / p);
                let dn = (nn / zn) * (-dy - rho - y + mu / nn);
                dir.y[i] = dy;
                dir.p[i] = dp;
                dir.n[i] = dn;
                dir.zp[i] = mu / p - zp - zp / p * dp;
                dir.zn[i] = mu / nn - zn - zn / nn * dn;
                if let Row::Inequality(sides) = row {
                    let ds = (dy + slack_grad[i]) / slack_sigma[i];
                    dir.s[i] = ds;
                    if sides.lower {
                        let gap = it.s[i] - lb[i];
                        dir.zl[i] = mu / gap - it.zl[i] - it.zl[i] / gap * ds;
                    }
                    if sides.upper {
                        let gap = ub[i] - it.s[i];
                        dir.zu[i] = mu / gap - it.zu[i] + it.zu[i] / gap * ds;
                    }
                }
            }
            for (k, sides) in barrier.vars.iter().enumerate() {
                if sides.lower {
                    let gap = it.x[k] - barrier.xl[k];
                    dir.vl[k] = mu / gap - it.vl[k] - it.vl[k] / gap * dx[k];
                }
                if sides.upper {
                    let gap = barrier.xu[k] - it.x[k];
                    dir.vu[k] = mu / gap - it.vu[k] + it.vu[k] / gap * dx[k];
                }
            }
            dir.x = dx;

            // Fraction to the boundary, separately for the primal and the bound multipliers
            let mut alpha_max = 1.0;
            let mut alpha_z = 1.0;
            for (i, row) in barrier.rows.iter().enumerate() {
                if *row == Row::Free {
                    continue;
                }
                to_boundary(&mut alpha_max, it.p[i], dir.p[i], tau);
                to_boundary(&mut alpha_max, it.n[i], dir.n[i], tau);
                to_boundary(&mut alpha_z, it.zp[i], dir.zp[i], tau);
                to_boundary(&mut alpha_z, it.zn[i], dir.zn[i], tau);
                if let Row::Inequality(sides) = row {
                    if sides.lower {
                        to_boundary(&mut alpha_max, it.s[i] - lb[i], dir.s[i], tau);
                        to_boundary(&mut alpha_z, it.zl[i], dir.zl[i], tau);
                    }
                    if sides.upper {
                        to_boundary(&mut alpha_max, ub[i] - it.s[i], -dir.s[i], tau);
                        to_boundary(&mut alpha_z, it.zu[i], dir.zu[i], tau);
                    }
                }
            }
            for (k, sides) in barrier.vars.iter().enumerate() {
                if sides.lower {
                    to_boundary(&mut alpha_max, it.x[k] - barrier.xl[k], dir.x[k], tau);
                    to_boundary(&mut alpha_z, it.vl[k], dir.vl[k], tau);
                }
                if sides.upper {
                    to_boundary(&mut alpha_max, barrier.xu[k] - it.x[k], -dir.x[k], tau);
                    to_boundary(&mut alpha_z, it.vu[k], dir.vu[k], tau);
                }
            }

            // Directional derivative of the barrier objective
            let mut slope = g.dot(&dir.x);
            for (i, row) in barrier.rows.iter().enumerate() {
                if *row == Row::Free {
                    continue;
                }
                slope += rho * (dir.p[i] + dir.n[i])
                    - mu * (dir.p[i] / it.p[i] + dir.n[i] / it.n[i]);
                if let Row::Inequality(sides) = row {
                    if sides.lower {
                        slope -= mu / (it.s[i] - lb[i]) * dir.s[i];
                    }
                    if sides.upper {
                        slope += mu / (ub[i] - it.s[i]) * dir.s[i];
                    }
                }
            }
            for (k, sides) in barrier.vars.iter().enumerate() {
                if sides.lower {
                    slope -= mu / (it.x[k] - barrier.xl[k]) * dir.x[k];
                }
                if sides.upper {
                    slope += mu / (barrier.xu[k] - it.x[k]) * dir.x[k];
                }
            }

            let current = (barrier.theta(&c, &it), barrier.phi(f, &it, mu));
            let alpha_min = Filter::min_step(current.0, slope);
            let mut alpha = alpha_max;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                trials += 1;
                let trial = it.primal_step(&dir, alpha);
                let c_trial = problem.constraints(&trial.x);
                let candidate = (
                    barrier.theta(&c_trial, &trial),
                    barrier.phi(problem.objective(&trial.x), &trial, mu),
                );
                match filter.accept(current, candidate, slope, alpha) {
                    Acceptance::Rejected => {}
                    outcome => {
                        accepted = Some((trial, outcome));
                        break;
                    }
                }
                alpha *= 0.5;
                if alpha < alpha_min {
                    break;
                }
            }

            let Some((trial, outcome)) = accepted else {
                debug!(
                    "IPM -- #{iteration}: line search failed (max step {alpha_max:.3e}), elastic variables reset"
                );
                barrier.reset_elastic(&mut it, &c, mu);
                filter.clear();
                continue;
            };
            if outcome == Acceptance::Filter {
                filter.augment(current.0, current.1);
            }
            trace!(
                "IPM -- #{iteration}: step {alpha:.3e} (max {alpha_max:.3e}, dual {alpha_z:.3e}), {outcome:?}, {} filter entries",
                filter.len()
            );

            it.x = trial.x;
            it.s = trial.s;
            it.p = trial.p;
            it.n = trial.n;
            it.y += alpha * &dir.y;
            for (i, row) in barrier.rows.iter().enumerate() {
                if *row == Row::Free {
                    continue;
                }
                it.zp[i] = safeguarded(it.zp[i], dir.zp[i], alpha_z, mu, it.p[i]);
                it.zn[i] = safeguarded(it.zn[i], dir.zn[i], alpha_z, mu, it.n[i]);
                if let Row::Inequality(sides) = row {
                    if sides.lower {
                        let gap = it.s[i] - lb[i];
                        it.zl[i] = safeguarded(it.zl[i], dir.zl[i], alpha_z, mu, gap);
                    }
                    if sides.upper {
                        let gap = ub[i] - it.s[i];
                        it.zu[i] = safeguarded(it.zu[i], dir.zu[i], alpha_z, mu, gap);
                    }
                }
            }
            for (k, sides) in barrier.vars.iter().enumerate() {
                if sides.lower {
                    let gap = it.x[k] - barrier.xl[k];
                    it.vl[k] = safeguarded(it.vl[k], dir.vl[k], alpha_z, mu, gap);
                }
                if sides.upper {
                    let gap = barrier.xu[k] - it.x[k];
                    it.vu[k] = safeguarded(it.vu[k], dir.vu[k], alpha_z, mu, gap);
                }
            }
        }

        Err(SolverError::MaxIterReached {
            iterations: opts.max_iterations,
            violation: problem.max_violation(&it.x),
        })
    }
}
