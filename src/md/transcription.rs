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

use super::{
    ConstraintGroup, ConstraintKind, InitialGuess, Objective, Scenario, Solution,
    TranscriptionError,
};
use crate::cosmic::StateLayout;
use crate::dual::{derivative, dot, norm, seed, Dual, Real};
use crate::linalg::{DVector, SVD};
use crate::opti::{LowerTriangle, NonlinearProgram, SparseJacobian};
use crate::propagators::rk4_step;
use std::fmt;

/// Relative step of the finite differences of the Lagrangian Hessian
const HESSIAN_STEP: f64 = 1e-6;

/// Direct transcription of a [`Scenario`]: the decision vector holds every state node followed by
/// every control, the dynamics are enforced through RK4 defect rows.
#[derive(Clone, Debug)]
pub struct Transcription {
    pub scenario: Scenario,
    pub layout: StateLayout,
    step_size: f64,
    orbital_velocity: f64,
    /// Unit normal of the target orbital plane, if any
    normal: Option<[f64; 3]>,
}

impl Transcription {
    pub fn new(scenario: Scenario) -> Self {
        let layout = scenario.layout();
        let step_size = scenario.step_size();
        let orbital_velocity = scenario.orbital_velocity();
        let normal = scenario.plane.map(|plane| {
            let n = plane.normal();
            [n[0], n[1], n[2]]
        });
        Self {
            scenario,
            layout,
            step_size,
            orbital_velocity,
            normal,
        }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn objective(&self) -> Objective {
        Objective::new(self.step_size, self.layout)
    }

    /// Builds every block of constraint rows, with their bounds, in row order.
    pub fn constraint_groups(&self) -> Result<Vec<ConstraintGroup>, TranscriptionError> {
        let layout = &self.layout;
        let n = layout.nodes;
        let mut groups = Vec::new();

        groups.push(ConstraintGroup::equality(
            ConstraintKind::InitialCondition,
            layout,
        )?);

        for interval in 0..n {
            groups.push(ConstraintGroup::equality(
                ConstraintKind::Dynamics { interval },
                layout,
            )?);
        }

        let safety_radius = self.scenario.dynamics.primary.safety_radius();
        for node in 0..=n {
            groups.push(ConstraintGroup::within(
                ConstraintKind::Safety { node },
                safety_radius,
                f64::INFINITY,
                layout,
            )?);
        }

        for interval in 0..n {
            groups.push(ConstraintGroup::within(
                ConstraintKind::Thrust { interval },
                0.0,
                self.scenario.thrust_max,
                layout,
            )?);
        }

        let thrust_slew = self.scenario.thrust_slew_limit();
        for interval in 0..n - 1 {
            groups.push(ConstraintGroup::within(
                ConstraintKind::ThrustSlew { interval },
                -thrust_slew,
                thrust_slew,
                layout,
            )?);
        }

        let angle_slew = self.scenario.angle_slew_limit();
        for angle in 0..layout.angle_count() {
            for interval in 0..n - 1 {
                groups.push(ConstraintGroup::within(
                    ConstraintKind::AngleSlew { angle, interval },
                    -angle_slew,
                    angle_slew,
                    layout,
                )?);
            }
        }

        let mut terminal = vec![
            ConstraintKind::TerminalSpeed,
            ConstraintKind::TerminalRadialVelocity,
        ];
        if self.normal.is_some() {
            terminal.push(ConstraintKind::TerminalVelocityInPlane);
            terminal.push(ConstraintKind::TerminalPositionInPlane);
        }
        terminal.push(ConstraintKind::TerminalRadius);
        for kind in terminal {
            groups.push(ConstraintGroup::equality(kind, layout)?);
        }

        Ok(groups)
    }

    /// Evaluates the rows of the block `kind`, where `var(i)` returns decision variable `i`.
    pub fn evaluate<T: Real>(&self, kind: ConstraintKind, var: impl Fn(usize) -> T) -> Vec<T> {
        let layout = &self.layout;
        let n = layout.nodes;
        let collect = |range: std::ops::Range<usize>| -> Vec<T> { range.map(&var).collect() };

        match kind {
            ConstraintKind::InitialCondition => layout
                .state_range(0)
                .zip(self.scenario.initial_state.iter())
                .map(|(i, x0)| var(i) - T::constant(*x0))
                .collect(),
            ConstraintKind::Dynamics { interval } => {
                let state = DVector::from_vec(collect(layout.state_range(interval)));
                let control = DVector::from_vec(collect(layout.control_range(interval)));
                let next = rk4_step(
                    &self.scenario.dynamics,
                    &state,
                    &control,
                    T::constant(self.step_size),
                );
                layout
                    .state_range(interval + 1)
                    .zip(next.iter())
                    .map(|(i, x)| var(i) - *x)
                    .collect()
            }
            ConstraintKind::Safety { node } => {
                vec![norm(&collect(layout.position_range(node, 0)))]
            }
            ConstraintKind::Thrust { interval } => vec![var(layout.thrust_index(interval))],
            ConstraintKind::ThrustSlew { interval } => {
                vec![var(layout.thrust_index(interval + 1)) - var(layout.thrust_index(interval))]
            }
            ConstraintKind::AngleSlew { angle, interval } => {
                let next = var(layout.angle_index(interval + 1, angle));
                vec![next - var(layout.angle_index(interval, angle))]
            }
            ConstraintKind::TerminalSpeed => {
                let vel = collect(layout.velocity_range(n, 0));
                vec![norm(&vel) - T::constant(self.orbital_velocity)]
            }
            ConstraintKind::TerminalRadialVelocity => {
                let pos = collect(layout.position_range(n, 0));
                let vel = collect(layout.velocity_range(n, 0));
                vec![dot(&vel, &pos)]
            }
            ConstraintKind::TerminalVelocityInPlane => {
                let vel = collect(layout.velocity_range(n, 0));
                vec![dot(&vel, &self.plane_normal())]
            }
            ConstraintKind::TerminalPositionInPlane => {
                let pos = collect(layout.position_range(n, 0));
                vec![dot(&pos, &self.plane_normal())]
            }
            ConstraintKind::TerminalRadius => {
                let pos = collect(layout.position_range(n, 0));
                vec![norm(&pos) - T::constant(self.scenario.target_radius)]
            }
        }
    }

    /// Normal of the target plane lifted into `T`, zero without a plane
    fn plane_normal<T: Real>(&self) -> Vec<T> {
        let normal = self.normal.unwrap_or_default();
        normal[..self.layout.dim()]
            .iter()
            .map(|ni| T::constant(*ni))
            .collect()
    }

    /// Builds the problem instance, seeded with the initial guess of the scenario.
    pub fn build(self) -> Result<ProblemInstance, TranscriptionError> {
        let groups = self.constraint_groups()?;
        let guess = InitialGuess::rollout(&self.scenario)?;
        let initial_guess = guess.to_decision_vector(&self.layout);
        ProblemInstance::new(self, groups, initial_guess)
    }
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "transcription of {} ({})", self.scenario, self.layout)
    }
}

/// The complete nonlinear program of a transcription: objective, constraint rows with their
/// bounds, and the initial guess. It is not modified once built.
#[derive(Clone, Debug)]
pub struct ProblemInstance {
    pub transcription: Transcription,
    pub objective: Objective,
    groups: Vec<ConstraintGroup>,
    lower: DVector<f64>,
    upper: DVector<f64>,
    initial_guess: DVector<f64>,
}

impl ProblemInstance {
    pub fn new(
        transcription: Transcription,
        groups: Vec<ConstraintGroup>,
        initial_guess: DVector<f64>,
    ) -> Result<Self, TranscriptionError> {
        let layout = transcription.layout;
        if initial_guess.len() != layout.n_vars() {
            return Err(TranscriptionError::DecisionVectorSize {
                expected: layout.n_vars(),
                got: initial_guess.len(),
            });
        }

        let lower: Vec<f64> = groups.iter().flat_map(|g| g.lower().to_vec()).collect();
        let upper: Vec<f64> = groups.iter().flat_map(|g| g.upper().to_vec()).collect();
        let rows: usize = groups.iter().map(|g| g.kind().rows(&layout)).sum();
        if lower.len() != rows || upper.len() != rows {
            return Err(TranscriptionError::RowMismatch {
                rows,
                lower: lower.len(),
                upper: upper.len(),
            });
        }

        let me = Self {
            objective: transcription.objective(),
            transcription,
            groups,
            lower: DVector::from_vec(lower),
            upper: DVector::from_vec(upper),
            initial_guess,
        };

        info!("{}", me.transcription);
        info!(
            "{} variables, {} constraint rows ({} equalities)",
            me.n_vars(),
            me.n_rows(),
            me.groups
                .iter()
                .filter(|g| g.is_equality())
                .map(|g| g.rows())
                .sum::<usize>()
        );
        let classes: [(&str, fn(&ConstraintKind) -> bool); 6] = [
            ("initial condition", |k| *k == ConstraintKind::InitialCondition),
            ("dynamics", |k| matches!(k, ConstraintKind::Dynamics { .. })),
            ("safety", |k| matches!(k, ConstraintKind::Safety { .. })),
            ("thrust", |k| matches!(k, ConstraintKind::Thrust { .. })),
            ("slew", |k| {
                matches!(
                    k,
                    ConstraintKind::ThrustSlew { .. } | ConstraintKind::AngleSlew { .. }
                )
            }),
            ("terminal", |k| k.is_terminal()),
        ];
        for (class, filter) in classes {
            debug!("{:>5} {class} rows", me.rows_where(filter));
        }
        Ok(me)
    }

    pub fn layout(&self) -> &StateLayout {
        &self.transcription.layout
    }

    pub fn groups(&self) -> &[ConstraintGroup] {
        &self.groups
    }

    /// Rows of every block of kind matching `filter`, summed
    pub fn rows_where(&self, filter: impl Fn(&ConstraintKind) -> bool) -> usize {
        self.groups
            .iter()
            .filter(|g| filter(&g.kind()))
            .map(|g| g.rows())
            .sum()
    }

    /// Ensures `z` is a full decision vector
    pub fn check_size(&self, z: &DVector<f64>) -> Result<(), TranscriptionError> {
        if z.len() != self.n_vars() {
            return Err(TranscriptionError::DecisionVectorSize {
                expected: self.n_vars(),
                got: z.len(),
            });
        }
        Ok(())
    }

    /// Rank of the constraint Jacobian at `z`, singular values below `tol` are considered zero.
    pub fn jacobian_rank(&self, z: &DVector<f64>, tol: f64) -> usize {
        let dense = self.constraint_jacobian(z).to_dense();
        SVD::new(dense, false, false).rank(tol)
    }

    /// Forward-mode differentiation: each dependency of block `kind` is seeded in turn and the
    /// block re-evaluated in dual numbers at `var`. Returns one column of partials per dependency.
    fn block_partials(
        &self,
        kind: ConstraintKind,
        deps: &[usize],
        var: impl Fn(usize) -> f64,
    ) -> Vec<Vec<f64>> {
        deps.iter()
            .map(|&j| {
                self.transcription
                    .evaluate(kind, |i| {
                        if i == j {
                            seed(var(i))
                        } else {
                            Dual::constant(var(i))
                        }
                    })
                    .iter()
                    .map(derivative)
                    .collect()
            })
            .collect()
    }

    /// Splits the solver output into its states and controls, and runs the terminal simulation.
    pub fn decode(&self, z: &DVector<f64>) -> Result<Solution, TranscriptionError> {
        self.check_size(z)?;
        Solution::decode(&self.transcription.scenario, z)
    }
}

impl NonlinearProgram for ProblemInstance {
    fn n_vars(&self) -> usize {
        self.transcription.layout.n_vars()
    }

    fn n_rows(&self) -> usize {
        self.lower.len()
    }

    fn objective(&self, x: &DVector<f64>) -> f64 {
        self.objective.evaluate(|i| x[i])
    }

    fn objective_gradient(&self, _x: &DVector<f64>) -> DVector<f64> {
        self.objective.gradient()
    }

    fn constraints(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut rows = Vec::with_capacity(self.n_rows());
        for group in &self.groups {
            rows.extend(self.transcription.evaluate(group.kind(), |i| x[i]));
        }
        DVector::from_vec(rows)
    }

    fn constraint_jacobian(&self, x: &DVector<f64>) -> SparseJacobian {
        let layout = &self.transcription.layout;
        let mut jac = SparseJacobian::new(self.n_vars());
        for group in &self.groups {
            let kind = group.kind();
            let deps = kind.dependencies(layout);
            let columns = self.block_partials(kind, &deps, |i| x[i]);
            for row in 0..group.rows() {
                jac.push_row(
                    deps.iter()
                        .zip(columns.iter())
                        .filter(|(_, column)| column[row] != 0.0)
                        .map(|(j, column)| (*j, column[row]))
                        .collect(),
                );
            }
        }
        jac
    }

    /// Only nonlinear blocks with a nonzero multiplier contribute, each through central
    /// differences of its weighted gradient over its own dependencies. The objective is linear.
    fn lagrangian_hessian(&self, x: &DVector<f64>, multipliers: &DVector<f64>) -> LowerTriangle {
        let layout = &self.transcription.layout;
        let mut entries = Vec::new();
        let mut offset = 0;
        for group in &self.groups {
            let kind = group.kind();
            let weights = &multipliers.as_slice()[offset..offset + group.rows()];
            offset += group.rows();
            if kind.is_linear() || weights.iter().all(|w| *w == 0.0) {
                continue;
            }
            let deps = kind.dependencies(layout);
            // Gradient of the weighted rows with dependency `shifted` moved by `step`
            let gradient = |shifted: usize, step: f64| -> Vec<f64> {
                self.block_partials(kind, &deps, |i| if i == shifted { x[i] + step } else { x[i] })
                    .iter()
                    .map(|column| column.iter().zip(weights).map(|(d, w)| d * w).sum::<f64>())
                    .collect()
            };
            let columns: Vec<Vec<f64>> = deps
                .iter()
                .map(|&j| {
                    let step = HESSIAN_STEP * x[j].abs().max(1.0);
                    let plus = gradient(j, step);
                    let minus = gradient(j, -step);
                    plus.iter()
                        .zip(minus.iter())
                        .map(|(p, m)| (p - m) / (2.0 * step))
                        .collect()
                })
                .collect();
            // Dependencies are sorted, so deps[a] ≥ deps[b] for b ≤ a
            for (a, &i) in deps.iter().enumerate() {
                for (b, &j) in deps[..=a].iter().enumerate() {
                    let value = 0.5 * (columns[a][b] + columns[b][a]);
                    if value != 0.0 {
                        entries.push((i, j, value));
                    }
                }
            }
        }
        entries
    }

    /// Stage order: each state node followed by the control of its interval, so that the
    /// condensed Newton matrix of the solver is block banded.
    fn variable_order(&self) -> Vec<usize> {
        let layout = &self.transcription.layout;
        (0..=layout.nodes)
            .flat_map(|k| {
                let control = if k < layout.nodes {
                    layout.control_range(k)
                } else {
                    0..0
                };
                layout.state_range(k).chain(control)
            })
            .collect()
    }

    fn row_bounds(&self) -> (&DVector<f64>, &DVector<f64>) {
        (&self.lower, &self.upper)
    }

    fn initial_guess(&self) -> DVector<f64> {
        self.initial_guess.clone()
    }
}

impl fmt::Display for ProblemInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} variables and {} rows: {}",
            self.n_vars(),
            self.n_rows(),
            self.objective
        )
    }
}
