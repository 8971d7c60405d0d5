use approx::assert_abs_diff_eq;
use insertion::linalg::DVector;
use insertion::opti::{
    InteriorPoint, NlpSolver, NonlinearProgram, SolverError, SolverOptions, SparseJacobian,
};
use rstest::*;

/// min (x0 - 1)² + (x1 - 2)² s.t. x0 + x1 = 1 (row 0), x0 - x1 ∈ [lo, hi] (row 1)
struct Parabola {
    lower: DVector<f64>,
    upper: DVector<f64>,
    start: DVector<f64>,
}

impl Parabola {
    fn new(lo: f64, hi: f64) -> Self {
        Self {
            lower: DVector::from_vec(vec![1.0, lo]),
            upper: DVector::from_vec(vec![1.0, hi]),
            start: DVector::from_vec(vec![3.0, -4.0]),
        }
    }
}

impl NonlinearProgram for Parabola {
    fn n_vars(&self) -> usize {
        2
    }

    fn n_rows(&self) -> usize {
        2
    }

    fn objective(&self, x: &DVector<f64>) -> f64 {
        (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2)
    }

    fn objective_gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![2.0 * (x[0] - 1.0), 2.0 * (x[1] - 2.0)])
    }

    fn constraints(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![x[0] + x[1], x[0] - x[1]])
    }

    fn constraint_jacobian(&self, _x: &DVector<f64>) -> SparseJacobian {
        let mut jac = SparseJacobian::new(2);
        jac.push_row(vec![(0, 1.0), (1, 1.0)]);
        jac.push_row(vec![(0, 1.0), (1, -1.0)]);
        jac
    }

    fn row_bounds(&self) -> (&DVector<f64>, &DVector<f64>) {
        (&self.lower, &self.upper)
    }

    fn initial_guess(&self) -> DVector<f64> {
        self.start.clone()
    }
}

#[fixture]
fn solver() -> InteriorPoint {
    InteriorPoint::new(SolverOptions::default())
}

/// The unconstrained minimum of the second row sits at x0 - x1 = -1, i.e. (0, 1)
#[rstest]
#[case::inactive(-10.0, 10.0, [0.0, 1.0])]
#[case::lower_active(0.0, 10.0, [0.5, 0.5])]
#[case::upper_active(-10.0, -3.0, [-1.0, 2.0])]
fn two_sided_rows(
    solver: InteriorPoint,
    #[case] lo: f64,
    #[case] hi: f64,
    #[case] expected: [f64; 2],
) {
    let problem = Parabola::new(lo, hi);
    let sol = solver.solve(&problem).unwrap();
    assert_abs_diff_eq!(sol.x[0], expected[0], epsilon = 1e-5);
    assert_abs_diff_eq!(sol.x[1], expected[1], epsilon = 1e-5);
    assert!(sol.violation <= 1e-8);
    assert_eq!(sol.constraints.len(), 2);
    assert_eq!(sol.multipliers.len(), 2);
    assert_abs_diff_eq!(sol.objective, problem.objective(&sol.x), epsilon = 1e-12);
}

#[rstest]
fn multiplier_of_the_equality(solver: InteriorPoint) {
    let sol = solver.solve(&Parabola::new(-10.0, 10.0)).unwrap();
    // ∇f = (-2, -2) at (0, 1) balanced by the equality row only
    assert_abs_diff_eq!(sol.multipliers[0].abs(), 2.0, epsilon = 1e-4);
    assert_abs_diff_eq!(sol.multipliers[1], 0.0, epsilon = 1e-4);
}

#[test]
fn contradictory_rows_fail() {
    // Within the box |x| ≤ 5, x0 - x1 cannot exceed 10
    struct Boxed(Parabola);
    impl NonlinearProgram for Boxed {
        fn n_vars(&self) -> usize {
            2
        }
        fn n_rows(&self) -> usize {
            2
        }
        fn objective(&self, x: &DVector<f64>) -> f64 {
            self.0.objective(x)
        }
        fn objective_gradient(&self, x: &DVector<f64>) -> DVector<f64> {
            self.0.objective_gradient(x)
        }
        fn constraints(&self, x: &DVector<f64>) -> DVector<f64> {
            self.0.constraints(x)
        }
        fn constraint_jacobian(&self, x: &DVector<f64>) -> SparseJacobian {
            self.0.constraint_jacobian(x)
        }
        fn row_bounds(&self) -> (&DVector<f64>, &DVector<f64>) {
            self.0.row_bounds()
        }
        fn variable_bounds(&self) -> (DVector<f64>, DVector<f64>) {
            (
                DVector::from_element(2, -5.0),
                DVector::from_element(2, 5.0),
            )
        }
        fn initial_guess(&self) -> DVector<f64> {
            self.0.initial_guess()
        }
    }

    let problem = Boxed(Parabola::new(20.0, 30.0));
    match InteriorPoint::default().solve(&problem) {
        Err(SolverError::LocallyInfeasible { violation, .. }) => {
            assert!(violation >= 10.0 - 1e-6);
        }
        other => panic!("expected the solver to fail, got {other:?}"),
    }
}
