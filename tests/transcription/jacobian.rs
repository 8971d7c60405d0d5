use insertion::io::{GuessConfig, ScenarioConfig};
use insertion::linalg::DVector;
use insertion::md::Transcription;
use insertion::opti::NonlinearProgram;
use rstest::*;

use crate::two_body_planar;

/// Constraint Jacobian by central differences
fn finite_differences<P: NonlinearProgram>(problem: &P, z: &DVector<f64>) -> Vec<Vec<f64>> {
    let mut cols = Vec::with_capacity(z.len());
    for j in 0..z.len() {
        let eps = 1e-6 * z[j].abs().max(1.0);
        let mut plus = z.clone();
        plus[j] += eps;
        let mut minus = z.clone();
        minus[j] -= eps;
        let diff = (problem.constraints(&plus) - problem.constraints(&minus)) / (2.0 * eps);
        cols.push(diff.iter().copied().collect());
    }
    cols
}

#[rstest]
#[case::planar(ScenarioConfig::planar(), vec![1e-4, 0.3])]
#[case::spatial(ScenarioConfig::spatial(), vec![1e-4, 0.3, 1.2])]
#[case::two_bodies(two_body_planar(), vec![2e-4, -0.7])]
fn jacobian_matches_finite_differences(#[case] cfg: ScenarioConfig, #[case] control: Vec<f64>) {
    let mut cfg = cfg;
    cfg.nodes = 4;
    cfg.horizon = 60.0;
    cfg.guess = Some(GuessConfig {
        state: None,
        control: Some(control),
    });
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();

    let jac = problem.constraint_jacobian(&z).to_dense();
    let fd = finite_differences(&problem, &z);
    for (j, col) in fd.iter().enumerate() {
        for (i, expected) in col.iter().enumerate() {
            let tol = 1e-6 * expected.abs().max(1.0);
            assert!(
                (jac[(i, j)] - expected).abs() < tol,
                "d c[{i}] / d z[{j}]: {} != {expected}",
                jac[(i, j)]
            );
        }
    }
}

#[test]
fn jacobian_is_sparse() {
    let mut cfg = ScenarioConfig::planar();
    cfg.nodes = 40;
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();
    let jac = problem.constraint_jacobian(&z);
    // Each dynamics row depends on two states and one control at most
    assert!(jac.rows.iter().all(|row| row.len() <= 2 * 4 + 2));
    assert!(jac.nnz() < jac.n_rows() * jac.n_cols / 10);
}

#[test]
fn objective_gradient_is_the_step_size() {
    let mut cfg = ScenarioConfig::spatial();
    cfg.nodes = 6;
    let scenario = cfg.into_scenario().unwrap();
    let h = scenario.step_size();
    let problem = Transcription::new(scenario).build().unwrap();
    let layout = *problem.layout();
    let grad = problem.objective_gradient(&problem.initial_guess());
    for j in 0..layout.n_vars() {
        let expected = if (0..6).any(|k| layout.thrust_index(k) == j) {
            h
        } else {
            0.0
        };
        assert_eq!(grad[j], expected);
    }
}

#[test]
fn constraint_jacobian_rank() {
    let mut cfg = ScenarioConfig::planar();
    cfg.nodes = 6;
    cfg.guess = Some(GuessConfig {
        state: None,
        control: Some(vec![1e-4, 0.3]),
    });
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();
    // The initial condition and dynamics rows are independent: they pin every state
    let rank = problem.jacobian_rank(&z, 1e-9);
    assert!(rank >= 7 * 4);
    assert!(rank <= problem.n_rows().min(problem.n_vars()));
}
