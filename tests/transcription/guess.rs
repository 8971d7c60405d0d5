use approx::assert_abs_diff_eq;
use insertion::io::{GuessConfig, ScenarioConfig};
use insertion::md::{ConstraintKind, InitialGuess, Transcription};
use insertion::opti::NonlinearProgram;
use rstest::*;

use crate::two_body_planar;

/// Largest absolute value of the rows of the blocks matching `filter`
fn max_residual(cfg: ScenarioConfig, filter: impl Fn(&ConstraintKind) -> bool) -> f64 {
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();
    let c = problem.constraints(&z);
    let mut row = 0;
    let mut worst = 0.0_f64;
    for group in problem.groups() {
        if filter(&group.kind()) {
            for i in row..row + group.rows() {
                worst = worst.max(c[i].abs());
            }
        }
        row += group.rows();
    }
    worst
}

#[rstest]
#[case::planar(ScenarioConfig::planar())]
#[case::spatial(ScenarioConfig::spatial())]
#[case::two_bodies(two_body_planar())]
fn guess_is_dynamically_consistent(#[case] cfg: ScenarioConfig) {
    let residual = max_residual(cfg, |k| matches!(k, ConstraintKind::Dynamics { .. }));
    assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-12);
}

#[test]
fn default_guess_starts_at_the_initial_state() {
    let mut cfg = ScenarioConfig::spatial();
    cfg.nodes = 10;
    cfg.guess = None;
    let residual = max_residual(cfg, |k| {
        matches!(
            k,
            ConstraintKind::Dynamics { .. } | ConstraintKind::InitialCondition
        )
    });
    assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-12);
}

#[test]
fn thrusting_guess_is_dynamically_consistent() {
    let mut cfg = ScenarioConfig::spatial();
    cfg.nodes = 30;
    cfg.guess = Some(GuessConfig {
        state: None,
        control: Some(vec![2e-4, 0.4, 1.2]),
    });
    let residual = max_residual(cfg, |k| matches!(k, ConstraintKind::Dynamics { .. }));
    assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-12);
}

#[test]
fn seeded_state_only_breaks_the_initial_condition() {
    let mut cfg = ScenarioConfig::planar();
    cfg.nodes = 20;
    cfg.guess = Some(GuessConfig {
        state: Some(vec![150.0, 0.0, 0.0, 2.3]),
        control: None,
    });
    let dynamics = max_residual(cfg.clone(), |k| matches!(k, ConstraintKind::Dynamics { .. }));
    assert_abs_diff_eq!(dynamics, 0.0, epsilon = 1e-12);

    let initial = max_residual(cfg, |k| *k == ConstraintKind::InitialCondition);
    assert_abs_diff_eq!(initial, 40.0, epsilon = 1e-12);
}

#[test]
fn decision_vector_order() {
    let mut cfg = ScenarioConfig::planar();
    cfg.nodes = 3;
    cfg.guess = None;
    let scenario = cfg.into_scenario().unwrap();
    let layout = scenario.layout();
    let guess = InitialGuess::rollout(&scenario).unwrap();
    let z = guess.to_decision_vector(&layout);

    assert_eq!(z.len(), 4 * 4 + 3 * 2);
    for (node, state) in guess.states.iter().enumerate() {
        assert_eq!(z.rows(node * 4, 4), *state);
    }
    // Zero control by default
    assert!(z.rows(layout.control_offset(), 6).iter().all(|u| *u == 0.0));
}
