use insertion::cosmic::Dimension;
use insertion::io::ScenarioConfig;
use insertion::md::{ConstraintGroup, ConstraintKind, Transcription, TranscriptionError};
use insertion::opti::NonlinearProgram;
use rstest::*;

use crate::two_body_planar;

#[rstest]
#[case::planar(ScenarioConfig::planar(), 34, 46)]
#[case::spatial(ScenarioConfig::spatial(), 51, 64)]
#[case::two_bodies(two_body_planar(), 58, 70)]
fn rows_and_bounds_are_aligned(
    #[case] cfg: ScenarioConfig,
    #[case] n_vars: usize,
    #[case] n_rows: usize,
) {
    let mut cfg = cfg;
    cfg.nodes = 5;
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();

    assert_eq!(problem.n_vars(), n_vars);
    assert_eq!(z.len(), n_vars);
    assert_eq!(problem.n_rows(), n_rows);

    let (lb, ub) = problem.row_bounds();
    assert_eq!(lb.len(), n_rows);
    assert_eq!(ub.len(), n_rows);
    assert_eq!(problem.constraints(&z).len(), n_rows);

    let jac = problem.constraint_jacobian(&z);
    assert_eq!(jac.n_rows(), n_rows);
    assert_eq!(jac.n_cols, n_vars);

    assert!(lb.iter().zip(ub.iter()).all(|(l, u)| l <= u));
    let groups: usize = problem.groups().iter().map(|g| g.rows()).sum();
    assert_eq!(groups, n_rows);
}

#[test]
fn terminal_rows_follow_the_dimension() {
    for (cfg, terminal) in [(ScenarioConfig::planar(), 3), (ScenarioConfig::spatial(), 5)] {
        let problem = Transcription::new(cfg.into_scenario().unwrap())
            .build()
            .unwrap();
        assert_eq!(problem.rows_where(|k| k.is_terminal()), terminal);
        let last = problem.groups().last().unwrap().kind();
        assert_eq!(last, ConstraintKind::TerminalRadius);
    }
}

#[test]
fn bounds_of_each_block() {
    let mut cfg = ScenarioConfig::spatial();
    cfg.nodes = 8;
    let scenario = cfg.into_scenario().unwrap();
    let h = scenario.step_size();
    let tr = Transcription::new(scenario);
    assert_eq!(tr.scenario.dimension(), Dimension::Spatial);

    for group in tr.constraint_groups().unwrap() {
        let (lb, ub) = (group.lower()[0], group.upper()[0]);
        match group.kind() {
            ConstraintKind::InitialCondition
            | ConstraintKind::Dynamics { .. }
            | ConstraintKind::TerminalSpeed
            | ConstraintKind::TerminalRadialVelocity
            | ConstraintKind::TerminalVelocityInPlane
            | ConstraintKind::TerminalPositionInPlane
            | ConstraintKind::TerminalRadius => {
                assert!(group.is_equality());
                assert!(group.lower().iter().all(|x| *x == 0.0));
            }
            ConstraintKind::Safety { .. } => {
                approx::assert_relative_eq!(lb, 110.0);
                assert_eq!(ub, f64::INFINITY);
            }
            ConstraintKind::Thrust { .. } => {
                assert_eq!((lb, ub), (0.0, 0.0004));
            }
            ConstraintKind::ThrustSlew { .. } => {
                approx::assert_relative_eq!(ub, h * 0.0004 / 60.0);
                assert_eq!(lb, -ub);
            }
            ConstraintKind::AngleSlew { .. } => {
                approx::assert_relative_eq!(ub, h * std::f64::consts::PI / 48.0);
                assert_eq!(lb, -ub);
            }
        }
    }
}

#[test]
fn malformed_bounds_are_rejected() {
    let layout = ScenarioConfig::planar().into_scenario().unwrap().layout();
    let kind = ConstraintKind::Dynamics { interval: 2 };

    assert_eq!(
        ConstraintGroup::new(kind, vec![0.0; 4], vec![0.0; 3], &layout).unwrap_err(),
        TranscriptionError::BoundMismatch {
            kind,
            rows: 4,
            lower: 4,
            upper: 3
        }
    );
    assert_eq!(
        ConstraintGroup::new(
            kind,
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.5, 0.0],
            &layout
        )
        .unwrap_err(),
        TranscriptionError::EmptyBounds { kind, row: 2 }
    );
    assert!(ConstraintGroup::within(ConstraintKind::TerminalRadius, 1.0, -1.0, &layout).is_err());
    assert!(ConstraintGroup::within(ConstraintKind::TerminalRadius, -1.0, 1.0, &layout).is_ok());
}
