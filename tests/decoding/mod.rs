use approx::assert_abs_diff_eq;
use insertion::io::{GuessConfig, ScenarioConfig};
use insertion::linalg::Vector3;
use insertion::md::{ConstraintKind, Transcription, TranscriptionError};
use insertion::opti::NonlinearProgram;

/// Circular state of radius 190 in the plane of the scenario
fn circular_state(cfg: &ScenarioConfig) -> (Vec<f64>, Vec<f64>) {
    let speed = cfg.primary.circular_velocity(cfg.grav_const, cfg.target.radius);
    match cfg.target.plane {
        None => (vec![cfg.target.radius, 0.0], vec![0.0, speed]),
        Some(plane) => {
            let normal = plane.normal();
            let u = normal.cross(&Vector3::x()).normalize();
            let w = normal.cross(&u);
            let pos = u * cfg.target.radius;
            let vel = w * speed;
            (pos.iter().copied().collect(), vel.iter().copied().collect())
        }
    }
}

fn on_target_orbit(mut cfg: ScenarioConfig) -> ScenarioConfig {
    let (position, velocity) = circular_state(&cfg);
    cfg.bodies[0].position = position;
    cfg.bodies[0].velocity = velocity;
    cfg.guess = None;
    cfg
}

#[test]
fn coasting_on_the_planar_target_orbit() {
    let cfg = on_target_orbit(ScenarioConfig::planar());
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();

    let tr = &problem.transcription;
    for kind in [
        ConstraintKind::TerminalSpeed,
        ConstraintKind::TerminalRadialVelocity,
        ConstraintKind::TerminalRadius,
    ] {
        let row = tr.evaluate(kind, |i| z[i])[0];
        assert_abs_diff_eq!(row, 0.0, epsilon = 1e-4);
    }

    let sol = problem.decode(&z).unwrap();
    assert_eq!(sol.extended_trajectory.nrows(), 176 + 1 + 210);
    assert!(sol.radius_drift() < 1e-4, "drift = {}", sol.radius_drift());
    assert_eq!(sol.total_impulse(), 0.0);
    assert_abs_diff_eq!(sol.speed(176 + 210), sol.orbital_velocity, epsilon = 1e-6);
}

#[test]
fn coasting_on_the_spatial_target_orbit() {
    let mut cfg = on_target_orbit(ScenarioConfig::spatial());
    cfg.nodes = 200;
    cfg.terminal_steps = 100;
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();

    let tr = &problem.transcription;
    for kind in [
        ConstraintKind::TerminalSpeed,
        ConstraintKind::TerminalRadialVelocity,
        ConstraintKind::TerminalVelocityInPlane,
        ConstraintKind::TerminalPositionInPlane,
        ConstraintKind::TerminalRadius,
    ] {
        let row = tr.evaluate(kind, |i| z[i])[0];
        assert_abs_diff_eq!(row, 0.0, epsilon = 1e-3);
    }

    let sol = problem.decode(&z).unwrap();
    assert!(sol.radius_drift() < 1e-3, "drift = {}", sol.radius_drift());
}

#[test]
fn off_target_orbit_drifts() {
    let mut cfg = ScenarioConfig::planar();
    cfg.nodes = 100;
    cfg.terminal_steps = 50;
    cfg.guess = None;
    // Periapsis at 110, apoapsis near 168
    cfg.bodies[0].velocity = vec![0.0, 1.1 * (0.0008_f64 * 1e6 / 110.0).sqrt()];
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let sol = problem.decode(&problem.initial_guess()).unwrap();
    // The initial ellipse never reaches r = 190
    assert!(sol.radius_drift() > 20.0);
    assert!((0..sol.extended_trajectory.nrows()).all(|row| sol.radius(row) < 180.0));
}

#[test]
fn decoder_layout() {
    let mut cfg = ScenarioConfig::spatial();
    cfg.nodes = 5;
    cfg.horizon = 20.0;
    cfg.terminal_steps = 4;
    cfg.guess = Some(GuessConfig {
        state: None,
        control: Some(vec![1e-4, 0.2, 1.0]),
    });
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let z = problem.initial_guess();
    let sol = problem.decode(&z).unwrap();

    assert_eq!(sol.trajectory.shape(), (6, 6));
    assert_eq!(sol.controls.shape(), (5, 3));
    assert_eq!(sol.extended_trajectory.shape(), (10, 6));
    assert_eq!(sol.extended_controls.shape(), (10, 3));
    for k in 0..5 {
        assert_eq!(sol.controls[(k, 0)], 1e-4);
        assert_eq!(sol.controls[(k, 2)], 1.0);
    }
    assert!(sol.extended_controls.rows(5, 5).iter().all(|u| *u == 0.0));
    assert_eq!(sol.terminal_state(), sol.extended_trajectory.row(5).transpose());
    assert_abs_diff_eq!(sol.total_impulse(), 5e-4 * sol.step_size, epsilon = 1e-15);
    assert_abs_diff_eq!(problem.objective(&z), sol.total_impulse(), epsilon = 1e-15);

    let epochs = sol.epochs();
    assert_eq!(epochs.len(), 10);
    assert_abs_diff_eq!(epochs[9], 45.0, epsilon = 1e-9);

    let short = z.rows(0, z.len() - 1).into_owned();
    assert_eq!(
        problem.decode(&short).unwrap_err(),
        TranscriptionError::DecisionVectorSize {
            expected: z.len(),
            got: z.len() - 1
        }
    );
}
