use approx::assert_relative_eq;
use insertion::cosmic::{Dimension, OrbitalPlane};
use insertion::io::{ConfigError, ConfigRepr, ScenarioConfig};
use insertion::opti::SolverOptions;
use rstest::*;

use crate::data_path;

#[rstest]
#[case::planar(ScenarioConfig::planar())]
#[case::spatial(ScenarioConfig::spatial())]
fn yaml_round_trip(#[case] cfg: ScenarioConfig) {
    let yaml = serde_yaml::to_string(&cfg).unwrap();
    let reloaded = ScenarioConfig::loads(&yaml).unwrap();
    assert_eq!(reloaded, cfg);
}

fn assert_close(loaded: &[f64], wanted: &[f64]) {
    assert_eq!(loaded.len(), wanted.len());
    for (l, w) in loaded.iter().zip(wanted) {
        assert_relative_eq!(*l, *w, epsilon = 1e-12, max_relative = 1e-12);
    }
}

/// Asserts the states of both configurations match, then aligns them bit for bit
fn assert_same_bodies(cfg: &mut ScenarioConfig, preset: &ScenarioConfig) {
    assert_eq!(cfg.bodies.len(), preset.bodies.len());
    for (body, expected) in cfg.bodies.iter().zip(&preset.bodies) {
        assert_eq!(body.mass, expected.mass);
        assert_close(&body.position, &expected.position);
        assert_close(&body.velocity, &expected.velocity);
    }
    cfg.bodies = preset.bodies.clone();

    let seed = |cfg: &ScenarioConfig| cfg.guess.clone().and_then(|g| g.state).unwrap_or_default();
    assert_close(&seed(cfg), &seed(preset));
    cfg.guess = preset.guess.clone();
}

#[test]
fn planar_data_file_is_the_preset() {
    let mut cfg = ScenarioConfig::load(data_path("planar.yaml")).unwrap();
    let preset = ScenarioConfig::planar();
    assert_same_bodies(&mut cfg, &preset);
    assert_eq!(cfg, preset);
    assert!(cfg.solver.is_none());
    assert_eq!(cfg.solver_options(), SolverOptions::default());
}

#[test]
fn spatial_data_file() {
    let mut cfg = ScenarioConfig::load(data_path("spatial.yaml")).unwrap();
    let preset = ScenarioConfig::spatial();

    assert_eq!(cfg.dimension, Dimension::Spatial);
    assert_eq!(cfg.nodes, preset.nodes);
    assert_eq!(cfg.terminal_steps, 500);
    assert_eq!(cfg.target.plane, Some(OrbitalPlane::new(0.3, 0.2, -0.2)));
    assert_same_bodies(&mut cfg, &preset);

    // Solver options not in the file keep their defaults
    let options = cfg.solver_options();
    assert_eq!(options.max_iterations, 2000);
    assert_eq!(
        options.acceptable_iterations,
        SolverOptions::default().acceptable_iterations
    );

    cfg.into_scenario().unwrap();
}

#[test]
fn terminal_steps_default() {
    let mut yaml = serde_yaml::to_string(&ScenarioConfig::planar()).unwrap();
    yaml = yaml
        .lines()
        .filter(|line| !line.starts_with("terminal_steps"))
        .collect::<Vec<_>>()
        .join("\n");
    let cfg = ScenarioConfig::loads(&yaml).unwrap();
    assert_eq!(cfg.terminal_steps, 210);
}

#[test]
fn loading_errors() {
    assert!(matches!(
        ScenarioConfig::load(data_path("does_not_exist.yaml")),
        Err(ConfigError::ReadError { .. })
    ));
    assert!(matches!(
        ScenarioConfig::loads("horizon: [1, 2"),
        Err(ConfigError::ParseError { .. })
    ));
    assert!(matches!(
        ScenarioConfig::loads("horizon: 700.0\nnodes: 10\n"),
        Err(ConfigError::ParseError { .. })
    ));
}

#[rstest]
#[case::at_the_surface(100.0)]
#[case::inside_the_margin(105.0)]
#[case::on_the_margin(110.0)]
fn target_inside_safety_radius(#[case] radius: f64) {
    let mut cfg = ScenarioConfig::planar();
    cfg.target.radius = radius;
    match cfg.into_scenario() {
        Err(ConfigError::InvalidConfig { msg }) => assert!(msg.contains("safety radius")),
        other => panic!("expected the target to be rejected, got {other:?}"),
    }
}
