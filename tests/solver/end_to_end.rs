use approx::assert_abs_diff_eq;
use insertion::io::ScenarioConfig;
use insertion::md::Transcription;
use insertion::opti::{InteriorPoint, NlpSolver, NonlinearProgram};
use insertion::Solution;

fn solve(cfg: &ScenarioConfig) -> (f64, Solution) {
    let problem = Transcription::new(cfg.into_scenario().unwrap())
        .build()
        .unwrap();
    let nlp_sol = InteriorPoint::new(cfg.solver_options())
        .solve(&problem)
        .unwrap();
    assert!(problem.max_violation(&nlp_sol.x) <= 1e-6);
    (nlp_sol.objective, problem.decode(&nlp_sol.x).unwrap())
}

#[cfg_attr(debug_assertions, ignore = "slow in debug builds, run with --release")]
#[test]
fn planar_insertion() {
    let _ = pretty_env_logger::try_init();
    let cfg = ScenarioConfig::planar();
    let (objective, sol) = solve(&cfg);
    println!("{sol}");

    let n = cfg.nodes;
    assert_abs_diff_eq!(sol.radius(n), 190.0, epsilon = 1e-4);
    assert_abs_diff_eq!(sol.speed(n), (0.0008_f64 * 1e6 / 190.0).sqrt(), epsilon = 1e-4);
    assert_abs_diff_eq!(sol.total_impulse(), objective, epsilon = 1e-12);
    assert!(sol
        .normalized_thrust()
        .iter()
        .all(|r| *r <= 1.0 + 1e-6));
    // Stable insertion: the coasting body stays on the target orbit
    assert!(sol.radius_drift() < 1e-2, "drift = {}", sol.radius_drift());
}

#[cfg_attr(debug_assertions, ignore = "slow in debug builds, run with --release")]
#[test]
fn refining_the_grid_does_not_lower_the_cost() {
    let _ = pretty_env_logger::try_init();
    let mut coarse = ScenarioConfig::planar();
    coarse.nodes = 60;
    let mut fine = coarse.clone();
    fine.nodes = 120;

    let (coarse_cost, _) = solve(&coarse);
    let (fine_cost, _) = solve(&fine);
    println!("N = 60: {coarse_cost:.9e}, N = 120: {fine_cost:.9e}");
    assert!(fine_cost >= coarse_cost * (1.0 - 0.05));
}
