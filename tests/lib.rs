extern crate orbit_insertion as insertion;

mod config;
mod decoding;
mod solver;
mod transcription;

use insertion::io::{BodyConfig, ScenarioConfig};
use std::path::PathBuf;

/// Path to a file of the data directory
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()))
        .join("data")
        .join(name)
}

/// Planar preset with a second, passive body on a wide orbit, guessed from its initial state
pub fn two_body_planar() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::planar();
    cfg.guess = None;
    cfg.bodies.push(BodyConfig {
        mass: 0.01,
        position: vec![-250.0, 0.0],
        velocity: vec![0.0, -1.78],
    });
    cfg
}
