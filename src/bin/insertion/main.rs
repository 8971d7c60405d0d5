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

extern crate clap;
extern crate log;
extern crate orbit_insertion as insertion;
extern crate pretty_env_logger;

use clap::{Parser, ValueEnum};
use insertion::io::{export_csv, ConfigRepr, ScenarioConfig};
use insertion::md::Transcription;
use insertion::opti::{InteriorPoint, NlpSolver};
use insertion::InsertionError;
use log::{error, info};
use std::env::{set_var, var};
use std::path::PathBuf;

const LOG_VAR: &str = "INSERTION_LOG";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Planar,
    Spatial,
}

/// Minimum-fuel low-thrust insertion into a circular orbit.
#[derive(Debug, Parser)]
#[command(name = "insertion", version, about)]
struct Cli {
    /// Scenario file (YAML)
    #[arg(conflicts_with = "preset", required_unless_present = "preset")]
    scenario: Option<PathBuf>,

    /// Run one of the built-in scenarios instead of a scenario file
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Where to write the solution as CSV
    #[arg(short, long, default_value = "solution.csv")]
    output: PathBuf,

    /// Overrides the constraint tolerance of the solver
    #[arg(short, long)]
    tolerance: Option<f64>,
}

fn run(cli: Cli) -> Result<(), InsertionError> {
    let cfg = match (&cli.scenario, cli.preset) {
        (Some(path), _) => {
            info!("Loading scenario `{}`", path.display());
            ScenarioConfig::load(path)?
        }
        (None, Some(Preset::Spatial)) => ScenarioConfig::spatial(),
        (None, _) => ScenarioConfig::planar(),
    };

    let scenario = cfg.into_scenario()?;
    info!("{scenario}");

    let problem = Transcription::new(scenario).build()?;
    let mut options = cfg.solver_options();
    if let Some(tolerance) = cli.tolerance {
        options.constraint_tolerance = tolerance;
    }
    let solver = InteriorPoint::new(options);
    info!("{solver}");

    let nlp_sol = solver.solve(&problem)?;
    info!("{nlp_sol}");

    let solution = problem.decode(&nlp_sol.x)?;
    println!("{solution}");

    export_csv(&solution, &cli.output)?;
    Ok(())
}

fn main() -> Result<(), InsertionError> {
    let cli = Cli::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    run(cli).map_err(|e| {
        error!("{e}");
        e
    })
}
