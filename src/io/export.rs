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

use crate::md::Solution;
use snafu::prelude::*;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("could not export the solution: {source}"))]
    CsvError { source: csv::Error },
    #[snafu(display("I/O error while exporting the solution: {source}"))]
    IoError { source: std::io::Error },
}

/// Column headers: time, every state component, every control component.
fn headers(solution: &Solution) -> Vec<String> {
    const AXES: [&str; 3] = ["x", "y", "z"];
    let layout = &solution.layout;
    let mut hdrs = vec!["t".to_string()];
    for prefix in ["", "v"] {
        for body in 0..layout.n_body {
            for axis in &AXES[..layout.dim()] {
                hdrs.push(format!("body{body}_{prefix}{axis}"));
            }
        }
    }
    hdrs.push("thrust".to_string());
    for angle in 0..layout.angle_count() {
        hdrs.push(format!("angle{angle}"));
    }
    hdrs
}

/// Writes the extended trajectory and controls of `solution` as CSV, one row per step.
pub fn write_csv<W: Write>(solution: &Solution, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(solution)).context(CsvSnafu)?;

    for (row, t) in solution.epochs().into_iter().enumerate() {
        let mut record = vec![t];
        record.extend(solution.extended_trajectory.row(row).iter());
        record.extend(solution.extended_controls.row(row).iter());
        wtr.serialize(record).context(CsvSnafu)?;
    }
    wtr.flush().context(IoSnafu)
}

/// Exports `solution` to a CSV file at `path`.
pub fn export_csv<P: AsRef<Path>>(solution: &Solution, path: P) -> Result<(), ExportError> {
    let wtr = std::fs::File::create(path.as_ref()).context(IoSnafu)?;
    write_csv(solution, wtr)?;
    info!("Saved solution to {}", path.as_ref().display());
    Ok(())
}
