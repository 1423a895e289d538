//! CSV export of the trajectory columns.

use std::path::Path;

use anyhow::Context as _;

use crate::{encode_gif::ensure_parent_dir, error::PendulaResult, model::Trajectory};

/// Write the trajectory as `t,theta,omega,x,y` rows, one per sample.
///
/// Write-only telemetry; nothing in the crate reads this back.
pub fn write_trajectory_csv(trajectory: &Trajectory, path: &Path) -> PendulaResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?;

    writer
        .write_record(["t", "theta", "omega", "x", "y"])
        .context("failed to write csv header")?;
    for s in trajectory.iter() {
        writer
            .write_record([
                s.t.to_string(),
                s.theta.to_string(),
                s.omega.to_string(),
                s.x.to_string(),
                s.y.to_string(),
            ])
            .context("failed to write csv row")?;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(())
}
