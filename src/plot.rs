//! Static chart of the angle time series.

use std::path::Path;

use plotters::prelude::*;

use crate::{
    error::{PendulaError, PendulaResult},
    model::Trajectory,
    render::draw_err,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub line_rgb: [u8; 3],
    pub caption: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            line_rgb: [30, 90, 200],
            caption: "Pendulum angle over time".to_string(),
        }
    }
}

impl ChartStyle {
    pub fn validate(&self) -> PendulaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PendulaError::invalid_config(
                "chart width/height must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Plot `theta(t)` for the full trajectory into a PNG at `path`.
pub fn save_angle_chart(
    trajectory: &Trajectory,
    path: &Path,
    style: &ChartStyle,
) -> PendulaResult<()> {
    style.validate()?;
    if trajectory.len() < 2 {
        return Err(PendulaError::render(
            "chart needs a trajectory with at least two samples",
        ));
    }

    let t0 = trajectory.first().map(|s| s.t).unwrap_or(0.0);
    let t1 = trajectory.last().map(|s| s.t).unwrap_or(0.0);

    let mut theta_min = f64::INFINITY;
    let mut theta_max = f64::NEG_INFINITY;
    for s in trajectory.iter() {
        theta_min = theta_min.min(s.theta);
        theta_max = theta_max.max(s.theta);
    }
    let pad = 0.05 * (theta_max - theta_min).abs().max(1e-9);
    theta_min -= pad;
    theta_max += pad;

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(&style.caption, ("sans-serif", 28))
        .x_label_area_size(42)
        .y_label_area_size(58)
        .build_cartesian_2d(t0..t1, theta_min..theta_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Angle θ (rad)")
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 14))
        .light_line_style(RGBColor(225, 225, 225).stroke_width(1))
        .draw()
        .map_err(draw_err)?;

    let line = RGBColor(style.line_rgb[0], style.line_rgb[1], style.line_rgb[2]);
    chart
        .draw_series(LineSeries::new(
            trajectory.angle_series(),
            line.stroke_width(2),
        ))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
