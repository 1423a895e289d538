//! Per-sample scene rendering: pivot, rod, and bob drawn into an RGBA frame.

use image::RgbaImage;
use plotters::prelude::*;

use crate::{
    error::{PendulaError, PendulaResult},
    model::StateSample,
};

/// Visual style for rendered pendulum frames.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    pub width: u32,
    pub height: u32,
    /// Extra world-space border around the swing envelope (m).
    pub margin: f64,
    pub rod_width: u32,
    pub bob_radius: u32,
    pub rod_rgb: [u8; 3],
    pub bob_rgb: [u8; 3],
    /// Draw a `t = {:.1} s` caption above the scene.
    pub caption: bool,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            margin: 0.2,
            rod_width: 2,
            bob_radius: 8,
            rod_rgb: [0, 0, 0],
            bob_rgb: [220, 40, 40],
            caption: true,
        }
    }
}

impl SceneStyle {
    pub fn validate(&self) -> PendulaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PendulaError::invalid_config(
                "scene width/height must be non-zero",
            ));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(PendulaError::invalid_config(
                "scene margin must be finite and >= 0",
            ));
        }
        if self.rod_width == 0 || self.bob_radius == 0 {
            return Err(PendulaError::invalid_config(
                "scene rod_width/bob_radius must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Render one sample: white background, rod from the pivot at the world
/// origin down to the bob at `(x, y)`.
///
/// The world window is `x in [-L - margin, L + margin]`,
/// `y in [-L - margin, margin]`, so the rest position hangs at the bottom
/// center of the frame. Pure function of its inputs.
pub fn render_scene(
    sample: &StateSample,
    length: f64,
    style: &SceneStyle,
) -> PendulaResult<RgbaImage> {
    style.validate()?;
    if !(length > 0.0) {
        return Err(PendulaError::render("length must be > 0"));
    }

    let (w, h) = (style.width, style.height);
    let mut buf = vec![0u8; (w as usize) * (h as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let x_range = (-length - style.margin)..(length + style.margin);
        let y_range = (-length - style.margin)..style.margin;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(8);
        if style.caption {
            builder.caption(
                format!("Simple pendulum (t = {:.1} s)", sample.t),
                ("sans-serif", 18),
            );
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        let rod = RGBColor(style.rod_rgb[0], style.rod_rgb[1], style.rod_rgb[2]);
        let bob = RGBColor(style.bob_rgb[0], style.bob_rgb[1], style.bob_rgb[2]);

        chart
            .draw_series(LineSeries::new(
                [(0.0, 0.0), (sample.x, sample.y)],
                rod.stroke_width(style.rod_width),
            ))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Circle::new(
                (sample.x, sample.y),
                style.bob_radius as i32,
                bob.filled(),
            )))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    rgb_to_rgba(w, h, &buf)
}

pub(crate) fn draw_err(e: impl std::fmt::Display) -> PendulaError {
    PendulaError::render(e.to_string())
}

fn rgb_to_rgba(width: u32, height: u32, rgb: &[u8]) -> PendulaResult<RgbaImage> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| PendulaError::render("frame buffer size mismatch (bug)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StateSample;

    fn style_no_caption() -> SceneStyle {
        SceneStyle {
            width: 120,
            height: 120,
            caption: false,
            ..Default::default()
        }
    }

    #[test]
    fn style_validation_catches_bad_values() {
        assert!(
            SceneStyle {
                width: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            SceneStyle {
                margin: -0.1,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            SceneStyle {
                bob_radius: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn rest_frame_has_bob_pixels_below_center() {
        let sample = StateSample::from_angular(0.0, 0.0, 0.0, 1.0);
        let style = style_no_caption();
        let frame = render_scene(&sample, 1.0, &style).unwrap();
        assert_eq!(frame.width(), 120);
        assert_eq!(frame.height(), 120);

        let bob = image::Rgba([style.bob_rgb[0], style.bob_rgb[1], style.bob_rgb[2], 255]);
        let mut bob_rows = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == bob)
            .map(|(_, y, _)| y);
        assert!(bob_rows.all(|y| y > 60), "bob must hang below mid-frame");
        assert!(
            frame.pixels().any(|p| *p == bob),
            "bob color must appear in the frame"
        );
        assert!(
            frame.pixels().any(|p| *p == image::Rgba([255, 255, 255, 255])),
            "background must stay white"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let sample = StateSample::from_angular(1.2, 0.25, -0.4, 1.0);
        let style = style_no_caption();
        let a = render_scene(&sample, 1.0, &style).unwrap();
        let b = render_scene(&sample, 1.0, &style).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn rejects_nonpositive_length() {
        let sample = StateSample::from_angular(0.0, 0.0, 0.0, 1.0);
        assert!(render_scene(&sample, 0.0, &style_no_caption()).is_err());
    }
}
