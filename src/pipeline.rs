//! One-shot orchestration: config → trajectory → GIF + chart (+ CSV) → deck.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    deck::{Bullet, Deck, PictureRef, Slide},
    encode_gif::{GifConfig, GifWriter},
    error::{PendulaError, PendulaResult},
    export::write_trajectory_csv,
    model::{SimulationConfig, Trajectory},
    plot::{ChartStyle, save_angle_chart},
    render::{SceneStyle, render_scene},
    sim::integrate,
};

pub const GIF_FILE: &str = "pendulum.gif";
pub const CHART_FILE: &str = "theta_vs_time.png";
pub const DECK_FILE: &str = "pendulum.pptx";
pub const CSV_FILE: &str = "trajectory.csv";
pub const FRAMES_DIR: &str = "frames";

/// Everything needed to produce the artifacts for one run.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub simulation: SimulationConfig,
    pub scene: SceneStyle,
    pub chart: ChartStyle,
    pub animation: AnimationConfig,
}

/// Animation-layer knobs. The subsampling stride is a rendering concern and
/// never leaks into the integrator.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Render every `stride`-th sample.
    pub stride: usize,
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { stride: 10, fps: 20 }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> PendulaResult<()> {
        if self.stride == 0 {
            return Err(PendulaError::invalid_config("animation stride must be >= 1"));
        }
        if self.fps == 0 {
            return Err(PendulaError::invalid_config("animation fps must be >= 1"));
        }
        Ok(())
    }
}

impl StudioConfig {
    pub fn validate(&self) -> PendulaResult<()> {
        self.simulation.validate()?;
        self.scene.validate()?;
        self.chart.validate()?;
        self.animation.validate()?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RunOpts {
    pub out_dir: PathBuf,
    /// Also dump the subsampled frames as PNGs into `frames/`.
    pub keep_frames: bool,
    pub export_csv: bool,
    pub overwrite: bool,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("pendulum_output"),
            keep_frames: false,
            export_csv: false,
            overwrite: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunArtifacts {
    pub samples: usize,
    pub frames: u64,
    pub gif_path: PathBuf,
    pub chart_path: PathBuf,
    pub deck_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

/// Run the whole pipeline and return the artifact paths.
///
/// Directory creation is the only recovery behavior here; every other
/// failure surfaces immediately.
#[tracing::instrument(skip(cfg, opts), fields(out_dir = %opts.out_dir.display()))]
pub fn run(cfg: &StudioConfig, opts: &RunOpts) -> PendulaResult<RunArtifacts> {
    cfg.validate()?;
    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("failed to create '{}'", opts.out_dir.display()))?;

    let trajectory = integrate(&cfg.simulation)?;
    tracing::info!(samples = trajectory.len(), "trajectory ready");

    let gif_path = opts.out_dir.join(GIF_FILE);
    let gif_cfg = GifConfig {
        width: cfg.scene.width,
        height: cfg.scene.height,
        fps: cfg.animation.fps,
        out_path: gif_path.clone(),
        overwrite: opts.overwrite,
        loop_forever: true,
    };
    let frames_dir = opts.keep_frames.then(|| opts.out_dir.join(FRAMES_DIR));
    let frames = encode_animation(&trajectory, cfg, gif_cfg, frames_dir.as_deref())?;
    tracing::info!(frames, "animation encoded");

    let chart_path = opts.out_dir.join(CHART_FILE);
    save_angle_chart(&trajectory, &chart_path, &cfg.chart)?;

    let csv_path = if opts.export_csv {
        let path = opts.out_dir.join(CSV_FILE);
        write_trajectory_csv(&trajectory, &path)?;
        Some(path)
    } else {
        None
    };

    let deck_path = opts.out_dir.join(DECK_FILE);
    default_deck(&gif_path, &chart_path).write_pptx(&deck_path)?;
    tracing::info!(deck = %deck_path.display(), "deck written");

    Ok(RunArtifacts {
        samples: trajectory.len(),
        frames,
        gif_path,
        chart_path,
        deck_path,
        csv_path,
    })
}

/// Render the subsampled trajectory into an animated GIF, optionally dumping
/// each frame as a PNG into `frames_dir`.
pub fn encode_animation(
    trajectory: &Trajectory,
    cfg: &StudioConfig,
    gif_cfg: GifConfig,
    frames_dir: Option<&Path>,
) -> PendulaResult<u64> {
    cfg.animation.validate()?;
    if trajectory.is_empty() {
        return Err(PendulaError::render("cannot animate an empty trajectory"));
    }

    if let Some(dir) = frames_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create '{}'", dir.display()))?;
    }

    let mut writer = GifWriter::create(gif_cfg)?;
    for (i, sample) in trajectory.iter_stride(cfg.animation.stride).enumerate() {
        let frame = render_scene(sample, cfg.simulation.length, &cfg.scene)?;
        if let Some(dir) = frames_dir {
            let path = dir.join(format!("frame_{i:04}.png"));
            frame
                .save(&path)
                .map_err(|e| PendulaError::render(format!("failed to save '{}': {e}", path.display())))?;
        }
        writer.push_frame(frame)?;
    }
    writer.finish()
}

/// The fixed slide content of the generated presentation.
pub fn default_deck(gif_path: &Path, chart_path: &Path) -> Deck {
    Deck {
        slides: vec![
            Slide::lead(
                "Oscillations of a Simple Pendulum",
                "Physical model, numerical simulation, and animation",
            ),
            Slide::bullets(
                "1. Basic theory",
                vec![
                    Bullet::new("Equation of motion: d²θ/dt² + (g/L)·sinθ = 0", 0),
                    Bullet::new("For small angles: sinθ ≈ θ → simple harmonic motion", 1),
                    Bullet::new("Approximate solution: θ(t) = θ₀·cos(√(g/L)·t)", 1),
                ],
            ),
            Slide::picture(
                "2. Pendulum animation",
                PictureRef::new(gif_path, 1.5, 1.5, 6.0),
            ),
            Slide::picture(
                "3. Angle plot θ(t)",
                PictureRef::new(chart_path, 1.0, 1.5, 8.0),
            ),
            Slide::bullets(
                "4. Conclusions",
                vec![
                    Bullet::new(
                        "The simple pendulum is an example of periodic oscillatory motion",
                        0,
                    ),
                    Bullet::new(
                        "For small angles the period is independent of the amplitude",
                        1,
                    ),
                    Bullet::new("Large angles deviate from harmonic motion", 1),
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_config_validation_covers_all_sections() {
        let mut cfg = StudioConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.animation.stride = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = StudioConfig::default();
        cfg.simulation.dt = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_deck_has_five_slides_in_order() {
        let deck = default_deck(Path::new("a.gif"), Path::new("b.png"));
        assert_eq!(deck.slides.len(), 5);
        assert!(deck.slides[0].title.contains("Simple Pendulum"));
        assert!(deck.slides[2].title.contains("animation"));
        assert!(deck.slides[4].title.contains("Conclusions"));
        assert!(deck.validate().is_ok());
    }

    #[test]
    fn partial_json_config_fills_defaults() {
        let cfg: StudioConfig =
            serde_json::from_str(r#"{"animation": {"stride": 5}}"#).unwrap();
        assert_eq!(cfg.animation.stride, 5);
        assert_eq!(cfg.animation.fps, 20);
        assert_eq!(cfg.simulation.t_max, 10.0);
    }
}
