use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pendula", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the pendulum scene at a given time as a PNG.
    Frame(FrameArgs),
    /// Render the trajectory as an animated GIF.
    Animate(AnimateArgs),
    /// Plot the angle-over-time chart as a PNG.
    Chart(ChartArgs),
    /// Export the trajectory columns as CSV.
    Export(ExportArgs),
    /// Produce every artifact and assemble the slide deck.
    Deck(DeckArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; missing sections fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gravitational acceleration (m/s^2).
    #[arg(long)]
    g: Option<f64>,

    /// Rod length (m).
    #[arg(long)]
    length: Option<f64>,

    /// Initial angle (rad).
    #[arg(long)]
    theta0: Option<f64>,

    /// Initial angular velocity (rad/s).
    #[arg(long)]
    omega0: Option<f64>,

    /// Total simulated time (s).
    #[arg(long)]
    t_max: Option<f64>,

    /// Integration step (s).
    #[arg(long)]
    dt: Option<f64>,

    /// Render every Nth sample into the animation.
    #[arg(long)]
    stride: Option<usize>,

    /// Animation frame rate.
    #[arg(long)]
    fps: Option<u32>,
}

impl ConfigArgs {
    fn resolve(&self) -> anyhow::Result<pendula::StudioConfig> {
        let mut cfg = match &self.config {
            Some(path) => read_config_json(path)?,
            None => pendula::StudioConfig::default(),
        };

        if let Some(g) = self.g {
            cfg.simulation.g = g;
        }
        if let Some(length) = self.length {
            cfg.simulation.length = length;
        }
        if let Some(theta0) = self.theta0 {
            cfg.simulation.theta0 = theta0;
        }
        if let Some(omega0) = self.omega0 {
            cfg.simulation.omega0 = omega0;
        }
        if let Some(t_max) = self.t_max {
            cfg.simulation.t_max = t_max;
        }
        if let Some(dt) = self.dt {
            cfg.simulation.dt = dt;
        }
        if let Some(stride) = self.stride {
            cfg.animation.stride = stride;
        }
        if let Some(fps) = self.fps {
            cfg.animation.fps = fps;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Time (s) of the sample to render; the nearest sample is used.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct AnimateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output CSV path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DeckArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output directory for every artifact.
    #[arg(long, default_value = "pendulum_output")]
    out_dir: PathBuf,

    /// Also dump the rendered frames as PNGs.
    #[arg(long)]
    keep_frames: bool,

    /// Also export the trajectory as CSV.
    #[arg(long)]
    csv: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Animate(args) => cmd_animate(args),
        Command::Chart(args) => cmd_chart(args),
        Command::Export(args) => cmd_export(args),
        Command::Deck(args) => cmd_deck(args),
    }
}

fn read_config_json(path: &Path) -> anyhow::Result<pendula::StudioConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cfg: pendula::StudioConfig =
        serde_json::from_reader(r).with_context(|| "parse config JSON")?;
    Ok(cfg)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let trajectory = pendula::integrate(&cfg.simulation)?;

    let sample = trajectory
        .iter()
        .min_by(|a, b| {
            let da = (a.t - args.time).abs();
            let db = (b.t - args.time).abs();
            da.total_cmp(&db)
        })
        .context("trajectory is empty")?;

    let frame = pendula::render_scene(sample, cfg.simulation.length, &cfg.scene)?;
    ensure_parent(&args.out)?;
    frame
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let trajectory = pendula::integrate(&cfg.simulation)?;

    let gif_cfg = pendula::default_gif_config(
        &args.out,
        cfg.scene.width,
        cfg.scene.height,
        cfg.animation.fps,
    );
    let frames = pendula::encode_animation(&trajectory, &cfg, gif_cfg, None)?;

    eprintln!("wrote {} ({frames} frames)", args.out.display());
    Ok(())
}

fn cmd_chart(args: ChartArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let trajectory = pendula::integrate(&cfg.simulation)?;

    ensure_parent(&args.out)?;
    pendula::save_angle_chart(&trajectory, &args.out, &cfg.chart)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let trajectory = pendula::integrate(&cfg.simulation)?;

    pendula::write_trajectory_csv(&trajectory, &args.out)?;

    eprintln!("wrote {} ({} samples)", args.out.display(), trajectory.len());
    Ok(())
}

fn cmd_deck(args: DeckArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let opts = pendula::RunOpts {
        out_dir: args.out_dir,
        keep_frames: args.keep_frames,
        export_csv: args.csv,
        overwrite: true,
    };

    let artifacts = pendula::run(&cfg, &opts)?;

    eprintln!(
        "wrote {} ({} frames from {} samples)",
        artifacts.gif_path.display(),
        artifacts.frames,
        artifacts.samples
    );
    eprintln!("wrote {}", artifacts.chart_path.display());
    if let Some(csv) = &artifacts.csv_path {
        eprintln!("wrote {}", csv.display());
    }
    eprintln!("wrote {}", artifacts.deck_path.display());
    Ok(())
}
