use std::path::PathBuf;

use anyhow::Context as _;
use backdrop::{presets, ExportOptions, ParamSet, Sanitize as _, SanitizeReport, Scene, Time, Viewport};
use clap::Parser;

/// Run a backdrop headlessly and write a standalone HTML export.
#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Parameter set JSON. Defaults are used when omitted.
    params: Option<PathBuf>,

    /// Output HTML path.
    #[arg(default_value = "backdrop-export.html")]
    out: PathBuf,

    /// Start from a named preset instead of a parameter file.
    #[arg(long, conflicts_with = "params")]
    preset: Option<String>,

    /// Frames to simulate before exporting.
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Fixed frame step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Clock multiplier applied to every step. 0 freezes the animation.
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,

    /// Seed for the random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Viewport size in pixels.
    #[arg(long, default_value_t = 1600)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Skip the sanitizer after each update.
    #[arg(long, default_value_t = false)]
    no_sanitize: bool,

    /// Title of the exported page.
    #[arg(long)]
    title: Option<String>,
}

fn load_params(cli: &Cli) -> anyhow::Result<ParamSet> {
    if let Some(name) = &cli.preset {
        let preset = presets::find(name).with_context(|| format!("unknown preset {name:?}"))?;
        return Ok((preset.params)());
    }
    match &cli.params {
        Some(path) => ParamSet::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(ParamSet::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let params = load_params(&cli)?;
    let viewport = Viewport::new(cli.width, cli.height);
    tracing::info!(pattern = %params.pattern, frames = cli.frames, "starting headless run");

    let mut scene = match cli.seed {
        Some(seed) => Scene::with_seed(params, viewport, seed),
        None => Scene::new(params, viewport),
    };
    scene.set_sanitize_enabled(!cli.no_sanitize);

    let mut time = Time::new();
    time.set_fixed_delta(Some(cli.dt));
    time.set_time_scale(cli.time_scale);

    let mut total = SanitizeReport::default();
    for _ in 0..cli.frames {
        let report = scene.advance(time.update());
        if !report.sanitize.is_clean() {
            tracing::debug!(
                elapsed = report.frame.elapsed,
                repaired = report.sanitize.repaired,
                discarded = report.sanitize.discarded_entities,
                "sanitized frame"
            );
        }
        total.merge(report.sanitize);
    }

    if cli.no_sanitize {
        // Report what the sanitizer would have caught, without touching the scene.
        if let Some(mut pattern) = scene.active().cloned() {
            total.merge(pattern.sanitize());
        }
    }

    tracing::info!(
        frames = time.frame(),
        elapsed = time.elapsed(),
        elements = scene.active().map_or(0, |p| p.element_count()),
        repaired = total.repaired,
        discarded = total.discarded_entities,
        surface_dropped = total.discarded_surface,
        "run complete"
    );

    let mut options = ExportOptions::default();
    if let Some(title) = cli.title {
        options.title = title;
    }
    backdrop::write_html(&cli.out, scene.params(), &options)?;
    Ok(())
}
