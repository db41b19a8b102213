use std::{
    cell::Cell,
    io::{self, BufRead, Write},
    path::PathBuf,
    rc::Rc,
    thread,
};

use animate_core::{
    AnimationConfig, AppConfig, Controls, Direction, Easing, PlaybackClock, ScriptedFrames, Tick,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: usize = 40;
const MAX_SAMPLE_FRAMES: f64 = 1_000_000.0;

fn main() -> animate_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { animation } => run_play(&animation.resolve()?),
        Commands::Sample {
            animation,
            interval,
        } => run_sample(&animation.resolve()?, interval),
        Commands::Curves { steps } => run_curves(steps),
    }
}

fn run_play(config: &AppConfig) -> animate_core::Result<()> {
    let settings = &config.animation;
    tracing::info!(
        from = settings.from,
        to = settings.to,
        duration_ms = settings.duration_ms,
        fps = config.frames.fps,
        "starting playback; type p (pause), c (continue), r (restart) or s (stop) + enter"
    );

    let (low, high) = if settings.from <= settings.to {
        (settings.from, settings.to)
    } else {
        (settings.to, settings.from)
    };
    let finished = Rc::new(Cell::new(false));
    let done_flag = finished.clone();

    let mut animation = settings
        .builder()
        .on_transition(move |tick| {
            let span = high - low;
            let fill = if span > 0.0 {
                ((tick.value - low) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            if let Err(err) = draw_bar(fill, tick) {
                tracing::debug!(%err, "failed to draw progress bar");
            }
        })
        .on_done(move || done_flag.set(true))
        .build()?;

    spawn_keyboard(animation.controls());
    animation.start(PlaybackClock::with_fps(config.frames.fps));
    println!();

    if finished.get() {
        tracing::info!("animation finished");
    } else {
        tracing::info!("animation stopped before completion");
    }
    Ok(())
}

fn draw_bar(fill: f64, tick: Tick) -> io::Result<()> {
    let filled = (fill * BAR_WIDTH as f64).round() as usize;
    let mut out = io::stdout().lock();
    write!(
        out,
        "\r[{}{}] {:>5.1}% value {:>12.4}",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        tick.progress * 100.0,
        tick.value
    )?;
    out.flush()
}

fn run_sample(config: &AppConfig, interval: f64) -> animate_core::Result<()> {
    let settings = &config.animation;
    let mut animation = settings
        .builder()
        .on_transition(|tick| match serde_json::to_string(&tick) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::error!(%err, "failed to encode tick"),
        })
        .on_done(|| tracing::debug!("sampled animation complete"))
        .build()?;

    animation.start(sample_frames(settings, interval)?);
    Ok(())
}

/// Synthetic frames at `interval` that outlast every iteration. Each
/// iteration restarts on the first frame at or past its duration, so it may
/// take one frame more than `duration / interval`.
fn sample_frames(
    settings: &AnimationConfig,
    interval: f64,
) -> animate_core::Result<ScriptedFrames> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err("sample interval must be positive".into());
    }

    let per_iteration = (settings.duration_ms / interval).ceil() + 1.0;
    let frames = per_iteration * f64::from(settings.iteration_count.max(1));
    if !frames.is_finite() || frames > MAX_SAMPLE_FRAMES {
        return Err(format!(
            "sampling would take {frames} frames, more than the limit of {MAX_SAMPLE_FRAMES}; \
             use a larger --interval"
        )
        .into());
    }

    Ok(ScriptedFrames::every(interval, frames * interval))
}

fn run_curves(steps: usize) -> animate_core::Result<()> {
    let steps = steps.max(1);
    for easing in Easing::ALL {
        let samples: Vec<String> = (0..=steps)
            .map(|i| format!("{:.3}", easing.apply(i as f64 / steps as f64)))
            .collect();
        println!("{:<18} {}", easing.name(), samples.join(" "));
    }
    Ok(())
}

fn spawn_keyboard(controls: Controls) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match line.trim() {
                "p" => controls.pause(),
                "c" => controls.resume(),
                "r" => controls.restart(),
                "s" => {
                    controls.stop();
                    break;
                }
                "" => {}
                other => tracing::warn!(command = other, "unknown control command"),
            }
        }
    });
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Frame-driven value interpolation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an animation in real time, reading controls from stdin.
    Play {
        #[command(flatten)]
        animation: AnimationArgs,
    },
    /// Drive an animation with evenly spaced synthetic frames and print each
    /// tick as a JSON line.
    Sample {
        #[command(flatten)]
        animation: AnimationArgs,
        /// Milliseconds between synthetic frames.
        #[arg(long, default_value_t = 100.0)]
        interval: f64,
    },
    /// List the available easing curves with a few sample points.
    Curves {
        /// Number of intervals to sample on [0, 1].
        #[arg(long, default_value_t = 4)]
        steps: usize,
    },
}

/// Playback parameters; flags override values read from `--config`.
#[derive(Args, Debug)]
struct AnimationArgs {
    /// JSON config file to start from.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, allow_hyphen_values = true)]
    from: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    to: Option<f64>,
    /// Milliseconds per iteration.
    #[arg(short, long)]
    duration: Option<f64>,
    #[arg(short, long)]
    iterations: Option<u32>,
    /// Easing curve name, e.g. `easeInOutQuad`.
    #[arg(short, long)]
    easing: Option<String>,
    /// normal, reverse, alternate or alternate-reverse.
    #[arg(long)]
    direction: Option<Direction>,
    /// Frames per second for real-time playback.
    #[arg(long)]
    fps: Option<u32>,
}

impl AnimationArgs {
    fn resolve(&self) -> animate_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };

        let animation = &mut config.animation;
        if let Some(from) = self.from {
            animation.from = from;
        }
        if let Some(to) = self.to {
            animation.to = to;
        }
        if let Some(duration) = self.duration {
            animation.duration_ms = duration;
        }
        if let Some(iterations) = self.iterations {
            animation.iteration_count = iterations;
        }
        if let Some(easing) = &self.easing {
            animation.easing = Some(easing.clone());
        }
        if let Some(direction) = self.direction {
            animation.direction = direction;
        }
        if let Some(fps) = self.fps {
            config.frames.fps = fps;
        }

        Ok(config)
    }
}
