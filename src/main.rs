//! Demo binary: a color ramp (or an image) stretched into a window.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use image::RgbaImage;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use stretch_canvas::{CanvasApp, CanvasWindow, Configuration, Display, StretchPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StretchArg {
    /// Draw the canvas at native size
    #[value(name = "none")]
    Native,
    /// Fill the window, ignoring aspect ratio
    Full,
    /// Preserve aspect, fitting the larger canvas side
    Larger,
    /// Preserve aspect, fitting the smaller canvas side
    Smaller,
}

impl From<StretchArg> for StretchPolicy {
    fn from(arg: StretchArg) -> Self {
        match arg {
            StretchArg::Native => StretchPolicy::NoStretch,
            StretchArg::Full => StretchPolicy::Full,
            StretchArg::Larger => StretchPolicy::LargerBorder,
            StretchArg::Smaller => StretchPolicy::SmallerBorder,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stretch-canvas", version, about = "Stretch a pixel canvas into a window")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured stretch policy
    #[arg(short, long, value_enum)]
    stretch: Option<StretchArg>,

    /// Show this image instead of the color ramp
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// Step through the stretch policies at this interval (e.g. "2s")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    cycle: Option<Duration>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("stretch_canvas={level}").parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

/// Advances the stretch policy on a fixed interval.
struct PolicyCycle {
    every: Duration,
    last: Instant,
}

impl PolicyCycle {
    fn tick(&mut self, window: &mut CanvasWindow) -> Result<()> {
        if self.last.elapsed() < self.every {
            return Ok(());
        }
        self.last = Instant::now();
        let next = window.engine().policy().next();
        window.set_stretch(next)?;
        info!(policy = ?next, rect = ?window.fitted_rect(), "stretch policy cycled");
        Ok(())
    }
}

/// Every channel climbs by `STEP` per frame and drops back to black past 1.0.
struct Ramp {
    channels: Vec<f32>,
    cycle: Option<PolicyCycle>,
}

impl Ramp {
    const STEP: f32 = 0.01;
}

impl CanvasApp for Ramp {
    fn init(&mut self, window: &mut CanvasWindow) -> Result<()> {
        let canvas = window.engine().canvas().size();
        self.channels = vec![0.0; canvas.pixel_count() as usize * 3];
        Ok(())
    }

    fn update(&mut self, window: &mut CanvasWindow) -> Result<()> {
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.tick(window)?;
        }
        window.update_canvas(&self.channels)?;
        for value in &mut self.channels {
            *value += Self::STEP;
            if *value > 1.0 {
                *value = 0.0;
            }
        }
        Ok(())
    }
}

struct Still {
    image: RgbaImage,
    cycle: Option<PolicyCycle>,
}

impl CanvasApp for Still {
    fn init(&mut self, window: &mut CanvasWindow) -> Result<()> {
        window.update_canvas_from_image(&self.image)?;
        Ok(())
    }

    fn update(&mut self, window: &mut CanvasWindow) -> Result<()> {
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.tick(window)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(stretch) = cli.stretch {
        cfg.stretch = stretch.into();
    }
    let cfg = cfg.validated().context("validating configuration")?;
    info!(
        frame_interval = %humantime::format_duration(cfg.frame_interval),
        stretch = ?cfg.stretch,
        "configuration loaded",
    );

    let cycle = cli.cycle.map(|every| PolicyCycle {
        every,
        last: Instant::now(),
    });

    let display = Display::new().context("failed to initialize display")?;
    match &cli.image {
        Some(path) => {
            let image = image::open(path)
                .with_context(|| format!("failed to open image {}", path.display()))?
                .into_rgba8();
            display.run(cfg, Still { image, cycle })
        }
        None => display.run(
            cfg,
            Ramp {
                channels: Vec::new(),
                cycle,
            },
        ),
    }
}
