use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use field_engine::{Dimensions, DistributionKind, FieldConfig};
use glam::{vec2, Vec2};

#[derive(Debug, Parser)]
#[command(name = "field_preview")]
#[command(about = "Render signal-in-noise fields without a window")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render one field with the signal at a fixed spot and strength.
    Render(RenderArgs),
    /// Replay a trial: the frame shown at `--time`, optionally after a guess.
    Trial(TrialArgs),
    /// Print the effective configuration as RON.
    Config(FieldArgs),
}

#[derive(Debug, Args)]
pub struct FieldArgs {
    /// RON or JSON preset; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Column chart (1d) or density map (2d).
    #[arg(long, value_enum)]
    pub mode: Option<Dimensions>,
    /// Size of individual cells in the grid as a fraction of the window size.
    /// Bigger = harder. Reasonable values between 0.001 - 0.25.
    #[arg(short = 'g', long)]
    pub cell_spacing: Option<f32>,
    /// Width of the signal as a fraction of the short window side (1d: of the width).
    /// Bigger = harder. Reasonable values between 0.01 - 4.0.
    #[arg(short = 'w', long)]
    pub signal_width: Option<f32>,
    /// Falloff shape of the signal around its origin.
    #[arg(long, value_enum)]
    pub signal_shape: Option<DistributionKind>,
    /// Average value of the noise floor as a fraction of full brightness.
    /// Bigger = harder. Reasonable values between 0.0 - 1.0.
    #[arg(short = 'l', long)]
    pub noise_floor: Option<f32>,
    /// Spread of the noise around the noise floor.
    /// Bigger = harder. Reasonable values between 0.0 - 0.5.
    #[arg(short = 'd', long)]
    pub noise_deviation: Option<f32>,
    /// Maximum number of spreads away from the noise floor that noise can reach.
    /// Bigger = harder. Reasonable values between 1.0 - 6.0.
    #[arg(short = 'c', long)]
    pub noise_deviation_cap: Option<f32>,
    /// Distribution the per-cell noise is drawn from.
    #[arg(long, value_enum)]
    pub noise_distribution: Option<DistributionKind>,
    /// Shape parameter of pareto noise; must be non-zero.
    /// Smaller = heavier tail. Reasonable values between 0.5 - 3.0.
    #[arg(long = "pareto-alpha")]
    pub noise_pareto_distribution_parameter: Option<f32>,
    /// Length of time in seconds each noise frame is shown.
    /// Bigger = harder. Reasonable values between 0.016 - 5.0.
    #[arg(short = 'f', long)]
    pub frame_length: Option<f32>,
    /// Approximate time in seconds until the signal approaches full strength.
    /// Bigger = harder. Reasonable values 1.0 and above.
    #[arg(short = 'r', long)]
    pub signal_ramp_duration: Option<f32>,
    /// Strength of the signal once at peak.
    /// Smaller = harder. Reasonable values between 0.0 - 1.0.
    #[arg(short = 's', long)]
    pub signal_max_strength: Option<f32>,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(long, default_value_t = 800)]
    pub width: u32,
    #[arg(long, default_value_t = 800)]
    pub height: u32,
    /// Write a PNG here.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Print a coarse preview with this many columns.
    #[arg(long)]
    pub ascii: Option<u32>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub field: FieldArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Signal origin in normalized coordinates, `x,y`.
    #[arg(long, value_parser = parse_point, default_value = "0.5,0.5")]
    pub origin: Vec2,
    #[arg(long, default_value_t = 1.0)]
    pub strength: f32,
    #[arg(long, default_value_t = 0.0)]
    pub noise_seed: f32,
}

#[derive(Debug, Args)]
pub struct TrialArgs {
    #[command(flatten)]
    pub field: FieldArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Seconds since the trial started.
    #[arg(long, default_value_t = 60.0)]
    pub time: f32,
    /// Seed for signal placement.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Guess location in pixels, `x,y`; scored and printed as JSON.
    #[arg(long, value_parser = parse_point)]
    pub guess: Option<Vec2>,
}

impl FieldArgs {
    pub fn apply(&self, mut config: FieldConfig) -> FieldConfig {
        if let Some(v) = self.mode {
            config.dimensions = v;
        }
        if let Some(v) = self.cell_spacing {
            config.cell_spacing = v;
        }
        if let Some(v) = self.signal_width {
            config.signal_width = v;
        }
        if let Some(v) = self.signal_shape {
            config.signal_shape = v;
        }
        if let Some(v) = self.noise_floor {
            config.noise_floor = v;
        }
        if let Some(v) = self.noise_deviation {
            config.noise_deviation = v;
        }
        if let Some(v) = self.noise_deviation_cap {
            config.noise_deviation_cap = v;
        }
        if let Some(v) = self.noise_distribution {
            config.noise_distribution = v;
        }
        if let Some(v) = self.noise_pareto_distribution_parameter {
            config.noise_pareto_distribution_parameter = v;
        }
        if let Some(v) = self.frame_length {
            config.frame_length = v;
        }
        if let Some(v) = self.signal_ramp_duration {
            config.signal_ramp_duration = v;
        }
        if let Some(v) = self.signal_max_strength {
            config.signal_max_strength = v;
        }
        config
    }
}

impl OutputArgs {
    pub fn resolution(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x {x:?}: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y {y:?}: {e}"))?;
    Ok(vec2(x, y))
}
