mod cli;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use field_engine::{FieldConfig, FieldEvaluator, Trial};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FieldArgs, RenderArgs, TrialArgs};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &FieldArgs) -> Result<FieldConfig> {
    let base = match &args.config {
        Some(path) => FieldConfig::load(path)
            .with_context(|| format!("loading preset {}", path.display()))?,
        None => FieldConfig::default(),
    };
    let config = args.apply(base);
    config.validate().context("invalid field configuration")?;
    Ok(config)
}

fn render(args: RenderArgs) -> Result<()> {
    let config = load_config(&args.field)?;
    let resolution = args.output.resolution();
    let block = config.parameter_block(
        resolution,
        args.origin * resolution,
        args.strength,
        args.noise_seed,
    );
    let evaluator = FieldEvaluator::new(block).context("building field evaluator")?;
    output::emit(&evaluator, &args.output)
}

fn trial(args: TrialArgs) -> Result<()> {
    let config = load_config(&args.field)?;
    let mut trial = Trial::new(config, args.output.resolution(), args.seed)?;
    let elapsed = Duration::try_from_secs_f32(args.time)
        .with_context(|| format!("invalid --time {}", args.time))?;
    if let Some(location) = args.guess {
        let decision = trial.guess(location, elapsed);
        println!("{}", serde_json::to_string_pretty(&decision)?);
    }
    let evaluator = trial.evaluator(elapsed).context("building field evaluator")?;
    output::emit(&evaluator, &args.output)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Trial(args) => trial(args),
        Commands::Config(args) => {
            let config = load_config(&args)?;
            println!("{}", config.to_ron_string()?);
            Ok(())
        }
    }
}
