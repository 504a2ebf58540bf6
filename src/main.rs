//! tradelabel CLI: triple-barrier labeling and rolling-horizon splits.
//!
//! Commands:
//! - `label`: label one ticker's price file and write the labeled CSV
//! - `split`: split an existing labeled CSV into train/test folds
//! - `run`: label and split one or more experiments in parallel
//! - `generate-configs`: write per-ticker experiment configs from a universe

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tradelabel::config::{generate_ticker_configs, ConfigManager, UniverseConfig};
use tradelabel::engines::{run_batch, ExperimentOrchestrator};

#[derive(Parser)]
#[command(
    name = "tradelabel",
    about = "Triple-barrier labeling and rolling-horizon splitting for price series"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label a price series and write the labeled CSV.
    Label {
        /// Experiment config (YAML, JSON or TOML).
        #[arg(long)]
        config: PathBuf,
    },
    /// Split a labeled CSV into train/test folds.
    Split {
        /// Experiment config (YAML, JSON or TOML).
        #[arg(long)]
        config: PathBuf,
    },
    /// Label and split every given experiment, in parallel.
    Run {
        /// One or more experiment configs.
        #[arg(long, required = true, num_args = 1..)]
        config: Vec<PathBuf>,
    },
    /// Generate `<TICKER>_experiment.json` files from a universe and a template.
    GenerateConfigs {
        /// Universe file listing tickers.
        #[arg(long)]
        universe: PathBuf,

        /// Template experiment config.
        #[arg(long)]
        template: PathBuf,

        /// Output directory for generated configs.
        #[arg(long, default_value = "configs")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Label { config } => run_label(config),
        Commands::Split { config } => run_split(config),
        Commands::Run { config } => run_experiments(config),
        Commands::GenerateConfigs {
            universe,
            template,
            output_dir,
        } => run_generate(universe, template, output_dir),
    }
}

fn orchestrator(path: &Path) -> Result<ExperimentOrchestrator> {
    let config = ConfigManager::load_from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    Ok(ExperimentOrchestrator::new(config)?)
}

fn run_label(config: PathBuf) -> Result<()> {
    let orchestrator = orchestrator(&config)?;
    match orchestrator.label_ticker()? {
        Some(records) => println!(
            "Labeled {} records -> {}",
            records.len(),
            orchestrator.config().labeling_output().display()
        ),
        None => println!("Labeling disabled for {}", orchestrator.config().ticker),
    }
    Ok(())
}

fn run_split(config: PathBuf) -> Result<()> {
    let orchestrator = orchestrator(&config)?;
    let summary = orchestrator.split_ticker()?;
    println!(
        "{}: {} folds from {} records -> {}",
        summary.ticker, summary.rolling.fold_count, summary.record_count, summary.save_dir
    );
    if let Some(cpcv) = &summary.cpcv {
        println!("{}: {} CPCV folds", summary.ticker, cpcv.fold_count);
    }
    Ok(())
}

fn run_experiments(paths: Vec<PathBuf>) -> Result<()> {
    let mut configs = Vec::with_capacity(paths.len());
    for path in &paths {
        let config = ConfigManager::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?;
        configs.push(config);
    }

    let outcomes = run_batch(configs);
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "{:<8} ok      {:>6} records {:>4} folds",
                outcome.ticker, summary.record_count, summary.rolling.fold_count
            ),
            Err(e) => println!("{:<8} FAILED  {}", outcome.ticker, e),
        }
    }

    if failed > 0 {
        bail!("{} of {} experiments failed", failed, outcomes.len());
    }
    Ok(())
}

fn run_generate(universe: PathBuf, template: PathBuf, output_dir: PathBuf) -> Result<()> {
    let universe = UniverseConfig::load(&universe)
        .with_context(|| format!("loading universe {}", universe.display()))?;
    let template = ConfigManager::load_from_file(&template)
        .with_context(|| format!("loading template {}", template.display()))?;

    let generated = generate_ticker_configs(&universe, &template, &output_dir)?;
    println!("Generated {} configs in {}", generated.len(), output_dir.display());
    Ok(())
}
