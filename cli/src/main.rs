//! buffer-sim - command-line driver for the buffer simulator
//!
//! Subcommands:
//! - `rollout`: run baseline-policy episodes, one JSON object per step
//! - `generate`: print synthetic vehicle-kind sequences
//! - `show-config`: print the effective configuration and its hash

mod policies;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use buffer_sim_core_rs::orchestrator::compute_config_hash;
use buffer_sim_core_rs::{
    EpisodeMetrics, Orchestrator, OrchestratorConfig, RngManager, SimulationError, Snapshot,
    VehicleGenerator, VehicleKind,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policies::PolicyArg;

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Parser)]
#[command(
    name = "buffer-sim",
    about = "Multi-line vehicle buffer simulator",
    version
)]
struct Cli {
    /// JSON config file (defaults used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override rng_seed from the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run episodes with a baseline policy
    Rollout {
        #[arg(long, value_enum, default_value = "greedy")]
        policy: PolicyArg,

        /// Step limit per episode
        #[arg(long, default_value_t = 200)]
        max_steps: usize,

        #[arg(long, default_value_t = 1)]
        episodes: usize,
    },

    /// Print synthetic vehicle-kind sequences
    Generate {
        /// Number of sequences
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Kinds per sequence
        #[arg(long, default_value_t = 20)]
        length: usize,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Serialize)]
struct StepRecord<'a> {
    episode: usize,
    step: usize,
    action: String,
    reward: f64,
    terminal: bool,
    snapshot: &'a Snapshot,
}

#[derive(Serialize)]
struct EpisodeSummary<'a> {
    episode: usize,
    terminal: bool,
    summary: &'a EpisodeMetrics,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<OrchestratorConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&text)?
        }
        None => OrchestratorConfig::default(),
    };

    if let Some(seed) = seed {
        config.rng_seed = seed;
    }
    Orchestrator::validate_config(&config)?;
    Ok(config)
}

fn rollout(
    config: OrchestratorConfig,
    policy: PolicyArg,
    max_steps: usize,
    episodes: usize,
) -> Result<(), CliError> {
    let mut policy = policies::build(policy, config.rng_seed);
    let mut engine = Orchestrator::new(config)?;

    for episode in 0..episodes {
        engine.reset();
        let mut terminal = false;

        for _ in 0..max_steps {
            let action = policy.choose(&engine);
            let result = engine.step(action)?;
            terminal = result.terminal;

            let record = StepRecord {
                episode,
                step: result.step,
                action: action.to_string(),
                reward: result.reward,
                terminal,
                snapshot: &result.snapshot,
            };
            println!("{}", serde_json::to_string(&record)?);

            if terminal {
                break;
            }
        }

        let metrics = engine.metrics();
        info!(
            episode,
            steps = metrics.steps,
            total_reward = metrics.total_reward,
            terminal,
            "episode finished"
        );
        let summary = EpisodeSummary {
            episode,
            terminal,
            summary: metrics,
        };
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}

fn generate(config: OrchestratorConfig, count: usize, length: usize) -> Result<(), CliError> {
    let generator = VehicleGenerator::new(config.kind_distribution.clone());
    let mut rng = RngManager::new(config.rng_seed);

    for _ in 0..count {
        let sequence: Vec<VehicleKind> = generator.generate_sequence(length, &mut rng);
        println!("{}", serde_json::to_string(&sequence)?);
    }
    Ok(())
}

fn show_config(config: &OrchestratorConfig) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    info!(config_hash = %compute_config_hash(config)?, "effective config");
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Command::Rollout {
            policy,
            max_steps,
            episodes,
        } => rollout(config, policy, max_steps, episodes),
        Command::Generate { count, length } => generate(config, count, length),
        Command::ShowConfig => show_config(&config),
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
