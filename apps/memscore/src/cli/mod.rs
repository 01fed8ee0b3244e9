//! # Memory Score CLI Module
//!
//! This module implements the CLI interface for Memory Score.
//!
//! ## Available Commands
//!
//! - `stages` - List the stage schema
//! - `score` - Score metric inputs per stage and overall
//! - `decay` - Project the overall score forward without reinforcement
//! - `compare` - Gap analysis against a competitor or a flat benchmark
//! - `report` - Full diagnosis with priority interventions

mod commands;

use crate::config::Config;
use crate::error::CliError;
use clap::{Args, Parser, Subcommand};
use memscore_core::Engine;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Memory Score - brand memory diagnostic
///
/// Scores brand metrics across the memory lifecycle (create, expand,
/// strengthen, retrieve, reinstate, defend) and derives the overall score,
/// decay outlook and competitive gaps.
#[derive(Parser, Debug)]
#[command(name = "memscore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Stage schema: "diagnostic", "dynamic" or a path to a TOML schema
    #[arg(short = 'S', long, global = true, default_value = "diagnostic")]
    pub schema: String,

    /// Path to a TOML config file (defaults to memscore.toml if present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stages, signals and benchmarks of the schema
    Stages,

    /// Score metric inputs
    Score {
        /// Path to the metric inputs (JSON: stage -> signal -> value)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Project the overall score over a time horizon
    Decay(DecayArgs),

    /// Compare stage scores against a competitor or benchmark
    Compare(CompareArgs),

    /// Full diagnosis with priority interventions
    Report {
        /// Path to the metric inputs (JSON: stage -> signal -> value)
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Arguments of the `decay` command.
#[derive(Args, Debug, Clone, Default)]
pub struct DecayArgs {
    /// Overall score to project
    #[arg(long, conflicts_with = "input")]
    pub score: Option<i64>,

    /// Metric inputs to score first
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Decline per time unit (0.05 = 5%); selects the geometric model
    #[arg(short, long, conflicts_with = "stepped")]
    pub rate: Option<f64>,

    /// Comma-separated offsets, e.g. "0,4,8,12,16"
    #[arg(long)]
    pub horizon: Option<String>,

    /// Rounding of projected scores: "nearest" or "up"
    #[arg(long)]
    pub rounding: Option<String>,

    /// Use the stepped four-weekly retention schedule
    #[arg(long)]
    pub stepped: bool,
}

/// Arguments of the `compare` command.
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// Metric inputs of the own brand
    #[arg(short, long)]
    pub input: PathBuf,

    /// Competitor stage scores (JSON: stage -> score)
    #[arg(short = 'c', long, conflicts_with = "benchmark")]
    pub competitor: Option<PathBuf>,

    /// Display name of the competitor
    #[arg(short, long, requires = "competitor")]
    pub name: Option<String>,

    /// Flat benchmark score for every stage
    #[arg(short, long)]
    pub benchmark: Option<i64>,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let schema = load_schema(&cli.schema)?;

    let ctx = Context {
        engine: Engine::new(schema),
        schema_name: cli.schema,
        config,
        json_mode: cli.json_mode,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::Stages) | None => cmd_stages(&ctx, &mut out),
        Some(Commands::Score { input }) => cmd_score(&ctx, &mut out, &input),
        Some(Commands::Decay(args)) => cmd_decay(&ctx, &mut out, &args),
        Some(Commands::Compare(args)) => cmd_compare(&ctx, &mut out, &args),
        Some(Commands::Report { input }) => cmd_report(&ctx, &mut out, &input),
    }
}
