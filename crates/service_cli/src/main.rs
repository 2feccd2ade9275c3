//! Tranche CLI - Command Line Operations for the Tranche Engine
//!
//! This is the operational entry point for the tiered risk distribution
//! engine.
//!
//! # Commands
//!
//! - `tranche curve` - Print the APY of every risk segment
//! - `tranche range --min <S> --max <S>` - Blended APY and predicted yield
//! - `tranche waterfall --total-yield <Y>` - Split a yield pool bottom-up
//! - `tranche loss --total-loss <L>` - Allocate a loss over the tiers
//! - `tranche stress --amount <A> --min <S> --max <S> --tvl <T>` - Stress a position
//! - `tranche check` - Validate the configuration
//!
//! # Configuration
//!
//! Settings are resolved from CLI flags, then `TRANCHE_*` environment
//! variables, then the TOML file given by `--config` or `TRANCHE_CONFIG`,
//! then built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tranche_risk::scenarios::StressSeverity;

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_config, CliArgs, LogLevel};

/// Tiered risk distribution engine CLI
#[derive(Parser)]
#[command(name = "tranche")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the APY curve with tiers
    Curve,

    /// Blended APY and predicted yield for a risk range
    Range {
        /// Lowest segment of the range
        #[arg(long, allow_negative_numbers = true)]
        min: i64,

        /// Highest segment of the range
        #[arg(long, allow_negative_numbers = true)]
        max: i64,

        /// Position amount
        #[arg(short, long, default_value = "0")]
        amount: f64,
    },

    /// Distribute a yield pool over a uniform liquidity profile
    Waterfall {
        /// Yield available for distribution
        #[arg(short, long, allow_negative_numbers = true)]
        total_yield: f64,

        /// Liquidity held at every segment
        #[arg(short, long, default_value = "1000")]
        liquidity: f64,
    },

    /// Allocate a loss over a uniform liquidity profile
    Loss {
        /// Loss to allocate
        #[arg(short, long, allow_negative_numbers = true)]
        total_loss: f64,

        /// Liquidity held at every segment
        #[arg(short, long, default_value = "1000")]
        liquidity: f64,

        /// Allocation policy (proportional, tiered)
        #[arg(short, long, default_value = "tiered")]
        policy: String,

        /// Severity used for tier absorption rates
        #[arg(short, long, default_value = "0.1")]
        severity: f64,
    },

    /// Stress a position against pool-wide losses
    Stress {
        /// Position amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: f64,

        /// Lowest segment of the position
        #[arg(long, allow_negative_numbers = true)]
        min: i64,

        /// Highest segment of the position
        #[arg(long, allow_negative_numbers = true)]
        max: i64,

        /// Pool total value locked
        #[arg(short, long)]
        tvl: f64,

        /// Severity to run, as a preset (mild, moderate, severe, extreme) or a
        /// fraction; repeat for several (defaults from configuration)
        #[arg(short, long = "severity", allow_negative_numbers = true)]
        severities: Vec<StressSeverity>,
    },

    /// Check system configuration
    Check,
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = build_config(&CliArgs {
        config_file: cli.config.clone(),
        log_level: cli.log_level.clone(),
        format: cli.format.clone(),
        verbose: cli.verbose,
    })?;

    init_tracing(config.log_level);
    debug!(
        source = ?config.source,
        format = ?config.format,
        "configuration resolved"
    );

    match cli.command {
        Commands::Curve => commands::curve::run(&config),
        Commands::Range { min, max, amount } => commands::range::run(&config, min, max, amount),
        Commands::Waterfall {
            total_yield,
            liquidity,
        } => commands::waterfall::run(&config, total_yield, liquidity),
        Commands::Loss {
            total_loss,
            liquidity,
            policy,
            severity,
        } => commands::loss::run(&config, total_loss, liquidity, &policy, severity),
        Commands::Stress {
            amount,
            min,
            max,
            tvl,
            severities,
        } => commands::stress::run(&config, amount, min, max, tvl, &severities),
        Commands::Check => commands::check::run(&config),
    }
}
