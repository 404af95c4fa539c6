//! Operator CLI for the Acey secure unlock ceremony
//!
//! Runs real unlock ceremonies at the terminal and non-interactive drills
//! with scripted capability answers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod handlers;

use handlers::{
    drill::{handle_drill, DrillArgs},
    unlock::handle_unlock,
};

#[derive(Parser)]
#[command(name = "acey")]
#[command(about = "Acey - secure unlock ceremony", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".acey/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an unlock ceremony, prompting the operator at each step
    Unlock {
        /// Why the unlock is needed (recorded in the audit trail)
        #[arg(short, long)]
        reason: String,

        /// Integrity check to report as failed (repeatable)
        #[arg(long = "fail-check", value_name = "NAME")]
        fail_checks: Vec<String>,
    },

    /// Rehearse a ceremony with compressed timings and fixed answers
    Drill(DrillArgs),

    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .init();

    let code = match cli.command {
        Commands::Unlock {
            reason,
            fail_checks,
        } => handle_unlock(&config, &reason, fail_checks).await?,

        Commands::Drill(args) => handle_drill(&config, args).await?,

        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
            0
        }
    };

    // A console prompt still parked on stdin would hold runtime shutdown.
    std::process::exit(code)
}
