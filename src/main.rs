use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "seedsearch")]
#[command(version, about = "Resumable phased phrase search driven by an external cracking oracle")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit journal lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = seedsearch::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the search, resuming from the ledger
    Run {
        /// Stop Phase 3 after this many batches
        #[arg(long)]
        max_phase3_batches: Option<u64>,
    },
    /// Summarise the ledger: phase, progress, matches, recent problems
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List the base-phrase catalog as `index key phrase`
    Phrases {
        /// Only phrases containing this text
        #[arg(long)]
        grep: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    seedsearch::logging::init_logging(cli.verbose, cli.log_json)
        .context("Failed to initialise logging")?;

    match &cli.command {
        Commands::Run { max_phase3_batches } => {
            cmd::cmd_run(&cli.config, *max_phase3_batches).await?
        }
        Commands::Status { json } => cmd::cmd_status(&cli.config, *json)?,
        Commands::Phrases { grep } => cmd::cmd_phrases(grep.as_deref())?,
        Commands::Config => cmd::cmd_config(&cli.config)?,
    }

    Ok(())
}
