mod config;
mod extract;
mod loader;
mod models;
mod pipeline;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::storage::Repository;

#[derive(Parser)]
#[command(name = "flbb-stats", about = "FLBB game-sheet extraction", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every finished game in the schedule catalog (incremental)
    Process {
        /// Reprocess games whose record already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Reprocess a single game by its external id
    Game { id: String },

    /// Show record-store statistics
    Stats,

    /// List stored division partitions
    Divisions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "flbb_stats_engine=info,warn",
        1 => "flbb_stats_engine=debug,info",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Process { force } => {
            let _t = utils::Timer::start("Batch extraction");
            let stats = Pipeline::new(config).run(force)?;
            info!(
                "Done: {} games, {} written, {} errors",
                stats.processed, stats.written, stats.errors
            );
        }

        Command::Game { id } => {
            let outcome = Pipeline::new(config).run_single(&id)?;
            println!("Game {}: {:?}", id, outcome);
        }

        Command::Stats => {
            let repo = Repository::open(&config.paths.output_dir)?;
            let records = repo.record_count()?;
            let divisions = repo.list_divisions()?;
            println!("─────────────────────────────────");
            println!("  FLBB Stats — Record Store");
            println!("─────────────────────────────────");
            println!("  Records   : {}", utils::fmt_number(records as i64));
            println!("  Divisions : {}", divisions.len());
            println!("─────────────────────────────────");
        }

        Command::Divisions => {
            let repo = Repository::open(&config.paths.output_dir)?;
            let divisions = repo.list_divisions()?;
            if divisions.is_empty() {
                println!("No records yet — run `flbb-stats-engine process` first.");
            } else {
                for d in &divisions {
                    println!("  {}", d);
                }
            }
        }
    }

    Ok(())
}
