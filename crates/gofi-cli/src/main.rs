mod commands;
mod logging;
mod progress;

use std::process;

use clap::Parser;
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use gofi_core::utils::byte_count_si;
use gofi_core::{AppConfig, InventoryEngine};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match gofi_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    args.apply(&mut config);
    if let Err(err) = config.validate() {
        error!("Invalid configuration: {}", err);
        process::exit(1);
    }

    match args.command {
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        Some(Commands::Run) | None => {
            if let Err(err) = run_process(config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_process(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = InventoryEngine::new(config);
    let reporter = CliReporter::new();
    let result = engine.run(&reporter)?;

    info!(
        "Walk: {}, Store: {}, Send: {}",
        format!("{:.2}s", result.walk_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.load_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.transmit_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files ({} too large, {} unreadable), {} errors, {} shards, {} rows stored",
        format!("{}", result.walk.files).cyan(),
        format!("{}", result.walk.too_large).yellow(),
        format!("{}", result.walk.unreadable).yellow(),
        format!("{}", result.walk.errors).red(),
        format!("{}", result.shards_written).cyan(),
        format!("{}", result.rows_stored).cyan(),
    );
    if let Some(transfer) = &result.transfer {
        info!(
            "Session {} sent {} to {}",
            result.session_id,
            byte_count_si(transfer.payload_sent).green(),
            engine.config().target_url,
        );
    }

    Ok(())
}
