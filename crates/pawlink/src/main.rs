// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pawlink - realtime messaging sync core for a dog-care community.
//!
//! This is the binary entry point for the Pawlink CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod demo;
mod status;
mod surface;

use clap::{Parser, Subcommand};

/// Pawlink - realtime messaging sync core for a dog-care community.
#[derive(Parser, Debug)]
#[command(name = "pawlink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a local two-user messaging demo over the SQLite store.
    Demo,
    /// Check the health of the configured message store.
    Status,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match pawlink_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            pawlink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.app.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let outcome = match cli.command {
        Some(Commands::Demo) => demo::run(&config).await,
        Some(Commands::Status) => status::run(&config).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(pawlink_core::PawlinkError::Internal(format!(
                    "failed to render configuration: {e}"
                ))),
            }
        }
        None => {
            println!("pawlink: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("pawlink: {e}");
        std::process::exit(1);
    }
}
