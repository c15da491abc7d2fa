//! Water Restriction Monitoring Service - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Polls council websites for the current water restriction level
//! 2. Marks each configured location online or offline
//! 3. Retries failed locations sooner than the normal refresh interval
//! 4. Optionally serves the latest levels over HTTP
//!
//! Usage:
//!   cargo run --release                         # Poll locations from things.toml
//!   cargo run --release -- --endpoint 8080      # Also serve status on port 8080
//!   cargo run --release -- --once               # Poll every location once and exit
//!
//! Environment:
//!   NZWATER_CONFIG - path to the thing configuration (default: things.toml)
//!   RUST_LOG       - log filter (default: info)

use clap::Parser;
use nzwater_service::client::WaterAlertClient;
use nzwater_service::config::{self, ThingConfig};
use nzwater_service::daemon::Daemon;
use nzwater_service::endpoint::{self, ChannelStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "nzwater_service", version, about = "Polls NZ council water restriction levels")]
struct Cli {
    /// Thing configuration file
    #[arg(long, env = config::CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Serve thing status on this port
    #[arg(long)]
    endpoint: Option<u16>,

    /// Poll every thing once, print the levels and exit
    #[arg(long)]
    once: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    println!("💧 NZ Water Alert Service");
    println!("=========================\n");

    let path = config::config_path(cli.config);
    let things = match config::load_config(&path) {
        Ok(things) => things,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            return ExitCode::FAILURE;
        }
    };
    println!("✓ Loaded {} thing(s) from {}\n", things.len(), path.display());

    if cli.once {
        return poll_once(&things);
    }

    let store = ChannelStore::new();
    for thing in &things {
        store.register(&thing.id);
    }

    let mut daemon = Daemon::new(things, Arc::new(store.clone()));
    daemon.initialize();

    // Start HTTP endpoint if requested (in background thread)
    if let Some(port) = cli.endpoint {
        let endpoint_store = store.clone();
        std::thread::spawn(move || {
            if let Err(e) = endpoint::start_endpoint_server(port, endpoint_store) {
                error!("Endpoint server error: {}", e);
            }
        });
        println!("🚀 Endpoint running on http://0.0.0.0:{}\n", port);
    }

    println!("🔄 Polling {} thing(s), press Ctrl+C to stop\n", daemon.pollers().len());

    if let Err(e) = daemon.run() {
        eprintln!("\n❌ Daemon error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Polls each thing once and prints the result.
fn poll_once(things: &[ThingConfig]) -> ExitCode {
    let mut failures = 0;

    for thing in things {
        let result = thing
            .validate()
            .and_then(|()| WaterAlertClient::new(&thing.location))
            .and_then(|client| client.get_level());
        match result {
            Ok(level) => println!("   ✓ {} ({}) - level {}", thing.id, thing.location, level),
            Err(e) => {
                failures += 1;
                eprintln!("   ✗ {} ({}) - {}", thing.id, thing.location, e);
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
