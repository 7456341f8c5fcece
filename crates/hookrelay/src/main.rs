// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! hookrelay - batching webhook relay for chat platforms.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod send;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hookrelay_config::{ConfigError, HookrelayConfig};

/// hookrelay - batching webhook relay for chat platforms.
#[derive(Parser, Debug)]
#[command(name = "hookrelay", version, about, long_about = None)]
struct Cli {
    /// Explicit config file (otherwise the XDG hierarchy is searched).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Relay newline-delimited JSON send requests read from stdin.
    Serve,
    /// Send one message immediately.
    Send(send::SendArgs),
    /// Validate configuration and exit.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> Result<HookrelayConfig, Vec<ConfigError>> {
    match path {
        Some(path) => hookrelay_config::load_and_validate_path(path),
        None => hookrelay_config::load_and_validate(),
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hookrelay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            hookrelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.relay.log_level);
            serve::run_serve(&config).await.map_err(Into::into)
        }
        Some(Commands::Send(args)) => {
            init_tracing(&config.relay.log_level);
            send::run_send(&config, args).await.map_err(Into::into)
        }
        Some(Commands::Check) => {
            eprintln!(
                "hookrelay: config OK (flush every {} ms, {:?} failure policy, {:?} cache)",
                config.relay.flush_interval_ms, config.relay.failure_policy, config.cache.backend
            );
            Ok(())
        }
        None => {
            println!("hookrelay: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("hookrelay: {e}");
        std::process::exit(1);
    }
}
