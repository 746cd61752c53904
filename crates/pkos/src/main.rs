//! # PK_OS - Operator Console
//!
//! A line-oriented hacking sandbox. Hosts the mission engine, the puzzle
//! sandbox, rewards, the black market and the achievement ledger.
//!
//! ## Architecture
//! ```text
//! stdin ──► console ──► GameState ──► KvStore (memory / file / Redis)
//!              ▲            │
//!   clock ─────┘            └─► Scheduler (virtual clock)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod achievements;
mod config;
mod console;
mod economy;
mod engine;
mod fs;
mod missions;
mod puzzles;
mod rewards;
mod state;
mod store;

use config::AppConfig;
use missions::{Generation, MissionRegistry, spawn_generation};
use state::GameState;

/// PK_OS - Operator Console
#[derive(Parser, Debug)]
#[command(name = "pkos")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/pkos.toml")]
    config: String,

    /// Store URL: memory://, file://<path> or redis://... (overrides config)
    #[arg(long, env = "PKOS_STORE")]
    store: Option<String>,

    /// Number of procedural missions (overrides config)
    #[arg(long)]
    missions: Option<usize>,

    /// RNG seed for reproducible sessions (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("💻 Starting PK_OS v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    let store = store::open_store(&config.store_url).context("Failed to open store")?;
    info!("✅ Store opened: {}", config.store_url);

    let mut generation = Some(start_generation(&config));
    let mut state = GameState::boot(config.clone(), store, MissionRegistry::with_catalog());
    flush(&mut state);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut clock = tokio::time::interval(Duration::from_millis(config.clock_resolution_ms));
    let mut last_advance = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read console input")? {
                    Some(line) => console::handle(&mut state, &line),
                    None => break,
                }
            }
            _ = clock.tick() => {
                let elapsed = last_advance.elapsed().as_millis() as u64;
                last_advance += Duration::from_millis(elapsed);
                state.advance(elapsed);
            }
            result = async {
                match generation.as_mut() {
                    Some(task) => (&mut task.handle).await,
                    None => std::future::pending().await,
                }
            }, if generation.is_some() => {
                generation = None;
                match result {
                    Ok(registry) => state.install_registry(registry),
                    Err(e) => tracing::error!(error = %e, "Mission generation failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutdown signal received");
                break;
            }
        }

        flush(&mut state);

        if let Some(reason) = state.pending_reset() {
            info!(reason = ?reason, "🔄 Rebooting session");
            if let Some(task) = generation.take() {
                task.cancel();
            }
            let store = state.into_store();
            generation = Some(start_generation(&config));
            state = GameState::boot(config.clone(), store, MissionRegistry::with_catalog());
            flush(&mut state);
        }
    }

    info!("👋 PK_OS shutdown complete");
    Ok(())
}

fn start_generation(config: &AppConfig) -> Generation {
    spawn_generation(
        MissionRegistry::with_catalog(),
        config.mission_count,
        config.seed,
    )
}

/// Console output goes to stdout; logs go to stderr
fn flush(state: &mut GameState) {
    for line in state.take_output() {
        println!("{}", line);
    }
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
