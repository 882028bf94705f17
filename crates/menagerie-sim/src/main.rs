//! # Menagerie Sim
//!
//! Headless runner for the Menagerie behavior and combat core.
//!
//! Loads a TOML config, spawns a player with its allies, a pack of hostiles
//! and some loot inside the arena, runs the tick loop and reports:
//! - `menagerie-sim [config.toml]` runs a scenario
//! - `menagerie-sim --init [config.toml]` writes the default config and exits
//!
//! Logging honours `RUST_LOG`; set `MENAGERIE_LOG_JSON=1` for JSON lines.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod report;
mod runner;
mod scenario;
mod timing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{SimConfig, CONFIG_FILE};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("menagerie=info".parse()?);
    let json = std::env::var_os("MENAGERIE_LOG_JSON").is_some();

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
    Ok(())
}

/// Main entry point.
fn main() -> Result<()> {
    init_tracing()?;

    info!("Menagerie sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1).peekable();
    let init = args.next_if(|arg| arg == "--init").is_some();
    let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);

    if init {
        SimConfig::default()
            .save_to(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        return Ok(());
    }

    let mut config = SimConfig::load_from(&path);
    config.validate();
    config.check()?;

    let report = runner::run(&config)?;
    info!(
        ticks = report.ticks,
        sim_seconds = report.sim_seconds,
        avg_tick_ms = report.average_tick_ms,
        player_alive = report.survivors.player,
        player_health = report.player_health,
        allies = report.survivors.allies,
        hostiles = report.survivors.hostiles,
        loot_delivered = report.events.loot_delivered,
        "summary"
    );

    if let Some(report_path) = &config.report_path {
        report
            .write_to(report_path)
            .with_context(|| format!("writing {}", report_path.display()))?;
    }

    info!("Menagerie sim shutdown complete");
    Ok(())
}
