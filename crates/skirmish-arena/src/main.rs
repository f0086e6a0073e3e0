//! # Skirmish Arena
//!
//! Headless encounter that drives a crowd of combat agents against a
//! scripted target.
//!
//! Usage:
//! - `skirmish [config.toml]` runs the encounter and logs a summary
//! - `skirmish --write-config [config.toml]` writes the default configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod arena;
mod config;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::arena::Arena;
use crate::config::{ArenaConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("skirmish=info".parse()?))
        .init();

    info!("Skirmish arena starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("--write-config") {
        let path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());
        ArenaConfig::default().save_to(&path)?;
        return Ok(());
    }

    let path = first.unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = ArenaConfig::load_from(&path);

    let summary = Arena::new(config).run();
    summary.log();

    info!("Skirmish arena finished");
    Ok(())
}
