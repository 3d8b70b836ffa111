//! Cover Scout - locate cover artwork for archived software images.
//!
//! Hashes ROM files, matches them against the libretro-thumbnails
//! catalog by name, and falls back to CRC lookups against
//! ScreenScraper when configured. Sources are tried in priority order
//! until one finds a result.

pub mod artwork;
pub mod cli;
pub mod config;
pub mod error;
pub mod hasher;
pub mod model;
pub mod platforms;
pub mod scanner;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("cover_scout=info".parse()?))
        .init();

    cli::run(&args)
}
