//! Command-line interface for cover-scout.
//!
//! Thin orchestration only: the commands scan, decide whether hashing is
//! needed, drive the source chain, and print the outcome. All engine
//! logic lives in [`crate::artwork`].

mod commands;

pub use commands::{run, Cli, Commands};
