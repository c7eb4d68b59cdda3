//! Queue management for a poise/songbird music bot.
//!
//! The binary in `main.rs` wires these commands into a poise framework; the
//! library is split out so the queue behaviours can be exercised from `tests/`.

use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod utils;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, stored and accessible in all command invocations
pub struct Data {
    /// Location of the SQLite file holding per-guild settings.
    pub database_path: PathBuf,
}

impl Data {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }
}
