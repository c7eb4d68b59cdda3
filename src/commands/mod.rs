//! This module aggregates all the command modules for the bot.

/// Commands related to music playback and the queue (requires the `music` feature).
#[cfg(feature = "music")]
pub mod music;
