//! Process configuration read from the environment (and `.env` via dotenv).

use std::collections::HashSet;
use std::env;

use poise::serenity_prelude::UserId;
use thiserror::Error;

use crate::utils::database::APPDATA_DB;

/// Prefix used for text commands when `BOT_PREFIX` is unset.
pub const DEFAULT_PREFIX: &str = "!";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid user id in BOT_OWNERS: {0}")]
    InvalidOwner(String),
}

/// Startup configuration for the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub prefix: String,
    pub database_path: String,
    pub owners: HashSet<UserId>,
}

impl BotConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let prefix = lookup("BOT_PREFIX")
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let database_path = lookup("DATABASE_PATH")
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| APPDATA_DB.to_string());

        let owners = match lookup("BOT_OWNERS") {
            Some(raw) => parse_owners(&raw)?,
            None => HashSet::new(),
        };

        Ok(Self {
            token,
            prefix,
            database_path,
            owners,
        })
    }
}

fn parse_owners(raw: &str) -> Result<HashSet<UserId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .map(UserId::new)
                .ok_or_else(|| ConfigError::InvalidOwner(id.to_string()))
        })
        .collect()
}
