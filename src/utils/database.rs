//! Provides functions for interacting with the application's SQLite database.
//! Handles initialization, table creation, and reads/writes of the per-guild
//! audio settings (DJ mode, vote mode, playback flags).

use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use serenity::model::id::{GuildId, RoleId};
use std::path::Path;
use tracing::warn;

/// The default filename for the SQLite database.
pub const APPDATA_DB: &str = "application_data.db";

/// Audio settings for a single guild. Guilds without a stored row use the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildSettings {
    /// Whether destructive queue commands require the DJ role.
    pub dj_enabled: bool,
    /// The role that grants DJ privileges.
    pub dj_role: Option<RoleId>,
    /// Whether vote-skipping is enabled.
    pub vote_enabled: bool,
    pub shuffle: bool,
    pub repeat: bool,
    pub auto_play: bool,
    /// Whether track thumbnails are shown in queue embeds.
    pub thumbnail: bool,
}

/// Boolean guild settings that can be toggled from chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum GuildFlag {
    #[name = "dj"]
    Dj,
    #[name = "vote"]
    Vote,
    #[name = "shuffle"]
    Shuffle,
    #[name = "repeat"]
    Repeat,
    #[name = "autoplay"]
    AutoPlay,
    #[name = "thumbnail"]
    Thumbnail,
}

impl GuildSettings {
    pub fn flag(&self, flag: GuildFlag) -> bool {
        match flag {
            GuildFlag::Dj => self.dj_enabled,
            GuildFlag::Vote => self.vote_enabled,
            GuildFlag::Shuffle => self.shuffle,
            GuildFlag::Repeat => self.repeat,
            GuildFlag::AutoPlay => self.auto_play,
            GuildFlag::Thumbnail => self.thumbnail,
        }
    }

    /// Flip a flag and return its new value.
    pub fn toggle(&mut self, flag: GuildFlag) -> bool {
        let slot = match flag {
            GuildFlag::Dj => &mut self.dj_enabled,
            GuildFlag::Vote => &mut self.vote_enabled,
            GuildFlag::Shuffle => &mut self.shuffle,
            GuildFlag::Repeat => &mut self.repeat,
            GuildFlag::AutoPlay => &mut self.auto_play,
            GuildFlag::Thumbnail => &mut self.thumbnail,
        };
        *slot = !*slot;
        *slot
    }
}

/// Initializes the database by ensuring the necessary tables are created.
pub fn init_db(path: impl AsRef<Path>) -> SqlResult<()> {
    let conn = Connection::open(path)?;
    create_tables(&conn)
}

/// Creates the `guild_settings` table if it doesn't exist.
fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guild_settings (
            guild_id INTEGER PRIMARY KEY,
            dj_enabled BOOLEAN NOT NULL DEFAULT 0,
            dj_role INTEGER,
            vote_enabled BOOLEAN NOT NULL DEFAULT 0,
            shuffle BOOLEAN NOT NULL DEFAULT 0,
            repeat BOOLEAN NOT NULL DEFAULT 0,
            auto_play BOOLEAN NOT NULL DEFAULT 0,
            thumbnail BOOLEAN NOT NULL DEFAULT 0
        )",
        [],
    )?;

    Ok(())
}

fn load_settings(conn: &Connection, guild_id: GuildId) -> SqlResult<Option<GuildSettings>> {
    conn.query_row(
        "SELECT dj_enabled, dj_role, vote_enabled, shuffle, repeat, auto_play, thumbnail
         FROM guild_settings WHERE guild_id = ?1",
        params![guild_id.get()],
        |row| {
            let dj_role: Option<u64> = row.get(1)?;
            Ok(GuildSettings {
                dj_enabled: row.get(0)?,
                dj_role: dj_role.filter(|id| *id != 0).map(RoleId::new),
                vote_enabled: row.get(2)?,
                shuffle: row.get(3)?,
                repeat: row.get(4)?,
                auto_play: row.get(5)?,
                thumbnail: row.get(6)?,
            })
        },
    )
    .optional()
}

fn store_settings(conn: &Connection, guild_id: GuildId, settings: &GuildSettings) -> SqlResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO guild_settings
            (guild_id, dj_enabled, dj_role, vote_enabled, shuffle, repeat, auto_play, thumbnail)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            guild_id.get(),
            settings.dj_enabled,
            settings.dj_role.map(|role| role.get()),
            settings.vote_enabled,
            settings.shuffle,
            settings.repeat,
            settings.auto_play,
            settings.thumbnail,
        ],
    )?;
    Ok(())
}

/// Retrieves the settings for a guild.
/// Falls back to the defaults if the guild has no row or a database error occurs.
pub fn get_guild_settings(path: impl AsRef<Path>, guild_id: GuildId) -> GuildSettings {
    let result = Connection::open(path).and_then(|conn| {
        create_tables(&conn)?;
        load_settings(&conn, guild_id)
    });

    match result {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            warn!("Failed to read settings for guild {}: {}", guild_id, e);
            GuildSettings::default()
        }
    }
}

/// Inserts or replaces the settings for a guild.
pub fn set_guild_settings(
    path: impl AsRef<Path>,
    guild_id: GuildId,
    settings: &GuildSettings,
) -> SqlResult<()> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    store_settings(&conn, guild_id, settings)
}
