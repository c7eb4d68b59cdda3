//! Music playback and queue management commands.

pub mod pause;
pub mod play;
pub mod queue;
pub mod settings;
pub mod stop;

pub mod utils;

use crate::utils::database::{GuildSettings, get_guild_settings};
use crate::{CommandResult, Context};
use poise::CreateReply;
use serenity::model::id::GuildId;

use utils::music_manager::MusicError;

/// The invoking guild, or `NotInGuild` for commands run in DMs.
fn guild_id(ctx: Context<'_>) -> Result<GuildId, MusicError> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// Audio settings of the invoking guild.
fn guild_settings(ctx: Context<'_>, guild_id: GuildId) -> GuildSettings {
    get_guild_settings(&ctx.data().database_path, guild_id)
}
