use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicManager};
use tracing::info;

/// Stop the music and clear the queue
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    stop_playback(ctx).await
}

/// Stop the current track and drop everything queued behind it. The bot
/// stays in its voice channel.
pub async fn stop_playback(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let Some(player) = MusicManager::connected_player(ctx.serenity_context(), guild_id).await else {
        ctx.send(embedded_messages::no_track_playing()).await?;
        return Ok(());
    };

    let dropped = player.track_queue().len();
    player.track_queue().stop();
    info!("Stopped playback and dropped {} tracks in guild {}", dropped, guild_id);

    ctx.send(embedded_messages::stopped()).await?;
    Ok(())
}
