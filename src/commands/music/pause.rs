use super::*;
use crate::commands::music::utils::{
    embedded_messages, music_manager::MusicManager, track_metadata::TrackMetadata,
};
use songbird::tracks::PlayMode;
use tracing::info;

/// Pause or resume the current track
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    toggle_pause(ctx).await
}

/// Flip the current track between playing and paused.
pub async fn toggle_pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let current = MusicManager::connected_player(ctx.serenity_context(), guild_id)
        .await
        .and_then(|player| player.track_queue().current());
    let Some(track) = current else {
        ctx.send(embedded_messages::no_track_playing()).await?;
        return Ok(());
    };
    let metadata = track.data::<TrackMetadata>();

    match track.get_info().await?.playing {
        PlayMode::Play => {
            track.pause()?;
            info!("Paused {} in guild {}", metadata.title, guild_id);
            ctx.send(embedded_messages::paused(&metadata)).await?;
        }
        PlayMode::Pause => {
            track.play()?;
            info!("Resumed {} in guild {}", metadata.title, guild_id);
            ctx.send(embedded_messages::resumed(&metadata)).await?;
        }
        _ => {
            ctx.send(embedded_messages::no_track_playing()).await?;
        }
    }

    Ok(())
}
