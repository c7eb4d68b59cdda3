use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{HTTP_CLIENT, MusicError, MusicManager},
    track_metadata::{TrackMetadata, is_web_url},
};
use songbird::input::{Compose, YoutubeDl};
use songbird::tracks::Track;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Play a song from YouTube or a direct URL
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = guild_id(ctx)?;

    // Get the user's voice channel
    let user_id = ctx.author().id;
    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, user_id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(embedded_messages::user_not_in_voice_channel(err))
                    .await?;
                return Ok(());
            }
        };

    // Defer the response since resolving the source might take time
    ctx.defer().await?;

    let call = match MusicManager::connected_player(ctx.serenity_context(), guild_id).await {
        Some(_) => MusicManager::get_call(ctx.serenity_context(), guild_id).await?,
        None => {
            let joined = match MusicManager::check_connect_permission(
                ctx.serenity_context(),
                guild_id,
                channel_id,
            ) {
                Ok(()) => {
                    MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await
                }
                Err(err) => Err(err),
            };
            match joined {
                Ok(call) => call,
                Err(err) => {
                    ctx.send(embedded_messages::failed_to_join_voice_channel(err))
                        .await?;
                    return Ok(());
                }
            }
        }
    };

    let mut source = if is_web_url(&query) {
        YoutubeDl::new(HTTP_CLIENT.clone(), query.clone())
    } else {
        YoutubeDl::new_search(HTTP_CLIENT.clone(), query.clone())
    };

    let aux = match source.aux_metadata().await {
        Ok(aux) => aux,
        Err(err) => {
            error!("Failed to resolve audio source for {}: {}", query, err);
            let err = MusicError::AudioSourceError(err.to_string());
            ctx.send(embedded_messages::failed_to_process_audio_source(err))
                .await?;
            return Ok(());
        }
    };

    let requested_by = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };
    let metadata = TrackMetadata::from_aux(&aux, user_id, requested_by);
    debug!("Resolved track metadata: {:?}", metadata);

    let mut track = Track::from(source);
    track.user_data = Arc::new(metadata.clone());

    let position = {
        let mut handler = call.lock().await;
        handler.enqueue(track).await;
        handler.queue().len().saturating_sub(1)
    };
    info!(
        "Queued {} in guild {} at position {}",
        metadata.title, guild_id, position
    );

    ctx.send(embedded_messages::track_enqueued(&metadata, position))
        .await?;

    Ok(())
}
