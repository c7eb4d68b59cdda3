use super::*;
use crate::commands::music::{pause, stop};
use crate::commands::music::utils::{
    access::{MemberAccess, controls_locked},
    cooldown::SHUFFLE_COOLDOWN,
    embedded_messages,
    music_manager::{MusicManager, SongbirdConnector},
    pager::{self, MenuExit},
    queue_manager::NowPlaying,
    queue_service::{
        QueueListing, clean_own_tracks, clean_queue, clear_queue, list_queue, search_queue,
        shuffle_queue,
    },
    reaction_controls::{self, PlaybackReaction},
};
use std::time::Instant;
use tracing::{debug, info};

/// List the songs in the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    required_bot_permissions = "EMBED_LINKS | ADD_REACTIONS",
    subcommands(
        "queue_list",
        "queue_clear",
        "queue_clean",
        "queue_cleanself",
        "queue_search",
        "queue_shuffle"
    )
)]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page of the queue to open"] page: Option<usize>,
) -> CommandResult {
    show_queue(ctx, page.unwrap_or(1)).await
}

/// List the songs in the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "list",
    required_bot_permissions = "EMBED_LINKS | ADD_REACTIONS"
)]
pub async fn queue_list(
    ctx: Context<'_>,
    #[description = "Page of the queue to open"] page: Option<usize>,
) -> CommandResult {
    show_queue(ctx, page.unwrap_or(1)).await
}

async fn show_queue(ctx: Context<'_>, page: usize) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    debug!("Listing the queue for guild {} from page {}", guild_id, page);

    let player = MusicManager::connected_player(ctx.serenity_context(), guild_id).await;
    let listing = match list_queue(player.as_ref(), page).await {
        Ok(listing) => listing,
        Err(notice) => {
            ctx.send(embedded_messages::queue_notice(&notice)).await?;
            return Ok(());
        }
    };
    let settings = guild_settings(ctx, guild_id);

    match listing {
        QueueListing::NowPlaying(now_playing) => {
            now_playing_controls(ctx, &now_playing, &settings).await
        }
        QueueListing::Pages(pages) => {
            let guild_name = ctx
                .guild()
                .map(|guild| guild.name.clone())
                .unwrap_or_default();
            let embeds = embedded_messages::queue_pages(&pages, &guild_name, &settings);

            if pager::paginate(ctx, &embeds, pages.start_page - 1, true).await? == MenuExit::Info {
                poise::builtins::help(ctx, Some("queue"), Default::default()).await?;
            }
            Ok(())
        }
    }
}

/// Show the current track and offer stop/pause reactions to members allowed
/// to control playback.
async fn now_playing_controls(
    ctx: Context<'_>,
    now_playing: &NowPlaying,
    settings: &GuildSettings,
) -> CommandResult {
    let reply = ctx
        .send(CreateReply::default().embed(embedded_messages::now_playing(now_playing, settings)))
        .await?;

    let access = MemberAccess::resolve(ctx, settings).await;
    if controls_locked(&access) {
        return Ok(());
    }

    let message = reply.into_message().await?;
    let http = ctx.serenity_context().http.clone();
    let adding = reaction_controls::start_adding_reactions(http.clone(), message.clone());

    let picked = reaction_controls::await_playback_reaction(ctx, &message).await;
    if picked.is_some() {
        adding.abort();
    }
    reaction_controls::clear_reactions(http, message);

    match picked {
        Some(PlaybackReaction::Stop) => stop::stop_playback(ctx).await,
        Some(PlaybackReaction::Pause) => pause::toggle_pause(ctx).await,
        None => Ok(()),
    }
}

/// Clears the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "clear"
)]
pub async fn queue_clear(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let player = MusicManager::connected_player(ctx.serenity_context(), guild_id).await;
    let settings = guild_settings(ctx, guild_id);
    let access = MemberAccess::resolve(ctx, &settings).await;

    let notice = clear_queue(player.as_ref(), &access);
    ctx.send(embedded_messages::queue_notice(&notice)).await?;
    Ok(())
}

/// Removes songs from the queue if the requester is not in the voice channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "clean"
)]
pub async fn queue_clean(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let player = MusicManager::connected_player(ctx.serenity_context(), guild_id).await;
    let settings = guild_settings(ctx, guild_id);
    let access = MemberAccess::resolve(ctx, &settings).await;
    let listeners = MusicManager::channel_listeners(ctx.serenity_context(), guild_id);

    let notice = clean_queue(player.as_ref(), &access, &listeners);
    ctx.send(embedded_messages::queue_notice(&notice)).await?;
    Ok(())
}

/// Removes all tracks you requested from the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "cleanself"
)]
pub async fn queue_cleanself(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let player = MusicManager::connected_player(ctx.serenity_context(), guild_id).await;
    let member_name = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };

    let notice = clean_own_tracks(player.as_ref(), ctx.author().id, &member_name);
    ctx.send(embedded_messages::queue_notice(&notice)).await?;
    Ok(())
}

/// Search the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "search",
    required_bot_permissions = "EMBED_LINKS"
)]
pub async fn queue_search(
    ctx: Context<'_>,
    #[description = "Words to look for in the queued titles"]
    #[rest]
    search_words: String,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let player = MusicManager::connected_player(ctx.serenity_context(), guild_id).await;

    match search_queue(player.as_ref(), &search_words) {
        Ok(results) => {
            debug!(
                "Search for {:?} matched {} queued tracks",
                search_words,
                results.hits.len()
            );
            pager::paginate(ctx, &embedded_messages::search_pages(&results), 0, false).await?;
        }
        Err(notice) => {
            ctx.send(embedded_messages::queue_notice(&notice)).await?;
        }
    }
    Ok(())
}

/// Shuffles the queue
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Music",
    rename = "shuffle"
)]
pub async fn queue_shuffle(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let settings = guild_settings(ctx, guild_id);
    let access = MemberAccess::resolve(ctx, &settings).await;
    let connected = MusicManager::connected_player(ctx.serenity_context(), guild_id)
        .await
        .is_some();
    let connector = SongbirdConnector::new(ctx.serenity_context(), guild_id, ctx.author().id);

    let notice = shuffle_queue(
        &access,
        connected,
        &connector,
        &SHUFFLE_COOLDOWN,
        guild_id,
        Instant::now(),
    )
    .await;
    info!("Shuffle requested in guild {}: {:?}", guild_id, notice);

    ctx.send(embedded_messages::queue_notice(&notice)).await?;
    Ok(())
}
