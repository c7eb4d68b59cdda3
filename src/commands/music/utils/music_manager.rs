use async_trait::async_trait;
use rand::seq::SliceRandom;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::tracks::{PlayMode, TrackQueue};
use songbird::{Call, Songbird};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::queue_manager::{NowPlaying, QueuePlayer, VoiceConnector};
use super::track_metadata::TrackMetadata;

/// Shared HTTP client handed to every `YoutubeDl` input.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Missing permission to connect to the voice channel")]
    MissingConnectPermission,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Stateless helpers around the Songbird voice manager and the serenity cache
pub struct MusicManager;

impl MusicManager {
    /// Get the Songbird voice client from the context
    pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
        songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
    }

    /// Get the current voice channel call handle
    pub async fn get_call(
        ctx: &Context,
        guild_id: GuildId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;
        songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    /// The player for a guild, if the bot is currently connected to a channel there
    pub async fn connected_player(ctx: &Context, guild_id: GuildId) -> Option<SongbirdPlayer> {
        let call = Self::get_call(ctx, guild_id).await.ok()?;
        let handler = call.lock().await;
        handler.current_channel()?;
        Some(SongbirdPlayer::new(handler.queue().clone()))
    }

    /// Join a voice channel
    pub async fn join_channel(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;

        let handle = songbird.join(guild_id, channel_id).await.map_err(|e| {
            error!(
                "Failed to join voice channel {} for guild {}: {}",
                channel_id, guild_id, e
            );
            MusicError::JoinError(e.to_string())
        })?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(handle)
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// Everyone currently in the bot's voice channel in this guild
    pub fn channel_listeners(ctx: &Context, guild_id: GuildId) -> Vec<UserId> {
        let bot_id = ctx.cache.current_user().id;
        let Some(guild) = ctx.cache.guild(guild_id) else {
            return Vec::new();
        };
        let Some(channel_id) = guild
            .voice_states
            .get(&bot_id)
            .and_then(|state| state.channel_id)
        else {
            return Vec::new();
        };

        guild
            .voice_states
            .values()
            .filter(|state| state.channel_id == Some(channel_id))
            .map(|state| state.user_id)
            .collect()
    }

    /// Make sure the bot may join `channel_id`: it needs Connect, and Move
    /// Members as well when the channel is already full.
    pub fn check_connect_permission(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<()> {
        let bot_id = ctx.cache.current_user().id;
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let (Some(channel), Some(member)) =
            (guild.channels.get(&channel_id), guild.members.get(&bot_id))
        else {
            debug!(
                "Channel {} or bot member not cached, leaving the check to the join",
                channel_id
            );
            return Ok(());
        };

        let permissions = guild.user_permissions_in(channel, member);
        let occupants = guild
            .voice_states
            .values()
            .filter(|state| state.channel_id == Some(channel_id) && state.user_id != bot_id)
            .count();
        let full = channel_is_full(channel.user_limit, occupants);

        if !permissions.connect() || (full && !permissions.move_members()) {
            warn!(
                "Missing permission to connect to channel {} in guild {}",
                channel_id, guild_id
            );
            return Err(MusicError::MissingConnectPermission);
        }

        Ok(())
    }
}

/// Whether the bot joining would take the last free slot of a channel with
/// `occupants` other members. A limit of zero means unlimited.
pub fn channel_is_full(user_limit: Option<u32>, occupants: usize) -> bool {
    user_limit.is_some_and(|limit| limit > 0 && limit as usize <= occupants + 1)
}

/// `QueuePlayer` over songbird's built-in queue. Entry 0 of the songbird
/// queue is the playing track, so the listed queue starts at entry 1.
#[derive(Clone)]
pub struct SongbirdPlayer {
    queue: TrackQueue,
}

impl SongbirdPlayer {
    pub fn new(queue: TrackQueue) -> Self {
        Self { queue }
    }

    pub fn track_queue(&self) -> &TrackQueue {
        &self.queue
    }
}

#[async_trait]
impl QueuePlayer for SongbirdPlayer {
    async fn now_playing(&self) -> Option<NowPlaying> {
        let handle = self.queue.current()?;
        let track = handle.data::<TrackMetadata>();
        let info = handle.get_info().await.ok();

        Some(NowPlaying {
            track: (*track).clone(),
            position: info.as_ref().map(|info| info.position).unwrap_or_default(),
            paused: info.is_some_and(|info| info.playing == PlayMode::Pause),
        })
    }

    fn queue(&self) -> Vec<TrackMetadata> {
        self.queue
            .current_queue()
            .iter()
            .skip(1)
            .map(|handle| (*handle.data::<TrackMetadata>()).clone())
            .collect()
    }

    fn retain(&self, keep: &mut dyn FnMut(&TrackMetadata) -> bool) -> usize {
        self.queue.modify_queue(|queue| {
            let mut index = 0;
            let mut removed = 0;
            queue.retain(|queued| {
                let handle = queued.handle();
                let kept = index == 0 || keep(handle.data::<TrackMetadata>().as_ref());
                index += 1;
                if !kept {
                    removed += 1;
                    if let Err(e) = handle.stop() {
                        debug!("Removed track was already finished: {}", e);
                    }
                }
                kept
            });
            removed
        })
    }

    fn shuffle(&self) {
        self.queue.modify_queue(|queue| {
            if queue.len() > 2 {
                queue.make_contiguous()[1..].shuffle(&mut rand::rng());
            }
        });
    }

    fn is_empty(&self) -> bool {
        self.queue.len() <= 1
    }
}

/// Joins the invoking member's voice channel on demand.
pub struct SongbirdConnector<'a> {
    ctx: &'a Context,
    guild_id: GuildId,
    user_id: UserId,
}

impl<'a> SongbirdConnector<'a> {
    pub fn new(ctx: &'a Context, guild_id: GuildId, user_id: UserId) -> Self {
        Self {
            ctx,
            guild_id,
            user_id,
        }
    }
}

#[async_trait]
impl VoiceConnector for SongbirdConnector<'_> {
    type Player = SongbirdPlayer;

    async fn connect(&self) -> MusicResult<SongbirdPlayer> {
        let channel_id =
            MusicManager::get_user_voice_channel(self.ctx, self.guild_id, self.user_id)?;
        MusicManager::check_connect_permission(self.ctx, self.guild_id, channel_id)?;

        let call = MusicManager::join_channel(self.ctx, self.guild_id, channel_id).await?;
        let queue = call.lock().await.queue().clone();
        Ok(SongbirdPlayer::new(queue))
    }
}
