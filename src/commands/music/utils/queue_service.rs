//! The queue commands' behaviour, independent of Discord I/O.
//!
//! Every function takes the guild's player (if any) and the invoking member's
//! [`AccessGate`], performs the queue change, and returns what to tell the user.

use serenity::model::id::{GuildId, UserId};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::access::{AccessGate, dj_denied};
use super::cooldown::GuildCooldown;
use super::music_manager::MusicError;
use super::queue_manager::{
    NowPlaying, QUEUE_DISPLAY_LIMIT, QueuePlayer, SearchHit, VoiceConnector, clamp_page,
    match_tracks, page_count, page_range, queue_duration,
};
use super::track_metadata::TrackMetadata;

/// Queue commands that DJ mode can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    Clear,
    Clean,
    Shuffle,
}

impl QueueAction {
    pub fn verb(self) -> &'static str {
        match self {
            QueueAction::Clear => "clear",
            QueueAction::Clean => "clean",
            QueueAction::Shuffle => "shuffle",
        }
    }
}

/// Why a shuffle was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleRefusal {
    NothingQueued,
    NotInVoice,
    MissingPermission,
    BackendUnavailable,
}

impl From<&MusicError> for ShuffleRefusal {
    fn from(err: &MusicError) -> Self {
        match err {
            MusicError::UserNotInVoiceChannel | MusicError::NotInGuild => {
                ShuffleRefusal::NotInVoice
            }
            MusicError::MissingConnectPermission => ShuffleRefusal::MissingPermission,
            MusicError::NoVoiceManager => ShuffleRefusal::BackendUnavailable,
            _ => ShuffleRefusal::NothingQueued,
        }
    }
}

/// A single-message answer to a queue command.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueNotice {
    NothingQueued,
    DjRequired(QueueAction),
    Cleared,
    Cleaned { removed: usize },
    CleanedOwn { removed: usize, member: String },
    NoMatches,
    ShuffleRefused(ShuffleRefusal),
    ShuffleCooldown { remaining: Duration },
    Shuffled,
}

/// What the queue listing should show.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueListing {
    /// Only the current track, nothing queued behind it.
    NowPlaying(NowPlaying),
    Pages(QueuePages),
}

/// The paginated queue listing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePages {
    pub now_playing: Option<NowPlaying>,
    /// The listed tracks, at most `QUEUE_DISPLAY_LIMIT`.
    pub tracks: Vec<TrackMetadata>,
    /// Length of the whole queue, listed or not.
    pub total_tracks: usize,
    pub remaining: Duration,
    pub page_count: usize,
    /// 1-based page to open the menu on.
    pub start_page: usize,
}

impl QueuePages {
    pub fn truncated(&self) -> bool {
        self.total_tracks > QUEUE_DISPLAY_LIMIT
    }

    /// Entries of a 1-based page with their 1-based queue positions.
    pub fn entries(&self, page: usize) -> impl Iterator<Item = (usize, &TrackMetadata)> {
        let range = page_range(page, self.tracks.len());
        let start = range.start;
        self.tracks[range]
            .iter()
            .enumerate()
            .map(move |(offset, track)| (start + offset + 1, track))
    }
}

/// Paginated search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPages {
    pub hits: Vec<SearchHit>,
    pub page_count: usize,
}

impl SearchPages {
    pub fn entries(&self, page: usize) -> &[SearchHit] {
        &self.hits[page_range(page, self.hits.len())]
    }
}

/// Build the queue listing, opening on `requested_page` (1-based, clamped).
pub async fn list_queue<P: QueuePlayer>(
    player: Option<&P>,
    requested_page: usize,
) -> Result<QueueListing, QueueNotice> {
    let player = player.ok_or(QueueNotice::NothingQueued)?;
    let now_playing = player.now_playing().await;
    let mut tracks = player.queue();

    if tracks.is_empty() {
        return now_playing
            .map(QueueListing::NowPlaying)
            .ok_or(QueueNotice::NothingQueued);
    }

    let total_tracks = tracks.len();
    let remaining = queue_duration(&tracks, now_playing.as_ref());
    tracks.truncate(QUEUE_DISPLAY_LIMIT);
    let page_count = page_count(tracks.len());
    let start_page = clamp_page(requested_page, page_count);

    debug!(
        "Listing {} of {} queued tracks over {} pages",
        tracks.len(),
        total_tracks,
        page_count
    );

    Ok(QueueListing::Pages(QueuePages {
        now_playing,
        tracks,
        total_tracks,
        remaining,
        page_count,
        start_page,
    }))
}

/// Empty the queue.
pub fn clear_queue<P: QueuePlayer>(player: Option<&P>, gate: &impl AccessGate) -> QueueNotice {
    let Some(player) = player.filter(|player| !player.is_empty()) else {
        return QueueNotice::NothingQueued;
    };
    if dj_denied(gate) {
        return QueueNotice::DjRequired(QueueAction::Clear);
    }

    let removed = player.clear();
    info!("Cleared {} tracks from the queue", removed);
    QueueNotice::Cleared
}

/// Drop the tracks whose requester is not among `listeners`.
pub fn clean_queue<P: QueuePlayer>(
    player: Option<&P>,
    gate: &impl AccessGate,
    listeners: &[UserId],
) -> QueueNotice {
    let Some(player) = player.filter(|player| !player.is_empty()) else {
        return QueueNotice::NothingQueued;
    };
    if dj_denied(gate) {
        return QueueNotice::DjRequired(QueueAction::Clean);
    }

    let removed = player.retain(&mut |track: &TrackMetadata| listeners.contains(&track.requester));
    info!("Removed {} tracks queued by absent members", removed);
    QueueNotice::Cleaned { removed }
}

/// Drop every track `member` queued.
pub fn clean_own_tracks<P: QueuePlayer>(
    player: Option<&P>,
    member: UserId,
    member_name: &str,
) -> QueueNotice {
    let Some(player) = player.filter(|player| !player.is_empty()) else {
        return QueueNotice::NothingQueued;
    };

    let removed = player.retain(&mut |track: &TrackMetadata| track.requester != member);
    info!("Removed {} tracks queued by {}", removed, member);
    QueueNotice::CleanedOwn {
        removed,
        member: member_name.to_string(),
    }
}

/// Search the queue for `words`.
pub fn search_queue<P: QueuePlayer>(
    player: Option<&P>,
    words: &str,
) -> Result<SearchPages, QueueNotice> {
    let player = player.ok_or(QueueNotice::NothingQueued)?;
    let queue = player.queue();
    if queue.is_empty() {
        return Err(QueueNotice::NothingQueued);
    }

    let hits = match_tracks(&queue, words);
    if hits.is_empty() {
        return Err(QueueNotice::NoMatches);
    }

    Ok(SearchPages {
        page_count: page_count(hits.len()),
        hits,
    })
}

/// Shuffle the queue, connecting to the member's channel first. Every
/// refusal gives the guild's cooldown slot back.
pub async fn shuffle_queue<C: VoiceConnector>(
    gate: &impl AccessGate,
    connected: bool,
    connector: &C,
    cooldown: &GuildCooldown,
    guild_id: GuildId,
    now: Instant,
) -> QueueNotice {
    if let Err(remaining) = cooldown.try_start(guild_id, now) {
        return QueueNotice::ShuffleCooldown { remaining };
    }

    let refuse = |notice: QueueNotice| {
        cooldown.reset(guild_id);
        notice
    };

    if dj_denied(gate) {
        return refuse(QueueNotice::DjRequired(QueueAction::Shuffle));
    }
    if !connected {
        return refuse(QueueNotice::ShuffleRefused(ShuffleRefusal::NothingQueued));
    }

    let player = match connector.connect().await {
        Ok(player) => player,
        Err(err) => {
            debug!("Shuffle could not connect in guild {}: {}", guild_id, err);
            return refuse(QueueNotice::ShuffleRefused(ShuffleRefusal::from(&err)));
        }
    };

    if player.is_empty() {
        return refuse(QueueNotice::ShuffleRefused(ShuffleRefusal::NothingQueued));
    }

    player.shuffle();
    info!("Shuffled the queue in guild {}", guild_id);
    QueueNotice::Shuffled
}
