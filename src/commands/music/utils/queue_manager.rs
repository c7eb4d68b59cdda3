//! The player seam used by the queue commands, plus the pure queue operations
//! (pagination, duration totals, fuzzy search) they are built from.

use async_trait::async_trait;
use std::ops::Range;
use std::time::Duration;

use super::music_manager::MusicResult;
use super::track_metadata::TrackMetadata;

/// At most this many queued tracks are paginated by the queue listing.
pub const QUEUE_DISPLAY_LIMIT: usize = 500;
/// Entries per page for queue listings and search results.
pub const TRACKS_PER_PAGE: usize = 10;
/// Number of best-scoring tracks considered by a queue search.
pub const SEARCH_RESULT_LIMIT: usize = 50;
/// Search hits must score strictly above this (0-100).
pub const SEARCH_SCORE_THRESHOLD: u8 = 89;

/// The track currently playing and where playback is.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub track: TrackMetadata,
    pub position: Duration,
    pub paused: bool,
}

impl NowPlaying {
    /// Time left in the current track. Streams have no end.
    pub fn remaining(&self) -> Duration {
        match self.track.duration {
            Some(duration) if !self.track.is_stream => duration.saturating_sub(self.position),
            _ => Duration::ZERO,
        }
    }
}

/// A guild's player: the currently playing track and the queue behind it.
/// The queue never includes the current track.
#[async_trait]
pub trait QueuePlayer: Send + Sync {
    async fn now_playing(&self) -> Option<NowPlaying>;

    /// Snapshot of the queued tracks, in play order.
    fn queue(&self) -> Vec<TrackMetadata>;

    /// Keep only the queued tracks for which `keep` is true, preserving order.
    /// Returns how many tracks were removed.
    fn retain(&self, keep: &mut dyn FnMut(&TrackMetadata) -> bool) -> usize;

    /// Randomise the order of the queued tracks.
    fn shuffle(&self);

    fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Remove every queued track. Returns how many were removed.
    fn clear(&self) -> usize {
        self.retain(&mut |_: &TrackMetadata| false)
    }
}

/// Establishes (or moves) the voice connection for the invoking member and
/// hands back the player for it.
#[async_trait]
pub trait VoiceConnector: Send + Sync {
    type Player: QueuePlayer;

    async fn connect(&self) -> MusicResult<Self::Player>;
}

/// Number of pages needed for `len` entries.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(TRACKS_PER_PAGE)
}

/// Clamp a 1-based page number into `1..=pages`.
pub fn clamp_page(requested: usize, pages: usize) -> usize {
    requested.clamp(1, pages.max(1))
}

/// Index range covered by a 1-based page over `len` entries.
pub fn page_range(page: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(TRACKS_PER_PAGE).min(len);
    let end = (start + TRACKS_PER_PAGE).min(len);
    start..end
}

/// Total playing time left: every non-stream queued track plus the rest of
/// the current one.
pub fn queue_duration(queue: &[TrackMetadata], now_playing: Option<&NowPlaying>) -> Duration {
    let queued: Duration = queue
        .iter()
        .filter(|track| !track.is_stream)
        .filter_map(|track| track.duration)
        .sum();

    queued + now_playing.map(NowPlaying::remaining).unwrap_or_default()
}

/// A queued track matching a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// 1-based position in the queue.
    pub position: usize,
    pub label: String,
    pub score: u8,
}

/// Fuzzy-match the queue against `words`. Returns the strong matches, best
/// first, ties kept in queue order.
pub fn match_tracks(queue: &[TrackMetadata], words: &str) -> Vec<SearchHit> {
    let mut scored: Vec<SearchHit> = queue
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let label = track.search_label();
            SearchHit {
                position: index + 1,
                score: partial_ratio(words, &label),
                label,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(SEARCH_RESULT_LIMIT);
    scored.retain(|hit| hit.score > SEARCH_SCORE_THRESHOLD);
    scored
}

/// Case-insensitive similarity (0-100) of the shorter string against the
/// best-aligned window of the longer one. Substrings score 100.
pub fn partial_ratio(needle: &str, haystack: &str) -> u8 {
    let needle = needle.trim().to_lowercase();
    let haystack = haystack.trim().to_lowercase();
    if needle.is_empty() || haystack.is_empty() {
        return 0;
    }
    if haystack.contains(&needle) || needle.contains(&haystack) {
        return 100;
    }

    let (short, long) = if needle.chars().count() <= haystack.chars().count() {
        (needle, haystack)
    } else {
        (haystack, needle)
    };
    let width = short.chars().count();
    let long: Vec<char> = long.chars().collect();

    let best = long
        .windows(width)
        .map(|window| {
            let window: String = window.iter().collect();
            let distance = strsim::levenshtein(&short, &window);
            1.0 - distance as f64 / (2 * width) as f64
        })
        .fold(0.0_f64, f64::max);

    (best * 100.0).round().clamp(0.0, 100.0) as u8
}
