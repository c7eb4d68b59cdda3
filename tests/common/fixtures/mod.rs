//! Sample tracks and members used across the queue tests

use rusty_queue::commands::music::utils::queue_manager::NowPlaying;
use rusty_queue::commands::music::utils::track_metadata::TrackMetadata;
use serenity::model::id::{GuildId, UserId};
use std::time::Duration;

pub const ALICE: UserId = UserId::new(111);
pub const BOB: UserId = UserId::new(222);
pub const CAROL: UserId = UserId::new(333);

pub const GUILD: GuildId = GuildId::new(987654321);

pub fn display_name(user: UserId) -> &'static str {
    match user.get() {
        111 => "alice",
        222 => "bob",
        333 => "carol",
        _ => "someone",
    }
}

/// A three-minute track requested by `requester`.
pub fn track(title: &str, requester: UserId) -> TrackMetadata {
    let mut metadata = TrackMetadata::new(title, requester, display_name(requester));
    metadata.url = Some(format!("https://example.com/{}", title.replace(' ', "-")));
    metadata.duration = Some(Duration::from_secs(180));
    metadata
}

pub fn livestream(title: &str, requester: UserId) -> TrackMetadata {
    let mut metadata = track(title, requester);
    metadata.duration = None;
    metadata.is_stream = true;
    metadata
}

/// `count` tracks titled "Song 1".."Song n", all requested by alice.
pub fn numbered_tracks(count: usize) -> Vec<TrackMetadata> {
    (1..=count)
        .map(|i| track(&format!("Song {}", i), ALICE))
        .collect()
}

pub fn titles(tracks: &[TrackMetadata]) -> Vec<String> {
    tracks.iter().map(|track| track.title.clone()).collect()
}

pub fn playing(track: TrackMetadata, position_secs: u64) -> NowPlaying {
    NowPlaying {
        track,
        position: Duration::from_secs(position_secs),
        paused: false,
    }
}
