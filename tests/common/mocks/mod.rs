//! Mock implementations of the player, voice connection and permission seams

use async_trait::async_trait;
use mockall::mock;
use rusty_queue::commands::music::utils::access::AccessGate;
use rusty_queue::commands::music::utils::music_manager::{MusicError, MusicResult};
use rusty_queue::commands::music::utils::queue_manager::{NowPlaying, QueuePlayer, VoiceConnector};
use rusty_queue::commands::music::utils::track_metadata::TrackMetadata;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

mock! {
    pub Gate {}

    impl AccessGate for Gate {
        fn dj_enabled(&self) -> bool;
        fn vote_enabled(&self) -> bool;
        fn can_instaskip(&self) -> bool;
        fn is_alone(&self) -> bool;
    }
}

/// A gate answering every question with a fixed value.
pub fn gate(dj_enabled: bool, can_instaskip: bool, is_alone: bool) -> MockGate {
    let mut gate = MockGate::new();
    gate.expect_dj_enabled().return_const(dj_enabled);
    gate.expect_vote_enabled().return_const(false);
    gate.expect_can_instaskip().return_const(can_instaskip);
    gate.expect_is_alone().return_const(is_alone);
    gate
}

/// A gate that fails the test if anything asks it.
pub fn untouched_gate() -> MockGate {
    let mut gate = MockGate::new();
    gate.expect_dj_enabled().times(0);
    gate.expect_can_instaskip().times(0);
    gate.expect_is_alone().times(0);
    gate
}

/// In-memory player. Clones share state so tests can inspect a player handed
/// out by [`FakeConnector`].
#[derive(Clone, Default)]
pub struct FakePlayer {
    current: Arc<Mutex<Option<NowPlaying>>>,
    tracks: Arc<Mutex<Vec<TrackMetadata>>>,
    shuffles: Arc<AtomicUsize>,
}

impl FakePlayer {
    pub fn with_queue(tracks: Vec<TrackMetadata>) -> Self {
        let player = Self::default();
        *player.tracks.lock().unwrap() = tracks;
        player
    }

    pub fn playing(mut self, now_playing: NowPlaying) -> Self {
        self.current = Arc::new(Mutex::new(Some(now_playing)));
        self
    }

    pub fn tracks(&self) -> Vec<TrackMetadata> {
        self.tracks.lock().unwrap().clone()
    }

    pub fn shuffle_count(&self) -> usize {
        self.shuffles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueuePlayer for FakePlayer {
    async fn now_playing(&self) -> Option<NowPlaying> {
        self.current.lock().unwrap().clone()
    }

    fn queue(&self) -> Vec<TrackMetadata> {
        self.tracks()
    }

    fn retain(&self, keep: &mut dyn FnMut(&TrackMetadata) -> bool) -> usize {
        let mut tracks = self.tracks.lock().unwrap();
        let before = tracks.len();
        tracks.retain(|track| keep(track));
        before - tracks.len()
    }

    fn shuffle(&self) {
        self.tracks.lock().unwrap().reverse();
        self.shuffles.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connector that either hands out a fixed player or fails with a fixed error.
pub struct FakeConnector {
    outcome: Result<FakePlayer, fn() -> MusicError>,
    attempts: AtomicUsize,
}

impl FakeConnector {
    pub fn joining(player: FakePlayer) -> Self {
        Self {
            outcome: Ok(player),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: fn() -> MusicError) -> Self {
        Self {
            outcome: Err(error),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceConnector for FakeConnector {
    type Player = FakePlayer;

    async fn connect(&self) -> MusicResult<FakePlayer> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(|error| error())
    }
}
