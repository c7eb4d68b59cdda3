//! Behaviour of the queue commands against in-memory players and mocked permissions

#![cfg(feature = "music")]

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::time::{Duration, Instant};
use test_case::test_case;

use common::fixtures::*;
use common::mocks::*;
use rusty_queue::commands::music::utils::cooldown::{GuildCooldown, SHUFFLE_COOLDOWN_PERIOD};
use rusty_queue::commands::music::utils::music_manager::MusicError;
use rusty_queue::commands::music::utils::queue_service::*;

fn no_player() -> Option<&'static FakePlayer> {
    None
}

mod clear {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clearing_an_empty_queue_reports_nothing_queued() {
        common::init();
        let gate = untouched_gate();

        assert_eq!(clear_queue(no_player(), &gate), QueueNotice::NothingQueued);

        let idle = FakePlayer::with_queue(vec![]).playing(playing(track("Now", BOB), 10));
        assert_eq!(clear_queue(Some(&idle), &gate), QueueNotice::NothingQueued);
    }

    #[test]
    fn test_clear_needs_dj_role_in_dj_mode() {
        let player = FakePlayer::with_queue(numbered_tracks(3));

        let notice = clear_queue(Some(&player), &gate(true, false, false));

        assert_eq!(notice, QueueNotice::DjRequired(QueueAction::Clear));
        assert_eq!(player.tracks().len(), 3);
    }

    #[rstest]
    #[case::dj_mode_off(false, false, false)]
    #[case::can_instaskip(true, true, false)]
    #[case::alone_in_channel(true, false, true)]
    fn test_clear_empties_queue(
        #[case] dj_enabled: bool,
        #[case] can_instaskip: bool,
        #[case] is_alone: bool,
    ) {
        let player = FakePlayer::with_queue(numbered_tracks(4));

        let notice = clear_queue(Some(&player), &gate(dj_enabled, can_instaskip, is_alone));

        assert_eq!(notice, QueueNotice::Cleared);
        assert!(player.tracks().is_empty());
    }
}

mod clean {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mixed_queue() -> FakePlayer {
        FakePlayer::with_queue(vec![
            track("one", ALICE),
            track("two", BOB),
            track("three", ALICE),
            track("four", CAROL),
            track("five", ALICE),
        ])
    }

    #[test]
    fn test_clean_self_removes_exactly_own_tracks() {
        let player = mixed_queue();

        let notice = clean_own_tracks(Some(&player), ALICE, "alice");

        assert_eq!(
            notice,
            QueueNotice::CleanedOwn {
                removed: 3,
                member: "alice".to_string()
            }
        );
        assert_eq!(titles(&player.tracks()), vec!["two", "four"]);
    }

    #[test]
    fn test_clean_self_without_own_tracks_removes_nothing() {
        let player = FakePlayer::with_queue(vec![track("two", BOB), track("four", CAROL)]);

        let notice = clean_own_tracks(Some(&player), ALICE, "alice");

        assert_matches!(notice, QueueNotice::CleanedOwn { removed: 0, .. });
        assert_eq!(titles(&player.tracks()), vec!["two", "four"]);
    }

    #[test]
    fn test_clean_self_on_empty_queue() {
        assert_eq!(
            clean_own_tracks(no_player(), ALICE, "alice"),
            QueueNotice::NothingQueued
        );
    }

    #[test]
    fn test_clean_keeps_only_listeners_tracks_in_order() {
        let player = mixed_queue();

        let notice = clean_queue(Some(&player), &gate(false, false, false), &[ALICE, CAROL]);

        assert_eq!(notice, QueueNotice::Cleaned { removed: 1 });
        assert_eq!(titles(&player.tracks()), vec!["one", "three", "four", "five"]);
    }

    #[test]
    fn test_clean_with_nobody_listening_empties_queue() {
        let player = mixed_queue();

        let notice = clean_queue(Some(&player), &gate(false, false, false), &[]);

        assert_eq!(notice, QueueNotice::Cleaned { removed: 5 });
        assert!(player.tracks().is_empty());
    }

    #[test]
    fn test_clean_needs_dj_role_in_dj_mode() {
        let player = mixed_queue();

        let notice = clean_queue(Some(&player), &gate(true, false, false), &[ALICE]);

        assert_eq!(notice, QueueNotice::DjRequired(QueueAction::Clean));
        assert_eq!(player.tracks().len(), 5);
    }
}

mod shuffle {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn cooldown() -> GuildCooldown {
        GuildCooldown::new(SHUFFLE_COOLDOWN_PERIOD)
    }

    #[tokio::test]
    async fn test_dj_refusal_resets_cooldown() {
        let cooldown = cooldown();
        let connector = FakeConnector::joining(FakePlayer::with_queue(numbered_tracks(3)));
        let now = Instant::now();

        let notice = shuffle_queue(
            &gate(true, false, false),
            true,
            &connector,
            &cooldown,
            GUILD,
            now,
        )
        .await;

        assert_eq!(notice, QueueNotice::DjRequired(QueueAction::Shuffle));
        assert_eq!(connector.attempts(), 0);
        assert_eq!(cooldown.try_start(GUILD, now), Ok(()));
    }

    #[tokio::test]
    async fn test_accepted_shuffle_blocks_the_next_one() {
        let cooldown = cooldown();
        let player = FakePlayer::with_queue(numbered_tracks(3));
        let connector = FakeConnector::joining(player.clone());
        let gate = gate(false, false, false);
        let start = Instant::now();

        let first = shuffle_queue(&gate, true, &connector, &cooldown, GUILD, start).await;
        assert_eq!(first, QueueNotice::Shuffled);
        assert_eq!(player.shuffle_count(), 1);
        assert_eq!(titles(&player.tracks()), vec!["Song 3", "Song 2", "Song 1"]);

        let second = shuffle_queue(
            &gate,
            true,
            &connector,
            &cooldown,
            GUILD,
            start + Duration::from_secs(10),
        )
        .await;
        assert_eq!(
            second,
            QueueNotice::ShuffleCooldown {
                remaining: Duration::from_secs(20)
            }
        );
        assert_eq!(player.shuffle_count(), 1);

        let third = shuffle_queue(
            &gate,
            true,
            &connector,
            &cooldown,
            GUILD,
            start + SHUFFLE_COOLDOWN_PERIOD,
        )
        .await;
        assert_eq!(third, QueueNotice::Shuffled);
        assert_eq!(player.shuffle_count(), 2);
    }

    #[tokio::test]
    async fn test_not_connected_reports_nothing_queued() {
        let cooldown = cooldown();
        let connector = FakeConnector::joining(FakePlayer::with_queue(numbered_tracks(3)));
        let now = Instant::now();

        let notice = shuffle_queue(
            &gate(false, false, false),
            false,
            &connector,
            &cooldown,
            GUILD,
            now,
        )
        .await;

        assert_eq!(
            notice,
            QueueNotice::ShuffleRefused(ShuffleRefusal::NothingQueued)
        );
        assert_eq!(connector.attempts(), 0);
        assert!(cooldown.try_start(GUILD, now).is_ok());
    }

    #[test_case(|| MusicError::UserNotInVoiceChannel, ShuffleRefusal::NotInVoice ; "author not in voice")]
    #[test_case(|| MusicError::MissingConnectPermission, ShuffleRefusal::MissingPermission ; "missing connect permission")]
    #[test_case(|| MusicError::NoVoiceManager, ShuffleRefusal::BackendUnavailable ; "voice backend missing")]
    #[test_case(|| MusicError::JoinError("gateway closed".into()), ShuffleRefusal::NothingQueued ; "join failed")]
    #[tokio::test]
    async fn test_connection_failures_are_reported(
        error: fn() -> MusicError,
        expected: ShuffleRefusal,
    ) {
        let cooldown = cooldown();
        let connector = FakeConnector::failing(error);
        let now = Instant::now();

        let notice = shuffle_queue(
            &gate(false, false, false),
            true,
            &connector,
            &cooldown,
            GUILD,
            now,
        )
        .await;

        assert_eq!(notice, QueueNotice::ShuffleRefused(expected));
        assert_eq!(connector.attempts(), 1);
        assert!(cooldown.try_start(GUILD, now).is_ok());
    }

    #[tokio::test]
    async fn test_empty_queue_after_connecting() {
        let cooldown = cooldown();
        let player = FakePlayer::with_queue(vec![]).playing(playing(track("Now", BOB), 0));
        let connector = FakeConnector::joining(player.clone());
        let now = Instant::now();

        let notice = shuffle_queue(
            &gate(false, false, false),
            true,
            &connector,
            &cooldown,
            GUILD,
            now,
        )
        .await;

        assert_eq!(
            notice,
            QueueNotice::ShuffleRefused(ShuffleRefusal::NothingQueued)
        );
        assert_eq!(player.shuffle_count(), 0);
        assert!(cooldown.try_start(GUILD, now).is_ok());
    }
}

mod listing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_nothing_playing_and_nothing_queued() {
        assert_matches!(
            list_queue(no_player(), 1).await,
            Err(QueueNotice::NothingQueued)
        );

        let idle = FakePlayer::with_queue(vec![]);
        assert_matches!(
            list_queue(Some(&idle), 1).await,
            Err(QueueNotice::NothingQueued)
        );
    }

    #[tokio::test]
    async fn test_only_current_track_shows_now_playing() {
        let current = playing(track("Now", BOB), 42);
        let player = FakePlayer::with_queue(vec![]).playing(current.clone());

        let listing = list_queue(Some(&player), 1).await;

        assert_matches!(listing, Ok(QueueListing::NowPlaying(now)) if now == current);
    }

    #[tokio::test]
    async fn test_long_queue_is_truncated_before_paginating() {
        let player = FakePlayer::with_queue(numbered_tracks(612));

        let Ok(QueueListing::Pages(pages)) = list_queue(Some(&player), 1).await else {
            panic!("expected a paginated listing");
        };

        assert!(pages.truncated());
        assert_eq!(pages.tracks.len(), 500);
        assert_eq!(pages.total_tracks, 612);
        assert_eq!(pages.page_count, 50);
        assert_eq!(player.tracks().len(), 612);
    }

    #[rstest]
    #[case::first(1, 1)]
    #[case::middle(2, 2)]
    #[case::past_the_end(99, 3)]
    #[case::zero(0, 1)]
    #[tokio::test]
    async fn test_requested_page_is_clamped(#[case] requested: usize, #[case] expected: usize) {
        let player = FakePlayer::with_queue(numbered_tracks(25));

        let Ok(QueueListing::Pages(pages)) = list_queue(Some(&player), requested).await else {
            panic!("expected a paginated listing");
        };

        assert_eq!(pages.start_page, expected);
    }

    #[tokio::test]
    async fn test_last_page_entries_keep_queue_positions() {
        let player = FakePlayer::with_queue(numbered_tracks(25));

        let Ok(QueueListing::Pages(pages)) = list_queue(Some(&player), 3).await else {
            panic!("expected a paginated listing");
        };
        let entries: Vec<(usize, String)> = pages
            .entries(3)
            .map(|(position, track)| (position, track.title.clone()))
            .collect();

        assert_eq!(
            entries,
            (21..=25)
                .map(|i| (i, format!("Song {}", i)))
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_remaining_time_skips_streams_and_counts_current_track() {
        let mut queued = numbered_tracks(2);
        queued.push(livestream("radio", CAROL));
        let player = FakePlayer::with_queue(queued).playing(playing(track("Now", BOB), 60));

        let Ok(QueueListing::Pages(pages)) = list_queue(Some(&player), 1).await else {
            panic!("expected a paginated listing");
        };

        // Two queued tracks plus the two minutes left of the current one.
        assert_eq!(pages.remaining, Duration::from_secs(180 * 2 + 120));
        assert!(pages.now_playing.is_some());
    }
}

mod search {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strong_matches_best_first() {
        let player = FakePlayer::with_queue(vec![
            track("Under Pressure", ALICE),
            track("Bohemian Rapsody live", BOB),
            track("Another One Bites the Dust", ALICE),
            track("Bohemian Rhapsody", CAROL),
        ]);

        let results = search_queue(Some(&player), "bohemian rhapsody").unwrap();
        let positions: Vec<usize> = results.hits.iter().map(|hit| hit.position).collect();

        assert_eq!(positions, vec![4, 2]);
        assert_eq!(results.page_count, 1);
    }

    #[test]
    fn test_no_matches() {
        let player = FakePlayer::with_queue(numbered_tracks(5));

        assert_matches!(
            search_queue(Some(&player), "metallica"),
            Err(QueueNotice::NoMatches)
        );
        assert_matches!(
            search_queue(no_player(), "metallica"),
            Err(QueueNotice::NothingQueued)
        );
    }

    #[test]
    fn test_results_are_paged_by_ten() {
        let player = FakePlayer::with_queue(numbered_tracks(23));

        let results = search_queue(Some(&player), "song").unwrap();

        assert_eq!(results.hits.len(), 23);
        assert_eq!(results.page_count, 3);
        assert_eq!(results.entries(3).len(), 3);
        assert_eq!(results.entries(1)[0].position, 1);
    }
}
