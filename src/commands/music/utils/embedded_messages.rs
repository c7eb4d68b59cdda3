use poise::{ChoiceParameter, CreateReply};
use serenity::all::{CreateEmbed, CreateEmbedFooter};
use serenity::model::id::RoleId;
use std::time::Duration;
use thousands::Separable;

use super::queue_manager::NowPlaying;
use super::queue_service::{QueueAction, QueueNotice, QueuePages, SearchPages, ShuffleRefusal};
use super::{format_duration, music_manager::MusicError, track_metadata::TrackMetadata};
use crate::utils::database::{GuildFlag, GuildSettings};

const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

const PROGRESS_SECTIONS: usize = 12;
const PROGRESS_BAR: &str = "━";
const PROGRESS_KNOB: &str = "🔘";

/// Draw the playback progress bar, e.g. `▶️━━━🔘━━━━━━━━`.
pub fn draw_progress(position: Duration, duration: Option<Duration>, paused: bool) -> String {
    let ratio = match duration {
        Some(duration) if !duration.is_zero() => {
            position.as_secs_f64() / duration.as_secs_f64()
        }
        _ => 1.0,
    };
    let knob = (ratio * PROGRESS_SECTIONS as f64).round() as usize;

    let mut bar = String::from(if paused { "⏸️" } else { "▶️" });
    for section in 0..PROGRESS_SECTIONS {
        bar.push_str(if section == knob {
            PROGRESS_KNOB
        } else {
            PROGRESS_BAR
        });
    }
    bar
}

fn check_mark(enabled: bool) -> &'static str {
    if enabled { "✅" } else { "❌" }
}

/// Auto-Play/Shuffle/Repeat line shown under queue embeds.
pub fn status_footer(settings: &GuildSettings) -> String {
    format!(
        "Auto-Play: {} | Shuffle: {} | Repeat: {}",
        check_mark(settings.auto_play),
        check_mark(settings.shuffle),
        check_mark(settings.repeat)
    )
}

/// The `pos`/`dur` pair shown next to the progress bar.
fn playback_times(now_playing: &NowPlaying) -> (String, String) {
    let position = format_duration(now_playing.position);
    let duration = match now_playing.track.duration {
        Some(duration) if !now_playing.track.is_stream => format_duration(duration),
        _ => "LIVE".to_string(),
    };
    (position, duration)
}

fn progress_line(now_playing: &NowPlaying) -> String {
    let (position, duration) = playback_times(now_playing);
    let bar = draw_progress(
        now_playing.position,
        now_playing.track.duration,
        now_playing.paused,
    );
    format!("{}`{}`/`{}`", bar, position, duration)
}

fn thumbnail_for<'a>(track: &'a TrackMetadata, settings: &GuildSettings) -> Option<&'a str> {
    track.thumbnail.as_deref().filter(|_| settings.thumbnail)
}

/// Text of the "Now Playing" embed shown when nothing is queued.
pub fn now_playing_description(now_playing: &NowPlaying) -> String {
    format!(
        "{}\n Requested by: **{}**\n\n{}",
        now_playing.track.description(false),
        now_playing.track.requested_by,
        progress_line(now_playing)
    )
}

/// Create an embed for the current track when nothing is queued behind it
pub fn now_playing(now_playing: &NowPlaying, settings: &GuildSettings) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("Now Playing")
        .description(now_playing_description(now_playing))
        .footer(CreateEmbedFooter::new(status_footer(settings)))
        .color(SUCCESS_COLOR);

    if let Some(thumbnail) = thumbnail_for(&now_playing.track, settings) {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}

/// Text of one queue page: the truncation note, the current track, then the entries.
pub fn queue_page_description(pages: &QueuePages, page: usize) -> String {
    let mut description = String::new();

    if pages.truncated() {
        description.push_str(&format!(
            "__Too many songs in the queue, only showing the first {}__.\n\n",
            pages.tracks.len().separate_with_commas()
        ));
    }

    if let Some(current) = &pages.now_playing {
        if current.track.is_stream {
            description.push_str("**Currently livestreaming:**\n");
        } else {
            description.push_str("Playing: ");
        }
        description.push_str(&format!(
            "{}\nRequested by: **{}**\n\n{}\n\n",
            current.track.description(false),
            current.track.requested_by,
            progress_line(current)
        ));
    }

    for (position, track) in pages.entries(page) {
        description.push_str(&format!(
            "`{}.` {}, requested by **{}**\n",
            position,
            track.description(true),
            track.requested_by
        ));
    }

    description
}

/// Footer of one queue page.
pub fn queue_page_footer(pages: &QueuePages, page: usize, settings: &GuildSettings) -> String {
    format!(
        "Page {}/{} | {} tracks, {} remaining\n{}",
        page.separate_with_commas(),
        pages.page_count.separate_with_commas(),
        pages.total_tracks.separate_with_commas(),
        format_duration(pages.remaining),
        status_footer(settings)
    )
}

/// Create one embed per queue page
pub fn queue_pages(pages: &QueuePages, guild_name: &str, settings: &GuildSettings) -> Vec<CreateEmbed> {
    let thumbnail = pages
        .now_playing
        .as_ref()
        .and_then(|current| thumbnail_for(&current.track, settings));

    (1..=pages.page_count)
        .map(|page| {
            let mut embed = CreateEmbed::new()
                .title(format!("Queue for __{}__", guild_name))
                .description(queue_page_description(pages, page))
                .footer(CreateEmbedFooter::new(queue_page_footer(pages, page, settings)))
                .color(SUCCESS_COLOR);
            if let Some(thumbnail) = thumbnail {
                embed = embed.thumbnail(thumbnail);
            }
            embed
        })
        .collect()
}

pub fn search_page_description(results: &SearchPages, page: usize) -> String {
    results
        .entries(page)
        .iter()
        .map(|hit| format!("`{}.` **{}**\n", hit.position, hit.label))
        .collect()
}

/// Create one embed per page of search results
pub fn search_pages(results: &SearchPages) -> Vec<CreateEmbed> {
    (1..=results.page_count)
        .map(|page| {
            CreateEmbed::new()
                .title("Matching Tracks:")
                .description(search_page_description(results, page))
                .footer(CreateEmbedFooter::new(format!(
                    "Page {}/{} | {} tracks",
                    page.separate_with_commas(),
                    results.page_count.separate_with_commas(),
                    results.hits.len().separate_with_commas()
                )))
                .color(SUCCESS_COLOR)
        })
        .collect()
}

/// Title, optional description and whether the notice reports a refusal.
pub fn notice_text(notice: &QueueNotice) -> (String, Option<String>, bool) {
    const NOTHING_QUEUED: &str = "There's nothing in the queue.";

    match notice {
        QueueNotice::NothingQueued => (NOTHING_QUEUED.to_string(), None, true),
        QueueNotice::DjRequired(action) => (
            format!("Unable To {} Queue", capitalized(*action)),
            Some(format!("You need the DJ role to {} the queue.", action.verb())),
            true,
        ),
        QueueNotice::Cleared => (
            "Queue Modified".to_string(),
            Some("The queue has been cleared.".to_string()),
            false,
        ),
        QueueNotice::Cleaned { removed: 0 } | QueueNotice::CleanedOwn { removed: 0, .. } => {
            ("Removed 0 tracks.".to_string(), None, false)
        }
        QueueNotice::Cleaned { removed } => (
            "Removed tracks from the queue".to_string(),
            Some(format!(
                "Removed {} tracks queued by members outside of the voice channel.",
                removed.separate_with_commas()
            )),
            false,
        ),
        QueueNotice::CleanedOwn { removed, member } => (
            "Removed tracks from the queue".to_string(),
            Some(format!(
                "Removed {} tracks queued by {}.",
                removed.separate_with_commas(),
                member
            )),
            false,
        ),
        QueueNotice::NoMatches => ("No matches.".to_string(), None, true),
        QueueNotice::ShuffleRefused(refusal) => {
            let reason = match refusal {
                ShuffleRefusal::NotInVoice => "Connect to a voice channel first.",
                ShuffleRefusal::MissingPermission => {
                    "I don't have permission to connect to your channel."
                }
                ShuffleRefusal::BackendUnavailable => {
                    "Connection to the voice backend has not yet been established."
                }
                ShuffleRefusal::NothingQueued => NOTHING_QUEUED,
            };
            (
                "Unable To Shuffle Queue".to_string(),
                Some(reason.to_string()),
                true,
            )
        }
        QueueNotice::ShuffleCooldown { remaining } => (
            "This command is on cooldown".to_string(),
            Some(format!(
                "Try again in {} seconds.",
                remaining.as_secs_f64().ceil() as u64
            )),
            true,
        ),
        QueueNotice::Shuffled => ("Queue has been shuffled.".to_string(), None, false),
    }
}

fn capitalized(action: QueueAction) -> &'static str {
    match action {
        QueueAction::Clear => "Clear",
        QueueAction::Clean => "Clean",
        QueueAction::Shuffle => "Shuffle",
    }
}

/// Create a reply for the outcome of a queue command
pub fn queue_notice(notice: &QueueNotice) -> CreateReply {
    let (title, description, refused) = notice_text(notice);
    let mut embed = CreateEmbed::new()
        .title(title)
        .color(if refused { ERROR_COLOR } else { SUCCESS_COLOR });
    if let Some(description) = description {
        embed = embed.description(description);
    }
    CreateReply::default().embed(embed)
}

/// Create an embed for a newly queued track. Position 0 means it plays right away.
pub fn track_enqueued(metadata: &TrackMetadata, position: usize) -> CreateReply {
    let duration = match metadata.duration {
        Some(duration) if !metadata.is_stream => format_duration(duration),
        _ => "LIVE".to_string(),
    };
    let mut embed = CreateEmbed::new()
        .title(if position == 0 {
            "🎵 Now Playing"
        } else {
            "🎵 Added to Queue"
        })
        .description(metadata.description(false))
        .field("Duration", format!("`{}`", duration), true)
        .color(SUCCESS_COLOR);
    if position > 0 {
        embed = embed.field("Position", format!("`#{}`", position), true);
    }
    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    CreateReply::default().embed(embed)
}

/// Create an embed for when a track is paused
pub fn paused(metadata: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏸️ Paused")
            .description(format!("Paused {}", metadata.description(false)))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is resumed
pub fn resumed(metadata: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("▶️ Resumed")
            .description(format!("Resumed {}", metadata.description(false)))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when no track is playing
pub fn no_track_playing() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description("No track is currently playing")
            .color(ERROR_COLOR),
    )
}

/// Create an embed for when the bot stops playing music
pub fn stopped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description("Playback stopped and queue cleared")
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(format!("You need to be in a voice channel: {}", err))
                .color(ERROR_COLOR),
        )
        .ephemeral(true)
}

/// Create an embed for when the bot fails to join a voice channel
pub fn failed_to_join_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(format!("Failed to join voice channel: {}", err))
            .color(ERROR_COLOR),
    )
}

/// Create an embed for when the bot fails to process an audio source
pub fn failed_to_process_audio_source(err: MusicError) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(format!("Failed to process audio source: {}", err))
            .color(ERROR_COLOR),
    )
}

/// Create an embed listing the guild's audio settings
pub fn guild_settings(guild_name: &str, settings: &GuildSettings) -> CreateReply {
    let dj_role = settings
        .dj_role
        .map(|role| format!("<@&{}>", role))
        .unwrap_or_else(|| "Not set".to_string());

    let mut embed = CreateEmbed::new()
        .title(format!("Audio settings for __{}__", guild_name))
        .field("DJ role", dj_role, false)
        .color(SUCCESS_COLOR);
    for flag in [
        GuildFlag::Dj,
        GuildFlag::Vote,
        GuildFlag::Shuffle,
        GuildFlag::Repeat,
        GuildFlag::AutoPlay,
        GuildFlag::Thumbnail,
    ] {
        embed = embed.field(flag.name(), check_mark(settings.flag(flag)), true);
    }

    CreateReply::default().embed(embed)
}

/// Create an embed for when a guild flag is toggled
pub fn flag_toggled(flag: GuildFlag, enabled: bool, dj_role_missing: bool) -> CreateReply {
    let mut description = format!(
        "`{}` is now {}.",
        flag.name(),
        if enabled { "enabled" } else { "disabled" }
    );
    if flag == GuildFlag::Dj && enabled && dj_role_missing {
        description.push_str("\nNo DJ role is set yet, use `musicset djrole` to pick one.");
    }

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("Settings Updated")
            .description(description)
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when the DJ role changes
pub fn dj_role_updated(role: Option<RoleId>) -> CreateReply {
    let description = match role {
        Some(role) => format!("DJ role set to <@&{}>.", role),
        None => "DJ role cleared.".to_string(),
    };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("Settings Updated")
            .description(description)
            .color(SUCCESS_COLOR),
    )
}
