//! Defines `TrackMetadata`, the information attached to every queued track
//! as songbird user data, and the text helpers used to describe it in embeds.

use serenity::model::id::UserId;
use songbird::input::AuxMetadata;
use std::time::Duration;
use url::Url;

/// Longest title shown for an entry on a queue page.
const SHORT_TITLE_LEN: usize = 40;

/// Unified representation of metadata for a queued track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The uploader or artist, if known.
    pub author: Option<String>,
    /// The page the track was resolved from, if available.
    pub url: Option<String>,
    /// The duration of the track; `None` for live streams.
    pub duration: Option<Duration>,
    pub is_stream: bool,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The user who requested the track.
    pub requester: UserId,
    /// Display name of the requester at the time the track was queued.
    pub requested_by: String,
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, requester: UserId, requested_by: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            url: None,
            duration: None,
            is_stream: false,
            thumbnail: None,
            requester,
            requested_by: requested_by.into(),
        }
    }

    /// Builds metadata from what songbird reports for an input.
    pub fn from_aux(aux: &AuxMetadata, requester: UserId, requested_by: impl Into<String>) -> Self {
        Self {
            title: aux
                .title
                .clone()
                .or_else(|| aux.track.clone())
                .unwrap_or_else(|| "Unknown Track".to_string()),
            author: aux.artist.clone().or_else(|| aux.channel.clone()),
            url: aux.source_url.clone(),
            duration: aux.duration,
            is_stream: aux.duration.is_none(),
            thumbnail: aux.thumbnail.clone(),
            requester,
            requested_by: requested_by.into(),
        }
    }

    /// Whether the track came from an http(s) page rather than a local or raw source.
    pub fn has_web_url(&self) -> bool {
        self.url.as_deref().is_some_and(is_web_url)
    }

    /// Label used when searching the queue.
    pub fn search_label(&self) -> String {
        match &self.author {
            Some(author) if !self.has_web_url() => format!("{} - {}", author, self.title),
            _ => self.title.clone(),
        }
    }

    /// Markdown description for embeds. `shorten` truncates long titles.
    pub fn description(&self, shorten: bool) -> String {
        let title = if shorten {
            shorten_title(&self.title)
        } else {
            self.title.clone()
        };

        match (&self.url, self.has_web_url()) {
            (Some(url), true) => format!("**[{}]({})**", title, url),
            _ => match &self.author {
                Some(author) => format!("**{} - {}**", author, title),
                None => format!("**{}**", title),
            },
        }
    }
}

/// Checks whether the input parses as an http or https URL.
pub fn is_web_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn shorten_title(title: &str) -> String {
    if title.chars().count() > SHORT_TITLE_LEN {
        let cut: String = title.chars().take(SHORT_TITLE_LEN).collect();
        format!("{}...", cut.trim_end())
    } else {
        title.to_string()
    }
}
