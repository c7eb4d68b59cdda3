//! Stop and pause reactions under the "Now Playing" embed.

use serenity::http::{Http, HttpError};
use serenity::model::channel::{Message, ReactionType};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::Context;

/// How long the invoking member has to pick a reaction.
pub const REACTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause between removing the bot's own reactions one at a time.
const REMOVE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackReaction {
    Stop,
    Pause,
}

impl PlaybackReaction {
    pub const ALL: [PlaybackReaction; 2] = [PlaybackReaction::Stop, PlaybackReaction::Pause];

    pub fn emoji(self) -> &'static str {
        match self {
            PlaybackReaction::Stop => "⏹",
            PlaybackReaction::Pause => "⏯",
        }
    }

    fn reaction_type(self) -> ReactionType {
        ReactionType::Unicode(self.emoji().to_string())
    }

    /// Clients may send the emoji with or without the emoji presentation selector.
    pub fn from_emoji(emoji: &ReactionType) -> Option<Self> {
        let ReactionType::Unicode(name) = emoji else {
            return None;
        };
        let name = name.trim_end_matches('\u{FE0F}');
        Self::ALL
            .into_iter()
            .find(|reaction| reaction.emoji() == name)
    }
}

/// Add the control reactions in the background so the wait can start at once.
pub fn start_adding_reactions(http: Arc<Http>, message: Message) -> JoinHandle<()> {
    tokio::spawn(async move {
        for reaction in PlaybackReaction::ALL {
            if let Err(e) = message.react(http.as_ref(), reaction.reaction_type()).await {
                debug!("Could not add {} reaction: {}", reaction.emoji(), e);
                return;
            }
        }
    })
}

/// Wait for the author of `ctx` to pick one of the controls on `message`.
pub async fn await_playback_reaction(ctx: Context<'_>, message: &Message) -> Option<PlaybackReaction> {
    let reaction = message
        .await_reaction(ctx.serenity_context().shard.clone())
        .author_id(ctx.author().id)
        .filter(|reaction| PlaybackReaction::from_emoji(&reaction.emoji).is_some())
        .timeout(REACTION_TIMEOUT)
        .await?;

    PlaybackReaction::from_emoji(&reaction.emoji)
}

/// Remove the control reactions without holding up the caller. Without
/// Manage Messages the bot can still take back its own reactions.
pub fn clear_reactions(http: Arc<Http>, message: Message) {
    tokio::spawn(async move {
        let Err(e) = message.delete_reactions(http.as_ref()).await else {
            return;
        };
        if !is_forbidden(&e) {
            warn!("Failed to clear reactions on message {}: {}", message.id, e);
            return;
        }

        for reaction in PlaybackReaction::ALL {
            sleep(REMOVE_DELAY).await;
            if let Err(e) = message
                .delete_reaction(&http, None, reaction.reaction_type())
                .await
            {
                debug!("Could not remove own {} reaction: {}", reaction.emoji(), e);
            }
        }
    });
}

fn is_forbidden(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("⏹", Some(PlaybackReaction::Stop) ; "stop")]
    #[test_case("⏹\u{FE0F}", Some(PlaybackReaction::Stop) ; "stop with selector")]
    #[test_case("⏯️", Some(PlaybackReaction::Pause) ; "pause with selector")]
    #[test_case("⏭", None ; "skip is not a control")]
    fn test_from_emoji(emoji: &str, expected: Option<PlaybackReaction>) {
        let reaction = ReactionType::Unicode(emoji.to_string());
        assert_eq!(PlaybackReaction::from_emoji(&reaction), expected);
    }
}
