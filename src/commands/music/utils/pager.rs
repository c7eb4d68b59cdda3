//! Button-driven pagination over a list of embeds.

use futures::{Stream, StreamExt};
use poise::CreateReply;
use serenity::all::{
    ButtonStyle, ComponentInteractionCollector, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, ReactionType,
};
use std::time::Duration;
use tracing::debug;

use crate::{Context, Error};

/// How long the menu waits for the next button press.
pub const MENU_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuControl {
    Previous,
    Close,
    Next,
    Info,
}

impl MenuControl {
    fn emoji(self) -> &'static str {
        match self {
            MenuControl::Previous => "⬅️",
            MenuControl::Close => "❌",
            MenuControl::Next => "➡️",
            MenuControl::Info => "ℹ️",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            MenuControl::Previous => "prev",
            MenuControl::Close => "close",
            MenuControl::Next => "next",
            MenuControl::Info => "info",
        }
    }

    /// Button id, unique to the invocation that opened the menu.
    pub fn custom_id(self, menu_id: u64) -> String {
        format!("{}{}", menu_id, self.suffix())
    }

    pub fn from_custom_id(custom_id: &str, menu_id: u64) -> Option<Self> {
        let suffix = custom_id.strip_prefix(&menu_id.to_string())?;
        [
            MenuControl::Previous,
            MenuControl::Close,
            MenuControl::Next,
            MenuControl::Info,
        ]
        .into_iter()
        .find(|control| control.suffix() == suffix)
    }
}

/// How the menu ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Closed,
    TimedOut,
    /// The info button was pressed; the caller shows the help text.
    Info,
}

/// Index of the page shown after pressing `control` on page `current` of
/// `len` pages. Moving past either end wraps around.
pub fn turn_page(current: usize, len: usize, control: MenuControl) -> usize {
    if len == 0 {
        return 0;
    }
    match control {
        MenuControl::Previous => current.checked_sub(1).unwrap_or(len - 1),
        MenuControl::Next => (current + 1) % len,
        MenuControl::Close | MenuControl::Info => current,
    }
}

fn menu_buttons(menu_id: u64, with_info: bool) -> Vec<CreateActionRow> {
    let mut controls = vec![MenuControl::Previous, MenuControl::Close, MenuControl::Next];
    if with_info {
        controls.push(MenuControl::Info);
    }

    let buttons = controls
        .into_iter()
        .map(|control| {
            CreateButton::new(control.custom_id(menu_id))
                .emoji(ReactionType::Unicode(control.emoji().to_string()))
                .style(if control == MenuControl::Close {
                    ButtonStyle::Danger
                } else {
                    ButtonStyle::Secondary
                })
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

/// Next item of `presses`, or `None` once `idle` passes without one or the
/// stream ends.
pub async fn next_within<S>(presses: &mut S, idle: Duration) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    tokio::time::timeout(idle, presses.next()).await.ok().flatten()
}

/// Show `pages` starting at index `start` and let the author flip through
/// them until the menu is closed or left idle for [`MENU_TIMEOUT`].
pub async fn paginate(
    ctx: Context<'_>,
    pages: &[CreateEmbed],
    start: usize,
    with_info: bool,
) -> Result<MenuExit, Error> {
    let Some(last) = pages.len().checked_sub(1) else {
        return Ok(MenuExit::Closed);
    };
    let mut index = start.min(last);
    let menu_id = ctx.id();

    // One collector for the whole menu; presses that land mid-response stay queued.
    let prefix = menu_id.to_string();
    let mut presses = Box::pin(
        ComponentInteractionCollector::new(ctx.serenity_context().shard.clone())
            .author_id(ctx.author().id)
            .filter(move |press| press.data.custom_id.starts_with(&prefix))
            .stream(),
    );

    let reply = ctx
        .send(
            CreateReply::default()
                .embed(pages[index].clone())
                .components(menu_buttons(menu_id, with_info)),
        )
        .await?;

    loop {
        let Some(press) = next_within(&mut presses, MENU_TIMEOUT).await else {
            debug!("Menu {} timed out on page {}", menu_id, index + 1);
            reply
                .edit(
                    ctx,
                    CreateReply::default()
                        .embed(pages[index].clone())
                        .components(vec![]),
                )
                .await?;
            return Ok(MenuExit::TimedOut);
        };

        let Some(control) = MenuControl::from_custom_id(&press.data.custom_id, menu_id) else {
            continue;
        };

        match control {
            MenuControl::Close | MenuControl::Info => {
                press
                    .create_response(ctx.serenity_context(), CreateInteractionResponse::Acknowledge)
                    .await?;
                reply.delete(ctx).await?;
                return Ok(if control == MenuControl::Info {
                    MenuExit::Info
                } else {
                    MenuExit::Closed
                });
            }
            MenuControl::Previous | MenuControl::Next => {
                index = turn_page(index, pages.len(), control);
                press
                    .create_response(
                        ctx.serenity_context(),
                        CreateInteractionResponse::UpdateMessage(
                            CreateInteractionResponseMessage::new().embed(pages[index].clone()),
                        ),
                    )
                    .await?;
            }
        }
    }
}
