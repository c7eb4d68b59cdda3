use super::*;
use crate::commands::music::utils::{access::DJ_STATUS_CACHE, embedded_messages};
use crate::utils::database::{GuildFlag, set_guild_settings};
use serenity::model::guild::Role;
use tracing::{error, info};

/// Manage the guild's audio settings
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Admin",
    required_permissions = "MANAGE_GUILD",
    subcommands("musicset_show", "musicset_toggle", "musicset_djrole")
)]
pub async fn musicset(ctx: Context<'_>) -> CommandResult {
    show_settings(ctx).await
}

/// Show the guild's audio settings
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Admin",
    rename = "show",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn musicset_show(ctx: Context<'_>) -> CommandResult {
    show_settings(ctx).await
}

async fn show_settings(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let settings = guild_settings(ctx, guild_id);
    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_default();

    ctx.send(embedded_messages::guild_settings(&guild_name, &settings))
        .await?;
    Ok(())
}

/// Turn an audio setting on or off
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Admin",
    rename = "toggle",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn musicset_toggle(
    ctx: Context<'_>,
    #[description = "Setting to flip"] flag: GuildFlag,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let mut settings = guild_settings(ctx, guild_id);
    let enabled = settings.toggle(flag);

    if let Err(e) = set_guild_settings(&ctx.data().database_path, guild_id, &settings) {
        error!("Failed to store settings for guild {}: {}", guild_id, e);
        return Err(e.into());
    }
    if flag == GuildFlag::Dj {
        DJ_STATUS_CACHE.set(guild_id, enabled);
    }
    info!("Set {:?} to {} in guild {}", flag, enabled, guild_id);

    ctx.send(embedded_messages::flag_toggled(
        flag,
        enabled,
        settings.dj_role.is_none(),
    ))
    .await?;
    Ok(())
}

/// Set the role that may manage the queue in DJ mode
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    category = "Admin",
    rename = "djrole",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn musicset_djrole(
    ctx: Context<'_>,
    #[description = "The DJ role, leave empty to clear it"] role: Option<Role>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let mut settings = guild_settings(ctx, guild_id);
    settings.dj_role = role.map(|role| role.id);

    if let Err(e) = set_guild_settings(&ctx.data().database_path, guild_id, &settings) {
        error!("Failed to store DJ role for guild {}: {}", guild_id, e);
        return Err(e.into());
    }
    info!("DJ role in guild {} is now {:?}", guild_id, settings.dj_role);

    ctx.send(embedded_messages::dj_role_updated(settings.dj_role))
        .await?;
    Ok(())
}
