//! DJ-mode authorization for queue commands.
//!
//! Commands resolve an [`AccessGate`] for the invoking member from the
//! serenity cache and the guild settings, and hand it to the queue service.

use dashmap::DashMap;
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::sync::LazyLock;

use crate::Context;
use crate::utils::database::GuildSettings;

/// Permission facts about the invoking member.
pub trait AccessGate {
    fn dj_enabled(&self) -> bool;
    fn vote_enabled(&self) -> bool;
    /// Bots, guild owners, bot owners, moderators and DJs (when DJ mode is on).
    fn can_instaskip(&self) -> bool;
    /// No other non-bot member is in the bot's voice channel.
    fn is_alone(&self) -> bool;
}

/// DJ mode is on and the member has no way around it.
pub fn dj_denied(gate: &impl AccessGate) -> bool {
    gate.dj_enabled() && !gate.can_instaskip() && !gate.is_alone()
}

/// Whether the member is kept away from the now-playing reaction controls.
pub fn controls_locked(gate: &impl AccessGate) -> bool {
    (gate.dj_enabled() || gate.vote_enabled()) && !gate.can_instaskip() && !gate.is_alone()
}

/// Process-wide memo of each guild's DJ mode, filled on first use.
#[derive(Debug, Default)]
pub struct DjStatusCache {
    statuses: DashMap<GuildId, bool>,
}

impl DjStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached status, or `load()` stored as the status if the guild has none yet.
    pub fn get_or_insert_with(&self, guild_id: GuildId, load: impl FnOnce() -> bool) -> bool {
        *self.statuses.entry(guild_id).or_insert_with(load)
    }

    /// Overwrite the cached status, used when DJ mode is toggled.
    pub fn set(&self, guild_id: GuildId, enabled: bool) {
        self.statuses.insert(guild_id, enabled);
    }

    pub fn get(&self, guild_id: GuildId) -> Option<bool> {
        self.statuses.get(&guild_id).map(|status| *status)
    }
}

pub static DJ_STATUS_CACHE: LazyLock<DjStatusCache> = LazyLock::new(DjStatusCache::new);

/// What the cache tells us about the invoking member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub is_bot: bool,
    pub is_guild_owner: bool,
    pub is_bot_owner: bool,
    pub is_moderator: bool,
    pub has_dj_role: bool,
    /// Non-bot members besides the invoker in the bot's voice channel.
    pub other_listeners: usize,
}

/// `AccessGate` for a real member, resolved once per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccess {
    dj_enabled: bool,
    vote_enabled: bool,
    can_instaskip: bool,
    is_alone: bool,
}

impl MemberAccess {
    pub fn from_snapshot(snapshot: &MemberSnapshot, dj_enabled: bool, vote_enabled: bool) -> Self {
        let can_instaskip = snapshot.is_bot
            || snapshot.is_guild_owner
            || (dj_enabled && snapshot.has_dj_role)
            || snapshot.is_bot_owner
            || snapshot.is_moderator;

        Self {
            dj_enabled,
            vote_enabled,
            can_instaskip,
            is_alone: snapshot.other_listeners == 0,
        }
    }

    /// Resolve the gate for the author of `ctx`.
    pub async fn resolve(ctx: Context<'_>, settings: &GuildSettings) -> Self {
        let dj_enabled = match ctx.guild_id() {
            Some(guild_id) => DJ_STATUS_CACHE.get_or_insert_with(guild_id, || settings.dj_enabled),
            None => settings.dj_enabled,
        };
        // Cached guild members miss anyone not seen in voice; fetch the author.
        let (roles, resolved_permissions) = match ctx.author_member().await {
            Some(member) => (member.roles.clone(), member.permissions),
            None => (Vec::new(), None),
        };
        let snapshot = member_snapshot(ctx, settings, &roles, resolved_permissions);
        Self::from_snapshot(&snapshot, dj_enabled, settings.vote_enabled)
    }
}

impl AccessGate for MemberAccess {
    fn dj_enabled(&self) -> bool {
        self.dj_enabled
    }

    fn vote_enabled(&self) -> bool {
        self.vote_enabled
    }

    fn can_instaskip(&self) -> bool {
        self.can_instaskip
    }

    fn is_alone(&self) -> bool {
        self.is_alone
    }
}

/// Role-derived facts: whether the member moderates the guild and whether
/// they hold the DJ role.
pub fn role_access(
    roles: &[RoleId],
    dj_role: Option<RoleId>,
    resolved_permissions: Option<Permissions>,
    role_permissions: impl Fn(RoleId) -> Option<Permissions>,
) -> (bool, bool) {
    let grants_moderation = |permissions: Permissions| {
        permissions.administrator() || permissions.manage_guild()
    };
    let is_moderator = resolved_permissions.is_some_and(grants_moderation)
        || roles
            .iter()
            .filter_map(|role_id| role_permissions(*role_id))
            .any(grants_moderation);
    let has_dj_role = dj_role.is_some_and(|role| roles.contains(&role));
    (is_moderator, has_dj_role)
}

fn member_snapshot(
    ctx: Context<'_>,
    settings: &GuildSettings,
    roles: &[RoleId],
    resolved_permissions: Option<Permissions>,
) -> MemberSnapshot {
    let author = ctx.author();
    let bot_id = ctx.cache().current_user().id;
    let is_bot_owner = ctx.framework().options().owners.contains(&author.id);

    let Some(guild) = ctx.guild() else {
        let (is_moderator, has_dj_role) =
            role_access(roles, settings.dj_role, resolved_permissions, |_| None);
        return MemberSnapshot {
            is_bot: author.bot,
            is_bot_owner,
            is_moderator,
            has_dj_role,
            ..Default::default()
        };
    };

    let (is_moderator, has_dj_role) =
        role_access(roles, settings.dj_role, resolved_permissions, |role_id| {
            guild.roles.get(&role_id).map(|role| role.permissions)
        });

    let is_bot_user = |user_id: UserId| {
        user_id == bot_id
            || guild
                .members
                .get(&user_id)
                .is_some_and(|member| member.user.bot)
    };
    let other_listeners = guild
        .voice_states
        .get(&bot_id)
        .and_then(|state| state.channel_id)
        .map(|channel_id| {
            guild
                .voice_states
                .values()
                .filter(|state| state.channel_id == Some(channel_id))
                .filter(|state| state.user_id != author.id && !is_bot_user(state.user_id))
                .count()
        })
        .unwrap_or(0);

    MemberSnapshot {
        is_bot: author.bot,
        is_guild_owner: guild.owner_id == author.id,
        is_bot_owner,
        is_moderator,
        has_dj_role,
        other_listeners,
    }
}
