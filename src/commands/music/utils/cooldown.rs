use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serenity::model::id::GuildId;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// How long a guild waits between two shuffles.
pub const SHUFFLE_COOLDOWN_PERIOD: Duration = Duration::from_secs(30);

/// One use per `period` per guild. Refused attempts can hand their slot back
/// with [`GuildCooldown::reset`].
#[derive(Debug)]
pub struct GuildCooldown {
    period: Duration,
    last_used: DashMap<GuildId, Instant>,
}

impl GuildCooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_used: DashMap::new(),
        }
    }

    /// Claim the guild's slot at `now`, or return how long until it frees up.
    pub fn try_start(&self, guild_id: GuildId, now: Instant) -> Result<(), Duration> {
        match self.last_used.entry(guild_id) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.period {
                    return Err(self.period - elapsed);
                }
                entry.insert(now);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Ok(())
            }
        }
    }

    pub fn reset(&self, guild_id: GuildId) {
        self.last_used.remove(&guild_id);
    }
}

pub static SHUFFLE_COOLDOWN: LazyLock<GuildCooldown> =
    LazyLock::new(|| GuildCooldown::new(SHUFFLE_COOLDOWN_PERIOD));
