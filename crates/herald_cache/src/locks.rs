//! Per-guild mutual exclusion.

use herald_core::GuildId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per guild, created on first use.
///
/// Holding a guard excludes every other read-modify-write on the same guild
/// while leaving other guilds untouched.
#[derive(Debug, Clone, Default)]
pub struct GuildLocks {
    locks: Arc<Mutex<HashMap<GuildId, Arc<AsyncMutex<()>>>>>,
}

impl GuildLocks {
    /// Empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `guild_id`.
    pub async fn acquire(&self, guild_id: GuildId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(guild_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of guilds that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no guild has been locked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
