use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::error::{FacadeError, FacadeResult};

/// Tuning knobs for the lock service.
#[derive(Clone, Debug)]
pub struct LockConfig {
    /// TTL applied when `acquire` is called without one.
    pub default_ttl: Duration,
    /// How often the embedding scheduler should call
    /// [`LockService::sweep_expired`].
    pub sweep_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug)]
struct LockEntry {
    holder: String,
    expires_at: Instant,
}

/// Application-level edit locks, keyed by object identity.
///
/// Coarser than the store's writer discipline: it stops two users from
/// concurrently editing the same object through the facade's workflows.
/// Expiry uses a monotonic clock; expired entries are reaped by
/// [`Self::sweep_expired`], driven by the embedding scheduler. A
/// corrupted table detected during the sweep triggers a full
/// [`Self::reset`] instead of a partial cleanup.
pub struct LockService {
    config: LockConfig,
    table: Mutex<HashMap<String, LockEntry>>,
}

impl Default for LockService {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}

impl LockService {
    pub fn new(config: LockConfig) -> Self {
        Self {
            config,
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Take or refresh the lock on `key` for `holder`.
    ///
    /// Re-acquiring one's own unexpired lock extends it. A different
    /// holder's unexpired lock is a [`FacadeError::Locked`].
    pub fn acquire(
        &self,
        key: &str,
        holder: &str,
        ttl: Option<Duration>,
    ) -> FacadeResult<()> {
        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        let now = Instant::now();
        if let Some(entry) = table.get(key) {
            if entry.expires_at > now && entry.holder != holder {
                return Err(FacadeError::Locked {
                    key: key.to_string(),
                    holder: entry.holder.clone(),
                });
            }
        }
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        table.insert(
            key.to_string(),
            LockEntry {
                holder: holder.to_string(),
                expires_at: now + ttl,
            },
        );
        debug!(key, holder, ttl_ms = ttl.as_millis() as u64, "lock acquired");
        Ok(())
    }

    /// Release `key` if `holder` owns it. Returns whether a lock was
    /// released.
    pub fn release(&self, key: &str, holder: &str) -> bool {
        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        match table.get(key) {
            Some(entry) if entry.holder == holder => {
                table.remove(key);
                debug!(key, holder, "lock released");
                true
            }
            _ => false,
        }
    }

    /// The current unexpired holder of `key`, if any.
    pub fn holder_of(&self, key: &str) -> Option<String> {
        let table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        table
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.holder.clone())
    }

    /// Reap expired locks. Returns how many were released.
    ///
    /// A poisoned table is treated as a sweep anomaly: every lock is
    /// dropped rather than attempting a partial, possibly inconsistent
    /// cleanup.
    pub fn sweep_expired(&self) -> usize {
        let mut table = match self.table.lock() {
            Ok(table) => table,
            Err(poisoned) => {
                error!("lock table poisoned during sweep, resetting all locks");
                let mut table = poisoned.into_inner();
                let dropped = table.len();
                table.clear();
                self.table.clear_poison();
                return dropped;
            }
        };
        let now = Instant::now();
        let before = table.len();
        table.retain(|_, entry| entry.expires_at > now);
        let released = before - table.len();
        if released > 0 {
            debug!(released, "swept expired locks");
        }
        released
    }

    /// Drop every lock unconditionally.
    pub fn reset(&self) {
        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        let dropped = table.len();
        table.clear();
        info!(dropped, "lock table reset");
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn service() -> LockService {
        LockService::default()
    }

    #[test]
    fn acquire_then_conflict_then_release() {
        let locks = service();
        locks.acquire("http://grove.org/item/x", "alice", None).unwrap();

        let err = locks
            .acquire("http://grove.org/item/x", "bob", None)
            .unwrap_err();
        match err {
            FacadeError::Locked { holder, .. } => assert_eq!(holder, "alice"),
            other => panic!("expected locked, got {other:?}"),
        }

        assert!(locks.release("http://grove.org/item/x", "alice"));
        locks.acquire("http://grove.org/item/x", "bob", None).unwrap();
    }

    #[test]
    fn release_is_holder_checked() {
        let locks = service();
        locks.acquire("k", "alice", None).unwrap();
        assert!(!locks.release("k", "bob"));
        assert_eq!(locks.holder_of("k").as_deref(), Some("alice"));
    }

    #[test]
    fn reacquire_extends_own_lock() {
        let locks = service();
        locks.acquire("k", "alice", Some(Duration::from_millis(10))).unwrap();
        locks.acquire("k", "alice", Some(Duration::from_secs(60))).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(locks.holder_of("k").as_deref(), Some("alice"));
    }

    #[test]
    fn expired_locks_can_be_taken_over() {
        let locks = service();
        locks.acquire("k", "alice", Some(Duration::ZERO)).unwrap();
        locks.acquire("k", "bob", None).unwrap();
        assert_eq!(locks.holder_of("k").as_deref(), Some("bob"));
    }

    #[test]
    fn sweep_reaps_only_expired_locks() {
        let locks = service();
        locks.acquire("gone", "alice", Some(Duration::ZERO)).unwrap();
        locks.acquire("kept", "alice", Some(Duration::from_secs(60))).unwrap();

        assert_eq!(locks.sweep_expired(), 1);
        assert!(locks.holder_of("gone").is_none());
        assert_eq!(locks.holder_of("kept").as_deref(), Some("alice"));
    }

    #[test]
    fn reset_drops_everything() {
        let locks = service();
        locks.acquire("a", "alice", None).unwrap();
        locks.acquire("b", "bob", None).unwrap();
        locks.reset();
        assert!(locks.holder_of("a").is_none());
        assert!(locks.holder_of("b").is_none());
    }

    #[test]
    fn locks_are_independent_per_key() {
        let locks = service();
        locks.acquire("a", "alice", None).unwrap();
        locks.acquire("b", "bob", None).unwrap();
        assert_eq!(locks.holder_of("a").as_deref(), Some("alice"));
        assert_eq!(locks.holder_of("b").as_deref(), Some("bob"));
    }
}
