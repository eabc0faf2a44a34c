//! Short-lived cache for account snapshots and positions.
//!
//! Shields a UI from redundant provider calls when several widgets read the
//! same account within a short window. Disabled unless a TTL is configured.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::domain::account::{AccountSnapshot, Position};

#[derive(Debug, Clone)]
struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Cached<T> {
    fn fresh_at(&self, now: Instant, ttl: Duration) -> Option<T> {
        (now.saturating_duration_since(self.fetched_at) < ttl).then(|| self.value.clone())
    }
}

/// TTL cache of the last account snapshot and position list.
///
/// Values handed out are clones; callers never share state with the cache.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    ttl: Option<Duration>,
    account: Mutex<Option<Cached<AccountSnapshot>>>,
    positions: Mutex<Option<Cached<Vec<Position>>>>,
}

impl SnapshotCache {
    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A cache holding values for `ttl`. A zero TTL disables caching.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: (!ttl.is_zero()).then_some(ttl),
            ..Self::default()
        }
    }

    /// Configured TTL, if caching is enabled.
    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Whether caching is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Cached account snapshot, if still fresh.
    #[must_use]
    pub fn account(&self) -> Option<AccountSnapshot> {
        self.account_at(Instant::now())
    }

    fn account_at(&self, now: Instant) -> Option<AccountSnapshot> {
        let ttl = self.ttl?;
        self.account.lock().as_ref()?.fresh_at(now, ttl)
    }

    /// Store an account snapshot.
    pub fn store_account(&self, snapshot: &AccountSnapshot) {
        if self.is_enabled() {
            *self.account.lock() = Some(Cached {
                value: snapshot.clone(),
                fetched_at: Instant::now(),
            });
        }
    }

    /// Cached positions, if still fresh.
    #[must_use]
    pub fn positions(&self) -> Option<Vec<Position>> {
        self.positions_at(Instant::now())
    }

    fn positions_at(&self, now: Instant) -> Option<Vec<Position>> {
        let ttl = self.ttl?;
        self.positions.lock().as_ref()?.fresh_at(now, ttl)
    }

    /// Store a position list.
    pub fn store_positions(&self, positions: &[Position]) {
        if self.is_enabled() {
            *self.positions.lock() = Some(Cached {
                value: positions.to_vec(),
                fetched_at: Instant::now(),
            });
        }
    }

    /// Drop everything cached.
    pub fn clear(&self) {
        *self.account.lock() = None;
        *self.positions.lock() = None;
    }
}
