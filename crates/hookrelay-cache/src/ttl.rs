// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache backend that enforces record expiry itself.
//!
//! Expired records are invisible to `has` and `get` immediately and are
//! evicted lazily on access or in bulk by `purge_expired`.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use hookrelay_core::{CacheBackend, CacheKind, CacheRecord, RelayError};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    record: CacheRecord,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// TTL-enforcing cache keyed by `(kind, key)`.
///
/// Uses the tokio clock, so paused-time tests can drive expiry.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<(CacheKind, String), Entry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live entry, evicting it first if it has expired.
    fn live(&self, key: &str, kind: CacheKind) -> Option<CacheRecord> {
        let map_key = (kind, key.to_string());
        let now = Instant::now();
        // Guard must drop before remove_if, which takes a write lock on the shard.
        let record = {
            let entry = self.entries.get(&map_key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.record.clone())
            }
        };
        if record.is_none() {
            self.evict_expired(&map_key, now);
        }
        record
    }

    /// Removes the entry only if it is still expired at `now`; a concurrent
    /// `set` may have refreshed it since it was read.
    fn evict_expired(&self, map_key: &(CacheKind, String), now: Instant) -> bool {
        let evicted = self
            .entries
            .remove_if(map_key, |_, e| e.is_expired(now))
            .is_some();
        if evicted {
            let (kind, key) = map_key;
            debug!(key = %key, %kind, "evicted expired cache record");
        }
        evicted
    }
}

#[async_trait]
impl CacheBackend for TtlCache {
    fn name(&self) -> &str {
        "ttl"
    }

    async fn has(&self, key: &str, kind: CacheKind) -> Result<bool, RelayError> {
        Ok(self.live(key, kind).is_some())
    }

    async fn get(&self, key: &str, kind: CacheKind) -> Result<Option<CacheRecord>, RelayError> {
        Ok(self.live(key, kind))
    }

    async fn set(
        &self,
        key: &str,
        record: CacheRecord,
        kind: CacheKind,
        ttl: Option<Duration>,
    ) -> Result<(), RelayError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert((kind, key.to_string()), Entry { record, expires_at });
        Ok(())
    }

    async fn remove(&self, key: &str, kind: CacheKind) -> Result<(), RelayError> {
        self.entries.remove(&(kind, key.to_string()));
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, RelayError> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "purged expired cache records");
        }
        Ok(purged)
    }
}
