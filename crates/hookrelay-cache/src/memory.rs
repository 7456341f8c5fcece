// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local cache backend.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use hookrelay_core::{CacheBackend, CacheKind, CacheRecord, RelayError};

/// In-process cache keyed by `(kind, key)`.
///
/// TTLs passed to `set` are ignored; records live until removed.
#[derive(Debug, Default)]
pub struct MemoryCache {
    records: DashMap<(CacheKind, String), CacheRecord>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across both kinds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn has(&self, key: &str, kind: CacheKind) -> Result<bool, RelayError> {
        Ok(self.records.contains_key(&(kind, key.to_string())))
    }

    async fn get(&self, key: &str, kind: CacheKind) -> Result<Option<CacheRecord>, RelayError> {
        Ok(self
            .records
            .get(&(kind, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn set(
        &self,
        key: &str,
        record: CacheRecord,
        kind: CacheKind,
        _ttl: Option<Duration>,
    ) -> Result<(), RelayError> {
        self.records.insert((kind, key.to_string()), record);
        Ok(())
    }

    async fn remove(&self, key: &str, kind: CacheKind) -> Result<(), RelayError> {
        self.records.remove(&(kind, key.to_string()));
        Ok(())
    }
}
