// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache backend trait for credentials and channel metadata.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::{CacheKind, CacheRecord};

/// Key/value store holding webhook credentials and channel metadata.
///
/// Records are namespaced by [`CacheKind`], so the same channel id can hold
/// both a credential and metadata. Every component treats the backend as the
/// single source of truth for "do we already know how to reach this channel".
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    /// Returns the backend name used in logs.
    fn name(&self) -> &str;

    async fn has(&self, key: &str, kind: CacheKind) -> Result<bool, RelayError>;

    async fn get(&self, key: &str, kind: CacheKind) -> Result<Option<CacheRecord>, RelayError>;

    /// Stores a record. `ttl` is advisory for backends that do not expire.
    async fn set(
        &self,
        key: &str,
        record: CacheRecord,
        kind: CacheKind,
        ttl: Option<Duration>,
    ) -> Result<(), RelayError>;

    async fn remove(&self, key: &str, kind: CacheKind) -> Result<(), RelayError>;

    /// Drops expired records. Backends without expiry have nothing to do.
    async fn purge_expired(&self) -> Result<usize, RelayError> {
        Ok(0)
    }
}
