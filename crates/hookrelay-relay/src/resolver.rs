// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination resolution: channel id to webhook credential.
//!
//! Metadata and credentials are read through the cache and fetched from the
//! directory on a miss. Threads are redirected to their parent channel, whose
//! webhook they share; the thread id travels as a separate delivery parameter.

use std::sync::Arc;
use std::time::Duration;

use hookrelay_cache::ttl_for;
use hookrelay_config::CacheConfig;
use hookrelay_core::{
    CacheBackend, CacheKind, CacheRecord, ChannelId, ChannelMeta, Credential, Destination,
    Directory, RelayError,
};
use tracing::{debug, warn};

/// Lifetimes applied when caching resolved records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub credential: Option<Duration>,
    pub channel: Option<Duration>,
}

impl CacheTtls {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            credential: ttl_for(config, CacheKind::Credential),
            channel: ttl_for(config, CacheKind::ChannelMeta),
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Maps logical channels to destinations.
pub struct Resolver {
    cache: Arc<dyn CacheBackend>,
    directory: Arc<dyn Directory>,
    ttls: CacheTtls,
}

impl Resolver {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        directory: Arc<dyn Directory>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            cache,
            directory,
            ttls,
        }
    }

    /// Resolves a channel to its destination.
    ///
    /// Fails with [`RelayError::Resolution`] when the directory has no usable
    /// channel, a thread has no parent, or no credential can be produced.
    pub async fn resolve(&self, channel_id: &ChannelId) -> Result<Destination, RelayError> {
        let meta = self.channel_meta(channel_id).await?;

        let (target, thread_id) = if meta.kind.is_thread() {
            let parent = meta
                .parent_id
                .clone()
                .ok_or_else(|| RelayError::resolution(channel_id, "thread has no parent channel"))?;
            debug!(thread = %channel_id, parent = %parent, "redirecting thread to parent channel");
            (parent, Some(channel_id.clone()))
        } else {
            (channel_id.clone(), None)
        };

        let credential = self.credential(&target).await?;
        Ok(Destination {
            channel_id: target,
            thread_id,
            credential,
        })
    }

    /// Drops the cached credential for a destination so the next submission
    /// resolves it again.
    pub async fn invalidate(&self, destination: &Destination) {
        match self
            .cache
            .remove(destination.channel_id.as_str(), CacheKind::Credential)
            .await
        {
            Ok(()) => debug!(
                channel = %destination.channel_id,
                webhook = %destination.credential.id,
                "invalidated cached credential"
            ),
            Err(e) => warn!(
                channel = %destination.channel_id,
                error = %e,
                "failed to invalidate cached credential"
            ),
        }
    }

    async fn channel_meta(&self, id: &ChannelId) -> Result<ChannelMeta, RelayError> {
        if let Some(meta) = self
            .cached(id, CacheKind::ChannelMeta)
            .await
            .and_then(CacheRecord::into_channel_meta)
        {
            if meta.valid {
                return Ok(meta);
            }
            debug!(channel = %id, "cached channel metadata is invalid, re-resolving");
        }

        let meta = self
            .directory
            .resolve_channel(id)
            .await
            .map_err(|e| RelayError::resolution(id, format!("directory lookup failed: {e}")))?
            .ok_or_else(|| RelayError::resolution(id, "directory has no such channel"))?;

        if !meta.valid {
            return Err(RelayError::resolution(id, "channel is not usable"));
        }

        self.store(id, CacheRecord::ChannelMeta(meta.clone()), self.ttls.channel)
            .await;
        Ok(meta)
    }

    async fn credential(&self, channel_id: &ChannelId) -> Result<Credential, RelayError> {
        if let Some(credential) = self
            .cached(channel_id, CacheKind::Credential)
            .await
            .and_then(CacheRecord::into_credential)
        {
            return Ok(credential);
        }

        let credential = self
            .directory
            .resolve_or_create_credential(channel_id)
            .await
            .map_err(|e| {
                RelayError::resolution(channel_id, format!("credential lookup failed: {e}"))
            })?
            .ok_or_else(|| RelayError::resolution(channel_id, "no webhook credential available"))?;

        self.store(
            channel_id,
            CacheRecord::Credential(credential.clone()),
            self.ttls.credential,
        )
        .await;
        Ok(credential)
    }

    /// Cache read that degrades to a miss when the backend fails.
    async fn cached(&self, id: &ChannelId, kind: CacheKind) -> Option<CacheRecord> {
        match self.cache.get(id.as_str(), kind).await {
            Ok(record) => record,
            Err(e) => {
                warn!(channel = %id, %kind, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, id: &ChannelId, record: CacheRecord, ttl: Option<Duration>) {
        let kind = record.kind();
        if let Err(e) = self.cache.set(id.as_str(), record, kind, ttl).await {
            warn!(channel = %id, %kind, error = %e, "cache write failed");
        }
    }
}
