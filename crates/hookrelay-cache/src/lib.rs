// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache backends for webhook credentials and channel metadata.
//!
//! - [`MemoryCache`]: process-local concurrent map, TTLs are ignored
//! - [`TtlCache`]: process-local map that expires records itself
//! - [`RedisCache`]: external Redis server enforcing expiry, shared across
//!   relay processes
//!
//! All implement [`hookrelay_core::CacheBackend`] and are chosen at
//! construction time via [`build_cache`].

pub mod memory;
pub mod redis_cache;
pub mod ttl;

use std::sync::Arc;
use std::time::Duration;

use hookrelay_config::{CacheBackendKind, CacheConfig};
use hookrelay_core::{CacheBackend, CacheKind, RelayError};
use tracing::info;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use ttl::TtlCache;

/// Build the configured cache backend.
///
/// The Redis backend only parses its URL here; it connects on first use.
pub fn build_cache(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>, RelayError> {
    let cache: Arc<dyn CacheBackend> = match config.backend {
        CacheBackendKind::Memory => Arc::new(MemoryCache::new()),
        CacheBackendKind::Ttl => Arc::new(TtlCache::new()),
        CacheBackendKind::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                RelayError::Config("cache.redis_url is required for the redis backend".into())
            })?;
            Arc::new(RedisCache::open(url, config.redis_key_prefix.clone())?)
        }
    };
    info!(backend = cache.name(), "cache backend initialized");
    Ok(cache)
}

/// Configured lifetime for a record kind; `None` when expiry is disabled.
pub fn ttl_for(config: &CacheConfig, kind: CacheKind) -> Option<Duration> {
    let secs = match kind {
        CacheKind::Credential => config.credential_ttl_secs,
        CacheKind::ChannelMeta => config.channel_ttl_secs,
    };
    (secs > 0).then(|| Duration::from_secs(secs))
}
