// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed cache shared by every relay process pointed at the same server.
//!
//! Records are stored as JSON strings under `{prefix}{kind}:{key}`. Expiry is
//! delegated to the server (`SET .. EX`), so `purge_expired` has nothing to do.

use std::time::Duration;

use async_trait::async_trait;
use hookrelay_core::{CacheBackend, CacheKind, CacheRecord, RelayError};
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError, RedisResult};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// External TTL-enforcing cache.
///
/// The connection is opened on first use and reused afterwards; a failed
/// connect is retried by the next operation.
pub struct RedisCache {
    client: Client,
    conn: OnceCell<MultiplexedConnection>,
    prefix: String,
}

impl RedisCache {
    /// Parses the URL without connecting.
    pub fn open(url: &str, prefix: impl Into<String>) -> Result<Self, RelayError> {
        let client = Client::open(url)
            .map_err(|e| RelayError::Config(format!("invalid redis url `{url}`: {e}")))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            prefix: prefix.into(),
        })
    }

    fn key(&self, key: &str, kind: CacheKind) -> String {
        format!("{}{kind}:{key}", self.prefix)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, RelayError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_multiplexed_async_connection().await?;
                info!("connected to redis cache");
                Ok::<_, RedisError>(conn)
            })
            .await
            .map_err(|e| cache_error("connect", e))?;
        Ok(conn.clone())
    }
}

fn cache_error(op: &str, err: RedisError) -> RelayError {
    RelayError::Cache {
        message: format!("redis {op} failed: {err}"),
        source: Some(Box::new(err)),
    }
}

/// Whole seconds for `EX`, never zero so a sub-second TTL still expires.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs_f64().ceil().max(1.0) as u64
}

fn encode(record: &CacheRecord) -> Result<String, RelayError> {
    serde_json::to_string(record).map_err(|e| RelayError::Cache {
        message: format!("cannot encode cache record: {e}"),
        source: Some(Box::new(e)),
    })
}

fn decode(raw: &str) -> Result<CacheRecord, RelayError> {
    serde_json::from_str(raw).map_err(|e| RelayError::Cache {
        message: format!("cannot decode cache record: {e}"),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn has(&self, key: &str, kind: CacheKind) -> Result<bool, RelayError> {
        let mut conn = self.connection().await?;
        let exists: RedisResult<i64> = redis::cmd("EXISTS")
            .arg(self.key(key, kind))
            .query_async(&mut conn)
            .await;
        Ok(exists.map_err(|e| cache_error("EXISTS", e))? > 0)
    }

    async fn get(&self, key: &str, kind: CacheKind) -> Result<Option<CacheRecord>, RelayError> {
        let mut conn = self.connection().await?;
        let raw: RedisResult<Option<String>> = redis::cmd("GET")
            .arg(self.key(key, kind))
            .query_async(&mut conn)
            .await;
        match raw.map_err(|e| cache_error("GET", e))? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        record: CacheRecord,
        kind: CacheKind,
        ttl: Option<Duration>,
    ) -> Result<(), RelayError> {
        let value = encode(&record)?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(key, kind)).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(expiry_secs(ttl));
        }
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = cmd.query_async(&mut conn).await;
        result.map_err(|e| cache_error("SET", e))
    }

    async fn remove(&self, key: &str, kind: CacheKind) -> Result<(), RelayError> {
        let mut conn = self.connection().await?;
        let removed: RedisResult<i64> = redis::cmd("DEL")
            .arg(self.key(key, kind))
            .query_async(&mut conn)
            .await;
        let removed = removed.map_err(|e| cache_error("DEL", e))?;
        debug!(key, %kind, removed, "removed redis cache record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookrelay_core::{ChannelKind, ChannelMeta, Credential};

    fn credential(id: &str) -> CacheRecord {
        CacheRecord::Credential(Credential {
            id: id.into(),
            token: "tok".into(),
            channel_id: "c1".into(),
        })
    }

    #[test]
    fn keys_are_namespaced_by_prefix_and_kind() {
        let cache = RedisCache::open("redis://127.0.0.1:6379", "hr:").unwrap();
        assert_eq!(cache.key("123", CacheKind::Credential), "hr:credential:123");
        assert_eq!(cache.key("123", CacheKind::ChannelMeta), "hr:channel_meta:123");
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        let err = RedisCache::open("not a url", "hr:").err().unwrap();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn sub_second_ttl_rounds_up() {
        assert_eq!(expiry_secs(Duration::from_millis(10)), 1);
        assert_eq!(expiry_secs(Duration::from_millis(1500)), 2);
        assert_eq!(expiry_secs(Duration::from_secs(3600)), 3600);
    }

    #[test]
    fn records_survive_json_encoding() {
        let meta = CacheRecord::ChannelMeta(ChannelMeta {
            id: "t1".into(),
            kind: ChannelKind::PublicThread,
            parent_id: Some("c1".into()),
            guild_id: None,
            valid: true,
        });
        for record in [credential("w1"), meta] {
            assert_eq!(decode(&encode(&record).unwrap()).unwrap(), record);
        }
        assert!(matches!(decode("{"), Err(RelayError::Cache { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_reports_cache_error() {
        // Port 1 is reserved and refuses connections.
        let cache = RedisCache::open("redis://127.0.0.1:1", "hr:").unwrap();
        let err = cache.get("c1", CacheKind::Credential).await.unwrap_err();
        assert!(matches!(err, RelayError::Cache { .. }));
    }

    /// Runs against a live server when `HOOKRELAY_TEST_REDIS_URL` is set.
    #[tokio::test]
    async fn live_server_round_trip_and_expiry() {
        let Ok(url) = std::env::var("HOOKRELAY_TEST_REDIS_URL") else {
            return;
        };
        let prefix = format!("hookrelay-test:{}:", std::process::id());
        let cache = RedisCache::open(&url, prefix).unwrap();

        cache
            .set("c1", credential("w1"), CacheKind::Credential, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.has("c1", CacheKind::Credential).await.unwrap());
        assert!(!cache.has("c1", CacheKind::ChannelMeta).await.unwrap());
        assert_eq!(
            cache.get("c1", CacheKind::Credential).await.unwrap(),
            Some(credential("w1"))
        );

        // Server-side expiry runs on the wall clock.
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(cache.get("c1", CacheKind::Credential).await.unwrap().is_none());

        cache
            .set("c2", credential("w2"), CacheKind::Credential, None)
            .await
            .unwrap();
        cache.remove("c2", CacheKind::Credential).await.unwrap();
        assert!(!cache.has("c2", CacheKind::Credential).await.unwrap());
    }
}
