// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the hookrelay webhook relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level hookrelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HookrelayConfig {
    /// Flush cycle and failure handling.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Credential and channel metadata cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Display identity policy.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Discord REST and webhook settings.
    #[serde(default)]
    pub discord: DiscordConfig,
}

/// How a delivery failure affects the rest of a flush cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Only the failing destination's remaining chunks are abandoned.
    #[default]
    Isolate,
    /// The first failure abandons every destination not yet dispatched.
    AbortFlush,
}

/// Relay pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Period of the flush timer in milliseconds. Must be greater than zero.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Behavior when one destination fails during a flush.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: default_flush_interval_ms(),
            failure_policy: FailurePolicy::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_flush_interval_ms() -> u64 {
    6000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which cache backend holds credentials and channel metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    /// Process-local map; TTLs are not enforced.
    #[default]
    Memory,
    /// Process-local map that expires records on its own.
    Ttl,
    /// External Redis server; expiry is enforced by the server and the cache
    /// is shared by every relay pointed at it.
    Redis,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Lifetime of cached webhook credentials in seconds. 0 disables expiry.
    #[serde(default = "default_credential_ttl_secs")]
    pub credential_ttl_secs: u64,

    /// Lifetime of cached channel metadata in seconds. 0 disables expiry.
    #[serde(default = "default_channel_ttl_secs")]
    pub channel_ttl_secs: u64,

    /// Connection URL for the `redis` backend (`redis://` or `rediss://`).
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Prefix prepended to every key written to Redis.
    #[serde(default = "default_redis_key_prefix")]
    pub redis_key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            credential_ttl_secs: default_credential_ttl_secs(),
            channel_ttl_secs: default_channel_ttl_secs(),
            redis_url: None,
            redis_key_prefix: default_redis_key_prefix(),
        }
    }
}

fn default_credential_ttl_secs() -> u64 {
    86_400
}

fn default_channel_ttl_secs() -> u64 {
    3600
}

fn default_redis_key_prefix() -> String {
    "hookrelay:".to_string()
}

/// Display identity policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Name used when a caller supplies none or a banned one.
    #[serde(default = "default_identity_name")]
    pub default_name: String,

    /// Avatar used together with `default_name`.
    #[serde(default)]
    pub default_avatar_url: Option<String>,

    /// Names containing any of these (case-insensitive) are replaced.
    #[serde(default = "default_banned_substrings")]
    pub banned_substrings: Vec<String>,

    /// Names equal to any of these (case-insensitive) are replaced.
    #[serde(default = "default_banned_names")]
    pub banned_names: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_name: default_identity_name(),
            default_avatar_url: None,
            banned_substrings: default_banned_substrings(),
            banned_names: default_banned_names(),
        }
    }
}

fn default_identity_name() -> String {
    "hookrelay".to_string()
}

fn default_banned_substrings() -> Vec<String> {
    vec!["discord".to_string(), "clyde".to_string()]
}

fn default_banned_names() -> Vec<String> {
    vec!["everyone".to_string(), "here".to_string()]
}

/// Discord REST and webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token used for channel lookups and webhook creation.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Base URL of the REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Name given to webhooks the relay creates (and reuses).
    #[serde(default = "default_webhook_name")]
    pub webhook_name: String,

    /// Timeout for every HTTP request in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: default_api_base_url(),
            webhook_name: default_webhook_name(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_webhook_name() -> String {
    "hookrelay".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}
