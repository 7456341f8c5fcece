// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as a non-zero flush interval or a default identity that is not itself banned.

use hookrelay_core::limits::MAX_USERNAME_LENGTH;

use crate::diagnostic::ConfigError;
use crate::model::{CacheBackendKind, HookrelayConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HookrelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.relay.flush_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "relay.flush_interval_ms must be greater than 0".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.relay.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "relay.log_level `{}` is not one of {}",
                config.relay.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let name = config.identity.default_name.trim();
    if name.is_empty() {
        errors.push(ConfigError::Validation {
            message: "identity.default_name must not be empty".to_string(),
        });
    } else if name.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(ConfigError::Validation {
            message: format!(
                "identity.default_name must be at most {MAX_USERNAME_LENGTH} characters"
            ),
        });
    }

    // The fallback identity must survive its own ban lists.
    let lowered = name.to_lowercase();
    if config
        .identity
        .banned_substrings
        .iter()
        .any(|s| !s.is_empty() && lowered.contains(&s.to_lowercase()))
        || config
            .identity
            .banned_names
            .iter()
            .any(|s| s.to_lowercase() == lowered)
    {
        errors.push(ConfigError::Validation {
            message: format!("identity.default_name `{name}` is itself banned"),
        });
    }

    for (i, entry) in config.identity.banned_substrings.iter().enumerate() {
        if entry.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("identity.banned_substrings[{i}] must not be empty"),
            });
        }
    }

    if let Some(url) = &config.identity.default_avatar_url {
        if !is_http_url(url) {
            errors.push(ConfigError::Validation {
                message: format!("identity.default_avatar_url `{url}` must be an http(s) URL"),
            });
        }
    }

    if !is_http_url(&config.discord.api_base_url) {
        errors.push(ConfigError::Validation {
            message: format!(
                "discord.api_base_url `{}` must be an http(s) URL",
                config.discord.api_base_url
            ),
        });
    }

    if config.discord.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "discord.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.cache.backend == CacheBackendKind::Redis {
        match config.cache.redis_url.as_deref() {
            None => errors.push(ConfigError::Validation {
                message: "cache.redis_url is required when cache.backend = \"redis\"".to_string(),
            }),
            Some(url) if !is_redis_url(url) => errors.push(ConfigError::Validation {
                message: format!("cache.redis_url `{url}` must be a redis:// or rediss:// URL"),
            }),
            Some(_) => {}
        }
    }

    if config.discord.webhook_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "discord.webhook_name must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn is_redis_url(url: &str) -> bool {
    url.starts_with("redis://") || url.starts_with("rediss://")
}
