// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hookrelay.toml` > `~/.config/hookrelay/hookrelay.toml`
//! > `/etc/hookrelay/hookrelay.toml` with environment variable overrides via the
//! `HOOKRELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HookrelayConfig;

/// Config sections, used to map `HOOKRELAY_<SECTION>_<KEY>` to `section.key`.
const SECTIONS: &[&str] = &["relay", "cache", "identity", "discord"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hookrelay/hookrelay.toml` (system-wide)
/// 3. `~/.config/hookrelay/hookrelay.toml` (user XDG config)
/// 4. `./hookrelay.toml` (local directory)
/// 5. `HOOKRELAY_*` environment variables
pub fn load_config() -> Result<HookrelayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<HookrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HookrelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HookrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HookrelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HookrelayConfig::default()))
        .merge(Toml::file("/etc/hookrelay/hookrelay.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hookrelay/hookrelay.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hookrelay.toml"))
        .merge(env_provider())
}

/// Environment provider with an explicit section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `HOOKRELAY_RELAY_FLUSH_INTERVAL_MS` maps to `relay.flush_interval_ms` and
/// not `relay.flush.interval.ms`.
fn env_provider() -> Env {
    Env::prefixed("HOOKRELAY_").map(|key| {
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
