// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display identity policy: fallback and banned-name substitution.

use hookrelay_config::IdentityConfig;
use hookrelay_core::Identity;
use hookrelay_core::limits::MAX_USERNAME_LENGTH;
use tracing::debug;

/// Decides which identity a message is posted under.
///
/// Matching is case-insensitive. A name is banned when it contains any entry
/// of `banned_substrings` or equals any entry of `banned_names`.
#[derive(Debug, Clone)]
pub struct IdentityPolicy {
    default: Identity,
    banned_substrings: Vec<String>,
    banned_names: Vec<String>,
}

impl IdentityPolicy {
    pub fn new(
        default: Identity,
        banned_substrings: impl IntoIterator<Item = String>,
        banned_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            default,
            banned_substrings: banned_substrings
                .into_iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            banned_names: banned_names.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(
            Identity::new(
                config.default_name.clone(),
                config.default_avatar_url.clone(),
            ),
            config.banned_substrings.iter().cloned(),
            config.banned_names.iter().cloned(),
        )
    }

    pub fn default_identity(&self) -> &Identity {
        &self.default
    }

    pub fn is_banned(&self, name: &str) -> bool {
        let lowered = name.trim().to_lowercase();
        self.banned_names.iter().any(|n| *n == lowered)
            || self.banned_substrings.iter().any(|s| lowered.contains(s.as_str()))
    }

    /// Normalizes a requested identity.
    ///
    /// Missing or blank names fall back to the default name (keeping a
    /// requested avatar). Banned names are replaced by the whole default
    /// identity. Accepted names are trimmed and clamped to the platform limit.
    pub fn apply(&self, requested: Option<Identity>) -> Identity {
        let requested = requested.unwrap_or_default();
        let name = requested
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        match name {
            None => Identity {
                name: self.default.name.clone(),
                avatar_url: requested.avatar_url.or_else(|| self.default.avatar_url.clone()),
            },
            Some(name) if self.is_banned(name) => {
                debug!(name, "display name is banned, using default identity");
                self.default.clone()
            }
            Some(name) => Identity {
                name: Some(name.chars().take(MAX_USERNAME_LENGTH).collect()),
                avatar_url: requested.avatar_url,
            },
        }
    }
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self::from_config(&IdentityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> IdentityPolicy {
        IdentityPolicy::new(
            Identity::new("Relay", Some("https://cdn.example/relay.png".into())),
            vec!["discord".to_string(), "Clyde".to_string()],
            vec!["everyone".to_string(), "here".to_string()],
        )
    }

    fn named(name: &str) -> Option<Identity> {
        Some(Identity::new(name, Some("https://cdn.example/user.png".into())))
    }

    #[test]
    fn exact_banned_name_uses_default_identity() {
        let policy = policy();
        assert_eq!(policy.apply(named("everyone")), *policy.default_identity());
        assert_eq!(policy.apply(named("EVERYONE")), *policy.default_identity());
    }

    #[test]
    fn exact_list_does_not_match_substrings() {
        let policy = policy();
        let identity = policy.apply(named("everyone's friend"));
        assert_eq!(identity.name.as_deref(), Some("everyone's friend"));
    }

    #[test]
    fn banned_substring_is_case_insensitive() {
        let policy = policy();
        assert_eq!(policy.apply(named("My DISCORD bot")), *policy.default_identity());
        assert_eq!(policy.apply(named("clydesdale")), *policy.default_identity());
    }

    #[test]
    fn allowed_name_keeps_requested_avatar() {
        let identity = policy().apply(named("  Herald  "));
        assert_eq!(identity.name.as_deref(), Some("Herald"));
        assert_eq!(
            identity.avatar_url.as_deref(),
            Some("https://cdn.example/user.png")
        );
    }

    #[test]
    fn missing_name_falls_back_to_default_name() {
        let policy = policy();
        assert_eq!(policy.apply(None), *policy.default_identity());

        let avatar_only = Identity {
            name: Some("   ".into()),
            avatar_url: Some("https://cdn.example/own.png".into()),
        };
        let identity = policy.apply(Some(avatar_only));
        assert_eq!(identity.name.as_deref(), Some("Relay"));
        assert_eq!(identity.avatar_url.as_deref(), Some("https://cdn.example/own.png"));
    }

    #[test]
    fn long_names_are_clamped() {
        let long = "x".repeat(200);
        let identity = policy().apply(named(&long));
        assert_eq!(identity.name.unwrap().chars().count(), MAX_USERNAME_LENGTH);
    }
}
