// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock directory for deterministic resolution tests.
//!
//! `MockDirectory` implements `Directory` over an in-memory channel table and
//! counts every lookup so tests can assert on cache behavior.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use hookrelay_core::{ChannelId, ChannelKind, ChannelMeta, Credential, Directory, RelayError};

/// An in-memory channel directory.
///
/// Every credential lookup mints a new webhook (`wh-<channel>-<n>`), so a
/// re-resolution after invalidation is observable as a different id.
#[derive(Default)]
pub struct MockDirectory {
    channels: Mutex<HashMap<ChannelId, ChannelMeta>>,
    without_credential: HashSet<ChannelId>,
    failing: HashSet<ChannelId>,
    channel_lookups: AtomicUsize,
    credential_lookups: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain text channel.
    pub fn with_text_channel(self, id: &str) -> Self {
        self.with_channel(ChannelMeta {
            id: id.into(),
            kind: ChannelKind::Text,
            parent_id: None,
            guild_id: Some("guild".into()),
            valid: true,
        })
    }

    /// Adds a public thread under `parent`.
    pub fn with_thread(self, id: &str, parent: &str) -> Self {
        self.with_channel(ChannelMeta {
            id: id.into(),
            kind: ChannelKind::PublicThread,
            parent_id: Some(parent.into()),
            guild_id: Some("guild".into()),
            valid: true,
        })
    }

    pub fn with_channel(self, meta: ChannelMeta) -> Self {
        self.lock().insert(meta.id.clone(), meta);
        self
    }

    /// Channel resolves, but no webhook can be produced for it.
    pub fn without_credential(mut self, id: &str) -> Self {
        self.without_credential.insert(id.into());
        self
    }

    /// Every lookup for this channel returns an error.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Removes a channel, as if it had been deleted on the platform.
    pub fn remove_channel(&self, id: &str) {
        self.lock().remove(&ChannelId::from(id));
    }

    pub fn channel_lookups(&self) -> usize {
        self.channel_lookups.load(Ordering::SeqCst)
    }

    pub fn credential_lookups(&self) -> usize {
        self.credential_lookups.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ChannelId, ChannelMeta>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_failing(&self, id: &ChannelId) -> Result<(), RelayError> {
        if self.failing.contains(id) {
            return Err(RelayError::Internal(format!("directory unavailable for {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn resolve_channel(&self, id: &ChannelId) -> Result<Option<ChannelMeta>, RelayError> {
        self.channel_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failing(id)?;
        Ok(self.lock().get(id).cloned())
    }

    async fn resolve_or_create_credential(
        &self,
        channel_id: &ChannelId,
    ) -> Result<Option<Credential>, RelayError> {
        let n = self.credential_lookups.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_failing(channel_id)?;
        if self.without_credential.contains(channel_id) || !self.lock().contains_key(channel_id) {
            return Ok(None);
        }
        Ok(Some(Credential {
            id: format!("wh-{channel_id}-{n}"),
            token: format!("token-{n}"),
            channel_id: channel_id.clone(),
        }))
    }
}
