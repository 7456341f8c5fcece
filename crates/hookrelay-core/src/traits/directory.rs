// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory trait: maps channels to metadata and webhook credentials.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::{ChannelId, ChannelMeta, Credential};

/// External service that knows channels and can create webhooks.
///
/// `Ok(None)` means the directory answered but has nothing usable (deleted
/// channel, missing permissions). `Err` means the directory itself failed.
#[async_trait]
pub trait Directory: Send + Sync + 'static {
    async fn resolve_channel(&self, id: &ChannelId) -> Result<Option<ChannelMeta>, RelayError>;

    async fn resolve_or_create_credential(
        &self,
        channel_id: &ChannelId,
    ) -> Result<Option<Credential>, RelayError>;
}
