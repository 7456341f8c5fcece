// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for executing webhooks.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::{ChannelId, Credential, MessageDescriptor, WebhookBody};

/// Posts one message to a webhook endpoint.
///
/// Implementations own request timeouts. Bodies handed to a transport never
/// exceed the limits in [`crate::limits`], except for a single rich block that
/// is oversized on its own.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post(
        &self,
        credential: &Credential,
        thread_id: Option<&ChannelId>,
        body: &WebhookBody,
    ) -> Result<MessageDescriptor, RelayError>;
}
