// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord REST request/response types.

use hookrelay_core::{ChannelKind, MentionPolicy, WebhookBody};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Webhook execution ---

/// JSON body of an execute-webhook request.
#[derive(Debug, Serialize)]
pub struct ExecutePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<&'a Value>,

    #[serde(skip_serializing_if = "no_components")]
    pub components: &'a [Value],

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<&'a MentionPolicy>,

    /// Attachment metadata matching the multipart `files[n]` parts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef<'a>>,
}

fn no_components(components: &&[Value]) -> bool {
    components.is_empty()
}

/// Reference from the JSON payload to an uploaded file part.
#[derive(Debug, Serialize)]
pub struct AttachmentRef<'a> {
    pub id: usize,
    pub filename: &'a str,
}

impl<'a> From<&'a WebhookBody> for ExecutePayload<'a> {
    fn from(body: &'a WebhookBody) -> Self {
        Self {
            content: body.text.as_deref(),
            embeds: body.blocks.iter().map(|b| b.payload()).collect(),
            components: &body.components,
            username: body.identity.name.as_deref(),
            avatar_url: body.identity.avatar_url.as_deref(),
            allowed_mentions: body.mentions.as_ref(),
            attachments: body
                .attachments
                .iter()
                .enumerate()
                .map(|(id, a)| AttachmentRef {
                    id,
                    filename: &a.filename,
                })
                .collect(),
        }
    }
}

/// Message object returned by `?wait=true`. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub id: String,
    pub channel_id: String,
}

// --- Channels and webhooks ---

/// Channel object. Only the fields routing needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Maps a Discord channel type number to a [`ChannelKind`].
pub fn channel_kind(kind: u8) -> ChannelKind {
    match kind {
        0 => ChannelKind::Text,
        2 => ChannelKind::Voice,
        4 => ChannelKind::Category,
        5 => ChannelKind::Announcement,
        10 => ChannelKind::AnnouncementThread,
        11 => ChannelKind::PublicThread,
        12 => ChannelKind::PrivateThread,
        13 => ChannelKind::Stage,
        15 => ChannelKind::Forum,
        16 => ChannelKind::Media,
        _ => ChannelKind::Other,
    }
}

/// Webhook object. `token` is absent for webhooks we cannot execute.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiWebhook {
    pub id: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateWebhook<'a> {
    pub name: &'a str,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: u64,
}
