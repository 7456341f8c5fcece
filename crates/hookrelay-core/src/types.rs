// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the cache, relay pipeline, and platform adapters.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Identifier of a logical channel (or thread) on the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of a platform channel, as far as delivery routing cares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Announcement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    Stage,
    Forum,
    Media,
    Other,
}

impl ChannelKind {
    /// Thread-like channels deliver through their parent's webhook.
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

/// Cached metadata about a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub id: ChannelId,
    pub kind: ChannelKind,
    /// Parent channel for threads (and category for regular channels).
    pub parent_id: Option<ChannelId>,
    /// Guild the channel belongs to.
    pub guild_id: Option<String>,
    /// False once the channel is known to be unusable; forces re-resolution.
    pub valid: bool,
}

/// Webhook credential: the id+token pair authorizing delivery to an endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub token: String,
    /// Channel the webhook is attached to.
    pub channel_id: ChannelId,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// The two record families held by a cache backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CacheKind {
    Credential,
    ChannelMeta,
}

/// A value stored in a cache backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheRecord {
    Credential(Credential),
    ChannelMeta(ChannelMeta),
}

impl CacheRecord {
    pub fn kind(&self) -> CacheKind {
        match self {
            Self::Credential(_) => CacheKind::Credential,
            Self::ChannelMeta(_) => CacheKind::ChannelMeta,
        }
    }

    pub fn into_credential(self) -> Option<Credential> {
        match self {
            Self::Credential(c) => Some(c),
            Self::ChannelMeta(_) => None,
        }
    }

    pub fn into_channel_meta(self) -> Option<ChannelMeta> {
        match self {
            Self::ChannelMeta(m) => Some(m),
            Self::Credential(_) => None,
        }
    }
}

/// An opaque rich block (embed) together with its size cost.
///
/// The size is what counts against the per-request aggregate limit. When
/// built from a payload it is the character count of the embed's text fields;
/// callers may also assign it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct RichBlock {
    payload: Value,
    size: usize,
}

impl RichBlock {
    /// Wraps a payload and computes its size from the embed text fields.
    pub fn new(payload: Value) -> Self {
        let size = embed_size(&payload);
        Self { payload, size }
    }

    /// Wraps a payload with a caller-assigned size.
    pub fn with_size(payload: Value, size: usize) -> Self {
        Self { payload, size }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl From<Value> for RichBlock {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

impl From<RichBlock> for Value {
    fn from(block: RichBlock) -> Self {
        block.payload
    }
}

/// Character count of the embed fields the platform sums against its limit.
fn embed_size(payload: &Value) -> usize {
    let len = |v: Option<&Value>| v.and_then(Value::as_str).map_or(0, |s| s.chars().count());

    let mut total = len(payload.get("title")) + len(payload.get("description"));
    total += len(payload.get("footer").and_then(|f| f.get("text")));
    total += len(payload.get("author").and_then(|a| a.get("name")));
    if let Some(fields) = payload.get("fields").and_then(Value::as_array) {
        for field in fields {
            total += len(field.get("name")) + len(field.get("value"));
        }
    }
    total
}

/// A binary file uploaded alongside a message.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Display identity a webhook message is posted under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>, avatar_url: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            avatar_url,
        }
    }
}

/// Mention categories the platform may resolve into pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    Users,
    Roles,
    Everyone,
}

/// Which mentions in the content are allowed to notify.
///
/// The default parses nothing, so relayed text never pings anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionPolicy {
    #[serde(default)]
    pub parse: Vec<MentionKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl MentionPolicy {
    pub fn none() -> Self {
        Self::default()
    }
}

/// A caller's send request as accepted by the submission API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub blocks: Vec<RichBlock>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub mentions: Option<MentionPolicy>,
    /// Dispatch now instead of waiting for the next flush.
    #[serde(default)]
    pub immediate: bool,
    /// Wrap bare components into action rows before sending.
    #[serde(default)]
    pub transform_components: bool,
}

impl SendRequest {
    pub fn new(channel_id: impl Into<ChannelId>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn block(mut self, block: RichBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(mut self, blocks: impl IntoIterator<Item = RichBlock>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    pub fn component(mut self, component: Value) -> Self {
        self.components.push(component);
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn mentions(mut self, mentions: MentionPolicy) -> Self {
        self.mentions = Some(mentions);
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn transform_components(mut self, transform: bool) -> Self {
        self.transform_components = transform;
        self
    }

    /// True when there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        let no_text = self.text.as_deref().is_none_or(|t| t.trim().is_empty());
        no_text && self.blocks.is_empty() && self.attachments.is_empty() && self.components.is_empty()
    }
}

/// Where a message goes: the (possibly redirected) channel, its webhook
/// credential, and an optional thread inside that channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub channel_id: ChannelId,
    pub thread_id: Option<ChannelId>,
    pub credential: Credential,
}

impl Destination {
    pub fn key(&self) -> DestinationKey {
        DestinationKey {
            credential_id: self.credential.id.clone(),
            thread_id: self.thread_id.clone(),
        }
    }
}

/// Grouping key for merging: one webhook plus optional thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationKey {
    pub credential_id: String,
    pub thread_id: Option<ChannelId>,
}

/// The content of one webhook execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookBody {
    pub text: Option<String>,
    pub blocks: Vec<RichBlock>,
    pub components: Vec<Value>,
    pub attachments: Vec<Attachment>,
    pub identity: Identity,
    pub mentions: Option<MentionPolicy>,
}

impl WebhookBody {
    /// Aggregate size of the rich blocks in this body.
    pub fn block_size(&self) -> usize {
        self.blocks.iter().map(RichBlock::size).sum()
    }
}

/// One transport request: destination plus body, with its position in the
/// destination's chunk sequence.
///
/// When delivery fails, `remaining` holds the bodies of the later chunks that
/// were abandoned, so `body` plus `remaining` is everything still undelivered
/// for the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRequest {
    pub destination: Destination,
    pub body: WebhookBody,
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub remaining: Vec<WebhookBody>,
}

impl DeliveryRequest {
    /// The failed body followed by every abandoned one, in send order.
    pub fn undelivered(&self) -> impl Iterator<Item = &WebhookBody> {
        std::iter::once(&self.body).chain(&self.remaining)
    }

    /// Rich blocks that never reached the platform, in send order.
    pub fn undelivered_blocks(&self) -> impl Iterator<Item = &RichBlock> {
        self.undelivered().flat_map(|body| &body.blocks)
    }
}

/// What the platform returns for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub id: String,
    pub channel_id: ChannelId,
}
