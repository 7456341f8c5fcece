// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the hookrelay webhook relay.
//!
//! This crate provides the trait seams (cache backend, directory, transport,
//! delivery hooks), the error type, and the message types shared by the
//! pipeline and the platform adapters.

pub mod error;
pub mod limits;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelayError;
pub use types::{
    Attachment, CacheKind, CacheRecord, ChannelId, ChannelKind, ChannelMeta, Credential,
    DeliveryRequest, Destination, DestinationKey, Identity, MentionKind, MentionPolicy,
    MessageDescriptor, RichBlock, SendRequest, WebhookBody,
};

pub use traits::{CacheBackend, DeliveryHooks, Directory, NoopHooks, Transport};
