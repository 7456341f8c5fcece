// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery hooks that capture every notification for assertions.

use std::sync::Mutex;

use hookrelay_core::{
    ChannelId, DeliveryHooks, DeliveryRequest, MessageDescriptor, RelayError, RichBlock,
    WebhookBody,
};

/// A captured failure notification.
#[derive(Debug, Clone)]
pub struct RecordedFailure {
    pub error: String,
    pub status: Option<u16>,
    pub channel_id: ChannelId,
    pub thread_id: Option<ChannelId>,
    pub webhook_id: String,
    pub chunk_index: usize,
    pub chunk_count: usize,
    /// The body whose post failed.
    pub body: WebhookBody,
    /// Later bodies abandoned because of the failure.
    pub remaining: Vec<WebhookBody>,
}

impl RecordedFailure {
    pub fn undelivered_blocks(&self) -> impl Iterator<Item = &RichBlock> {
        std::iter::once(&self.body)
            .chain(&self.remaining)
            .flat_map(|body| &body.blocks)
    }
}

/// Hooks that remember what they were told.
#[derive(Default)]
pub struct RecordingHooks {
    delivered: Mutex<Vec<MessageDescriptor>>,
    failures: Mutex<Vec<RecordedFailure>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<MessageDescriptor> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DeliveryHooks for RecordingHooks {
    fn on_delivered(&self, descriptor: &MessageDescriptor) {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(descriptor.clone());
    }

    fn on_delivery_failed(&self, error: &RelayError, request: &DeliveryRequest) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedFailure {
                error: error.to_string(),
                status: error.status(),
                channel_id: request.destination.channel_id.clone(),
                thread_id: request.destination.thread_id.clone(),
                webhook_id: request.destination.credential.id.clone(),
                chunk_index: request.chunk_index,
                chunk_count: request.chunk_count,
                body: request.body.clone(),
                remaining: request.remaining.clone(),
            });
    }
}
