// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential delivery of one destination's chunks.

use std::sync::Arc;

use hookrelay_core::{
    DeliveryHooks, DeliveryRequest, MessageDescriptor, RelayError, Transport, WebhookBody,
};
use tracing::{debug, warn};

use crate::chunker::{ChunkLimits, plan};
use crate::merger::DestinationGroup;
use crate::resolver::Resolver;

/// Outcome of delivering one destination group.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Descriptors of the chunks the platform accepted, in dispatch order.
    pub delivered: Vec<MessageDescriptor>,
    /// The failure that stopped this destination, if any.
    pub error: Option<RelayError>,
    /// Chunks abandoned after the failure.
    pub skipped: usize,
}

impl DeliveryReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Posts planned bodies through the transport, one destination at a time.
pub struct Executor {
    transport: Arc<dyn Transport>,
    resolver: Arc<Resolver>,
    hooks: Arc<dyn DeliveryHooks>,
    limits: ChunkLimits,
}

impl Executor {
    pub fn new(
        transport: Arc<dyn Transport>,
        resolver: Arc<Resolver>,
        hooks: Arc<dyn DeliveryHooks>,
        limits: ChunkLimits,
    ) -> Self {
        Self {
            transport,
            resolver,
            hooks,
            limits,
        }
    }

    /// Chunks a group and dispatches the chunks strictly in order.
    ///
    /// Each accepted chunk fires `on_delivered`. The first failure fires
    /// `on_delivery_failed` with the failed body and every abandoned one, so
    /// callers can re-submit them, then drops the cached credential for the
    /// destination channel. Nothing is retried.
    pub async fn deliver(&self, group: DestinationGroup) -> DeliveryReport {
        let destination = group.destination.clone();
        let bodies = plan(group, &self.limits);
        let chunk_count = bodies.len();
        let mut report = DeliveryReport::default();

        let mut pending = bodies.into_iter().enumerate();
        while let Some((chunk_index, body)) = pending.next() {
            let result = self
                .transport
                .post(
                    &destination.credential,
                    destination.thread_id.as_ref(),
                    &body,
                )
                .await;

            match result {
                Ok(descriptor) => {
                    debug!(
                        channel = %destination.channel_id,
                        message_id = %descriptor.id,
                        chunk = chunk_index + 1,
                        of = chunk_count,
                        "delivered chunk"
                    );
                    self.hooks.on_delivered(&descriptor);
                    report.delivered.push(descriptor);
                }
                Err(error) => {
                    warn!(
                        channel = %destination.channel_id,
                        thread = ?destination.thread_id.as_ref().map(|t| t.as_str()),
                        webhook = %destination.credential.id,
                        chunk = chunk_index + 1,
                        of = chunk_count,
                        error = %error,
                        "delivery failed, abandoning remaining chunks"
                    );
                    let remaining: Vec<WebhookBody> = pending.map(|(_, body)| body).collect();
                    report.skipped = remaining.len();
                    let request = DeliveryRequest {
                        destination: destination.clone(),
                        body,
                        chunk_index,
                        chunk_count,
                        remaining,
                    };
                    self.hooks.on_delivery_failed(&error, &request);
                    self.resolver.invalidate(&destination).await;
                    report.error = Some(error);
                    break;
                }
            }
        }

        report
    }
}
