// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery notification hooks.

use crate::error::RelayError;
use crate::types::{DeliveryRequest, MessageDescriptor};

/// Observer notified about the outcome of every dispatched chunk.
///
/// These are the only notifications the relay emits. Hooks run on the
/// dispatching task and should return quickly.
pub trait DeliveryHooks: Send + Sync + 'static {
    fn on_delivered(&self, _descriptor: &MessageDescriptor) {}

    fn on_delivery_failed(&self, _error: &RelayError, _request: &DeliveryRequest) {}
}

/// Hooks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl DeliveryHooks for NoopHooks {}
