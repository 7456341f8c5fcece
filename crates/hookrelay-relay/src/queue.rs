// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending queue shared by submitters and the flush cycle.

use hookrelay_core::{Attachment, Destination, Identity, MentionPolicy, RichBlock};
use serde_json::Value;
use tokio::sync::Mutex;

/// One normalized submission awaiting a flush.
///
/// Created by the submission API after resolution and identity policy, never
/// mutated afterwards, consumed by the merger.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub destination: Destination,
    pub text: Option<String>,
    pub blocks: Vec<RichBlock>,
    pub components: Vec<Value>,
    pub attachments: Vec<Attachment>,
    pub identity: Identity,
    pub mentions: MentionPolicy,
}

/// Mutex-guarded list of entries in arrival order.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Mutex<Vec<QueueEntry>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, entry: QueueEntry) {
        self.entries.lock().await.push(entry);
    }

    /// Swaps the queue for an empty one and returns what was pending.
    ///
    /// Entries pushed after the swap belong to the next drain.
    pub async fn drain(&self) -> Vec<QueueEntry> {
        std::mem::take(&mut *self.entries.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
