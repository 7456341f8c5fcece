// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groups drained entries by destination.

use std::collections::HashMap;

use hookrelay_core::{Attachment, Destination, DestinationKey, Identity, MentionPolicy, RichBlock};
use serde_json::Value;

use crate::queue::QueueEntry;

/// Everything bound for one (webhook, thread) pair in a flush.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationGroup {
    pub destination: Destination,
    pub text: Option<String>,
    pub blocks: Vec<RichBlock>,
    pub components: Vec<Value>,
    pub attachments: Vec<Attachment>,
    pub identity: Identity,
    pub mentions: MentionPolicy,
    /// Number of queue entries merged into this group.
    pub entries: usize,
}

impl DestinationGroup {
    /// Starts a group from its first entry, which decides identity,
    /// attachments, and mention policy.
    pub fn from_entry(entry: QueueEntry) -> Self {
        Self {
            destination: entry.destination,
            text: entry.text,
            blocks: entry.blocks,
            components: entry.components,
            attachments: entry.attachments,
            identity: entry.identity,
            mentions: entry.mentions,
            entries: 1,
        }
    }

    /// Appends a later entry: text joins with a newline, blocks and
    /// components are appended; attachments and identity are ignored.
    fn absorb(&mut self, entry: QueueEntry) {
        if let Some(text) = entry.text {
            match &mut self.text {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(&text);
                }
                None => self.text = Some(text),
            }
        }
        self.blocks.extend(entry.blocks);
        self.components.extend(entry.components);
        self.entries += 1;
    }

    pub fn key(&self) -> DestinationKey {
        self.destination.key()
    }
}

/// Merges entries into one group per destination key.
///
/// Groups come out in the order their first entry arrived; within a group
/// content keeps arrival order.
pub fn merge(entries: Vec<QueueEntry>) -> Vec<DestinationGroup> {
    let mut groups: Vec<DestinationGroup> = Vec::new();
    let mut index: HashMap<DestinationKey, usize> = HashMap::new();

    for entry in entries {
        let key = entry.destination.key();
        match index.get(&key) {
            Some(&i) => groups[i].absorb(entry),
            None => {
                index.insert(key, groups.len());
                groups.push(DestinationGroup::from_entry(entry));
            }
        }
    }

    groups
}
