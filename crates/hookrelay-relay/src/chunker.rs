// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Size-partitioning of merged groups into webhook bodies.

use hookrelay_core::limits::{MAX_BLOCKS_PER_REQUEST, MAX_BLOCK_SIZE_PER_REQUEST, MAX_TEXT_LENGTH};
use hookrelay_core::{RichBlock, WebhookBody};
use tracing::warn;

use crate::merger::DestinationGroup;

/// Per-request limits applied while chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    pub max_blocks: usize,
    pub max_block_size: usize,
    pub max_text_len: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            max_blocks: MAX_BLOCKS_PER_REQUEST,
            max_block_size: MAX_BLOCK_SIZE_PER_REQUEST,
            max_text_len: MAX_TEXT_LENGTH,
        }
    }
}

/// Splits blocks into ordered slices within the count and size limits.
///
/// Greedy single pass: a slice is closed when adding the next block would
/// exceed either limit. A block larger than `max_block_size` on its own is
/// emitted alone. Returns no slices for no blocks.
pub fn chunk_blocks(blocks: Vec<RichBlock>, limits: &ChunkLimits) -> Vec<Vec<RichBlock>> {
    let mut chunks = Vec::new();
    let mut current: Vec<RichBlock> = Vec::new();
    let mut current_size = 0usize;

    for block in blocks {
        let size = block.size();
        if size > limits.max_block_size {
            warn!(
                size,
                limit = limits.max_block_size,
                "rich block exceeds the per-request size limit, sending it alone"
            );
        }

        let full = current.len() + 1 > limits.max_blocks;
        let too_big = current_size + size > limits.max_block_size;
        if !current.is_empty() && (full || too_big) {
            chunks.push(std::mem::take(&mut current));
            current_size = 0;
        }

        current_size += size;
        current.push(block);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Truncates `text` to at most `max` characters, marking the cut with an
/// ellipsis.
pub fn truncate_text(text: String, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text;
    }
    warn!(length = len, limit = max, "message text exceeds the limit, truncating");
    if max == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}

/// Plans the webhook bodies for one destination group.
///
/// The first body carries text, identity, components, attachments, and
/// mention policy alongside its blocks; later bodies carry rich blocks only.
/// A group without blocks still yields exactly one body.
pub fn plan(group: DestinationGroup, limits: &ChunkLimits) -> Vec<WebhookBody> {
    let DestinationGroup {
        text,
        blocks,
        components,
        attachments,
        identity,
        mentions,
        ..
    } = group;

    let mut slices = chunk_blocks(blocks, limits).into_iter();
    let first = WebhookBody {
        text: text
            .filter(|t| !t.trim().is_empty())
            .map(|t| truncate_text(t, limits.max_text_len)),
        blocks: slices.next().unwrap_or_default(),
        components,
        attachments,
        identity,
        mentions: Some(mentions),
    };

    std::iter::once(first)
        .chain(slices.map(|blocks| WebhookBody {
            blocks,
            ..WebhookBody::default()
        }))
        .collect()
}
