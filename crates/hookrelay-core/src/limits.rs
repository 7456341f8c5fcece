// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request limits enforced by the webhook execution endpoint.

/// Maximum number of rich blocks (embeds) in one request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 10;

/// Maximum aggregate rich-block size in one request.
pub const MAX_BLOCK_SIZE_PER_REQUEST: usize = 6000;

/// Maximum length of the text content in one request.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Maximum length of a webhook display name.
pub const MAX_USERNAME_LENGTH: usize = 80;

/// Maximum number of components in one action row.
pub const MAX_COMPONENTS_PER_ROW: usize = 5;
