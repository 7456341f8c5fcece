// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord adapters for the hookrelay pipeline.
//!
//! - [`DiscordWebhookTransport`] executes webhooks (JSON or multipart)
//! - [`DiscordDirectory`] resolves channels and finds or creates webhooks

mod client;
pub mod directory;
pub mod types;
pub mod webhook;

pub use directory::{BOT_TOKEN_ENV, DiscordDirectory};
pub use webhook::DiscordWebhookTransport;
