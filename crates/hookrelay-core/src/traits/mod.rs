// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the relay pipeline and its collaborators.
//!
//! All async traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod cache;
pub mod directory;
pub mod hooks;
pub mod transport;

pub use cache::CacheBackend;
pub use directory::Directory;
pub use hooks::{DeliveryHooks, NoopHooks};
pub use transport::Transport;
