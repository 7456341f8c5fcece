// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batching, size-partitioning webhook delivery pipeline.
//!
//! Submissions flow through:
//! 1. [`resolver`]: channel id to webhook credential (cached, threads
//!    redirected to their parent)
//! 2. [`identity`] and [`components`]: normalization
//! 3. [`queue`]: pending entries until the next flush
//! 4. [`merger`]: one group per (webhook, thread)
//! 5. [`chunker`]: platform-sized request bodies
//! 6. [`executor`]: ordered dispatch, credential invalidation on failure
//!
//! [`Relay`] ties these together behind a timer.

pub mod chunker;
pub mod components;
pub mod executor;
pub mod identity;
pub mod merger;
pub mod queue;
pub mod relay;
pub mod resolver;
mod scheduler;

pub use chunker::ChunkLimits;
pub use executor::DeliveryReport;
pub use identity::IdentityPolicy;
pub use relay::{
    DEFAULT_FLUSH_INTERVAL, FailedDestination, FlushReport, Relay, RelayBuilder, RelayStats,
    StatsSnapshot, SubmitOutcome,
};
pub use resolver::{CacheTtls, Resolver};
