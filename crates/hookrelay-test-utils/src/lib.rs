// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for hookrelay integration tests.
//!
//! Provides mock collaborators for fast, deterministic tests without a chat
//! platform.
//!
//! # Components
//!
//! - [`MockDirectory`] - In-memory channel table with lookup counters
//! - [`MockTransport`] - Recording transport with injectable failures
//! - [`RecordingHooks`] - Captures delivery notifications

pub mod mock_directory;
pub mod mock_transport;
pub mod recording_hooks;

pub use mock_directory::MockDirectory;
pub use mock_transport::{MockTransport, RecordedPost};
pub use recording_hooks::{RecordedFailure, RecordingHooks};
