// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the hookrelay workspace.

use thiserror::Error;

/// The primary error type used across all hookrelay traits and core operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (invalid values, zero flush interval, bad headers).
    #[error("configuration error: {0}")]
    Config(String),

    /// A logical channel could not be mapped to a webhook credential.
    ///
    /// Usually permanent (channel deleted, missing permissions), so callers
    /// drop the send instead of retrying.
    #[error("cannot resolve channel {channel_id}: {message}")]
    Resolution { channel_id: String, message: String },

    /// The submission carried no text, rich blocks, components, or attachments.
    #[error("submission has no content")]
    EmptyPayload,

    /// The transport rejected or failed a webhook request.
    #[error("delivery failed: {message}")]
    Delivery {
        /// HTTP status returned by the platform, if a response was received.
        status: Option<u16>,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cache backend errors.
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Shorthand for a delivery error without an underlying source.
    pub fn delivery(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Delivery {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a resolution error.
    pub fn resolution(channel_id: impl ToString, message: impl Into<String>) -> Self {
        Self::Resolution {
            channel_id: channel_id.to_string(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status attached to a delivery error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Delivery { status, .. } => *status,
            _ => None,
        }
    }

    /// True when the platform reported the webhook itself as gone.
    pub fn is_endpoint_gone(&self) -> bool {
        matches!(self.status(), Some(401) | Some(404))
    }
}
