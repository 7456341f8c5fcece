// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hookrelay send` command implementation.

use std::path::PathBuf;

use clap::Args;
use hookrelay_config::HookrelayConfig;
use hookrelay_core::{Attachment, Identity, RelayError, RichBlock, SendRequest};
use hookrelay_relay::SubmitOutcome;
use thiserror::Error;

use crate::serve::build_relay;

/// Errors from `hookrelay send`.
#[derive(Debug, Error)]
pub enum SendError {
    /// An `--embed` value is not a JSON object.
    #[error("invalid --embed argument: {0}")]
    InvalidEmbed(String),

    /// A `--file` path could not be read.
    #[error("cannot read --file {path}: {source}")]
    UnreadableFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Arguments for `hookrelay send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Target channel or thread id.
    pub channel: String,

    /// Message text.
    pub text: Option<String>,

    /// Display name to post under.
    #[arg(long)]
    pub username: Option<String>,

    /// Avatar URL to post with.
    #[arg(long)]
    pub avatar_url: Option<String>,

    /// Rich block as a JSON object; may be repeated.
    #[arg(long = "embed")]
    pub embeds: Vec<String>,

    /// File to attach; may be repeated.
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,
}

impl SendArgs {
    async fn into_request(self) -> Result<SendRequest, SendError> {
        let mut request = SendRequest::new(self.channel).immediate(true);
        if let Some(text) = self.text {
            request = request.text(text);
        }
        if self.username.is_some() || self.avatar_url.is_some() {
            request = request.identity(Identity {
                name: self.username,
                avatar_url: self.avatar_url,
            });
        }
        for embed in &self.embeds {
            let payload: serde_json::Value = serde_json::from_str(embed)
                .map_err(|e| SendError::InvalidEmbed(e.to_string()))?;
            if !payload.is_object() {
                return Err(SendError::InvalidEmbed(format!("`{embed}` is not a JSON object")));
            }
            request = request.block(RichBlock::new(payload));
        }
        for path in &self.files {
            let data = tokio::fs::read(path)
                .await
                .map_err(|source| SendError::UnreadableFile {
                    path: path.display().to_string(),
                    source,
                })?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            request = request.attachment(Attachment {
                filename,
                content_type: None,
                data,
            });
        }
        Ok(request)
    }
}

/// Runs the `hookrelay send` command: one immediate delivery.
pub async fn run_send(config: &HookrelayConfig, args: SendArgs) -> Result<(), SendError> {
    let request = args.into_request().await?;
    let relay = build_relay(config)?;
    match relay.submit(request).await {
        SubmitOutcome::Delivered(descriptors) => {
            for descriptor in descriptors {
                println!("{}", descriptor.id);
            }
            Ok(())
        }
        SubmitOutcome::Failed { error, .. } | SubmitOutcome::Dropped(error) => Err(error.into()),
        SubmitOutcome::Queued => {
            Err(RelayError::Internal("immediate send was queued".into()).into())
        }
    }
}
