// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hookrelay serve` command implementation.
//!
//! Reads one JSON send request per line from stdin and feeds it to a running
//! relay. Stops on EOF or SIGINT/SIGTERM; pending messages are flushed
//! before exit.

use std::sync::Arc;

use hookrelay_config::HookrelayConfig;
use hookrelay_core::{DeliveryHooks, DeliveryRequest, MessageDescriptor, RelayError, SendRequest};
use hookrelay_discord::{DiscordDirectory, DiscordWebhookTransport};
use hookrelay_relay::{Relay, SubmitOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::shutdown;

/// Delivery hooks that only log.
struct LogHooks;

impl DeliveryHooks for LogHooks {
    fn on_delivered(&self, descriptor: &MessageDescriptor) {
        debug!(message_id = %descriptor.id, channel = %descriptor.channel_id, "message delivered");
    }

    fn on_delivery_failed(&self, error: &RelayError, request: &DeliveryRequest) {
        warn!(
            channel = %request.destination.channel_id,
            undelivered_chunks = request.remaining.len() + 1,
            undelivered_blocks = request.undelivered_blocks().count(),
            error = %error,
            "relay content was not delivered"
        );
        if error.is_endpoint_gone() {
            info!(
                channel = %request.destination.channel_id,
                webhook = %request.destination.credential.id,
                "webhook no longer exists, a new one will be resolved on the next send"
            );
        }
    }
}

/// Builds a relay wired to the Discord adapters.
pub fn build_relay(config: &HookrelayConfig) -> Result<Relay, RelayError> {
    let directory = Arc::new(DiscordDirectory::new(&config.discord)?);
    let transport = Arc::new(DiscordWebhookTransport::new(&config.discord)?);
    Relay::builder(directory, transport)
        .with_config(config)
        .hooks(Arc::new(LogHooks))
        .build()
}

/// Counts of input lines handled by [`relay_lines`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LineStats {
    pub submitted: usize,
    pub malformed: usize,
}

/// Submits every JSON line from `reader` until EOF or cancellation.
pub async fn relay_lines<R>(relay: &Relay, reader: R, cancel: CancellationToken) -> LineStats
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = LineStats::default();
    let mut line_no = 0usize;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed to read input");
                break;
            }
        };
        line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: SendRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed send request");
                stats.malformed += 1;
                continue;
            }
        };

        stats.submitted += 1;
        if let SubmitOutcome::Failed { error, .. } = relay.submit(request).await {
            warn!(line = line_no, error = %error, "immediate send failed");
        }
    }

    stats
}

/// Runs the `hookrelay serve` command.
pub async fn run_serve(config: &HookrelayConfig) -> Result<(), RelayError> {
    info!("starting hookrelay serve");

    let relay = build_relay(config)?;
    relay.start()?;
    let cancel = shutdown::install_signal_handler();

    let lines = relay_lines(&relay, BufReader::new(tokio::io::stdin()), cancel).await;

    let report = relay.stop().await;
    let stats = relay.stats();
    info!(
        submitted = lines.submitted,
        malformed = lines.malformed,
        delivered = stats.delivered,
        failed = stats.failed,
        dropped = stats.dropped,
        final_flush_entries = report.entries,
        "hookrelay serve shutdown complete"
    );
    Ok(())
}
