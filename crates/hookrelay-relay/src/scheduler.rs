// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring flush timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::relay::RelayInner;

/// Background task that flushes the pending queue every period.
///
/// The first tick fires one full period after spawning. Ticks that fall
/// behind are delayed rather than bunched up.
pub(crate) struct FlushScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl FlushScheduler {
    pub(crate) fn spawn(inner: Arc<RelayInner>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "flush scheduler started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("flush scheduler cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        inner.tick().await;
                    }
                }
            }
        });

        Self { token, handle }
    }

    /// Stops the timer without waiting for an in-progress tick.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Stops the timer and waits for the task to exit. A tick that is
    /// already running completes first.
    pub(crate) async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "flush scheduler task ended abnormally");
        }
    }
}
