// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock webhook transport for deterministic delivery tests.
//!
//! `MockTransport` records every post it receives and can be told to fail
//! for particular webhooks, channels, or after a number of successes.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use hookrelay_core::{ChannelId, Credential, MessageDescriptor, RelayError, Transport, WebhookBody};

/// One post as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub credential: Credential,
    pub thread_id: Option<ChannelId>,
    pub body: WebhookBody,
    /// False when the mock answered with an error.
    pub accepted: bool,
}

#[derive(Default)]
struct State {
    posts: Vec<RecordedPost>,
    failing_webhooks: HashSet<String>,
    failing_channels: HashSet<ChannelId>,
    successes: usize,
}

/// A recording webhook transport.
pub struct MockTransport {
    state: Mutex<State>,
    fail_after: Option<usize>,
    failure_status: u16,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_after: None,
            failure_status: 500,
            delay: None,
        }
    }

    /// Accept the first `n` posts, reject every one after.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Reject every post to a webhook attached to this channel.
    pub fn failing_channel(self, channel_id: &str) -> Self {
        self.fail_channel(channel_id);
        self
    }

    /// HTTP status carried by injected failures (default 500).
    pub fn failure_status(mut self, status: u16) -> Self {
        self.failure_status = status;
        self
    }

    /// Sleep before answering each post.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reject every post to this webhook id from now on.
    pub fn fail_webhook(&self, webhook_id: &str) {
        self.lock().failing_webhooks.insert(webhook_id.to_string());
    }

    /// Reject every post to a webhook attached to this channel from now on.
    pub fn fail_channel(&self, channel_id: &str) {
        self.lock().failing_channels.insert(channel_id.into());
    }

    /// Stop injecting per-channel and per-webhook failures.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.failing_webhooks.clear();
        state.failing_channels.clear();
    }

    /// Every post received, accepted or not, in arrival order.
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.lock().posts.clone()
    }

    /// Accepted posts only.
    pub fn accepted(&self) -> Vec<RecordedPost> {
        self.lock().posts.iter().filter(|p| p.accepted).cloned().collect()
    }

    /// Accepted posts addressed to one channel (parent channel for threads).
    pub fn accepted_for(&self, channel_id: &str) -> Vec<RecordedPost> {
        self.accepted()
            .into_iter()
            .filter(|p| p.credential.channel_id.as_str() == channel_id)
            .collect()
    }

    pub fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(
        &self,
        credential: &Credential,
        thread_id: Option<&ChannelId>,
        body: &WebhookBody,
    ) -> Result<MessageDescriptor, RelayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        let rejected = state.failing_webhooks.contains(&credential.id)
            || state.failing_channels.contains(&credential.channel_id)
            || self.fail_after.is_some_and(|n| state.successes >= n);

        state.posts.push(RecordedPost {
            credential: credential.clone(),
            thread_id: thread_id.cloned(),
            body: body.clone(),
            accepted: !rejected,
        });

        if rejected {
            return Err(RelayError::delivery(
                Some(self.failure_status),
                format!("mock rejected post to webhook {}", credential.id),
            ));
        }

        state.successes += 1;
        Ok(MessageDescriptor {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: thread_id
                .cloned()
                .unwrap_or_else(|| credential.channel_id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(id: &str, channel: &str) -> Credential {
        Credential {
            id: id.into(),
            token: "tok".into(),
            channel_id: channel.into(),
        }
    }

    fn body(text: &str) -> WebhookBody {
        WebhookBody {
            text: Some(text.into()),
            ..WebhookBody::default()
        }
    }

    #[tokio::test]
    async fn records_accepted_posts() {
        let transport = MockTransport::new();
        let thread: ChannelId = "t1".into();
        let descriptor = transport
            .post(&credential("w1", "c1"), Some(&thread), &body("hi"))
            .await
            .unwrap();
        assert_eq!(descriptor.channel_id.as_str(), "t1");

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].accepted);
        assert_eq!(posts[0].body.text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn fail_after_rejects_later_posts() {
        let transport = MockTransport::new().fail_after(1).failure_status(404);
        let cred = credential("w1", "c1");
        assert!(transport.post(&cred, None, &body("a")).await.is_ok());
        let err = transport.post(&cred, None, &body("b")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(transport.accepted().len(), 1);
        assert_eq!(transport.post_count(), 2);
    }

    #[tokio::test]
    async fn failing_channel_can_heal() {
        let transport = MockTransport::new().failing_channel("c1");
        let cred = credential("w1", "c1");
        assert!(transport.post(&cred, None, &body("a")).await.is_err());
        transport.heal();
        assert!(transport.post(&cred, None, &body("b")).await.is_ok());
        assert_eq!(transport.accepted_for("c1").len(), 1);
    }
}
