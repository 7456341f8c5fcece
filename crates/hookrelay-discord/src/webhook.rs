// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook execution over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use hookrelay_config::DiscordConfig;
use hookrelay_core::{ChannelId, Credential, MessageDescriptor, RelayError, Transport, WebhookBody};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::{build_client, error_message, normalize_base, send_error};
use crate::types::{ApiMessage, ExecutePayload};

/// [`Transport`] that executes Discord webhooks.
///
/// Bodies without attachments are sent as JSON. With attachments the request
/// is multipart: `payload_json` plus one `files[n]` part per file.
/// Requests use `?wait=true` so the created message comes back.
#[derive(Debug, Clone)]
pub struct DiscordWebhookTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DiscordWebhookTransport {
    /// Webhook execution is authorized by the webhook token in the URL; no
    /// bot token is attached.
    pub fn new(config: &DiscordConfig) -> Result<Self, RelayError> {
        Ok(Self {
            client: build_client(config, None)?,
            base_url: normalize_base(&config.api_base_url),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn execute_url(&self, credential: &Credential) -> String {
        format!(
            "{}/webhooks/{}/{}",
            self.base_url, credential.id, credential.token
        )
    }
}

fn multipart_form(body: &WebhookBody, payload_json: String) -> Result<Form, RelayError> {
    let mut form = Form::new().text("payload_json", payload_json);
    for (i, attachment) in body.attachments.iter().enumerate() {
        let mut part = Part::bytes(attachment.data.clone()).file_name(attachment.filename.clone());
        if let Some(content_type) = &attachment.content_type {
            part = part.mime_str(content_type).map_err(|e| RelayError::Delivery {
                status: None,
                message: format!("invalid content type for {}: {e}", attachment.filename),
                source: Some(Box::new(e)),
            })?;
        }
        form = form.part(format!("files[{i}]"), part);
    }
    Ok(form)
}

#[async_trait]
impl Transport for DiscordWebhookTransport {
    async fn post(
        &self,
        credential: &Credential,
        thread_id: Option<&ChannelId>,
        body: &WebhookBody,
    ) -> Result<MessageDescriptor, RelayError> {
        let payload = ExecutePayload::from(body);

        let mut query: Vec<(&str, &str)> = vec![("wait", "true")];
        if let Some(thread) = thread_id {
            query.push(("thread_id", thread.as_str()));
        }
        let request = self.client.post(self.execute_url(credential)).query(&query);

        let request = if body.attachments.is_empty() {
            request.json(&payload)
        } else {
            let payload_json = serde_json::to_string(&payload).map_err(|e| RelayError::Delivery {
                status: None,
                message: format!("failed to encode webhook payload: {e}"),
                source: Some(Box::new(e)),
            })?;
            request.multipart(multipart_form(body, payload_json)?)
        };

        let response = request
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        let status = response.status();
        debug!(status = %status, webhook = %credential.id, "webhook response received");

        if !status.is_success() {
            let message = error_message(response).await;
            return Err(RelayError::delivery(Some(status.as_u16()), message));
        }

        let message: ApiMessage = response.json().await.map_err(|e| RelayError::Delivery {
            status: Some(status.as_u16()),
            message: format!("failed to parse webhook response: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageDescriptor {
            id: message.id,
            channel_id: message.channel_id.into(),
        })
    }
}
