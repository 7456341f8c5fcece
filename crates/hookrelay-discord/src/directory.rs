// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel and webhook lookups over the Discord REST API.

use std::time::Duration;

use async_trait::async_trait;
use hookrelay_config::DiscordConfig;
use hookrelay_core::{ChannelId, ChannelMeta, Credential, Directory, RelayError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::{build_client, error_message, normalize_base};
use crate::types::{ApiChannel, ApiWebhook, CreateWebhook, channel_kind};

/// Environment variable consulted when no bot token is configured.
pub const BOT_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// [`Directory`] backed by the Discord REST API.
///
/// Webhooks are owned by name: an existing webhook called `webhook_name`
/// that carries a token is reused, otherwise one is created. 403 and 404
/// mean the channel is gone or out of reach and resolve to `None`.
#[derive(Debug, Clone)]
pub struct DiscordDirectory {
    client: reqwest::Client,
    base_url: String,
    webhook_name: String,
    timeout: Duration,
}

impl DiscordDirectory {
    /// Creates a directory from config.
    ///
    /// # Bot token resolution
    /// 1. `config.bot_token` if set
    /// 2. `DISCORD_BOT_TOKEN` environment variable
    /// 3. Returns error if neither is available
    pub fn new(config: &DiscordConfig) -> Result<Self, RelayError> {
        let token = resolve_bot_token(&config.bot_token)?;
        let directory = Self {
            client: build_client(config, Some(&token))?,
            base_url: normalize_base(&config.api_base_url),
            webhook_name: config.webhook_name.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        };
        info!(base_url = %directory.base_url, "Discord directory initialized");
        Ok(directory)
    }

    /// GET a JSON resource. `Ok(None)` for 403/404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        channel_id: &ChannelId,
        url: String,
    ) -> Result<Option<T>, RelayError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_failed(channel_id, e))?;
        read_json(channel_id, response).await
    }

    fn request_failed(&self, channel_id: &ChannelId, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            return RelayError::Timeout {
                duration: self.timeout,
            };
        }
        RelayError::resolution(channel_id, format!("HTTP request failed: {e}"))
    }

    async fn create_webhook(&self, channel_id: &ChannelId) -> Result<Option<ApiWebhook>, RelayError> {
        let response = self
            .client
            .post(format!("{}/channels/{channel_id}/webhooks", self.base_url))
            .json(&CreateWebhook {
                name: &self.webhook_name,
            })
            .send()
            .await
            .map_err(|e| self.request_failed(channel_id, e))?;
        read_json(channel_id, response).await
    }
}

fn resolve_bot_token(configured: &Option<String>) -> Result<String, RelayError> {
    if let Some(token) = configured.as_deref().filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    std::env::var(BOT_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            RelayError::Config(format!(
                "no Discord bot token: set discord.bot_token or {BOT_TOKEN_ENV}"
            ))
        })
}


async fn read_json<T: DeserializeOwned>(
    channel_id: &ChannelId,
    response: reqwest::Response,
) -> Result<Option<T>, RelayError> {
    let status = response.status();
    if matches!(status, StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) {
        debug!(channel = %channel_id, status = %status, "channel not reachable");
        return Ok(None);
    }
    if !status.is_success() {
        let message = error_message(response).await;
        return Err(RelayError::resolution(channel_id, message));
    }
    response
        .json::<T>()
        .await
        .map(Some)
        .map_err(|e| RelayError::resolution(channel_id, format!("failed to parse response: {e}")))
}

#[async_trait]
impl Directory for DiscordDirectory {
    async fn resolve_channel(&self, id: &ChannelId) -> Result<Option<ChannelMeta>, RelayError> {
        let channel: Option<ApiChannel> = self
            .get_json(id, format!("{}/channels/{id}", self.base_url))
            .await?;

        Ok(channel.map(|c| ChannelMeta {
            id: c.id.into(),
            kind: channel_kind(c.kind),
            parent_id: c.parent_id.map(ChannelId::from),
            guild_id: c.guild_id,
            valid: true,
        }))
    }

    async fn resolve_or_create_credential(
        &self,
        channel_id: &ChannelId,
    ) -> Result<Option<Credential>, RelayError> {
        let existing: Option<Vec<ApiWebhook>> = self
            .get_json(
                channel_id,
                format!("{}/channels/{channel_id}/webhooks", self.base_url),
            )
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let reusable = existing
            .into_iter()
            .find(|w| w.token.is_some() && w.name.as_deref() == Some(self.webhook_name.as_str()));

        let webhook = match reusable {
            Some(webhook) => {
                debug!(channel = %channel_id, webhook = %webhook.id, "reusing existing webhook");
                webhook
            }
            None => match self.create_webhook(channel_id).await? {
                Some(webhook) => {
                    info!(channel = %channel_id, webhook = %webhook.id, "created webhook");
                    webhook
                }
                None => return Ok(None),
            },
        };

        Ok(webhook.token.map(|token| Credential {
            id: webhook.id,
            token,
            channel_id: webhook
                .channel_id
                .map(ChannelId::from)
                .unwrap_or_else(|| channel_id.clone()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookrelay_core::ChannelKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn directory(server: &MockServer) -> DiscordDirectory {
        let config = DiscordConfig {
            bot_token: Some("bot-secret".into()),
            api_base_url: server.uri(),
            ..DiscordConfig::default()
        };
        DiscordDirectory::new(&config).unwrap()
    }

    #[tokio::test]
    async fn resolves_thread_with_parent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/555"))
            .and(header("authorization", "Bot bot-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "555",
                "type": 11,
                "parent_id": "100",
                "guild_id": "1",
                "name": "incident-42"
            })))
            .mount(&server)
            .await;

        let meta = directory(&server)
            .resolve_channel(&"555".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.kind, ChannelKind::PublicThread);
        assert_eq!(meta.parent_id.unwrap().as_str(), "100");
        assert!(meta.valid);
    }

    #[tokio::test]
    async fn missing_access_resolves_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/555"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "Missing Access", "code": 50001})),
            )
            .mount(&server)
            .await;

        assert!(
            directory(&server)
                .resolve_channel(&"555".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn server_error_is_resolution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = directory(&server)
            .resolve_channel(&"555".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Resolution { .. }));
    }

    #[tokio::test]
    async fn reuses_named_webhook_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/100/webhooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "name": "hookrelay", "channel_id": "100"},
                {"id": "2", "name": "someone-else", "token": "t2", "channel_id": "100"},
                {"id": "3", "name": "hookrelay", "token": "t3", "channel_id": "100"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let credential = directory(&server)
            .resolve_or_create_credential(&"100".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.id, "3");
        assert_eq!(credential.token, "t3");
        assert_eq!(credential.channel_id.as_str(), "100");
    }

    #[tokio::test]
    async fn creates_webhook_when_none_reusable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/100/webhooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/channels/100/webhooks"))
            .and(body_json(json!({"name": "hookrelay"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "77", "name": "hookrelay", "token": "fresh", "channel_id": "100"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = directory(&server)
            .resolve_or_create_credential(&"100".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.id, "77");
        assert_eq!(credential.token, "fresh");
    }

    #[tokio::test]
    async fn no_manage_webhooks_permission_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/100/webhooks"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        assert!(
            directory(&server)
                .resolve_or_create_credential(&"100".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn slow_lookup_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/555"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "555", "type": 0}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = DiscordConfig {
            bot_token: Some("bot-secret".into()),
            api_base_url: server.uri(),
            request_timeout_secs: 1,
            ..DiscordConfig::default()
        };
        let err = DiscordDirectory::new(&config)
            .unwrap()
            .resolve_channel(&"555".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Timeout { .. }), "got: {err}");
    }

    #[test]
    fn configured_token_wins() {
        assert_eq!(
            resolve_bot_token(&Some("from-config".into())).unwrap(),
            "from-config"
        );
    }
}
