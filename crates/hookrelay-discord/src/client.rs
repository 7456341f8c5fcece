// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP client construction and error decoding.

use std::time::Duration;

use hookrelay_config::DiscordConfig;
use hookrelay_core::RelayError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::types::ApiErrorResponse;

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/hookrelay/hookrelay, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Builds a client with the configured timeout and, when given, bot
/// authorization on every request.
pub(crate) fn build_client(
    config: &DiscordConfig,
    bot_token: Option<&str>,
) -> Result<reqwest::Client, RelayError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = bot_token {
        let mut value = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|e| RelayError::Config(format!("invalid bot token header value: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))
}

/// Maps a transport-level reqwest failure, keeping timeouts distinct.
pub(crate) fn send_error(err: reqwest::Error, timeout: Duration) -> RelayError {
    if err.is_timeout() {
        RelayError::Timeout { duration: timeout }
    } else {
        RelayError::Delivery {
            status: None,
            message: format!("HTTP request failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Strips a trailing slash so paths can be appended with `/`.
pub(crate) fn normalize_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Reads an error response into a human-readable message.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) if api_err.code != 0 => {
            format!("Discord API error {} ({status}): {}", api_err.code, api_err.message)
        }
        Ok(api_err) => format!("Discord API returned {status}: {}", api_err.message),
        Err(_) => format!("Discord API returned {status}: {body}"),
    }
}
