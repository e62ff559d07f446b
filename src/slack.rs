use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info};

use crate::links::Unfurler;
use crate::model::preview::Preview;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("chat.unfurl request failed: {0}")]
    Request(#[from] ureq::Error),
    #[error("chat.unfurl returned status {0}")]
    Status(u16),
    #[error("chat.unfurl rejected: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API client for `chat.unfurl`, authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    token: String,
    api_base: String,
    agent: ureq::Agent,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .http_status_as_error(false)
            .build();
        Self {
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            agent: config.into(),
        }
    }

    /// Request body for `chat.unfurl`.
    pub fn unfurl_payload(channel: &str, message_ts: &str, previews: &BTreeMap<String, Preview>) -> Value {
        let unfurls: serde_json::Map<String, Value> = previews
            .iter()
            .map(|(url, preview)| (url.clone(), json!({ "blocks": preview_blocks(preview) })))
            .collect();
        json!({ "channel": channel, "ts": message_ts, "unfurls": unfurls })
    }
}

// Keep the bot token out of logs.
impl fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Unfurler for SlackClient {
    type Error = SlackError;

    fn unfurl(&self, channel: &str, message_ts: &str, previews: &BTreeMap<String, Preview>) -> Result<(), SlackError> {
        let payload = Self::unfurl_payload(channel, message_ts, previews);
        let url = format!("{}/chat.unfurl", self.api_base);
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send_json(payload)
            .inspect_err(|e| error!(error = %e, "Failed to call chat.unfurl"))?;

        let status = response.status().as_u16();
        if status != 200 {
            error!(status, "chat.unfurl returned non-success status");
            return Err(SlackError::Status(status));
        }
        let body: ApiResponse = response.body_mut().read_json()?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown_error".to_string());
            error!(error = %reason, "chat.unfurl rejected the request");
            return Err(SlackError::Api(reason));
        }
        info!(status, unfurls = previews.len(), "Posted unfurls to Slack");
        Ok(())
    }
}

/// Block Kit rendering of one preview.
pub fn preview_blocks(preview: &Preview) -> Value {
    json!([{
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": preview_text(preview),
        }
    }])
}

pub fn preview_text(preview: &Preview) -> String {
    format!(
        "<{}|*{}*> ({})\n*Time:* {} for {}\n*Cost:* {}",
        preview.url, preview.title, preview.event_id, preview.start, preview.duration, preview.cost
    )
}
