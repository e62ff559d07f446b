use serde::{Deserialize, Serialize};

/// Slack `link_shared` event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSharedEvent {
    pub channel: String,
    pub message_ts: String,
    #[serde(default)]
    pub links: Vec<SharedLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLink {
    pub url: String,
    #[serde(default)]
    pub domain: Option<String>,
}
