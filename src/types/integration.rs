use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::snowflake::Snowflake;
use crate::util;

/// What happens to a subscriber whose external subscription lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ExpireBehavior {
    RemoveRole,
    Kick,
    Unknown(u8),
}

impl From<u8> for ExpireBehavior {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::RemoveRole,
            1 => Self::Kick,
            other => Self::Unknown(other),
        }
    }
}

impl From<ExpireBehavior> for u8 {
    fn from(value: ExpireBehavior) -> Self {
        match value {
            ExpireBehavior::RemoveRole => 0,
            ExpireBehavior::Kick => 1,
            ExpireBehavior::Unknown(other) => other,
        }
    }
}

/// Account details on the integrated service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationAccount {
    /// Id on the external service, not necessarily numeric.
    pub id: String,
    pub name: String,
}

/// The application attached to a Discord integration. Also used for the
/// application block of `GET /oauth2/@me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationApp {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl IntegrationApp {
    /// CDN URL of the application icon, if one is set. App icons are
    /// always static.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_deref().map(|hash| {
            format!(
                "{}/app-icons/{}/{hash}.png?size=1024",
                util::CDN_BASE,
                self.id
            )
        })
    }
}

/// A guild integration attached to one of the user's connections
/// (Twitch subscriber role, YouTube membership and the like).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIntegration {
    pub id: Snowflake,
    pub name: String,
    /// Integration type, e.g. `twitch`, `youtube` or `discord`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub syncing: bool,
    /// Role handed to subscribers of this integration.
    #[serde(default)]
    pub role_id: Option<Snowflake>,
    #[serde(default)]
    pub enable_emoticons: Option<bool>,
    #[serde(default)]
    pub expire_behavior: Option<ExpireBehavior>,
    /// Grace period in days before `expire_behavior` kicks in.
    #[serde(default)]
    pub expire_grace_period: Option<u32>,
    pub account: IntegrationAccount,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscriber_count: Option<u32>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub application: Option<IntegrationApp>,
}

impl fmt::Display for ServerIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
