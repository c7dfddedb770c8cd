use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::integration::ServerIntegration;

/// Who can see a connection on the user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Visibility {
    /// Visible only to the user themselves.
    None,
    Everyone,
    /// A value this library does not know yet.
    Unknown(u8),
}

impl From<u8> for Visibility {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Everyone,
            other => Self::Unknown(other),
        }
    }
}

impl From<Visibility> for u8 {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::None => 0,
            Visibility::Everyone => 1,
            Visibility::Unknown(other) => other,
        }
    }
}

/// An external account (Twitch, Steam, GitHub, ...) linked to the user.
/// Requires the `connections` scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Id of the account on the external service. Not a snowflake.
    pub id: String,
    pub name: String,
    /// The service this connection is for, e.g. `twitch` or `youtube`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub revoked: bool,
    /// Server integrations tied to this connection.
    #[serde(default)]
    pub integrations: Vec<ServerIntegration>,
    pub verified: bool,
    pub friend_sync: bool,
    pub show_activity: bool,
    pub visibility: Visibility,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
