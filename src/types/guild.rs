use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::types::flags::Permissions;
use crate::types::snowflake::Snowflake;
use crate::util;

/// A partial guild from `GET /users/@me/guilds`.
///
/// The listing endpoint only returns what the member list UI needs:
/// identity, icon, the requesting user's permissions and feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Whether the requesting user owns the guild. Absent on some payloads.
    #[serde(default)]
    pub owner: Option<bool>,
    /// Permissions of the requesting user in this guild.
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Guild {
    /// CDN URL of the guild icon, if one is set.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_deref().map(|hash| {
            let mut url = util::cdn_image(&["icons", &self.id.to_string()], hash);
            url.push_str("?size=1024");
            url
        })
    }

    pub fn is_owner(&self) -> bool {
        self.owner.unwrap_or(false)
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Guild {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Guild {}

impl Hash for Guild {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
