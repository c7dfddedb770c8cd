use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::flags::Permissions;
use crate::types::snowflake::Snowflake;
use crate::types::user::User;
use crate::util;

/// A user's membership record in one guild: nickname, roles, join date
/// and voice state. The guild id is not part of the payload, so the CDN
/// helpers that need it take it as an argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// The user this record belongs to. Discord omits it on a few
    /// gateway-sourced payloads, hence the `Option`.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
    /// Guild-specific avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
    pub roles: Vec<Snowflake>,
    pub joined_at: DateTime<Utc>,
    /// When the member started boosting the guild.
    #[serde(default)]
    pub premium_since: Option<DateTime<Utc>>,
    pub deaf: bool,
    pub mute: bool,
    /// Whether the member has not yet passed membership screening.
    #[serde(default)]
    pub pending: Option<bool>,
    /// Permissions of the requesting user in the guild.
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, rename = "communication_disabled_until")]
    pub timed_out_until: Option<DateTime<Utc>>,
}

impl Member {
    /// Nickname if set, username otherwise. `None` when the payload
    /// carried no user object at all.
    pub fn display_name(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or_else(|| self.user.as_ref().map(|u| u.username.as_str()))
    }

    /// Chat mention string for this member.
    pub fn mention(&self) -> Option<String> {
        self.user.as_ref().map(User::mention)
    }

    /// CDN URL of the guild-specific avatar, if one is set.
    pub fn guild_avatar_url(&self, guild_id: Snowflake) -> Option<String> {
        let hash = self.avatar.as_deref()?;
        let user = self.user.as_ref()?;
        let mut url = util::cdn_image(
            &[
                "guilds",
                &guild_id.to_string(),
                "users",
                &user.id.to_string(),
                "avatars",
            ],
            hash,
        );
        url.push_str("?size=1024");
        Some(url)
    }

    /// Guild avatar first, then the user's own display avatar.
    pub fn display_avatar_url(&self, guild_id: Snowflake) -> Option<String> {
        self.guild_avatar_url(guild_id)
            .or_else(|| self.user.as_ref().map(User::display_avatar_url))
    }

    /// Whether a timeout is currently in effect.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out_until.is_some_and(|until| until > Utc::now())
    }
}
