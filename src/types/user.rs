use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::api::oauth::OauthApi;
use crate::api::users::{AddGuildMemberOptions, UsersApi};
use crate::client::Client;
use crate::error::Error;
use crate::types::connection::Connection;
use crate::types::flags::UserFlags;
use crate::types::guild::Guild;
use crate::types::member::Member;
use crate::types::snowflake::Snowflake;
use crate::types::token::AccessToken;
use crate::util;

/// The authorizing Discord user, as exposed by the `identify` scope.
///
/// `email` and `verified` are only filled in when the token also carries
/// the `email` scope. The struct is a plain data snapshot; the fetch
/// helpers below take the client and token explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub flags: UserFlags,
    #[serde(default)]
    pub public_flags: UserFlags,
    #[serde(default)]
    pub premium_type: PremiumType,
}

/// Nitro subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum PremiumType {
    #[default]
    None,
    NitroClassic,
    Nitro,
    NitroBasic,
    /// A tier this library does not know about yet.
    Unknown(u8),
}

impl From<u8> for PremiumType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::NitroClassic,
            2 => Self::Nitro,
            3 => Self::NitroBasic,
            other => Self::Unknown(other),
        }
    }
}

impl From<PremiumType> for u8 {
    fn from(value: PremiumType) -> Self {
        match value {
            PremiumType::None => 0,
            PremiumType::NitroClassic => 1,
            PremiumType::Nitro => 2,
            PremiumType::NitroBasic => 3,
            PremiumType::Unknown(other) => other,
        }
    }
}

impl User {
    /// CDN URL of the custom avatar, if one is set.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar
            .as_deref()
            .map(|hash| util::cdn_image(&["avatars", &self.id.to_string()], hash))
    }

    /// Default avatar Discord assigns from the discriminator.
    pub fn default_avatar_url(&self) -> String {
        let index = self.discriminator.parse::<u32>().unwrap_or(0) % 5;
        format!("{}/embed/avatars/{index}.png", util::CDN_BASE)
    }

    /// The custom avatar when present, the default one otherwise.
    pub fn display_avatar_url(&self) -> String {
        self.avatar_url().unwrap_or_else(|| self.default_avatar_url())
    }

    /// CDN URL of the profile banner, if one is set.
    pub fn banner_url(&self) -> Option<String> {
        self.banner
            .as_deref()
            .map(|hash| util::cdn_image(&["banners", &self.id.to_string()], hash))
    }

    /// Accent colour rendered as `#rrggbb`.
    pub fn accent_color_hex(&self) -> Option<String> {
        self.accent_color.map(|c| format!("#{c:06x}"))
    }

    /// Chat mention string for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Account creation time, read out of the id.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Trades the refresh token inside `token` for a fresh token set.
    pub async fn refresh(
        &self,
        client: &Client,
        token: &AccessToken,
    ) -> Result<AccessToken, Error> {
        let refresh = token.refresh_token().ok_or_else(|| {
            Error::Validation("access token carries no refresh token".to_string())
        })?;
        client.refresh_token(refresh).await
    }

    /// Lists the guilds this user is in. Needs the `guilds` scope.
    pub async fn fetch_guilds(
        &self,
        client: &Client,
        token: &AccessToken,
    ) -> Result<Vec<Guild>, Error> {
        client.fetch_user_guilds(token).await
    }

    /// Lists the user's account connections. Needs the `connections` scope.
    pub async fn fetch_connections(
        &self,
        client: &Client,
        token: &AccessToken,
    ) -> Result<Vec<Connection>, Error> {
        client.fetch_user_connections(token).await
    }

    /// Fetches this user's member record in a guild. Needs the
    /// `guilds.members.read` scope.
    pub async fn fetch_member(
        &self,
        client: &Client,
        token: &AccessToken,
        guild_id: Snowflake,
    ) -> Result<Member, Error> {
        client.fetch_member(token, guild_id).await
    }

    /// Joins this user to a guild through a bot that is already in it.
    /// Needs the `guilds.join` scope on the token.
    pub async fn add_to_guild(
        &self,
        client: &Client,
        token: &AccessToken,
        bot_token: &str,
        guild_id: Snowflake,
        options: AddGuildMemberOptions,
    ) -> Result<Option<Member>, Error> {
        client
            .add_guild_member(token, bot_token, guild_id, self.id, options)
            .await
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}

// Identity is the snowflake, never the mutable profile fields.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
