use reqwest::Method;
use serde::Serialize;

use crate::{
    client::{Client, Route},
    error::Error,
    types::connection::Connection,
    types::guild::Guild,
    types::member::Member,
    types::snowflake::Snowflake,
    types::token::AccessToken,
    types::user::User,
    util::build_url,
};

/// Attributes applied as a user joins a guild. Each one needs the bot to
/// hold the matching permission in the target guild.
#[derive(Debug, Clone, Default)]
pub struct AddGuildMemberOptions {
    /// Nickname to apply (`MANAGE_NICKNAMES`).
    pub nick: Option<String>,
    /// Role ids to assign on join (`MANAGE_ROLES`).
    pub roles: Vec<Snowflake>,
    /// Join muted (`MUTE_MEMBERS`).
    pub mute: Option<bool>,
    /// Join deafened (`DEAFEN_MEMBERS`).
    pub deaf: Option<bool>,
}

// Unset attributes stay off the wire; sending them would make Discord
// demand permissions the bot may not have.
#[derive(Serialize)]
struct AddGuildMemberBody<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nick: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    roles: &'a [Snowflake],
    #[serde(skip_serializing_if = "Option::is_none")]
    mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deaf: Option<bool>,
}

#[async_trait::async_trait]
pub trait UsersApi {
    /// Fetch the authorizing user. Needs the `identify` scope; `email`
    /// and `verified` stay empty without the `email` scope.
    async fn fetch_user(&self, token: &AccessToken) -> Result<User, Error>;

    /// Fetch the partial guilds the user is a member of. Needs the
    /// `guilds` scope.
    async fn fetch_user_guilds(&self, token: &AccessToken) -> Result<Vec<Guild>, Error>;

    /// Fetch the user's linked external accounts. Needs the
    /// `connections` scope.
    async fn fetch_user_connections(&self, token: &AccessToken) -> Result<Vec<Connection>, Error>;

    /// Fetch the user's member record in one guild. Needs the
    /// `guilds.members.read` scope.
    async fn fetch_member(&self, token: &AccessToken, guild_id: Snowflake)
        -> Result<Member, Error>;

    /// Join a user to a guild through a bot that is already in it. Needs
    /// the `guilds.join` scope on the token and `CREATE_INSTANT_INVITE`
    /// on the bot. Answers `Ok(None)` when the user was already a member.
    async fn add_guild_member(
        &self,
        token: &AccessToken,
        bot_token: &str,
        guild_id: Snowflake,
        user_id: Snowflake,
        options: AddGuildMemberOptions,
    ) -> Result<Option<Member>, Error>;
}

#[async_trait::async_trait]
impl UsersApi for Client {
    async fn fetch_user(&self, token: &AccessToken) -> Result<User, Error> {
        let route = Route::new(
            Method::GET,
            build_url(&self.api_url, &["users", "@me"]),
            "GET:/users/@me",
        );
        let request = self.bearer(&route, token);
        self.execute(&route, request).await
    }

    async fn fetch_user_guilds(&self, token: &AccessToken) -> Result<Vec<Guild>, Error> {
        let route = Route::new(
            Method::GET,
            build_url(&self.api_url, &["users", "@me", "guilds"]),
            "GET:/users/@me/guilds",
        );
        let request = self.bearer(&route, token);
        self.execute(&route, request).await
    }

    async fn fetch_user_connections(&self, token: &AccessToken) -> Result<Vec<Connection>, Error> {
        let route = Route::new(
            Method::GET,
            build_url(&self.api_url, &["users", "@me", "connections"]),
            "GET:/users/@me/connections",
        );
        let request = self.bearer(&route, token);
        self.execute(&route, request).await
    }

    async fn fetch_member(
        &self,
        token: &AccessToken,
        guild_id: Snowflake,
    ) -> Result<Member, Error> {
        let guild = guild_id.to_string();
        // The guild id is a major parameter: each guild gets its own bucket.
        let route = Route::new(
            Method::GET,
            build_url(&self.api_url, &["users", "@me", "guilds", &guild, "member"]),
            format!("GET:/users/@me/guilds/{guild}/member"),
        );
        let request = self.bearer(&route, token);
        self.execute(&route, request).await
    }

    async fn add_guild_member(
        &self,
        token: &AccessToken,
        bot_token: &str,
        guild_id: Snowflake,
        user_id: Snowflake,
        options: AddGuildMemberOptions,
    ) -> Result<Option<Member>, Error> {
        let guild = guild_id.to_string();
        let user = user_id.to_string();
        let route = Route::new(
            Method::PUT,
            build_url(&self.api_url, &["guilds", &guild, "members", &user]),
            format!("PUT:/guilds/{guild}/members"),
        );
        let body = AddGuildMemberBody {
            access_token: token.access_token(),
            nick: options.nick.as_deref(),
            roles: &options.roles,
            mute: options.mute,
            deaf: options.deaf,
        };
        let request = self.bot(&route, bot_token).json(&body);
        self.execute_optional(&route, request).await
    }
}
