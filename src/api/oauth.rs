use reqwest::Method;
use serde::Serialize;

use crate::{
    client::{Client, Route},
    error::Error,
    scopes,
    types::flags::Permissions,
    types::snowflake::Snowflake,
    types::token::{AccessToken, AuthorizationInfo},
    util::build_url,
};

/// Where users get sent to approve an authorization request.
pub const AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";

/// How the consent screen treats a user who already authorized the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Always show the consent screen.
    Consent,
    /// Skip it when the grant already covers the requested scopes.
    None,
}

impl Prompt {
    fn as_str(self) -> &'static str {
        match self {
            Self::Consent => "consent",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Code,
    /// Implicit grant, for client-side web applications only.
    Token,
}

impl ResponseType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }
}

/// Knobs for [`Client::authorize_url`]. `Default` is the plain
/// authorization-code flow with the client's configured scopes and
/// redirect URI. The bot fields only apply when the `bot` scope is part
/// of the request.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeOptions<'a> {
    pub prompt: Option<Prompt>,
    /// Opaque CSRF token, echoed back on the redirect.
    pub state: Option<&'a str>,
    pub response_type: ResponseType,
    /// Overrides the client's configured scopes for this URL.
    pub scopes: Option<&'a [&'a str]>,
    /// Overrides the client's configured redirect URI for this URL.
    pub redirect_uri: Option<&'a str>,
    /// Guild to preselect in the bot invite picker.
    pub guild_id: Option<Snowflake>,
    /// Permissions the bot invite asks for.
    pub permissions: Option<Permissions>,
    /// Locks the invite picker to `guild_id`.
    pub disable_guild_select: Option<bool>,
}

impl Client {
    /// Builds the URL to send a user to for authorization.
    ///
    /// Scope overrides are validated against the known vocabulary, same
    /// as at construction, so a typo fails here instead of on Discord's
    /// error page.
    pub fn authorize_url(&self, options: &AuthorizeOptions<'_>) -> Result<String, Error> {
        let scope = match options.scopes {
            Some(list) => {
                scopes::validate(list.iter().copied())?;
                list.join(" ")
            }
            None => self.scope_string(),
        };
        let redirect_uri = options.redirect_uri.unwrap_or(&self.redirect_uri);

        let mut query: Vec<(&str, String)> = vec![
            ("client_id", self.client_id.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
            ("response_type", options.response_type.as_str().to_string()),
        ];
        if !scope.is_empty() {
            query.push(("scope", scope.clone()));
        }
        if let Some(prompt) = options.prompt {
            query.push(("prompt", prompt.as_str().to_string()));
        }
        if let Some(state) = options.state {
            query.push(("state", state.to_string()));
        }
        if scope.split_whitespace().any(|s| s == "bot") {
            if let Some(guild_id) = options.guild_id {
                query.push(("guild_id", guild_id.to_string()));
            }
            if let Some(permissions) = options.permissions {
                query.push(("permissions", permissions.bits().to_string()));
            }
            if let Some(disable) = options.disable_guild_select {
                query.push(("disable_guild_select", disable.to_string()));
            }
        }

        let encoded = serde_urlencoded::to_string(&query)
            .map_err(|e| Error::Validation(format!("failed to encode authorize query: {e}")))?;
        Ok(format!("{AUTHORIZE_URL}?{encoded}"))
    }
}

#[derive(Serialize)]
struct CodeGrantForm<'a> {
    client_id: Snowflake,
    client_secret: &'a str,
    grant_type: &'static str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Serialize)]
struct RefreshGrantForm<'a> {
    client_id: Snowflake,
    client_secret: &'a str,
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct RevokeForm<'a> {
    client_id: Snowflake,
    client_secret: &'a str,
    token: &'a str,
}

#[async_trait::async_trait]
pub trait OauthApi {
    /// Trade an authorization code from the redirect for a token set.
    /// A code is single-use: a second exchange fails, and also voids the
    /// token the first one produced.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error>;

    /// Trade a refresh token for a fresh token set.
    async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, Error>;

    /// Revoke an access or refresh token. Discord answers success even
    /// for tokens that are already dead, so this only errors on
    /// transport or client-credential problems.
    async fn revoke_token(&self, token: &str) -> Result<(), Error>;

    /// Describe what a bearer token is authorized to do.
    async fn fetch_authorization_info(
        &self,
        token: &AccessToken,
    ) -> Result<AuthorizationInfo, Error>;
}

#[async_trait::async_trait]
impl OauthApi for Client {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error> {
        let route = Route::new(
            Method::POST,
            build_url(&self.api_url, &["oauth2", "token"]),
            "POST:/oauth2/token",
        );
        let form = CodeGrantForm {
            client_id: self.client_id,
            client_secret: self.secret(),
            grant_type: "authorization_code",
            code,
            redirect_uri: &self.redirect_uri,
        };
        let request = self.form(&route, &form);
        self.execute(&route, request).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        let route = Route::new(
            Method::POST,
            build_url(&self.api_url, &["oauth2", "token"]),
            "POST:/oauth2/token",
        );
        let form = RefreshGrantForm {
            client_id: self.client_id,
            client_secret: self.secret(),
            grant_type: "refresh_token",
            refresh_token,
        };
        let request = self.form(&route, &form);
        self.execute(&route, request).await
    }

    async fn revoke_token(&self, token: &str) -> Result<(), Error> {
        let route = Route::new(
            Method::POST,
            build_url(&self.api_url, &["oauth2", "token", "revoke"]),
            "POST:/oauth2/token/revoke",
        );
        let form = RevokeForm {
            client_id: self.client_id,
            client_secret: self.secret(),
            token,
        };
        let request = self.form(&route, &form);
        self.execute_unit(&route, request).await
    }

    async fn fetch_authorization_info(
        &self,
        token: &AccessToken,
    ) -> Result<AuthorizationInfo, Error> {
        let route = Route::new(
            Method::GET,
            build_url(&self.api_url, &["oauth2", "@me"]),
            "GET:/oauth2/@me",
        );
        let request = self.bearer(&route, token);
        self.execute(&route, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new(
            80351110224678912u64,
            "secret",
            "https://example.invalid/callback",
            &["identify", "guilds"],
        )
        .unwrap()
    }

    #[test]
    fn authorize_url_uses_the_configured_scopes() {
        let url = client().authorize_url(&AuthorizeOptions::default()).unwrap();
        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(url.contains("client_id=80351110224678912"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.invalid%2Fcallback"));
        assert!(url.contains("scope=identify+guilds"));
        assert!(url.contains("response_type=code"));
        assert!(!url.contains("state="));
    }

    #[test]
    fn authorize_url_carries_state_and_prompt() {
        let url = client()
            .authorize_url(&AuthorizeOptions {
                state: Some("15773059ghq9183habn"),
                prompt: Some(Prompt::Consent),
                ..Default::default()
            })
            .unwrap();
        assert!(url.contains("state=15773059ghq9183habn"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn bot_extras_require_the_bot_scope() {
        let options = AuthorizeOptions {
            guild_id: Some(Snowflake::new(197038439483310086)),
            permissions: Some(Permissions::ADMINISTRATOR),
            disable_guild_select: Some(true),
            ..Default::default()
        };
        // Without the bot scope the extras are dropped.
        let url = client().authorize_url(&options).unwrap();
        assert!(!url.contains("guild_id="));
        assert!(!url.contains("permissions="));

        let with_bot = AuthorizeOptions {
            scopes: Some(&["bot", "identify"]),
            ..options
        };
        let url = client().authorize_url(&with_bot).unwrap();
        assert!(url.contains("scope=bot+identify"));
        assert!(url.contains("guild_id=197038439483310086"));
        assert!(url.contains("permissions=8"));
        assert!(url.contains("disable_guild_select=true"));
    }

    #[test]
    fn scope_overrides_are_validated() {
        let err = client()
            .authorize_url(&AuthorizeOptions {
                scopes: Some(&["identify", "fly_to_moon"]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("fly_to_moon")));
    }
}
