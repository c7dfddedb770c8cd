//! Discord OAuth2 HTTP client.
//!
//! The client supports an **optional HTTP proxy** used for all requests.
//! Supported proxy formats:
//! * `http://USERNAME:PASSWORD@IP:PORT`
//! * `http://IP:PORT` *(user / password omitted)*

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Proxy, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::ratelimit::{RateLimitHeaders, RateLimiter};
use crate::scopes;
use crate::types::error_types::ErrorBody;
use crate::types::snowflake::Snowflake;
use crate::types::token::AccessToken;

/// Discord REST API v10.
pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";

const USER_AGENT: &str = concat!("discord_oauth2/", env!("CARGO_PKG_VERSION"));

/// One application's view of the Discord OAuth2 API.
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate
/// limiter, so budgets stay consistent across clones.
#[derive(Clone)]
pub struct Client {
    // Public configuration
    pub client_id: Snowflake,
    pub redirect_uri: String,
    /// Scopes requested by default when building authorize URLs.
    pub scopes: Vec<String>,
    pub api_url: String,
    /// Optional HTTP proxy, in the formats described at the top of this file.
    pub proxy: Option<String>,

    // Internal plumbing
    client_secret: String,
    pub(crate) http: reqwest::Client,
    pub(crate) limiter: Arc<RateLimiter>,
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("api_url", &self.api_url)
            .field("proxy", &self.proxy)
            .field("client_secret", &"<redacted>")
            .field("http", &"reqwest::Client")
            .finish()
    }
}

impl Client {
    /// Constructs a client with default settings; [`Client::builder`] has
    /// the remaining knobs.
    ///
    /// Fails with [`Error::Validation`] when a scope is outside the known
    /// vocabulary or the redirect URI is not an absolute URL.
    pub fn new(
        client_id: impl Into<Snowflake>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: &[&str],
    ) -> Result<Self, Error> {
        Self::builder(client_id, client_secret, redirect_uri, scopes).build()
    }

    pub fn builder(
        client_id: impl Into<Snowflake>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: &[&str],
    ) -> ClientBuilder {
        ClientBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            api_url: DEFAULT_API_URL.to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.client_secret
    }

    /// The configured scopes as the space-separated wire form.
    pub(crate) fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    // Request skeletons. Routes know their URL and the key their budget
    // is tracked under; these only attach authorization.

    pub(crate) fn bearer(&self, route: &Route, token: &AccessToken) -> RequestBuilder {
        self.http
            .request(route.method.clone(), &route.url)
            .header(AUTHORIZATION, token.authorization_header())
    }

    /// Bot authorization. The token is accepted with or without the
    /// `Bot ` prefix.
    pub(crate) fn bot(&self, route: &Route, bot_token: &str) -> RequestBuilder {
        let token = bot_token.strip_prefix("Bot ").unwrap_or(bot_token);
        self.http
            .request(route.method.clone(), &route.url)
            .header(AUTHORIZATION, format!("Bot {token}"))
    }

    /// Form-encoded skeleton for the OAuth2 token endpoints.
    pub(crate) fn form<T: serde::Serialize>(&self, route: &Route, form: &T) -> RequestBuilder {
        self.http
            .request(route.method.clone(), &route.url)
            .form(form)
    }

    /// Claims local budget, sends, and feeds the response headers back
    /// into the limiter.
    async fn dispatch(&self, route: &Route, request: RequestBuilder) -> Result<Response, Error> {
        let claim = self.limiter.acquire(&route.key).await;
        debug!(method = %route.method, url = %route.url, "sending request");
        let response = request.send().await?;
        let limits = RateLimitHeaders::parse(response.headers());
        self.limiter.release(&route.key, claim, &limits).await;
        debug!(
            method = %route.method,
            url = %route.url,
            status = response.status().as_u16(),
            "response received"
        );
        if limits.is_exhausted() && response.status().is_success() {
            debug!(route = %route.key, "route budget exhausted until reset");
        }
        Ok(response)
    }

    /// Maps a non-success response onto the error taxonomy, folding 429
    /// penalties back into the limiter.
    async fn consume_error(&self, route: &Route, response: Response) -> Error {
        let status = response.status().as_u16();
        let headers = RateLimitHeaders::parse(response.headers());
        let bytes = response.bytes().await.unwrap_or_default();
        let body = ErrorBody::from_bytes(&bytes);

        if status == 429 {
            // The body carries fractional seconds, the header whole ones.
            let retry_after = body
                .retry_after
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .or(headers.retry_after)
                .unwrap_or(Duration::from_secs(1));
            let global = body.global.unwrap_or(headers.global);
            warn!(
                route = %route.key,
                retry_ms = retry_after.as_millis() as u64,
                global,
                "request was rate limited"
            );
            self.limiter.penalize(&route.key, retry_after, global).await;
            return Error::RateLimited {
                retry_after,
                global,
            };
        }

        body.into_error(status)
    }

    pub(crate) async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        route: &Route,
        request: RequestBuilder,
    ) -> Result<T, Error> {
        let response = self.dispatch(route, request).await?;
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.consume_error(route, response).await)
        }
    }

    /// Like [`Client::execute`] for endpoints that answer without a body.
    pub(crate) async fn execute_unit(
        &self,
        route: &Route,
        request: RequestBuilder,
    ) -> Result<(), Error> {
        let response = self.dispatch(route, request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.consume_error(route, response).await)
        }
    }

    /// Like [`Client::execute`] for endpoints where 204 or an empty body
    /// means "nothing new" rather than an error.
    pub(crate) async fn execute_optional<T: serde::de::DeserializeOwned>(
        &self,
        route: &Route,
        request: RequestBuilder,
    ) -> Result<Option<T>, Error> {
        let response = self.dispatch(route, request).await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }
        Err(self.consume_error(route, response).await)
    }
}

/// One concrete request target plus the key its budget is tracked under.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) key: String,
}

impl Route {
    pub(crate) fn new(method: Method, url: String, key: impl Into<String>) -> Self {
        Self {
            method,
            url,
            key: key.into(),
        }
    }
}

/// Builder for [`Client`]; obtained from [`Client::builder`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client_id: Snowflake,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    api_url: String,
    proxy: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl ClientBuilder {
    /// Overrides the API base URL. Mostly useful to point at a test server.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the user agent sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration and builds the client.
    pub fn build(self) -> Result<Client, Error> {
        scopes::validate(self.scopes.iter().map(String::as_str))?;
        Url::parse(&self.redirect_uri).map_err(|e| {
            Error::Validation(format!(
                "invalid redirect_uri `{}`: {e}",
                self.redirect_uri
            ))
        })?;

        let mut builder = reqwest::ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .use_rustls_tls();

        if let Some(ref p) = self.proxy {
            let full = if p.starts_with("http://") || p.starts_with("https://") {
                p.clone()
            } else {
                format!("http://{p}")
            };
            let proxy = Proxy::all(&full)
                .map_err(|e| Error::Validation(format!("invalid proxy URL `{full}`: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder.build()?;

        Ok(Client {
            client_id: self.client_id,
            redirect_uri: self.redirect_uri,
            scopes: self.scopes,
            api_url: self.api_url,
            proxy: self.proxy,
            client_secret: self.client_secret,
            http,
            limiter: Arc::new(RateLimiter::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_known_scopes() {
        let client = Client::new(
            80351110224678912u64,
            "secret",
            "https://example.invalid/callback",
            &["identify", "guilds"],
        )
        .unwrap();
        assert_eq!(client.api_url, DEFAULT_API_URL);
        assert_eq!(client.scope_string(), "identify guilds");
    }

    #[test]
    fn rejects_unknown_scopes_at_construction() {
        let err = Client::new(
            80351110224678912u64,
            "secret",
            "https://example.invalid/callback",
            &["identify", "fly_to_moon"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("fly_to_moon")));
    }

    #[test]
    fn rejects_a_relative_redirect_uri() {
        let err = Client::new(1u64, "secret", "/callback", &["identify"]).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("redirect_uri")));
    }

    #[test]
    fn schemeless_proxies_get_a_scheme() {
        let client = Client::builder(
            1u64,
            "secret",
            "https://example.invalid/callback",
            &["identify"],
        )
        .proxy("127.0.0.1:8080")
        .build()
        .unwrap();
        assert_eq!(client.proxy.as_deref(), Some("127.0.0.1:8080"));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let client = Client::new(
            1u64,
            "super-secret-value",
            "https://example.invalid/callback",
            &["identify"],
        )
        .unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn clones_share_the_limiter() {
        let client = Client::new(
            1u64,
            "secret",
            "https://example.invalid/callback",
            &["identify"],
        )
        .unwrap();
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.limiter, &clone.limiter));
    }
}
