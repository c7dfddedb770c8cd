//! Bearer token material returned by the token endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::integration::IntegrationApp;
use crate::types::user::User;

/// The credential set handed back by `POST /oauth2/token`.
///
/// `issued_at` is stamped locally when the response is decoded; Discord only
/// sends a relative `expires_in`. Token strings are kept out of `Debug`
/// output so the struct can be logged safely.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    access_token: String,
    token_type: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(skip, default = "Utc::now")]
    issued_at: DateTime<Utc>,
}

impl AccessToken {
    /// The raw bearer token string.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token type, in practice always `Bearer`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// The refresh token, if the grant produced one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// The raw space-separated scope string as Discord granted it.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The granted scopes, one at a time.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    /// Lifetime in seconds, relative to `issued_at`.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Absolute expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + chrono::Duration::seconds(self.expires_in as i64)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    /// Value for the `Authorization` header, e.g. `Bearer abc123`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

/// Answer from `GET /oauth2/@me`: which application the bearer token belongs
/// to, what it may do, and until when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationInfo {
    pub application: IntegrationApp,
    pub scopes: Vec<String>,
    pub expires: DateTime<Utc>,
    /// Present only when the token carries the `identify` scope.
    #[serde(default)]
    pub user: Option<User>,
}
