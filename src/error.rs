use std::time::Duration;

use thiserror::Error;

/// A unified error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Discord rejected the credential itself: a consumed or bogus
    /// authorization code, an expired/revoked bearer token, or a token
    /// whose scopes do not cover the endpoint.
    #[error("authorization rejected (HTTP {status}, code {code}): {message}")]
    Auth {
        status: u16,
        code: i64,
        message: String,
    },

    /// Discord answered 429 anyway. `retry_after` is how long it asked us
    /// to back off, `global` marks an account-wide limit rather than a
    /// single route bucket.
    #[error("rate limited, retry after {retry_after:?} (global: {global})")]
    RateLimited {
        retry_after: Duration,
        global: bool,
    },

    /// Transport-level failure: connect, TLS, timeout, protocol.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rejected locally before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other non-success answer from Discord, with the HTTP status and
    /// the JSON error code from the body when one was present.
    #[error("API error (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// A response body that did not match the expected shape.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}
