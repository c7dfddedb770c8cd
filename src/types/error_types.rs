use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Discord error bodies come in two dialects. REST endpoints answer with
/// `{"code": 50025, "message": "Invalid OAuth2 access token"}` while the
/// OAuth2 token endpoints answer RFC 6749 style with
/// `{"error": "invalid_grant", "error_description": "..."}`. The 429 body
/// adds `retry_after` and `global`. One struct covers all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    /// Seconds to wait, fractional, only on 429 bodies.
    #[serde(default)]
    pub retry_after: Option<f64>,
    #[serde(default)]
    pub global: Option<bool>,
}

impl ErrorBody {
    /// Best-effort decode. A non-JSON or empty body maps to the default
    /// (everything `None`) so error mapping never fails itself.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// The most specific human-readable description available.
    pub fn describe(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "no error description provided".to_string())
    }

    /// Whether this is an OAuth2-dialect error (credential problem) as
    /// opposed to a generic REST error.
    pub fn is_oauth_error(&self) -> bool {
        self.error.is_some()
    }

    /// Maps a non-success response body onto the library error taxonomy.
    /// 429 is handled by the caller, which also knows the local bucket.
    pub fn into_error(self, status: u16) -> Error {
        let code = self.code.unwrap_or(0);
        let message = self.describe();
        if status == 401 || status == 403 || self.is_oauth_error() {
            Error::Auth {
                status,
                code,
                message,
            }
        } else {
            Error::Api {
                status,
                code,
                message,
            }
        }
    }
}
