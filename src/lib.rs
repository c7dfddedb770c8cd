//! # Discord OAuth2
//!
//! This library provides an asynchronous, typed Rust client for the
//! Discord OAuth2 API. It uses `tokio` for the async runtime and
//! `reqwest` for HTTP, covers the authorization-code flow (exchange,
//! refresh, revoke, introspection) and the identity resources a bearer
//! token unlocks, and rate-limits itself from Discord's `X-RateLimit-*`
//! response headers so callers never have to handle a 429 themselves.
//!
//! ```no_run
//! use discord_oauth2::{Client, OauthApi, UsersApi};
//!
//! # async fn run() -> Result<(), discord_oauth2::Error> {
//! let client = Client::new(
//!     80351110224678912u64,
//!     "client-secret",
//!     "https://my.app/callback",
//!     &["identify", "guilds"],
//! )?;
//! let token = client.exchange_code("code-from-the-redirect").await?;
//! let user = client.fetch_user(&token).await?;
//! println!("authorized as {user}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod ratelimit;
pub mod scopes;
pub mod types;
pub mod util;

pub use api::*;
pub use client::*;
pub use error::Error;
pub use types::*;
