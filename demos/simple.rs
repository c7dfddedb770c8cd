//! Minimal end-to-end flow: exchange a code from the redirect, then look
//! at who authorized us.
//!
//! ```sh
//! cargo run --example simple
//! ```

use discord_oauth2::{Client, OauthApi, UsersApi};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Client::new(
        123456789012345678u64, // my client id here
        "client_secret_here",
        "https://my.app/callback",
        &["identify", "guilds", "email", "connections"],
    )?;

    // Exchange a code received on the redirect callback.
    let token = client.exchange_code("my_code").await?;

    // Fetch the user's information with the access token.
    let user = client.fetch_user(&token).await?;

    // Fetch the user's connections.
    let connections = user.fetch_connections(&client, &token).await?;

    // Fetch guilds that the user is a member of.
    let guilds = user.fetch_guilds(&client, &token).await?;

    println!("{user} | {} connections", connections.len());

    for guild in &guilds {
        println!("`{}` member of {guild}", user.username);
    }

    Ok(())
}
