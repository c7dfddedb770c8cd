//! OAuth2 scope vocabulary and local validation.

use crate::error::Error;

/// Every scope Discord's OAuth2 endpoints currently accept.
pub const KNOWN_SCOPES: &[&str] = &[
    "activities.read",
    "activities.write",
    "applications.builds.read",
    "applications.builds.upload",
    "applications.commands",
    "applications.commands.update",
    "applications.commands.permissions.update",
    "applications.entitlements",
    "applications.store.update",
    "bot",
    "connections",
    "dm_channels.read",
    "email",
    "gdm.join",
    "guilds",
    "guilds.join",
    "guilds.members.read",
    "identify",
    "messages.read",
    "relationships.read",
    "role_connections.write",
    "rpc",
    "rpc.activities.write",
    "rpc.notifications.read",
    "rpc.voice.read",
    "rpc.voice.write",
    "voice",
    "webhook.incoming",
];

pub fn is_known(scope: &str) -> bool {
    KNOWN_SCOPES.contains(&scope)
}

/// Checks every requested scope against the known vocabulary, so typos are
/// caught locally instead of surfacing as a confusing redirect error.
pub fn validate<'a, I>(scopes: I) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a str>,
{
    for scope in scopes {
        if !is_known(scope) {
            return Err(Error::Validation(format!(
                "unknown OAuth2 scope `{scope}`"
            )));
        }
    }
    Ok(())
}
