//! Guild permission and user badge bitfields.
//!
//! Discord sends `permissions` as a decimal string (the value overflows
//! JavaScript numbers) and user `flags` as a plain integer. Both decoders
//! accept either form and keep bits they do not know a name for.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags::bitflags! {
    /// Permissions attached to a guild, role or channel overwrite.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const MANAGE_CHANNELS = 1 << 4;
        const MANAGE_GUILD = 1 << 5;
        const ADD_REACTIONS = 1 << 6;
        const VIEW_AUDIT_LOG = 1 << 7;
        const PRIORITY_SPEAKER = 1 << 8;
        const STREAM = 1 << 9;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        const SEND_TTS_MESSAGES = 1 << 12;
        const MANAGE_MESSAGES = 1 << 13;
        const EMBED_LINKS = 1 << 14;
        const ATTACH_FILES = 1 << 15;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const MENTION_EVERYONE = 1 << 17;
        const USE_EXTERNAL_EMOJIS = 1 << 18;
        const VIEW_GUILD_INSIGHTS = 1 << 19;
        const CONNECT = 1 << 20;
        const SPEAK = 1 << 21;
        const MUTE_MEMBERS = 1 << 22;
        const DEAFEN_MEMBERS = 1 << 23;
        const MOVE_MEMBERS = 1 << 24;
        const USE_VAD = 1 << 25;
        const CHANGE_NICKNAME = 1 << 26;
        const MANAGE_NICKNAMES = 1 << 27;
        const MANAGE_ROLES = 1 << 28;
        const MANAGE_WEBHOOKS = 1 << 29;
        const MANAGE_EMOJIS_AND_STICKERS = 1 << 30;
        const USE_APPLICATION_COMMANDS = 1 << 31;
        const REQUEST_TO_SPEAK = 1 << 32;
    }
}

bitflags::bitflags! {
    /// Badges shown on a user profile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UserFlags: u64 {
        const STAFF = 1 << 0;
        const PARTNER = 1 << 1;
        const HYPESQUAD = 1 << 2;
        const BUG_HUNTER = 1 << 3;
        const MFA_SMS = 1 << 4;
        const PREMIUM_PROMO_DISMISSED = 1 << 5;
        const HYPESQUAD_BRAVERY = 1 << 6;
        const HYPESQUAD_BRILLIANCE = 1 << 7;
        const HYPESQUAD_BALANCE = 1 << 8;
        const EARLY_SUPPORTER = 1 << 9;
        const TEAM_USER = 1 << 10;
        const SYSTEM = 1 << 12;
        const HAS_UNREAD_URGENT_MESSAGES = 1 << 13;
        const BUG_HUNTER_LEVEL_2 = 1 << 14;
        const VERIFIED_BOT = 1 << 16;
        const VERIFIED_BOT_DEVELOPER = 1 << 17;
        const CERTIFIED_MODERATOR = 1 << 18;
        const BOT_HTTP_INTERACTIONS = 1 << 19;
        const SPAMMER = 1 << 20;
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for UserFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// Sent by Discord as a decimal string, so write one back.
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(BitsVisitor("a permissions bitset as a string or integer"))
            .map(Permissions::from_bits_retain)
    }
}

impl Serialize for UserFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for UserFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(BitsVisitor("a user flags bitset as a string or integer"))
            .map(UserFlags::from_bits_retain)
    }
}

struct BitsVisitor(&'static str);

impl<'de> serde::de::Visitor<'de> for BitsVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.0)
    }

    fn visit_u64<E>(self, value: u64) -> Result<u64, E>
    where
        E: serde::de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> Result<u64, E>
    where
        E: serde::de::Error,
    {
        u64::try_from(value).map_err(|_| serde::de::Error::custom("bitset cannot be negative"))
    }

    fn visit_str<E>(self, value: &str) -> Result<u64, E>
    where
        E: serde::de::Error,
    {
        value
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("invalid bitset string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_is_pure_and_idempotent() {
        let bits = (Permissions::ADMINISTRATOR | Permissions::SEND_MESSAGES).bits();
        let first = Permissions::from_bits_retain(bits);
        let second = Permissions::from_bits_retain(bits);
        assert_eq!(first, second);
        assert_eq!(first.bits(), bits);
    }

    #[test]
    fn zero_decodes_to_no_flags() {
        assert_eq!(Permissions::from_bits_retain(0), Permissions::empty());
        assert_eq!(UserFlags::from_bits_retain(0), UserFlags::empty());
        assert!(!Permissions::from_bits_retain(0).contains(Permissions::KICK_MEMBERS));
    }

    #[test]
    fn permissions_deserialize_from_string_or_number() {
        let from_str: Permissions = serde_json::from_str("\"2048\"").unwrap();
        let from_num: Permissions = serde_json::from_str("2048").unwrap();
        assert_eq!(from_str, Permissions::SEND_MESSAGES);
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn permissions_serialize_to_decimal_string() {
        let perms = Permissions::CONNECT | Permissions::SPEAK;
        assert_eq!(
            serde_json::to_string(&perms).unwrap(),
            format!("\"{}\"", perms.bits())
        );
    }

    #[test]
    fn unknown_bits_survive_a_roundtrip() {
        let raw = Permissions::REQUEST_TO_SPEAK.bits() | (1 << 40);
        let perms = Permissions::from_bits_retain(raw);
        assert!(perms.contains(Permissions::REQUEST_TO_SPEAK));
        assert_eq!(perms.bits(), raw);
    }

    #[test]
    fn user_flags_decode_known_badges() {
        let flags: UserFlags = serde_json::from_str("131712").unwrap();
        assert!(flags.contains(UserFlags::HYPESQUAD_BRILLIANCE));
        assert!(flags.contains(UserFlags::EARLY_SUPPORTER));
        assert!(flags.contains(UserFlags::VERIFIED_BOT_DEVELOPER));
        assert!(!flags.contains(UserFlags::STAFF));
    }

    #[test]
    fn user_flags_serialize_as_number() {
        assert_eq!(serde_json::to_string(&UserFlags::STAFF).unwrap(), "1");
    }
}
