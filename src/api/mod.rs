pub mod oauth;
pub mod users;

pub use oauth::{AuthorizeOptions, OauthApi, Prompt, ResponseType, AUTHORIZE_URL};
pub use users::{AddGuildMemberOptions, UsersApi};
