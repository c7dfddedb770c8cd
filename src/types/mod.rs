pub mod connection;
pub mod error_types;
pub mod flags;
pub mod guild;
pub mod integration;
pub mod member;
pub mod snowflake;
pub mod token;
pub mod user;

// Re-export the main types commonly used
pub use connection::{Connection, Visibility};
pub use error_types::ErrorBody;
pub use flags::{Permissions, UserFlags};
pub use guild::Guild;
pub use integration::{ExpireBehavior, IntegrationAccount, IntegrationApp, ServerIntegration};
pub use member::Member;
pub use snowflake::Snowflake;
pub use token::{AccessToken, AuthorizationInfo};
pub use user::{PremiumType, User};
