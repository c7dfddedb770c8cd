mod client;

pub use client::{Client, ClientBuilder, DEFAULT_API_URL};

pub(crate) use client::Route;

pub use crate::{
    api::{oauth::OauthApi, users::UsersApi},
    error::Error,
};
