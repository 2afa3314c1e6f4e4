//! HTTP-facing half of Portico: where the token lives, how requests are
//! sent, and what the auth endpoints return.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← calls AuthApi, reacts to ApiError
//!     ↕
//! Client Layer (this crate)
//!   AuthApi     typed endpoints, business-code check
//!   ApiClient   URL building, bearer header, global 401 policy
//!   TokenStore  get / set / clear the bearer token
//!     ↕
//! Transport + Protocol (below)
//! ```

mod api;
mod client;
mod error;
mod token;

pub use api::AuthApi;
pub use client::{ApiClient, ClientConfig, DEFAULT_LOGIN_PATH, LoginRedirect, NoRedirect};
pub use error::ApiError;
pub use token::{
    CookieJar, DEFAULT_TOKEN_KEY, FileStore, KeyValueStore, MemoryStore, TokenStorage, TokenStore,
};

/// Endpoint paths, relative to `base_url + api_prefix`.
pub mod endpoints {
    pub use crate::api::{
        LOGIN, LOGOUT, REFRESH, REGISTER, STATUS, USER_INFO, USER_SESSION, VALIDATE,
    };
}
