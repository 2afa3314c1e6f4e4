//! Wire types for Portico.
//!
//! This crate defines the "language" the client and backend speak:
//!
//! - **Envelope** ([`Envelope`]): the `{code, message, data}` wrapper
//!   around every response.
//! - **Types** ([`UserInfo`], [`PermissionLevel`], [`SessionStatus`]):
//!   the identity data the session layer works with.
//! - **Payloads** ([`LoginRequest`], [`LoginResponse`], ...): per-endpoint
//!   request bodies and response `data`.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes ↔ types.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope, UserInfo) → Client (ApiError) → Session
//! ```
//!
//! Field-name variations (`isLoggedIn` vs `is_authenticated`, camelCase vs
//! snake_case) are resolved here, at decode time.

mod codec;
mod envelope;
mod error;
mod payloads;
mod types;

pub use codec::{Codec, JsonCodec};
pub use envelope::{Envelope, SUCCESS_CODE, UNAUTHORIZED_CODE};
pub use error::ProtocolError;
pub use payloads::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshResponse,
    RegisterRequest, RegisterResponse, UserSession, ValidateRequest,
    ValidateResponse,
};
pub use types::{
    PermissionLevel, SessionMeta, SessionStatus, UserId, UserInfo, UserPatch,
};
