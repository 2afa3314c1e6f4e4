//! Session state for Portico.
//!
//! This crate owns the answer to "who is signed in right now?":
//!
//! 1. **State**: [`SessionState`] and the observable [`SessionSnapshot`]
//! 2. **Store**: [`SessionStore`], the state machine driven by the auth API
//! 3. **Refresh**: an optional background task keeping the server session
//!    alive ([`refresh::spawn`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← reads snapshots, asks the store to initialize
//!     ↕
//! Session Layer (this crate)  ← login / logout / fetch, publishes snapshots
//!     ↕
//! Client Layer (below)  ← AuthApi, TokenStore, ApiError
//! ```

pub mod refresh;

mod error;
mod state;
mod store;

pub use error::SessionError;
pub use refresh::{RefreshConfig, RefreshHandle};
pub use state::{SessionSnapshot, SessionState};
pub use store::{LogoutOutcome, SessionStore};
