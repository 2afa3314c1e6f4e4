//! # Portico
//!
//! Client-side session and route-guard toolkit for backends that wrap
//! every response in a `{code, message, data}` envelope.
//!
//! Portico keeps track of who is signed in, talks to the auth endpoints,
//! and decides where a navigation may go. The layers:
//!
//! ```text
//! portico (this crate)  config, app context, unified error
//!   ├─ portico-router     route table, guard, navigate
//!   ├─ portico-session    SessionStore state machine, refresher
//!   ├─ portico-client     TokenStore, ApiClient, AuthApi
//!   ├─ portico-protocol   envelope and payload types
//!   └─ portico-transport  HTTP exchange (reqwest)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portico::prelude::*;
//!
//! # async fn run() -> Result<(), PorticoError> {
//! portico::init_tracing();
//!
//! let mut app = Portico::builder().config(PorticoConfig::from_env()?).build()?;
//! app.start().await;
//!
//! app.session().login("admin", "admin123").await?;
//! let nav = app.navigate("/admin").await?;
//! assert_eq!(nav.route.name, "admin");
//!
//! app.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;

pub use app::{PendingRedirect, Portico, PorticoBuilder};
pub use config::{DEFAULT_API_BASE, DEFAULT_API_PREFIX, DEFAULT_TIMEOUT_MS, PorticoConfig};
pub use error::PorticoError;

pub use portico_client as client;
pub use portico_protocol as protocol;
pub use portico_router as router;
pub use portico_session as session;
pub use portico_transport as transport;

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` (default
/// `info`).
///
/// Returns `false` if a global subscriber was already set, in which case
/// nothing changes.
pub fn init_tracing() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

pub mod prelude {
    pub use crate::{Portico, PorticoBuilder, PorticoConfig, PorticoError};
    pub use portico_client::{ApiError, TokenStore};
    pub use portico_protocol::{PermissionLevel, UserInfo, UserPatch};
    pub use portico_router::{Decision, Navigation, Router};
    pub use portico_session::{LogoutOutcome, SessionSnapshot, SessionState};
}
