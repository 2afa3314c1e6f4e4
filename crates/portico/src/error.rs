//! Unified error type for Portico.

use portico_client::ApiError;
use portico_protocol::ProtocolError;
use portico_router::RouterError;
use portico_session::SessionError;
use portico_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `portico` crate you deal with this single error type
/// instead of importing errors from each layer. The `#[from]` attribute on
/// each variant lets `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PorticoError {
    /// The HTTP transport couldn't be built or failed outright.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body didn't have the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A request failed (network, HTTP status, business code).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Navigation failed (no route, redirect loop).
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
