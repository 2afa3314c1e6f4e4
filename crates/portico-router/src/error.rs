//! Error types for the routing layer.

/// Errors that can occur while navigating.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Guard redirects kept bouncing. Usually a table where the login or
    /// home route is itself guarded.
    #[error("too many redirects navigating to {path} ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },

    /// No route matched. The standard table has a catch-all, so this only
    /// happens with a custom table.
    #[error("no route matches {0}")]
    NoMatch(String),
}
