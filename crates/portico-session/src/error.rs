//! Error types for the session layer.

use portico_client::ApiError;

/// Errors returned by [`SessionStore`](crate::SessionStore) operations.
///
/// By the time one of these reaches the caller the store has already
/// applied its reset policy for that operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a bearer token and there isn't one.
    #[error("no session token is stored")]
    MissingToken,
}

impl SessionError {
    /// `true` when the server reported the session as expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}
