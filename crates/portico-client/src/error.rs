//! Typed failures surfaced by the HTTP client and the auth API.

use portico_protocol::ProtocolError;

/// Everything that can go wrong between "issue a request" and "hand the
/// caller a usable envelope".
///
/// The `Display` strings of the HTTP-status variants are the fixed,
/// user-facing messages. The server's own message is logged, not shown.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response at all: DNS, refused connection, timeout.
    #[error("network error, please check your connection")]
    Network(String),

    /// The session is gone. The token has already been cleared and the
    /// login redirect hook has already fired by the time this is returned.
    #[error("session expired, please log in again")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("requested resource not found")]
    NotFound,

    #[error("invalid request parameters")]
    BadRequest,

    /// HTTP 500, 502 or 503.
    #[error("server error ({0}), please try again later")]
    ServerError(u16),

    /// Any other non-2xx status.
    #[error("request failed with status {0}")]
    RequestFailed(u16),

    /// A well-formed envelope whose `code` isn't success.
    #[error("{message} (code {code})")]
    Business { code: i64, message: String },

    /// A 2xx response whose body didn't decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// Maps a non-2xx HTTP status to its variant.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 | 502 | 503 => Self::ServerError(status),
            other => Self::RequestFailed(other),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(ApiError::from_status(400), ApiError::BadRequest));
        assert!(matches!(ApiError::from_status(403), ApiError::Forbidden));
        assert!(matches!(ApiError::from_status(404), ApiError::NotFound));
        assert!(matches!(ApiError::from_status(502), ApiError::ServerError(502)));
    }

    #[test]
    fn test_from_status_unknown_is_request_failed() {
        assert!(matches!(ApiError::from_status(418), ApiError::RequestFailed(418)));
        assert!(matches!(ApiError::from_status(504), ApiError::RequestFailed(504)));
    }

    #[test]
    fn test_business_display_includes_server_message() {
        let err = ApiError::Business {
            code: 400,
            message: "用户名或密码错误".into(),
        };
        assert_eq!(err.to_string(), "用户名或密码错误 (code 400)");
    }

    #[test]
    fn test_server_error_display_is_fixed() {
        assert_eq!(
            ApiError::ServerError(500).to_string(),
            "server error (500), please try again later"
        );
    }
}
