/// Errors that can occur in the transport layer.
///
/// Every variant means the same thing to callers above: no HTTP response
/// reached us. A response with a bad status code is NOT a transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, invalid header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote host could not be reached or the connection dropped.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// The response started arriving but its body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}
