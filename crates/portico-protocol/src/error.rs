//! Error types for the protocol layer.
//!
//! Each Portico crate defines its own error enum. A `ProtocolError` always
//! means "the bytes did not have the shape we expected", never "the server
//! said no".

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a non-JSON error page from a proxy, missing required
    /// fields, or a `data` payload that doesn't match the endpoint.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule, e.g. a permission
    /// level outside `0..=4`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
