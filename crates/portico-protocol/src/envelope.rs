//! The `{code, message, data}` wrapper every backend response uses.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ code: 200                    │  ← business status (200 = success)
//! │ message: "登录成功"           │  ← human-readable, may be localized
//! │ ┌──────────────────────────┐ │
//! │ │ data: { token, user, … } │ │  ← endpoint-specific payload
//! │ └──────────────────────────┘ │
//! └──────────────────────────────┘
//! ```
//!
//! The HTTP status and `code` usually agree, but callers must look at
//! `code`: a 2xx response can still carry a business failure.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// Envelope `code` meaning "the operation succeeded".
pub const SUCCESS_CODE: i64 = 200;

/// Envelope `code` meaning "your session is gone". Triggers the global
/// clear-token-and-redirect path in the client.
pub const UNAUTHORIZED_CODE: i64 = 401;

/// A response envelope.
///
/// `T` defaults to [`serde_json::Value`]: the client decodes the outer
/// envelope first, and only decodes `data` into a concrete type once it
/// knows the call succeeded (failure envelopes carry `{}` or `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Returns `true` when `code` is [`SUCCESS_CODE`].
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns `true` when `code` is [`UNAUTHORIZED_CODE`].
    pub fn is_unauthorized(&self) -> bool {
        self.code == UNAUTHORIZED_CODE
    }
}

impl Envelope<Value> {
    /// Builds a success envelope around `data`.
    pub fn success(data: Value) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "ok".to_owned(),
            data,
        }
    }

    /// Builds a failure envelope with an empty payload.
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Object(serde_json::Map::new()),
        }
    }

    /// Decodes `data` into `D`, keeping `code` and `message`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if `data` does not match `D`.
    pub fn decode<D: DeserializeOwned>(
        self,
    ) -> Result<Envelope<D>, ProtocolError> {
        let data = serde_json::from_value(self.data)
            .map_err(ProtocolError::Decode)?;
        Ok(Envelope {
            code: self.code,
            message: self.message,
            data,
        })
    }
}
