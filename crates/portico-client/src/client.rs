//! The envelope-aware HTTP client.
//!
//! [`ApiClient`] sits between the typed [`AuthApi`](crate::AuthApi) and a
//! raw [`Transport`]. For every request it:
//!
//! 1. Builds the URL: `base_url + api_prefix + path`.
//! 2. Attaches `Authorization: Bearer <token>` if the token store has one.
//! 3. Sends, and turns "no response" into [`ApiError::Network`].
//! 4. Handles 401 globally: clears the token, fires the login redirect,
//!    fails with [`ApiError::Unauthorized`].
//! 5. Maps other non-2xx statuses to their fixed [`ApiError`] variants.
//! 6. Decodes the body as an [`Envelope`] and returns it untouched.
//!
//! A non-200 `code` other than 401 is NOT an error at this layer. The
//! auth API decides what a business failure means for each endpoint.

use std::sync::Arc;

use portico_protocol::{Codec, Envelope, JsonCodec, UNAUTHORIZED_CODE};
use portico_transport::{HttpRequest, Method, Transport};
use serde::Serialize;

use crate::{ApiError, TokenStore};

/// Default route the redirect hook is pointed at.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Side effect fired when the server reports the session as gone.
///
/// In a browser this would be a full-page navigation. Here it is whatever
/// the embedding application wants: record it, navigate a router, exit.
pub trait LoginRedirect: Send + Sync + 'static {
    fn redirect_to_login(&self, login_path: &str);
}

/// A [`LoginRedirect`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRedirect;

impl LoginRedirect for NoRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::debug!(login_path, "login redirect requested, no handler installed");
    }
}

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme + host (+ port), without a trailing slash.
    pub base_url: String,
    /// Path prefix between the base URL and every endpoint. May be empty.
    pub api_prefix: String,
    /// Route handed to [`LoginRedirect`] on 401.
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            api_prefix: "/api".to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Full URL for an endpoint path such as `/auth/login`.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_end_matches('/');
        let prefix_sep = if prefix.is_empty() || prefix.starts_with('/') { "" } else { "/" };
        let path_sep = if path.starts_with('/') { "" } else { "/" };
        format!("{base}{prefix_sep}{prefix}{path_sep}{path}")
    }
}

/// Sends requests and applies the global response policy.
pub struct ApiClient<T> {
    transport: T,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
    config: ClientConfig,
    codec: JsonCodec,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, tokens: Arc<dyn TokenStore>, config: ClientConfig) -> Self {
        Self {
            transport,
            tokens,
            redirect: Arc::new(NoRedirect),
            config,
            codec: JsonCodec,
        }
    }

    /// Installs the hook fired on 401.
    pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::Get, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope, ApiError> {
        self.request(Method::Post, path, Some(body)).await
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::Post, path, None).await
    }

    /// Sends one request and applies the response policy described in the
    /// module docs.
    ///
    /// # Errors
    /// See [`ApiError`]. A returned `Ok` envelope may still carry a
    /// non-success `code`.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope, ApiError> {
        let url = self.config.url(path);
        let mut request =
            HttpRequest::new(method, url).with_header("Accept", self.codec.content_type());

        if let Some(body) = body {
            let bytes = self.codec.encode(body)?;
            request = request
                .with_header("Content-Type", self.codec.content_type())
                .with_body(bytes);
        }
        if let Some(token) = self.tokens.get() {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }

        let id = request.id;
        tracing::debug!(%id, %method, path, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%id, path, error = %e, "no response from server");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status;
        let decoded: Result<Envelope, _> = self.codec.decode(&response.body);

        let envelope_unauthorized = matches!(&decoded, Ok(env) if env.code == UNAUTHORIZED_CODE);
        if envelope_unauthorized || status == 401 {
            return Err(self.session_expired(path));
        }

        if !response.is_success() {
            let server_message = decoded.as_ref().map(|env| env.message.as_str()).unwrap_or("");
            tracing::warn!(%id, path, status, server_message, "request failed");
            return Err(ApiError::from_status(status));
        }

        let envelope = decoded.map_err(|e| {
            tracing::warn!(%id, path, status, error = %e, "undecodable response body");
            ApiError::Protocol(e)
        })?;
        tracing::debug!(%id, path, status, code = envelope.code, "response received");
        Ok(envelope)
    }

    fn session_expired(&self, path: &str) -> ApiError {
        tracing::info!(path, "session expired, clearing token");
        self.tokens.clear();
        self.redirect.redirect_to_login(&self.config.login_path);
        ApiError::Unauthorized
    }
}
