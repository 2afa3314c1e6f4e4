//! `Portico` builder and application context.
//!
//! This ties the layers together: transport → client → session → router.
//! One `Portico` is one signed-in (or not) client. It has an explicit
//! lifecycle:
//!
//! ```text
//! PorticoBuilder::build() ──→ start() ──→ navigate() / session() ... ──→ shutdown()
//!                               │                                          │
//!                  initialize + spawn refresher                   stop refresher
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use portico_client::{
    ApiClient, AuthApi, CookieJar, FileStore, KeyValueStore, LoginRedirect, MemoryStore,
    TokenStorage, TokenStore,
};
use portico_router::{Navigation, Router};
use portico_session::{RefreshHandle, SessionSnapshot, SessionStore, refresh};
use portico_transport::{ReqwestTransport, Transport};

use crate::{PorticoConfig, PorticoError};

/// Records the login redirect the HTTP client requests on 401, for the
/// application to act on later.
#[derive(Debug, Default)]
pub struct PendingRedirect {
    target: Mutex<Option<String>>,
}

impl PendingRedirect {
    /// Removes and returns the pending redirect, if any.
    pub fn take(&self) -> Option<String> {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl LoginRedirect for PendingRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::info!(login_path, "login redirect pending");
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(login_path.to_owned());
    }
}

/// Builder for a [`Portico`] context.
///
/// # Example
///
/// ```rust,no_run
/// use portico::prelude::*;
///
/// # async fn run() -> Result<(), PorticoError> {
/// let mut app = Portico::builder()
///     .config(PorticoConfig::from_env()?)
///     .build()?;
/// app.start().await;
/// let nav = app.navigate("/profile").await?;
/// println!("landed on {}", nav.route.name);
/// app.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PorticoBuilder {
    config: PorticoConfig,
    tokens: Option<Arc<dyn TokenStore>>,
    cookie_header: Option<String>,
    router: Option<Router>,
}

impl PorticoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PorticoConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses this token store instead of the one the config describes.
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Seeds the cookie fallback from a `Cookie:` header value.
    pub fn cookies(mut self, header: impl Into<String>) -> Self {
        self.cookie_header = Some(header.into());
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Builds a context that talks HTTP through `reqwest`.
    ///
    /// # Errors
    /// [`PorticoError::Transport`] if the HTTP client can't be created.
    pub fn build(self) -> Result<Portico<ReqwestTransport>, PorticoError> {
        let transport = ReqwestTransport::new(self.config.timeout)?;
        Ok(self.build_with_transport(transport))
    }

    /// Builds a context on a caller-provided transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Portico<T> {
        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => default_tokens(&self.config, self.cookie_header.as_deref()),
        };
        let redirect = Arc::new(PendingRedirect::default());
        let client = ApiClient::new(transport, tokens, self.config.client_config())
            .with_redirect(redirect.clone());
        let session = Arc::new(SessionStore::new(AuthApi::new(client)));

        tracing::debug!(api_base = %self.config.api_base, "portico context built");
        Portico {
            session,
            router: self.router.unwrap_or_default(),
            redirect,
            config: self.config,
            refresher: None,
        }
    }
}

fn default_tokens(config: &PorticoConfig, cookies: Option<&str>) -> Arc<dyn TokenStore> {
    let jar = cookies.map_or_else(CookieJar::new, CookieJar::from_header);
    match &config.token_file {
        Some(path) => with_names(FileStore::open(path.clone()), jar, config),
        None => with_names(MemoryStore::new(), jar, config),
    }
}

fn with_names<P: KeyValueStore>(
    primary: P,
    jar: CookieJar,
    config: &PorticoConfig,
) -> Arc<dyn TokenStore> {
    Arc::new(
        TokenStorage::new(primary, jar)
            .with_key(config.token_key.clone())
            .with_cookie_name(config.token_cookie.clone()),
    )
}

/// A running client: session store, router, and forced-redirect slot.
pub struct Portico<T> {
    session: Arc<SessionStore<T>>,
    router: Router,
    redirect: Arc<PendingRedirect>,
    config: PorticoConfig,
    refresher: Option<RefreshHandle>,
}

impl Portico<ReqwestTransport> {
    pub fn builder() -> PorticoBuilder {
        PorticoBuilder::new()
    }
}

impl<T: Transport> Portico<T> {
    /// Resolves the session and, if configured, starts background refresh.
    /// Calling it again only re-reads the (already resolved) state.
    pub async fn start(&mut self) -> SessionSnapshot {
        let snapshot = self.session.initialize().await;
        if self.refresher.is_none() {
            if let Some(config) = &self.config.refresh {
                self.refresher = Some(refresh::spawn(self.session.clone(), config.clone()));
            }
        }
        tracing::info!(logged_in = snapshot.is_logged_in(), "portico started");
        snapshot
    }

    /// Stops background work. The stored token is kept, so the next
    /// context built on the same store picks the session up again.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.refresher.take() {
            handle.stop().await;
        }
        tracing::info!("portico shut down");
    }

    pub fn session(&self) -> &Arc<SessionStore<T>> {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &PorticoConfig {
        &self.config
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Navigates through the guard. See [`Router::navigate`].
    pub async fn navigate(&self, path: &str) -> Result<Navigation, PorticoError> {
        Ok(self.router.navigate(path, &self.session).await?)
    }

    /// The login route a 401 asked for, if one is pending. Taking it
    /// clears it.
    pub fn take_forced_redirect(&self) -> Option<String> {
        self.redirect.take()
    }

    /// Navigates to the pending forced redirect, if there is one.
    ///
    /// A forced redirect means the server dropped the session, so the
    /// store is cleared first, the way a full page load would reset it.
    pub async fn follow_forced_redirect(&self) -> Option<Result<Navigation, PorticoError>> {
        let target = self.take_forced_redirect()?;
        self.session.clear();
        Some(self.navigate(&target).await)
    }
}
