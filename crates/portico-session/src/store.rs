//! The session store: the single source of truth for "who is signed in".
//!
//! Every operation that talks to the server goes through one async gate,
//! so operations on a store run one at a time in the order they were
//! called. While an operation holds the gate the snapshot's `is_loading`
//! flag is `true`.
//!
//! Reset policy per operation (what happens to local state on failure):
//!
//! | operation          | on failure                              |
//! |--------------------|-----------------------------------------|
//! | `initialize`       | `Anonymous`, token cleared, no error    |
//! | `login`            | `Anonymous`, error returned             |
//! | `logout`           | local state cleared anyway, never fails |
//! | `fetch_user_info`  | unchanged, error returned               |
//! | `fetch_session`    | cleared, error returned                 |
//! | `refresh`          | cleared on 401 only, error returned     |

use std::sync::Arc;

use portico_client::{ApiError, AuthApi, TokenStore};
use portico_protocol::{RefreshResponse, SessionStatus, UserInfo, UserPatch};
use portico_transport::Transport;
use tokio::sync::{Mutex, MutexGuard, watch};

use crate::{SessionError, SessionSnapshot, SessionState};

/// What `logout` managed to do.
///
/// Local state is always cleared. This only says whether the server
/// acknowledged it too.
#[derive(Debug)]
pub enum LogoutOutcome {
    /// The server ended the session.
    Confirmed,
    /// The server call failed; only the local session was cleared.
    LocalOnly(ApiError),
}

impl LogoutOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Holds the gate for one operation and keeps `is_loading` honest.
///
/// Dropping it without [`finish`](Self::finish) (early return, error,
/// cancelled future) still turns the loading flag off.
struct Operation<'a> {
    _gate: MutexGuard<'a, ()>,
    state: &'a watch::Sender<SessionSnapshot>,
}

impl Operation<'_> {
    fn finish(self, next: SessionState) {
        self.state.send_modify(|snap| {
            snap.state = next;
            snap.is_loading = false;
        });
    }
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        self.state
            .send_if_modified(|snap| std::mem::replace(&mut snap.is_loading, false));
    }
}

/// Observable session state backed by the auth API.
///
/// Share it with `Arc`. Read it with [`snapshot`](Self::snapshot) or watch
/// it with [`subscribe`](Self::subscribe).
pub struct SessionStore<T> {
    api: AuthApi<T>,
    state: watch::Sender<SessionSnapshot>,
    ops: Mutex<()>,
}

impl<T: Transport> SessionStore<T> {
    pub fn new(api: AuthApi<T>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            api,
            state,
            ops: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &AuthApi<T> {
        &self.api
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.api.client().tokens()
    }

    /// The current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver that sees every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    async fn begin(&self) -> Operation<'_> {
        let gate = self.ops.lock().await;
        self.start(gate)
    }

    /// Marks the store loading for as long as `gate` is held. Callers that
    /// might turn out to have nothing to do check first, while holding the
    /// gate, so a no-op never reaches subscribers.
    fn start<'a>(&'a self, gate: MutexGuard<'a, ()>) -> Operation<'a> {
        self.state.send_modify(|snap| snap.is_loading = true);
        Operation {
            _gate: gate,
            state: &self.state,
        }
    }

    /// Resolves the initial state.
    ///
    /// Without a stored token this settles on `Anonymous` with no request.
    /// Otherwise it asks `/auth/status`. Any failure means `Anonymous` and
    /// the token is dropped. Once the state is resolved, later calls just
    /// return the current snapshot.
    pub async fn initialize(&self) -> SessionSnapshot {
        let gate = self.ops.lock().await;
        if self.state.borrow().state.is_resolved() {
            return self.snapshot();
        }
        let op = self.start(gate);

        if self.tokens().get().is_none() {
            tracing::debug!("no stored token, starting anonymous");
            op.finish(SessionState::Anonymous);
            return self.snapshot();
        }

        let next = match self.api.check_status().await {
            Ok(status) => match status.into_user() {
                Some(user) => {
                    tracing::info!(%user, "session restored");
                    SessionState::Authenticated(user)
                }
                None => {
                    tracing::info!("stored token is no longer signed in");
                    self.tokens().clear();
                    SessionState::Anonymous
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "session status check failed");
                self.tokens().clear();
                SessionState::Anonymous
            }
        };
        op.finish(next);
        self.snapshot()
    }

    /// Signs in. On success the returned token is stored and the state
    /// becomes `Authenticated`.
    ///
    /// # Errors
    /// Whatever the login call returned. The state is `Anonymous`
    /// afterwards.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, SessionError> {
        let op = self.begin().await;
        match self.api.login(username, password).await {
            Ok(resp) => {
                self.tokens().set(&resp.token);
                tracing::info!(user = %resp.user, "logged in");
                op.finish(SessionState::Authenticated(resp.user.clone()));
                Ok(resp.user)
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "login failed");
                op.finish(SessionState::Anonymous);
                Err(e.into())
            }
        }
    }

    /// Signs out. Local state and token are cleared whatever the server
    /// says.
    pub async fn logout(&self) -> LogoutOutcome {
        let op = self.begin().await;
        let remote = self.api.logout().await;
        self.tokens().clear();
        op.finish(SessionState::Anonymous);

        match remote {
            Ok(_) => {
                tracing::info!("logged out");
                LogoutOutcome::Confirmed
            }
            Err(e) => {
                tracing::warn!(error = %e, "logout request failed, cleared local session only");
                LogoutOutcome::LocalOnly(e)
            }
        }
    }

    /// Reloads the full profile from `/user/info`.
    ///
    /// Returns `Ok(None)` without a request when nobody is signed in.
    ///
    /// # Errors
    /// Whatever the call returned. The state is left exactly as it was.
    pub async fn fetch_user_info(&self) -> Result<Option<UserInfo>, SessionError> {
        let gate = self.ops.lock().await;
        if !self.state.borrow().state.is_authenticated() {
            return Ok(None);
        }
        let op = self.start(gate);

        match self.api.get_user_info().await {
            Ok(user) => {
                tracing::debug!(%user, "profile reloaded");
                op.finish(SessionState::Authenticated(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to reload profile");
                Err(e.into())
            }
        }
    }

    /// Reloads the session from `/user/session`.
    ///
    /// A status that isn't signed in leaves the store `Anonymous` with the
    /// token dropped, same as [`initialize`](Self::initialize).
    ///
    /// # Errors
    /// Whatever the call returned. The store is cleared first.
    pub async fn fetch_session(&self) -> Result<SessionStatus, SessionError> {
        let op = self.begin().await;
        match self.api.get_session().await {
            Ok(status) => {
                let next = match &status.user {
                    Some(user) if status.is_logged_in => {
                        SessionState::Authenticated(user.clone())
                    }
                    _ => {
                        self.tokens().clear();
                        SessionState::Anonymous
                    }
                };
                op.finish(next);
                Ok(status)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load session");
                self.tokens().clear();
                op.finish(SessionState::Anonymous);
                Err(e.into())
            }
        }
    }

    /// Extends the session and stores whatever token the server returns.
    ///
    /// # Errors
    /// - [`SessionError::MissingToken`] if no token is stored (no request)
    /// - the call's error otherwise; a 401 also clears the store
    pub async fn refresh(&self) -> Result<RefreshResponse, SessionError> {
        let op = self.begin().await;
        if self.tokens().get().is_none() {
            return Err(SessionError::MissingToken);
        }

        match self.api.refresh_token().await {
            Ok(resp) => {
                self.tokens().set(&resp.token);
                tracing::debug!(refreshed_at = ?resp.refreshed_at, "session refreshed");
                Ok(resp)
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("session expired during refresh");
                self.tokens().clear();
                op.finish(SessionState::Anonymous);
                Err(ApiError::Unauthorized.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Shallow-merges `patch` into the signed-in user. No request is made.
    /// Does nothing unless the store is `Authenticated`.
    pub fn update_user_info(&self, patch: UserPatch) {
        self.state.send_if_modified(|snap| match &mut snap.state {
            SessionState::Authenticated(user) => {
                user.apply(patch);
                true
            }
            _ => false,
        });
    }

    /// Forces the store to `Anonymous` and drops the token. Safe to call
    /// repeatedly.
    pub fn clear(&self) {
        self.tokens().clear();
        self.state.send_if_modified(|snap| {
            if snap.state == SessionState::Anonymous {
                return false;
            }
            snap.state = SessionState::Anonymous;
            true
        });
    }
}
