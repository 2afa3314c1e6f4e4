//! Navigation: resolve, guard, follow redirects.

use portico_session::{SessionSnapshot, SessionStore};
use portico_transport::Transport;

use crate::{Decision, Guard, Location, ResolvedRoute, RouteTable, RouterError};

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The route actually landed on.
    pub route: ResolvedRoute,
    /// The originally requested location, if the guard redirected.
    pub redirected_from: Option<Location>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

/// Route table plus guard.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    guard: Guard,
    max_redirects: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::standard())
    }
}

impl Router {
    pub const DEFAULT_MAX_REDIRECTS: usize = 5;

    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            guard: Guard::default(),
            max_redirects: Self::DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Matches a raw path against the table, without guarding.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouterError> {
        let location = Location::parse(path);
        self.resolve_location(&location)
    }

    fn resolve_location(&self, location: &Location) -> Result<ResolvedRoute, RouterError> {
        self.table
            .resolve(location)
            .ok_or_else(|| RouterError::NoMatch(location.full_path()))
    }

    /// Navigates to `path`, initializing the session first if it hasn't
    /// been resolved yet.
    pub async fn navigate<T: Transport>(
        &self,
        path: &str,
        session: &SessionStore<T>,
    ) -> Result<Navigation, RouterError> {
        let mut snapshot = session.snapshot();
        if !snapshot.is_initialized() {
            snapshot = session.initialize().await;
        }
        self.navigate_with(path, &snapshot)
    }

    /// Navigates against a given snapshot. Every redirect target is guarded
    /// again, up to the redirect limit.
    pub fn navigate_with(
        &self,
        path: &str,
        session: &SessionSnapshot,
    ) -> Result<Navigation, RouterError> {
        let requested = Location::parse(path);
        let mut current = requested.clone();

        for hop in 0..=self.max_redirects {
            let route = self.resolve_location(&current)?;
            match self.guard.decide(&route, session) {
                Decision::Allow => {
                    tracing::debug!(path = %route.location, route = %route.name, "navigation allowed");
                    return Ok(Navigation {
                        route,
                        redirected_from: (hop > 0).then_some(requested),
                    });
                }
                Decision::Redirect(next) => {
                    tracing::debug!(from = %current, to = %next, "navigation redirected");
                    current = next;
                }
            }
        }

        tracing::warn!(path = %requested, hops = self.max_redirects, "redirect loop");
        Err(RouterError::RedirectLoop {
            path: requested.full_path(),
            hops: self.max_redirects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathPattern, Route, RouteMeta};
    use portico_protocol::{PermissionLevel, UserInfo};
    use portico_session::SessionState;

    fn anonymous() -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState::Anonymous,
            is_loading: false,
        }
    }

    fn member() -> SessionSnapshot {
        let mut user = UserInfo::new(2, "m");
        user.permission = PermissionLevel::Member;
        SessionSnapshot {
            state: SessionState::Authenticated(user),
            is_loading: false,
        }
    }

    #[test]
    fn test_navigate_with_allowed_is_not_redirected() {
        let nav = Router::default().navigate_with("/", &anonymous()).unwrap();
        assert_eq!(nav.route.name, "home");
        assert!(!nav.was_redirected());
    }

    #[test]
    fn test_navigate_with_anonymous_profile_lands_on_login() {
        let nav = Router::default()
            .navigate_with("/profile", &anonymous())
            .unwrap();

        assert_eq!(nav.route.name, "login");
        assert_eq!(nav.route.full_path(), "/login?redirect=%2Fprofile");
        assert_eq!(nav.redirected_from, Some(Location::new("/profile")));
    }

    #[test]
    fn test_navigate_with_member_admin_lands_home() {
        let nav = Router::default()
            .navigate_with("/admin/users", &member())
            .unwrap();
        assert_eq!(nav.route.name, "home");
    }

    #[test]
    fn test_navigate_with_unknown_path_is_not_found() {
        let nav = Router::default().navigate_with("/nowhere", &member()).unwrap();
        assert_eq!(nav.route.name, "not-found");
        assert_eq!(nav.route.meta.title, "Not Found");
    }

    #[test]
    fn test_navigate_with_guarded_login_loops() {
        // Both home and login require auth: anonymous visitors bounce forever.
        let table = RouteTable::new()
            .route(Route::new("home", PathPattern::Exact("/".into()), RouteMeta::auth("H")))
            .route(Route::new("login", PathPattern::Exact("/login".into()), RouteMeta::auth("L")));
        let router = Router::new(table).with_max_redirects(3);

        let err = router.navigate_with("/", &anonymous()).unwrap_err();

        assert!(matches!(err, RouterError::RedirectLoop { hops: 3, .. }));
    }

    #[test]
    fn test_navigate_with_no_match_errors() {
        let table = RouteTable::new()
            .route(Route::new("home", PathPattern::Exact("/".into()), RouteMeta::public("H")));
        let err = Router::new(table).navigate_with("/x", &anonymous()).unwrap_err();
        assert!(matches!(err, RouterError::NoMatch(p) if p == "/x"));
    }
}
