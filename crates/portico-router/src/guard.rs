//! The navigation guard.
//!
//! A pure function of (target route, session snapshot). Checks run in a
//! fixed order and the first that fails decides:
//!
//! 1. needs auth, not signed in  → login page, `?redirect=<target>`
//! 2. needs admin, below admin   → home
//! 3. guest only, signed in      → home
//! 4. otherwise                  → allow

use portico_session::SessionSnapshot;

use crate::{Location, ResolvedRoute};

/// Query key carrying the page to return to after login.
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// What the guard says about a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Location),
}

/// Where the guard sends people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub login_path: String,
    pub home_path: String,
}

impl Default for Guard {
    fn default() -> Self {
        Self {
            login_path: "/login".to_owned(),
            home_path: "/".to_owned(),
        }
    }
}

impl Guard {
    pub fn decide(&self, target: &ResolvedRoute, session: &SessionSnapshot) -> Decision {
        let meta = &target.meta;

        if meta.requires_auth && !session.is_logged_in() {
            return Decision::Redirect(
                Location::new(&self.login_path)
                    .with_query(REDIRECT_QUERY_KEY, target.full_path()),
            );
        }
        if meta.requires_admin && !session.is_admin() {
            return Decision::Redirect(Location::new(&self.home_path));
        }
        if meta.requires_guest && session.is_logged_in() {
            return Decision::Redirect(Location::new(&self.home_path));
        }
        Decision::Allow
    }
}

/// [`Guard::decide`] with the default login and home paths.
pub fn decide(target: &ResolvedRoute, session: &SessionSnapshot) -> Decision {
    Guard::default().decide(target, session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteMeta;
    use portico_protocol::{PermissionLevel, UserInfo};
    use portico_session::SessionState;

    fn target(path: &str, meta: RouteMeta) -> ResolvedRoute {
        ResolvedRoute {
            name: "t".into(),
            location: Location::parse(path),
            meta,
        }
    }

    fn anonymous() -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState::Anonymous,
            is_loading: false,
        }
    }

    fn signed_in(permission: PermissionLevel) -> SessionSnapshot {
        let mut user = UserInfo::new(1, "u");
        user.permission = permission;
        SessionSnapshot {
            state: SessionState::Authenticated(user),
            is_loading: false,
        }
    }

    #[test]
    fn test_decide_auth_route_anonymous_redirects_to_login_with_return_path() {
        let decision = decide(&target("/profile?tab=2", RouteMeta::auth("P")), &anonymous());

        let Decision::Redirect(loc) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(loc.path, "/login");
        assert_eq!(loc.query(REDIRECT_QUERY_KEY), Some("/profile?tab=2"));
    }

    #[test]
    fn test_decide_auth_route_unknown_state_redirects_to_login() {
        let decision = decide(&target("/profile", RouteMeta::auth("P")), &SessionSnapshot::default());
        assert!(matches!(decision, Decision::Redirect(loc) if loc.path == "/login"));
    }

    #[test]
    fn test_decide_admin_route_member_redirects_home() {
        let decision = decide(
            &target("/admin", RouteMeta::admin("A")),
            &signed_in(PermissionLevel::Member),
        );
        assert_eq!(decision, Decision::Redirect(Location::new("/")));
    }

    #[test]
    fn test_decide_admin_route_anonymous_goes_to_login_first() {
        let decision = decide(&target("/admin/users", RouteMeta::admin("A")), &anonymous());
        assert!(matches!(decision, Decision::Redirect(loc) if loc.path == "/login"));
    }

    #[test]
    fn test_decide_admin_route_admin_allowed() {
        let decision = decide(
            &target("/admin", RouteMeta::admin("A")),
            &signed_in(PermissionLevel::Admin),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_decide_guest_route_signed_in_redirects_home() {
        let decision = decide(
            &target("/login", RouteMeta::guest("L")),
            &signed_in(PermissionLevel::Guest),
        );
        assert_eq!(decision, Decision::Redirect(Location::new("/")));
    }

    #[test]
    fn test_decide_guest_route_anonymous_allowed() {
        assert_eq!(
            decide(&target("/register", RouteMeta::guest("R")), &anonymous()),
            Decision::Allow
        );
    }

    #[test]
    fn test_decide_public_route_always_allowed() {
        let meta = RouteMeta::public("Home");
        assert_eq!(decide(&target("/", meta.clone()), &anonymous()), Decision::Allow);
        assert_eq!(
            decide(&target("/", meta), &signed_in(PermissionLevel::Owner)),
            Decision::Allow
        );
    }

    #[test]
    fn test_custom_guard_paths() {
        let guard = Guard {
            login_path: "/signin".into(),
            home_path: "/dashboard".into(),
        };
        let decision = guard.decide(
            &target("/admin", RouteMeta::admin("A")),
            &signed_in(PermissionLevel::Member),
        );
        assert_eq!(decision, Decision::Redirect(Location::new("/dashboard")));
    }
}
