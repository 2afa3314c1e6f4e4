//! The route table.

use crate::{Location, PathPattern, ResolvedRoute, Route, RouteMeta};

/// Ordered routes. The first match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// The application's routes:
    ///
    /// | path          | name        | needs          |
    /// |---------------|-------------|----------------|
    /// | `/`           | `home`      |                |
    /// | `/login`      | `login`     | guest          |
    /// | `/register`   | `register`  | guest          |
    /// | `/profile`    | `profile`   | auth           |
    /// | `/setting/**` | `setting`   | auth           |
    /// | `/admin/**`   | `admin`     | auth + admin   |
    /// | anything else | `not-found` |                |
    pub fn standard() -> Self {
        Self::new()
            .route(Route::new("home", PathPattern::Exact("/".into()), RouteMeta::public("Home")))
            .route(Route::new("login", PathPattern::Exact("/login".into()), RouteMeta::guest("Login")))
            .route(Route::new(
                "register",
                PathPattern::Exact("/register".into()),
                RouteMeta::guest("Register"),
            ))
            .route(Route::new(
                "profile",
                PathPattern::Exact("/profile".into()),
                RouteMeta::auth("Profile"),
            ))
            .route(Route::new(
                "setting",
                PathPattern::Prefix("/setting".into()),
                RouteMeta::auth("Settings"),
            ))
            .route(Route::new(
                "admin",
                PathPattern::Prefix("/admin".into()),
                RouteMeta::admin("Admin"),
            ))
            .route(Route::new("not-found", PathPattern::CatchAll, RouteMeta::public("Not Found")))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn resolve(&self, location: &Location) -> Option<ResolvedRoute> {
        self.routes
            .iter()
            .find(|r| r.pattern.matches(&location.path))
            .map(|r| ResolvedRoute {
                name: r.name.clone(),
                location: location.clone(),
                meta: r.meta.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(path: &str) -> String {
        RouteTable::standard()
            .resolve(&Location::parse(path))
            .unwrap()
            .name
    }

    #[test]
    fn test_standard_resolves_known_paths() {
        assert_eq!(name_of("/"), "home");
        assert_eq!(name_of("/login?redirect=%2F"), "login");
        assert_eq!(name_of("/register/"), "register");
        assert_eq!(name_of("/profile"), "profile");
        assert_eq!(name_of("/setting"), "setting");
        assert_eq!(name_of("/setting/password"), "setting");
        assert_eq!(name_of("/admin/users/3"), "admin");
    }

    #[test]
    fn test_standard_unknown_is_not_found() {
        assert_eq!(name_of("/nope"), "not-found");
        assert_eq!(name_of("/profile/extra"), "not-found");
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        assert!(RouteTable::new().resolve(&Location::new("/")).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new()
            .route(Route::new("a", PathPattern::CatchAll, RouteMeta::public("A")))
            .route(Route::new("b", PathPattern::Exact("/b".into()), RouteMeta::public("B")));
        assert_eq!(table.resolve(&Location::new("/b")).unwrap().name, "a");
    }
}
