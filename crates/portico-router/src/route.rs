//! Route definitions and locations.

use std::fmt;

// ---------------------------------------------------------------------------
// RouteMeta
// ---------------------------------------------------------------------------

/// What a route demands of the session. Fixed when the table is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub requires_admin: bool,
    pub title: String,
}

impl RouteMeta {
    /// Open to everyone.
    pub fn public(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Only for signed-out visitors (login, register).
    pub fn guest(title: impl Into<String>) -> Self {
        Self {
            requires_guest: true,
            ..Self::public(title)
        }
    }

    /// Only for signed-in users.
    pub fn auth(title: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(title)
        }
    }

    /// Only for signed-in users at admin level or above.
    pub fn admin(title: impl Into<String>) -> Self {
        Self {
            requires_admin: true,
            ..Self::auth(title)
        }
    }
}

// ---------------------------------------------------------------------------
// PathPattern
// ---------------------------------------------------------------------------

/// How a route matches a normalized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// This path only.
    Exact(String),
    /// This path and anything below it: `/admin` matches `/admin` and
    /// `/admin/users`, not `/administrator`.
    Prefix(String),
    /// Everything. Put it last.
    CatchAll,
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => {
                path == p
                    || (path.starts_with(p.as_str())
                        && path[p.len()..].starts_with('/'))
            }
            Self::CatchAll => true,
        }
    }
}

/// A named entry in the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub pattern: PathPattern,
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(name: impl Into<String>, pattern: PathPattern, meta: RouteMeta) -> Self {
        Self {
            name: name.into(),
            pattern,
            meta,
        }
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A navigation target: normalized path plus decoded query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// A location with no query.
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            query: Vec::new(),
        }
    }

    /// Parses `path?query#fragment`. The fragment is dropped, the path is
    /// normalized, and query keys/values are percent-decoded.
    pub fn parse(raw: &str) -> Self {
        let without_fragment = raw.split_once('#').map_or(raw, |(before, _)| before);
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(k), decode(v))
            })
            .collect();

        Self {
            path: normalize_path(path),
            query,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for `key`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path plus encoded query string.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s).map_or_else(|_| s.to_owned(), |c| c.into_owned())
}

/// Leading slash added, trailing slashes trimmed, empty segments collapsed.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// A location matched to its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: String,
    pub location: Location,
    pub meta: RouteMeta,
}

impl ResolvedRoute {
    pub fn full_path(&self) -> String {
        self.location.full_path()
    }
}
