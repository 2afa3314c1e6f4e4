//! Session state types: what the store knows about the current user.

use portico_protocol::{PermissionLevel, UserInfo};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Who the store believes is signed in.
///
/// ```text
///            initialize()                 login() ok
///   Unknown ─────────────→ Anonymous ─────────────────→ Authenticated(user)
///      │                      ↑                                │
///      └── status says yes ───┼──────────────────────────────→ │
///                             └── logout() / clear() / 401 ────┘
/// ```
///
/// The user lives inside `Authenticated`, so "logged in without a user"
/// can't be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been checked yet.
    #[default]
    Unknown,
    /// Checked: nobody is signed in.
    Anonymous,
    /// Signed in as this user.
    Authenticated(UserInfo),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// `false` only for [`Unknown`](Self::Unknown).
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// An immutable view of the store at one instant.
///
/// This is what subscribers receive and what the route guard decides on.
/// The accessors mirror the read-only properties a UI binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// `true` while a network operation holds the store.
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn is_logged_in(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_resolved()
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.state.user()
    }

    pub fn username(&self) -> Option<&str> {
        self.user().map(|u| u.username.as_str())
    }

    /// Empty string when nobody is signed in.
    pub fn nickname(&self) -> &str {
        self.user().map_or("", |u| u.nickname.as_str())
    }

    pub fn avatar(&self) -> Option<&str> {
        self.user().and_then(|u| u.avatar.as_deref())
    }

    /// [`PermissionLevel::Guest`] when nobody is signed in.
    pub fn permission(&self) -> PermissionLevel {
        self.user().map_or(PermissionLevel::Guest, |u| u.permission)
    }

    pub fn is_admin(&self) -> bool {
        self.permission().is_admin()
    }
}
