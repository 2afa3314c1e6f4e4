//! User and session types as they travel on the wire.
//!
//! The backend speaks snake_case (`created_at`, `is_authenticated`) while
//! older front ends used camelCase (`createdAt`, `isLoggedIn`). Both are
//! accepted on the way in; everything is normalized here so that code above
//! this crate only ever sees one spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// A backend user ID.
///
/// Serialized as a plain number (`42`), displayed as `U-42` in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PermissionLevel
// ---------------------------------------------------------------------------

/// A user's rank, 0 (lowest) to 4.
///
/// The derive order of the variants IS the numeric order, so `<` and `>=`
/// compare ranks directly:
///
/// ```rust
/// use portico_protocol::PermissionLevel;
///
/// assert!(PermissionLevel::SuperAdmin >= PermissionLevel::ADMIN_THRESHOLD);
/// assert!(PermissionLevel::Member < PermissionLevel::ADMIN_THRESHOLD);
/// ```
///
/// On the wire this is a bare integer. Anything outside `0..=4` is a
/// decode error rather than being silently clamped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PermissionLevel {
    #[default]
    Guest = 0,
    Member = 1,
    Admin = 2,
    SuperAdmin = 3,
    Owner = 4,
}

impl PermissionLevel {
    /// Minimum level required for admin-only routes.
    pub const ADMIN_THRESHOLD: Self = Self::Admin;

    /// Returns `true` if this level may enter admin-only routes.
    pub fn is_admin(self) -> bool {
        self >= Self::ADMIN_THRESHOLD
    }

    /// The numeric rank.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for PermissionLevel {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Guest),
            1 => Ok(Self::Member),
            2 => Ok(Self::Admin),
            3 => Ok(Self::SuperAdmin),
            4 => Ok(Self::Owner),
            other => Err(ProtocolError::InvalidMessage(format!(
                "permission level {other} is outside 0..=4"
            ))),
        }
    }
}

impl From<PermissionLevel> for u8 {
    fn from(level: PermissionLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Guest => "guest",
            Self::Member => "member",
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// UserInfo
// ---------------------------------------------------------------------------

/// The signed-in user's profile.
///
/// Only `id` and `username` are guaranteed; the session endpoints return a
/// trimmed profile while `/user/info` returns everything. Timestamps are kept
/// as the backend's ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, alias = "permissionLevel")]
    pub permission: PermissionLevel,
    #[serde(default, alias = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, alias = "isVerified", skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "lastLoginAt", skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl UserInfo {
    /// Creates a minimal profile. Handy for tests and fixtures.
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            username: username.into(),
            nickname: String::new(),
            email: None,
            avatar: None,
            permission: PermissionLevel::default(),
            is_active: None,
            is_verified: None,
            created_at: None,
            updated_at: None,
            last_login_at: None,
        }
    }

    /// Shallow-merges `patch` into this profile: every field present in the
    /// patch overwrites ours, absent fields are left alone.
    pub fn apply(&mut self, patch: UserPatch) {
        let UserPatch {
            username,
            nickname,
            email,
            avatar,
            permission,
            updated_at,
        } = patch;
        if let Some(v) = username {
            self.username = v;
        }
        if let Some(v) = nickname {
            self.nickname = v;
        }
        if let Some(v) = email {
            self.email = Some(v);
        }
        if let Some(v) = avatar {
            self.avatar = Some(v);
        }
        if let Some(v) = permission {
            self.permission = v;
        }
        if let Some(v) = updated_at {
            self.updated_at = Some(v);
        }
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}

/// A partial profile update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Server-side session bookkeeping that some endpoints echo back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<String>,
}

/// The canonical answer to "who is signed in?".
///
/// Built from whatever the status/session endpoints send back. The login
/// flag is taken from `isLoggedIn`, else `is_authenticated`, else inferred
/// from whether a user is present. A truthy flag without a user is treated
/// as logged out, so `is_logged_in` always implies `user.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireSessionStatus")]
pub struct SessionStatus {
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    pub user: Option<UserInfo>,
    pub session: Option<SessionMeta>,
}

impl SessionStatus {
    /// A logged-out status.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in status for `user`.
    pub fn authenticated(user: UserInfo) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
            session: None,
        }
    }

    /// Consumes the status, returning the user only if logged in.
    pub fn into_user(self) -> Option<UserInfo> {
        if self.is_logged_in { self.user } else { None }
    }
}

/// Every spelling the backend has used for the session payload.
#[derive(Deserialize)]
struct WireSessionStatus {
    #[serde(default, rename = "isLoggedIn")]
    is_logged_in: Option<bool>,
    #[serde(default)]
    is_authenticated: Option<bool>,
    #[serde(default)]
    user: Option<UserInfo>,
    #[serde(default)]
    session: Option<SessionMeta>,
}

impl From<WireSessionStatus> for SessionStatus {
    fn from(wire: WireSessionStatus) -> Self {
        let flag = wire
            .is_logged_in
            .or(wire.is_authenticated)
            .unwrap_or(wire.user.is_some());
        let is_logged_in = flag && wire.user.is_some();
        Self {
            is_logged_in,
            user: if is_logged_in { wire.user } else { None },
            session: wire.session,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
