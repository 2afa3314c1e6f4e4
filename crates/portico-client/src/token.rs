//! Bearer token persistence.
//!
//! The client holds at most one token at a time. Where that token lives is
//! pluggable: a [`KeyValueStore`] is a tiny synchronous string map, and
//! [`TokenStorage`] layers the lookup policy on top of two of them:
//!
//! ```text
//! get()   → primary[key]  ──miss──→  fallback[cookie_name]  ──miss──→ None
//! set(t)  → primary[key] = t
//! clear() → primary.remove(key); fallback.remove(cookie_name)
//! ```
//!
//! The fallback exists because the backend also issues the token as a
//! `session_token` cookie, so a client that only has the cookie is still
//! considered to hold a token.
//!
//! No expiry is checked here. A stale token is discovered by the server
//! answering 401.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cookie::Cookie;

/// Key and cookie name the backend uses for the session token.
pub const DEFAULT_TOKEN_KEY: &str = "session_token";

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// A minimal string key-value store.
///
/// Implementations must never panic and never block for long: they are
/// called from async code without `spawn_blocking`.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        write(&self.entries).insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        write(&self.entries).remove(key);
    }
}

/// A store persisted as a flat JSON object on disk.
///
/// The file is read once in [`open`](Self::open) and rewritten after every
/// change. A missing or unreadable file starts empty; write failures are
/// logged and the in-memory value still takes effect.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let bytes = match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to serialize token file");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), error = %e, "failed to create token directory");
                    return;
                }
            }
        }
        if let Err(e) = std::fs::write(&self.path, bytes) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write token file");
        }
    }
}

fn load(path: &Path) -> BTreeMap<String, String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read token file");
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "token file is not a JSON object, starting empty");
        BTreeMap::new()
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = write(&self.entries);
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = write(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

/// Cookies as a `Cookie:` request header would carry them.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Cookie:` header value (`a=1; b=2`). Malformed pairs are
    /// skipped.
    pub fn from_header(header: &str) -> Self {
        let cookies = Cookie::split_parse(header)
            .filter_map(|parsed| match parsed {
                Ok(c) => Some((c.name().to_owned(), c.value().to_owned())),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed cookie");
                    None
                }
            })
            .collect();
        Self {
            cookies: RwLock::new(cookies),
        }
    }

    /// Renders the jar back into a `Cookie:` header value, names sorted.
    pub fn to_header(&self) -> String {
        read(&self.cookies)
            .iter()
            .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.cookies).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        write(&self.cookies).insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        write(&self.cookies).remove(key);
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Where the HTTP client reads and writes the bearer token.
///
/// Object-safe so the client and session store can share one
/// `Arc<dyn TokenStore>`.
pub trait TokenStore: Send + Sync + 'static {
    /// The current token, if any.
    fn get(&self) -> Option<String>;
    /// Stores `token`, replacing any previous one.
    fn set(&self, token: &str);
    /// Removes the token from every place `get` looks.
    fn clear(&self);
}

/// The standard [`TokenStore`]: a primary store plus a cookie fallback.
#[derive(Debug)]
pub struct TokenStorage<P, C = CookieJar> {
    primary: P,
    fallback: C,
    key: String,
    cookie_name: String,
}

impl TokenStorage<MemoryStore, CookieJar> {
    /// Memory-backed storage with an empty cookie jar.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), CookieJar::new())
    }
}

impl<P: KeyValueStore, C: KeyValueStore> TokenStorage<P, C> {
    pub fn new(primary: P, fallback: C) -> Self {
        Self {
            primary,
            fallback,
            key: DEFAULT_TOKEN_KEY.to_owned(),
            cookie_name: DEFAULT_TOKEN_KEY.to_owned(),
        }
    }

    /// Overrides the primary-store key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Overrides the fallback cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &C {
        &self.fallback
    }
}

impl<P: KeyValueStore, C: KeyValueStore> TokenStore for TokenStorage<P, C> {
    fn get(&self) -> Option<String> {
        self.primary
            .get(&self.key)
            .or_else(|| self.fallback.get(&self.cookie_name))
    }

    fn set(&self, token: &str) {
        self.primary.set(&self.key, token);
    }

    fn clear(&self) {
        self.primary.remove(&self.key);
        self.fallback.remove(&self.cookie_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_empty_storage_returns_none() {
        let store = TokenStorage::in_memory();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_set_then_get_returns_token() {
        let store = TokenStorage::in_memory();
        store.set("abc");
        assert_eq!(store.get().as_deref(), Some("abc"));
    }

    #[test]
    fn test_set_overwrites_previous_token() {
        let store = TokenStorage::in_memory();
        store.set("first");
        store.set("second");
        assert_eq!(store.get().as_deref(), Some("second"));
    }

    #[test]
    fn test_get_falls_back_to_cookie() {
        let store = TokenStorage::new(
            MemoryStore::new(),
            CookieJar::from_header("theme=dark; session_token=from-cookie"),
        );
        assert_eq!(store.get().as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_get_prefers_primary_over_cookie() {
        let store = TokenStorage::new(
            MemoryStore::new(),
            CookieJar::from_header("session_token=from-cookie"),
        );
        store.set("from-primary");
        assert_eq!(store.get().as_deref(), Some("from-primary"));
    }

    #[test]
    fn test_set_does_not_touch_cookie() {
        let store = TokenStorage::in_memory();
        store.set("abc");
        assert_eq!(store.fallback().get(DEFAULT_TOKEN_KEY), None);
    }

    #[test]
    fn test_clear_removes_primary_and_cookie() {
        let store = TokenStorage::new(
            MemoryStore::new(),
            CookieJar::from_header("session_token=c; theme=dark"),
        );
        store.set("p");

        store.clear();

        assert_eq!(store.get(), None);
        // Unrelated cookies survive.
        assert_eq!(store.fallback().get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_custom_key_and_cookie_name() {
        let store = TokenStorage::new(
            MemoryStore::new(),
            CookieJar::from_header("sid=xyz"),
        )
        .with_key("auth")
        .with_cookie_name("sid");

        assert_eq!(store.get().as_deref(), Some("xyz"));
        store.set("abc");
        assert_eq!(store.primary().get("auth").as_deref(), Some("abc"));
    }

    #[test]
    fn test_cookie_jar_to_header_sorted() {
        let jar = CookieJar::from_header("b=2; a=1");
        assert_eq!(jar.to_header(), "a=1; b=2");
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = TokenStorage::new(FileStore::open(&path), CookieJar::new());
        store.set("durable");

        let reopened = TokenStorage::new(FileStore::open(&path), CookieJar::new());
        assert_eq!(reopened.get().as_deref(), Some("durable"));

        reopened.clear();
        let again = FileStore::open(&path);
        assert_eq!(again.get(DEFAULT_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileStore::open(&path);

        assert_eq!(store.get(DEFAULT_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_creates_missing_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let store = FileStore::open(&path);
        store.set("k", "v");

        assert!(path.exists());
    }
}
