//! Session flag, its persistence, and credential checks.
//!
//! The session is a single boolean plus the email entered at login. It is
//! stored as two string entries in a key-value repository:
//!
//! - `user`: `{"email": "..."}`
//! - `isAuthenticated`: `"true"`
//!
//! The flag loads as authenticated only when both entries are present. This
//! is a convenience gate, not proof of identity.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::{PlannerError, Result};

/// Storage key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// Storage key holding the `"true"` flag.
pub const AUTH_KEY: &str = "isAuthenticated";

// ============================================================================
// SessionFlag
// ============================================================================

/// Whether someone is logged in, and as whom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFlag {
    /// `true` after a successful login.
    pub is_authenticated: bool,
    /// Email (username) entered at login.
    pub email: Option<String>,
}

impl SessionFlag {
    /// The logged-out flag.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A logged-in flag for `email`.
    #[must_use]
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            email: Some(email.into()),
        }
    }

    /// Avatar initial: the uppercased first letter of the email, or `U`.
    #[must_use]
    pub fn initial(&self) -> char {
        self.email
            .as_deref()
            .and_then(|email| email.chars().next())
            .and_then(|ch| ch.to_uppercase().next())
            .unwrap_or('U')
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    email: String,
}

// ============================================================================
// Repositories
// ============================================================================

/// String key-value storage for the session entries.
pub trait SessionRepository: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Session entries kept as a JSON object in a file.
///
/// Every operation re-reads the file, so changes made by another process
/// (e.g. `lesson logout` while `lesson serve` runs) are observed.
#[derive(Debug, Clone)]
pub struct FileSessionRepository {
    path: PathBuf,
}

impl FileSessionRepository {
    /// Creates a repository backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| PlannerError::session_corrupted(&self.path, e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionRepository for FileSessionRepository {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// In-memory session entries, for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Reads the flag from storage.
///
/// Authenticated only if the user record is present and the auth entry is
/// exactly `"true"`.
///
/// # Errors
///
/// Returns an error if the repository fails or the user record is not valid JSON.
pub fn load_flag(repository: &dyn SessionRepository) -> Result<SessionFlag> {
    let user = repository.get(USER_KEY)?;
    let authenticated = repository.get(AUTH_KEY)?.as_deref() == Some("true");

    match user {
        Some(user) if authenticated => {
            let stored: StoredUser = serde_json::from_str(&user)?;
            Ok(SessionFlag::signed_in(stored.email))
        }
        _ => Ok(SessionFlag::signed_out()),
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Decides whether a username/password pair may log in.
pub trait CredentialVerifier: Send + Sync {
    /// Returns `true` if the pair is accepted.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured pair, compared literally.
#[derive(Debug, Clone, Default)]
pub struct LiteralCredentialVerifier {
    credentials: Credentials,
}

impl LiteralCredentialVerifier {
    /// Creates a verifier for the given pair.
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialVerifier for LiteralCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.credentials.username && password == self.credentials.password
    }
}

// ============================================================================
// SessionStore
// ============================================================================

/// The live session flag, backed by a repository.
///
/// Every change is published on a `watch` channel so gated views see it on
/// their next render.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    flag: Arc<watch::Sender<SessionFlag>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("flag", &*self.flag.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Opens the store, loading the current flag from `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored entries cannot be read.
    pub fn open(repository: Arc<dyn SessionRepository>) -> Result<Self> {
        let flag = load_flag(repository.as_ref())?;
        debug!(authenticated = flag.is_authenticated, "Session loaded");
        let (sender, _) = watch::channel(flag);
        Ok(Self {
            repository,
            flag: Arc::new(sender),
        })
    }

    /// Opens a store that keeps its entries in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        let (sender, _) = watch::channel(SessionFlag::signed_out());
        Self {
            repository: Arc::new(MemorySessionRepository::new()),
            flag: Arc::new(sender),
        }
    }

    /// Snapshot of the current flag.
    #[must_use]
    pub fn current(&self) -> SessionFlag {
        self.flag.borrow().clone()
    }

    /// Returns `true` if someone is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.flag.borrow().is_authenticated
    }

    /// Subscribes to flag changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionFlag> {
        self.flag.subscribe()
    }

    /// Re-reads storage and adopts a stored login.
    ///
    /// A stored logout does not clear an in-memory login; use [`logout`](Self::logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the stored entries cannot be read.
    pub fn reload(&self) -> Result<SessionFlag> {
        let stored = load_flag(self.repository.as_ref())?;
        if stored.is_authenticated {
            self.flag.send_replace(stored);
        }
        Ok(self.current())
    }

    /// Checks the pair and, if accepted, sets and persists the flag.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidCredentials` if the pair is rejected; the
    /// flag is left unchanged. Returns a storage error if persisting fails.
    pub fn login(
        &self,
        verifier: &dyn CredentialVerifier,
        email: &str,
        password: &str,
    ) -> Result<SessionFlag> {
        if !verifier.verify(email, password) {
            warn!(email = %email, "Login rejected");
            return Err(PlannerError::InvalidCredentials);
        }

        let user = serde_json::to_string(&StoredUser {
            email: email.to_string(),
        })?;
        self.repository.set(USER_KEY, &user)?;
        self.repository.set(AUTH_KEY, "true")?;

        let flag = SessionFlag::signed_in(email);
        self.flag.send_replace(flag.clone());
        info!(email = %email, "Logged in");
        Ok(flag)
    }

    /// Clears the flag and both stored entries.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the entries cannot be removed.
    pub fn logout(&self) -> Result<()> {
        self.repository.remove(USER_KEY)?;
        self.repository.remove(AUTH_KEY)?;
        self.flag.send_replace(SessionFlag::signed_out());
        info!("Logged out");
        Ok(())
    }
}
