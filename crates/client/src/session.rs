//! Session token storage.
//!
//! [`SessionStore`] is the single owner of the access/refresh token pair.
//! It is created once, handed to [`ApiClient`](crate::ApiClient) and read
//! or mutated only through its methods. Every change is written through
//! to a [`TokenStore`], which plays the role of a cookie jar: tokens carry
//! an expiry and an expired token reads as absent.
//!
//! The file-backed store lives at ~/.config/mentordesk/session.json
//! (0600 on Unix).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Lifetime applied when the server does not send an expiry.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Token pair plus expiries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub access_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refresh_expiry: Option<DateTime<Utc>>,
}

impl Session {
    /// Access token if present and not past its expiry.
    pub fn live_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
        live(&self.access_token, self.access_expiry, now)
    }

    /// Refresh token if present and not past its expiry.
    pub fn live_refresh_token(&self, now: DateTime<Utc>) -> Option<&str> {
        live(&self.refresh_token, self.refresh_expiry, now)
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

fn live(token: &Option<String>, expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<&str> {
    match expiry {
        Some(at) if at <= now => None,
        _ => token.as_deref().filter(|t| !t.is_empty()),
    }
}

/// Token payload returned by `/auth/login` and `/auth/refresh`.
///
/// Every field is optional: a missing token leaves the stored one alone,
/// a missing expiry falls back to [`DEFAULT_TOKEN_TTL_DAYS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expiry: Option<String>,
}

/// Parse a server-supplied expiry, falling back to `now + 7 days`.
fn resolve_expiry(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let fallback = now + Duration::days(DEFAULT_TOKEN_TTL_DAYS);
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    // Some backends drop the offset: treat as UTC
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc();
        }
    }

    log::warn!("unrecognised token expiry '{}', assuming {} days", raw, DEFAULT_TOKEN_TTL_DAYS);
    fallback
}

// ── Persistence backends ────────────────────────────────────────────

/// Cookie-like persistence for a [`Session`].
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, ClientError>;
    fn save(&self, session: &Session) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// ~/.config/mentordesk/session.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("mentordesk/session.json"))
    }

    pub fn at_default_location() -> Result<Self, ClientError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| ClientError::Io("Could not determine config directory".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let session = serde_json::from_str(&contents)
            .map_err(|e| ClientError::Parse(format!("Invalid session file {}: {}", self.path.display(), e)))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, &contents)
            .map_err(|e| ClientError::Io(format!("Failed to write session file: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|e| ClientError::Io(format!("Failed to set file permissions: {}", e)))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| ClientError::Io(format!("Failed to delete session file: {}", e)))?;
        }
        Ok(())
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    saved: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self { saved: Mutex::new(Some(session)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

// ── SessionStore ────────────────────────────────────────────────────

/// Owned session state with write-through persistence.
pub struct SessionStore {
    state: Mutex<Session>,
    backend: Box<dyn TokenStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.snapshot();
        f.debug_struct("SessionStore")
            .field("has_access_token", &s.access_token.is_some())
            .field("has_refresh_token", &s.refresh_token.is_some())
            .field("access_expiry", &s.access_expiry)
            .field("refresh_expiry", &s.refresh_expiry)
            .finish()
    }
}

impl SessionStore {
    /// Open a store, restoring whatever the backend already holds.
    /// An unreadable backend starts an empty session.
    pub fn new(backend: impl TokenStore + 'static) -> Self {
        let initial = match backend.load() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                log::warn!("ignoring stored session: {}", e);
                Session::default()
            }
        };
        Self {
            state: Mutex::new(initial),
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// File-backed store at the default config location.
    pub fn open_default() -> Result<Self, ClientError> {
        Ok(Self::new(FileTokenStore::at_default_location()?))
    }

    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().live_access_token(Utc::now()).map(String::from)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().live_refresh_token(Utc::now()).map(String::from)
    }

    pub fn is_authenticated(&self) -> bool {
        let now = Utc::now();
        let s = self.lock();
        s.live_access_token(now).is_some() || s.live_refresh_token(now).is_some()
    }

    /// Apply a login/refresh payload.
    pub fn update(&self, update: &SessionUpdate) {
        let now = Utc::now();
        self.mutate(|s| {
            if let Some(ref token) = update.access_token {
                s.access_token = Some(token.clone());
                s.access_expiry = Some(resolve_expiry(update.access_token_expiry.as_deref(), now));
            }
            if let Some(ref token) = update.refresh_token {
                s.refresh_token = Some(token.clone());
                s.refresh_expiry = Some(resolve_expiry(update.refresh_token_expiry.as_deref(), now));
            }
        });
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|s| {
            s.access_token = Some(token);
            s.access_expiry = Some(Utc::now() + Duration::days(DEFAULT_TOKEN_TTL_DAYS));
        });
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|s| {
            s.refresh_token = Some(token);
            s.refresh_expiry = Some(Utc::now() + Duration::days(DEFAULT_TOKEN_TTL_DAYS));
        });
    }

    /// Drop both tokens locally and in the backend.
    pub fn clear(&self) {
        *self.lock() = Session::default();
        if let Err(e) = self.backend.clear() {
            log::warn!("failed to clear stored session: {}", e);
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        let snapshot = {
            let mut guard = self.lock();
            f(&mut guard);
            guard.clone()
        };
        if let Err(e) = self.backend.save(&snapshot) {
            log::warn!("failed to persist session: {}", e);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
