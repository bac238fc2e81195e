// Session credential and identity storage
//
// The store keeps the current session in memory and writes it through to a
// `SessionBackend` before any mutating call returns. Credential and identity
// live in one record so they are always persisted and cleared together.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Error;

/// Credential scheme used when the backend does not name one.
pub const DEFAULT_SCHEME: &str = "bearer";

// ── Identity ────────────────────────────────────────────────────────

/// Cached identity of the signed-in user.
///
/// Fields are optional because a credential can exist before the identity
/// fetch that follows it has succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
}

impl Identity {
    pub fn new(
        user_id: i64,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            email: Some(email.into()),
            display_name: Some(display_name.into()),
            role: Some(role.into()),
        }
    }

    /// An identity counts as confirmed once the backend has told us who we are.
    pub fn is_confirmed(&self) -> bool {
        self.user_id.is_some()
    }
}

// ── Persisted record ────────────────────────────────────────────────

/// The unit a [`SessionBackend`] reads and writes.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default)]
    pub identity: Identity,
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_type", &self.token_type)
            .field("identity", &self.identity)
            .finish()
    }
}

// ── Backends ────────────────────────────────────────────────────────

/// Durable key/value storage for one session record.
///
/// Implementations must make `store` and `clear` durable before returning.
pub trait SessionBackend: Send + Sync {
    fn load(&self) -> Result<SessionRecord, Error>;
    fn store(&self, record: &SessionRecord) -> Result<(), Error>;
    fn clear(&self) -> Result<(), Error>;
}

/// Process-local backend. Cloning an `Arc` of it across two stores
/// simulates a restart in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: Mutex<SessionRecord>,
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<SessionRecord, Error> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, record: &SessionRecord) -> Result<(), Error> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = SessionRecord::default();
        Ok(())
    }
}

impl<B: SessionBackend + ?Sized> SessionBackend for std::sync::Arc<B> {
    fn load(&self) -> Result<SessionRecord, Error> {
        (**self).load()
    }

    fn store(&self, record: &SessionRecord) -> Result<(), Error> {
        (**self).store(record)
    }

    fn clear(&self) -> Result<(), Error> {
        (**self).clear()
    }
}

/// JSON file backend. Each write goes to a sibling temp file that is
/// fsynced and then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where an undecodable session file is moved aside.
    pub fn quarantine_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    /// Move an undecodable file out of the way and start signed out.
    fn quarantine(&self, reason: &serde_json::Error) -> SessionRecord {
        let target = self.quarantine_path();
        warn!(
            path = %self.path.display(),
            error = %reason,
            "session file is corrupt, starting signed out"
        );
        if let Err(e) = fs::rename(&self.path, &target) {
            warn!(
                path = %target.display(),
                error = %e,
                "could not move corrupt session file aside"
            );
        }
        SessionRecord::default()
    }

    fn open_private(path: &Path) -> std::io::Result<fs::File> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> Result<SessionRecord, Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(SessionRecord::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| self.quarantine(&e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionRecord::default()),
            Err(e) => Err(Error::session(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn store(&self, record: &SessionRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(Error::session)?;
        }
        let json = serde_json::to_vec_pretty(record).map_err(Error::session)?;
        let tmp = self.temp_path();
        {
            let mut file = Self::open_private(&tmp).map_err(Error::session)?;
            file.write_all(&json).map_err(Error::session)?;
            file.sync_all().map_err(Error::session)?;
        }
        fs::rename(&tmp, &self.path).map_err(Error::session)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::session(e)),
        }
    }
}

// ── SessionStore ────────────────────────────────────────────────────

#[derive(Default)]
struct Cached {
    token: Option<SecretString>,
    scheme: Option<String>,
    identity: Identity,
}

impl Cached {
    fn from_record(record: SessionRecord) -> Self {
        Self {
            token: record.access_token.map(SecretString::from),
            scheme: record.token_type,
            identity: record.identity,
        }
    }

    fn to_record(&self) -> SessionRecord {
        SessionRecord {
            access_token: self.token.as_ref().map(|t| t.expose_secret().to_owned()),
            token_type: self.scheme.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Owner of the bearer credential and cached user identity.
///
/// Reads are served from memory. Writes persist through the backend first
/// and only then update memory, so a failed write leaves the previous
/// session intact. Callers must not run login and logout concurrently.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
    state: RwLock<Cached>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_credential", &self.has_credential())
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open a store over `backend`, loading whatever session it holds.
    pub fn open(backend: impl SessionBackend + 'static) -> Result<Self, Error> {
        let record = backend.load()?;
        debug!(
            has_credential = record.access_token.is_some(),
            "session loaded"
        );
        Ok(Self {
            backend: Box::new(backend),
            state: RwLock::new(Cached::from_record(record)),
        })
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::default()),
            state: RwLock::new(Cached::default()),
        }
    }

    /// Persist a freshly issued credential.
    ///
    /// Any previously cached identity is dropped in the same write: it
    /// belonged to the old credential and must be fetched again.
    pub fn save_credential(&self, token: &SecretString, scheme: &str) -> Result<(), Error> {
        let scheme = if scheme.trim().is_empty() {
            DEFAULT_SCHEME
        } else {
            scheme.trim()
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = Cached {
            token: Some(token.clone()),
            scheme: Some(scheme.to_owned()),
            identity: Identity::default(),
        };
        self.backend.store(&next.to_record())?;
        *state = next;
        info!("session credential saved");
        Ok(())
    }

    /// `"<scheme> <token>"`, or `None` when no credential is held.
    pub fn authorization_header_value(&self) -> Option<SecretString> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let token = state.token.as_ref()?;
        let scheme = state.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
        Some(SecretString::from(format!(
            "{scheme} {}",
            token.expose_secret()
        )))
    }

    /// Replace the cached identity, keeping the credential.
    pub fn save_identity(&self, identity: Identity) -> Result<(), Error> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut record = state.to_record();
        record.identity = identity.clone();
        self.backend.store(&record)?;
        state.identity = identity;
        debug!(user_id = ?state.identity.user_id, "session identity saved");
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity
            .clone()
    }

    /// Whether a credential is held, confirmed or not.
    pub fn has_credential(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    /// Whether a credential is held and its identity has been confirmed.
    ///
    /// A login whose identity fetch failed leaves a credential behind
    /// but is not authenticated.
    pub fn is_authenticated(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.token.is_some() && state.identity.is_confirmed()
    }

    /// Drop credential and identity together.
    ///
    /// Memory is cleared before the backend so the in-process session is
    /// gone even when the durable clear fails.
    pub fn clear_all(&self) -> Result<(), Error> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Cached::default();
        self.backend.clear()?;
        info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    fn header(store: &SessionStore) -> Option<String> {
        store
            .authorization_header_value()
            .map(|h| h.expose_secret().to_owned())
    }

    #[test]
    fn header_absent_until_credential_saved() {
        let store = SessionStore::in_memory();
        assert_eq!(header(&store), None);
        assert!(!store.has_credential());

        store.save_credential(&secret("abc"), "bearer").unwrap();
        assert_eq!(header(&store).as_deref(), Some("bearer abc"));
    }

    #[test]
    fn blank_scheme_defaults_to_bearer() {
        let store = SessionStore::in_memory();
        store.save_credential(&secret("abc"), "").unwrap();
        assert_eq!(header(&store).as_deref(), Some("bearer abc"));
    }

    #[test]
    fn authenticated_requires_confirmed_identity() {
        let store = SessionStore::in_memory();
        store.save_credential(&secret("abc"), "bearer").unwrap();
        assert!(store.has_credential());
        assert!(!store.is_authenticated());

        store
            .save_identity(Identity::new(4, "t@school.edu", "Tess", "teacher"))
            .unwrap();
        assert!(store.is_authenticated());
    }

    #[test]
    fn new_credential_drops_previous_identity() {
        let store = SessionStore::in_memory();
        store.save_credential(&secret("one"), "bearer").unwrap();
        store
            .save_identity(Identity::new(1, "a@school.edu", "A", "admin"))
            .unwrap();

        store.save_credential(&secret("two"), "bearer").unwrap();
        assert_eq!(store.identity(), Identity::default());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn clear_all_removes_everything() {
        let store = SessionStore::in_memory();
        store.save_credential(&secret("abc"), "bearer").unwrap();
        store
            .save_identity(Identity::new(1, "a@school.edu", "A", "admin"))
            .unwrap();

        store.clear_all().unwrap();
        assert_eq!(header(&store), None);
        assert_eq!(store.identity(), Identity::default());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn shared_memory_backend_survives_reopen() {
        let backend = Arc::new(MemoryBackend::default());
        let first = SessionStore::open(Arc::clone(&backend)).unwrap();
        first.save_credential(&secret("abc"), "bearer").unwrap();
        first
            .save_identity(Identity::new(9, "n@school.edu", "Nia", "teacher"))
            .unwrap();
        drop(first);

        let second = SessionStore::open(backend).unwrap();
        assert!(second.is_authenticated());
        assert_eq!(second.identity().display_name.as_deref(), Some("Nia"));
    }

    #[test]
    fn file_backend_round_trips_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert!(!store.has_credential());
        store.save_credential(&secret("tok"), "bearer").unwrap();
        store
            .save_identity(Identity::new(3, "r@school.edu", "Ravi", "teacher"))
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_file_name("session.json.tmp").exists());

        let reopened = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert_eq!(header(&reopened).as_deref(), Some("bearer tok"));
        assert_eq!(reopened.identity().user_id, Some(3));

        reopened.clear_all().unwrap();
        assert!(!path.exists());
        let after_clear = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert!(!after_clear.has_credential());
    }

    #[test]
    fn corrupt_file_opens_signed_out_and_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let backend = FileBackend::new(&path);

        let store = SessionStore::open(backend.clone()).unwrap();
        assert!(!store.has_credential());
        assert!(!store.is_authenticated());
        assert!(!path.exists());
        assert_eq!(
            std::fs::read_to_string(backend.quarantine_path()).unwrap(),
            "{not json"
        );

        store.clear_all().unwrap();
        store.save_credential(&secret("fresh"), "bearer").unwrap();
        let reopened = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert_eq!(header(&reopened).as_deref(), Some("bearer fresh"));
    }

    #[test]
    fn record_debug_redacts_token() {
        let record = SessionRecord {
            access_token: Some("super-secret".into()),
            token_type: Some("bearer".into()),
            identity: Identity::default(),
        };
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
