//! Session credential store
//!
//! Holds the bearer token and user id between runs. Values are written to
//! `{data_dir}/session.json` with an expiry (7 days by default) and are
//! readable only by the owner on Unix. A missing, expired or unreadable
//! value reads as "not logged in"; readers never fail.
//!
//! The store is cheap to clone and shared by everything that needs it:
//! login writes it, logout and the 401 handler clear it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CredentialError;

/// Default lifetime of stored credentials
pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// Cross-site policy for stored credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Only sent to the origin the credential was issued for
    Strict,
    /// Sent anywhere
    None,
}

/// How new credentials are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPolicy {
    /// How long a written value stays valid
    pub lifetime: Duration,
    /// Only attach over https
    pub secure: bool,
    pub same_site: SameSite,
    /// Origin credentials are issued for, e.g. `https://api.example.com`
    pub origin: Option<String>,
}

impl CredentialPolicy {
    /// Policy for a given API base URL
    ///
    /// Production sessions are secure and strictly same-origin.
    pub fn for_api(api_url: &str, production: bool) -> Self {
        let origin = Url::parse(api_url)
            .ok()
            .map(|u| u.origin().ascii_serialization());
        Self {
            lifetime: Duration::days(SESSION_LIFETIME_DAYS),
            secure: production,
            same_site: if production {
                SameSite::Strict
            } else {
                SameSite::None
            },
            origin,
        }
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(SESSION_LIFETIME_DAYS),
            secure: false,
            same_site: SameSite::None,
            origin: None,
        }
    }
}

/// One persisted value with its attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
    secure: bool,
    same_site: SameSite,
    #[serde(default)]
    origin: Option<String>,
}

impl StoredValue {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether this value may be sent with a request to `url`
    fn allowed_for(&self, url: &Url) -> bool {
        if self.secure && url.scheme() != "https" {
            return false;
        }
        match (self.same_site, &self.origin) {
            (SameSite::Strict, Some(origin)) => url.origin().ascii_serialization() == *origin,
            _ => true,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
struct SessionFile {
    #[serde(default)]
    token: Option<StoredValue>,
    #[serde(default)]
    user_id: Option<StoredValue>,
}

impl SessionFile {
    fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_id.is_none()
    }
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    policy: CredentialPolicy,
    session: SessionFile,
}

/// Values to attach to an outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

/// Process-wide session storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<Mutex<Inner>>,
}

impl CredentialStore {
    /// Open the store backed by `path`, loading any saved session
    ///
    /// An unreadable or malformed file is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>, policy: CredentialPolicy) -> Self {
        let path = path.into();
        let session = match load_session(&path) {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding saved session: {}", e);
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove session file {:?}: {}", path, e);
                }
                SessionFile::default()
            }
        };

        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: Some(path),
                policy,
                session,
            })),
        }
    }

    /// A store that is never written to disk
    pub fn in_memory(policy: CredentialPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: None,
                policy,
                session: SessionFile::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store the bearer token
    pub fn set_token(&self, token: &str) -> Result<(), CredentialError> {
        let mut inner = self.lock();
        inner.session.token = Some(inner.new_value(token));
        inner.persist()
    }

    /// Current bearer token, if present and not expired
    pub fn token(&self) -> Option<String> {
        let inner = self.lock();
        live(&inner.session.token).map(|v| v.value.clone())
    }

    /// Store the user identifier
    pub fn set_user_id(&self, user_id: &str) -> Result<(), CredentialError> {
        let mut inner = self.lock();
        inner.session.user_id = Some(inner.new_value(user_id));
        inner.persist()
    }

    /// Current user identifier, if present and not expired
    pub fn user_id(&self) -> Option<String> {
        let inner = self.lock();
        live(&inner.session.user_id).map(|v| v.value.clone())
    }

    /// Whether a live token is stored
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// When the current token expires
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let inner = self.lock();
        live(&inner.session.token).map(|v| v.expires_at)
    }

    /// Credentials that may be attached to a request for `url`
    pub fn for_request(&self, url: &Url) -> RequestCredentials {
        let inner = self.lock();
        let pick = |slot: &Option<StoredValue>| {
            live(slot)
                .filter(|v| v.allowed_for(url))
                .map(|v| v.value.clone())
        };
        RequestCredentials {
            token: pick(&inner.session.token),
            user_id: pick(&inner.session.user_id),
        }
    }

    /// Forget everything, in memory and on disk
    ///
    /// Safe to call any number of times.
    pub fn remove_all(&self) -> Result<(), CredentialError> {
        let mut inner = self.lock();
        inner.session = SessionFile::default();
        let Some(path) = inner.path.clone() else {
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed session file {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialError::Write { path, source }),
        }
    }
}

impl Inner {
    fn new_value(&self, value: &str) -> StoredValue {
        StoredValue {
            value: value.to_string(),
            expires_at: Utc::now() + self.policy.lifetime,
            secure: self.policy.secure,
            same_site: self.policy.same_site,
            origin: self.policy.origin.clone(),
        }
    }

    fn persist(&self) -> Result<(), CredentialError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if self.session.is_empty() {
            return match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(CredentialError::Write {
                    path: path.clone(),
                    source: e,
                }),
                _ => Ok(()),
            };
        }

        let json = serde_json::to_vec_pretty(&self.session).map_err(|e| {
            CredentialError::Corrupt {
                path: path.clone(),
                details: e.to_string(),
            }
        })?;
        write_private(path, &json).map_err(|source| CredentialError::Write {
            path: path.clone(),
            source,
        })
    }
}

fn live(slot: &Option<StoredValue>) -> Option<&StoredValue> {
    slot.as_ref().filter(|v| v.is_live(Utc::now()))
}

fn load_session(path: &Path) -> Result<SessionFile, CredentialError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SessionFile::default()),
        Err(source) => {
            return Err(CredentialError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| CredentialError::Corrupt {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

/// Write via a temp file and rename, owner-only on Unix
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_missing_values_read_as_logged_out() {
        let store = CredentialStore::in_memory(CredentialPolicy::default());
        assert!(store.token().is_none());
        assert!(store.user_id().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        {
            let store = CredentialStore::open(&path, CredentialPolicy::default());
            store.set_token("tok-1").unwrap();
            store.set_user_id("42").unwrap();
        }

        let store = CredentialStore::open(&path, CredentialPolicy::default());
        assert_eq!(store.token().as_deref(), Some("tok-1"));
        assert_eq!(store.user_id().as_deref(), Some("42"));
        assert!(store.expires_at().unwrap() > Utc::now() + Duration::days(6));
    }

    #[test]
    fn test_expired_values_are_ignored() {
        let policy = CredentialPolicy {
            lifetime: Duration::seconds(-1),
            ..CredentialPolicy::default()
        };
        let store = CredentialStore::in_memory(policy);
        store.set_token("old").unwrap();
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_remove_all_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let store = CredentialStore::open(&path, CredentialPolicy::default());

        store.set_token("tok").unwrap();
        store.set_user_id("7").unwrap();
        assert!(path.exists());

        store.remove_all().unwrap();
        assert!(!path.exists());
        assert!(store.token().is_none());
        assert!(store.user_id().is_none());

        store.remove_all().unwrap();
        store.remove_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CredentialStore::in_memory(CredentialPolicy::default());
        let other = store.clone();
        store.set_token("shared").unwrap();
        assert_eq!(other.token().as_deref(), Some("shared"));
        other.remove_all().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = CredentialStore::open(&path, CredentialPolicy::default());
        assert!(store.token().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_unremovable_session_path_starts_logged_out() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the session file should be can be neither read
        // nor removed as a file
        let path = temp_dir.path().join("session.json");
        fs::create_dir(&path).unwrap();

        let store = CredentialStore::open(&path, CredentialPolicy::default());
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
        assert!(path.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let store = CredentialStore::open(&path, CredentialPolicy::default());
        store.set_token("tok").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_secure_credentials_need_https() {
        let policy = CredentialPolicy::for_api("https://api.example.com", true);
        let store = CredentialStore::in_memory(policy);
        store.set_token("tok").unwrap();
        store.set_user_id("1").unwrap();

        let creds = store.for_request(&url("https://api.example.com/api/v1/cards/"));
        assert_eq!(creds.token.as_deref(), Some("tok"));
        assert_eq!(creds.user_id.as_deref(), Some("1"));

        let creds = store.for_request(&url("http://api.example.com/api/v1/cards/"));
        assert_eq!(creds, RequestCredentials::default());
    }

    #[test]
    fn test_strict_credentials_stay_on_origin() {
        let policy = CredentialPolicy::for_api("https://api.example.com", true);
        let store = CredentialStore::in_memory(policy);
        store.set_token("tok").unwrap();

        assert!(store
            .for_request(&url("https://evil.example.net/api/v1/cards/"))
            .token
            .is_none());
    }

    #[test]
    fn test_development_policy_allows_plain_http() {
        let policy = CredentialPolicy::for_api("http://localhost:8000", false);
        let store = CredentialStore::in_memory(policy);
        store.set_token("tok").unwrap();

        let creds = store.for_request(&url("http://localhost:8000/api/v1/cards/"));
        assert_eq!(creds.token.as_deref(), Some("tok"));
    }
}
