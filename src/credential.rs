//! Credential storage for the Devin API token.
//!
//! A token can come from two independent sources: the `DEVIN_API_KEY`
//! environment variable and a file in the CLI's configuration directory. The
//! environment always wins for a lookup, and neither source ever writes to
//! the other. Writes to the file are atomic (temp file + rename) and
//! owner-only on unix.

use std::{
    env, fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::config::token_file_path;
use crate::constants::DEVIN_API_KEY_ENV;
use crate::error::SessionError;

/// An API token. `Debug` and `Display` never reveal the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, trimming surrounding whitespace. Blank tokens are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, SessionError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SessionError::Validation("API token must not be empty".into()));
        }
        Ok(Credential(trimmed.to_string()))
    }

    /// The plaintext token, for the authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

const MASK_KEEP: usize = 4;

/// Display form of a secret: first and last four characters around `...`.
/// Secrets too short to hide a middle segment mask to `***`.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= MASK_KEEP * 2 {
        return "***".to_string();
    }
    let head: String = chars[..MASK_KEEP].iter().collect();
    let tail: String = chars[chars.len() - MASK_KEEP..].iter().collect();
    format!("{head}...{tail}")
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment(String),
    File(PathBuf),
    Memory,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment(key) => write!(f, "environment variable {key}"),
            CredentialSource::File(path) => write!(f, "saved token at {}", path.display()),
            CredentialSource::Memory => f.write_str("in-memory store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Outcome of checking a credential against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidity {
    Valid,
    /// The service rejected the credential (401/403).
    Invalid(String),
    /// The service could not be reached; says nothing about the credential.
    Unreachable(String),
}

/// Persistence for the single active credential of the current user.
pub trait CredentialStore {
    /// Resolve the active credential and report its source.
    fn lookup(&self) -> Option<StoredCredential>;

    /// Persist `credential`, replacing any previous value.
    fn set_credential(&self, credential: &Credential) -> Result<(), SessionError>;

    /// Delete the persisted credential. Returns whether anything was removed.
    fn remove_credential(&self) -> Result<bool, SessionError>;

    /// Human-readable location of the persisted copy.
    fn location(&self) -> String;

    fn get_credential(&self) -> Option<Credential> {
        self.lookup().map(|stored| stored.credential)
    }

    fn require_credential(&self) -> Result<Credential, SessionError> {
        self.get_credential().ok_or(SessionError::MissingCredential)
    }
}

/// File-backed store with an environment-variable override.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    env_key: Option<String>,
}

impl FileCredentialStore {
    /// Store at `path` that also honours `DEVIN_API_KEY`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore {
            path: path.into(),
            env_key: Some(DEVIN_API_KEY_ENV.to_string()),
        }
    }

    /// Store at the default location under the configuration directory.
    pub fn from_default_location() -> Self {
        Self::new(token_file_path())
    }

    /// Replace the environment variable consulted before the file.
    pub fn with_env_key(mut self, key: impl Into<String>) -> Self {
        self.env_key = Some(key.into());
        self
    }

    /// Consult only the file.
    pub fn without_env(mut self) -> Self {
        self.env_key = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn env_credential(&self) -> Option<StoredCredential> {
        let key = self.env_key.as_deref()?;
        let value = env::var(key).ok()?;
        let credential = Credential::new(value).ok()?;
        Some(StoredCredential {
            credential,
            source: CredentialSource::Environment(key.to_string()),
        })
    }

    fn file_credential(&self) -> Option<StoredCredential> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read saved token");
                return None;
            }
        };
        match Credential::new(data) {
            Ok(credential) => Some(StoredCredential {
                credential,
                source: CredentialSource::File(self.path.clone()),
            }),
            Err(_) => {
                tracing::warn!(path = %self.path.display(), "saved token file is empty");
                None
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn lookup(&self) -> Option<StoredCredential> {
        self.env_credential().or_else(|| self.file_credential())
    }

    fn set_credential(&self, credential: &Credential) -> Result<(), SessionError> {
        write_secret_atomic(&self.path, credential.expose())?;
        tracing::debug!(path = %self.path.display(), "saved token");
        Ok(())
    }

    fn remove_credential(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed saved token");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `content` to `path` through a sibling temp file so readers never see
/// a partially written secret.
fn write_secret_atomic(path: &Path, content: &str) -> io::Result<()> {
    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let temp_name = format!(
        ".{}.tmp-{}-{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("token"),
        std::process::id(),
        nanos
    );
    let temp_path = parent_dir.join(temp_name);

    let result = (|| {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// In-memory store. `env` plays the role of the environment variable and
/// shadows the stored value the same way the real store does.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    env: Option<Credential>,
    stored: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(credential: Credential) -> Self {
        MemoryCredentialStore {
            env: None,
            stored: Mutex::new(Some(credential)),
        }
    }

    pub fn with_env(mut self, credential: Credential) -> Self {
        self.env = Some(credential);
        self
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        self.stored.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn lookup(&self) -> Option<StoredCredential> {
        if let Some(credential) = &self.env {
            return Some(StoredCredential {
                credential: credential.clone(),
                source: CredentialSource::Environment("memory".into()),
            });
        }
        self.slot().clone().map(|credential| StoredCredential {
            credential,
            source: CredentialSource::Memory,
        })
    }

    fn set_credential(&self, credential: &Credential) -> Result<(), SessionError> {
        *self.slot() = Some(credential.clone());
        Ok(())
    }

    fn remove_credential(&self) -> Result<bool, SessionError> {
        Ok(self.slot().take().is_some())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
