use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::TokenStore;

const SESSION_FILE_VERSION: u32 = 1;

/// Persistence for a [`TokenStore`] between process runs.
pub trait SessionStore: Send + Sync {
    fn load(&self, profile: &str) -> Result<Option<TokenStore>, AuthError>;
    fn save(&self, profile: &str, store: &TokenStore) -> Result<(), AuthError>;
    fn clear(&self, profile: &str) -> Result<(), AuthError>;
}

/// One TOML file per profile under a base directory.
///
/// # Example
/// ```no_run
/// use tenantctl::auth::{FileSessionStore, SessionStore, TokenStore};
///
/// let sessions = FileSessionStore::new(std::path::PathBuf::from("/tmp/tenantctl"));
/// sessions.save("default", &TokenStore::default())?;
/// # Ok::<(), tenantctl::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn session_path(&self, profile: &str) -> PathBuf {
        let profile = normalize_label(profile);
        let name = if profile == "default" {
            "session.toml".to_string()
        } else {
            format!("session.{profile}.toml")
        };
        self.base_dir.join(name)
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, profile: &str) -> Result<Option<TokenStore>, AuthError> {
        let path = self.session_path(profile);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        if file.version != SESSION_FILE_VERSION {
            return Err(AuthError::Serialization(format!(
                "unsupported session file version {}",
                file.version
            )));
        }
        Ok(Some(file.session))
    }

    fn save(&self, profile: &str, store: &TokenStore) -> Result<(), AuthError> {
        let path = self.session_path(profile);
        Self::ensure_parent(&path)?;
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            profile: profile.to_string(),
            saved_at: Utc::now(),
            session: store.clone(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, profile: &str) -> Result<(), AuthError> {
        let path = self.session_path(profile);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    profile: String,
    saved_at: DateTime<Utc>,
    session: TokenStore,
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
