//! File-backed token store for persisting login state.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use tripkit_core::types::ApiUrl;
use tripkit_core::{AccessToken, RefreshToken, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    api: String,
    access_token: String,
    refresh_token: Option<String>,
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "tripkit").context("Could not determine config directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// A [`TokenStore`] persisted as a JSON file.
///
/// The session client writes refreshed tokens through this store, so the
/// on-disk session stays current without explicit save calls. Store
/// operations are infallible per the trait contract; persistence failures
/// are logged and the in-memory pair stays authoritative.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    api: ApiUrl,
    cache: RwLock<CachedPair>,
}

#[derive(Debug, Default)]
struct CachedPair {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

impl FileTokenStore {
    /// Create an empty store for a new session with the given API.
    pub fn create(api: ApiUrl) -> Result<Self> {
        Ok(Self::at_path(session_path()?, api))
    }

    /// Load the stored session, if any.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(session_path()?)
    }

    fn at_path(path: PathBuf, api: ApiUrl) -> Self {
        Self {
            path,
            api,
            cache: RwLock::new(CachedPair::default()),
        }
    }

    fn load_from(path: PathBuf) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).context("Failed to read session file")?;
        let stored: StoredSession = serde_json::from_str(&json).context("Invalid session file")?;

        let api = ApiUrl::new(&stored.api).context("Invalid API URL in session")?;

        Ok(Some(Self {
            path,
            api,
            cache: RwLock::new(CachedPair {
                access: Some(AccessToken::new(stored.access_token)),
                refresh: stored.refresh_token.map(RefreshToken::new),
            }),
        }))
    }

    /// Returns the API base URL this session belongs to.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    fn persist(&self, pair: &CachedPair) {
        let Some(ref access) = pair.access else {
            return;
        };

        let stored = StoredSession {
            api: self.api.to_string(),
            access_token: access.as_str().to_string(),
            refresh_token: pair.refresh.as_ref().map(|t| t.as_str().to_string()),
        };

        if let Err(e) = self.write_file(&stored) {
            tracing::warn!(error = %e, "failed to persist session file");
        }
    }

    fn write_file(&self, stored: &StoredSession) -> Result<()> {
        let json = serde_json::to_string_pretty(stored)?;
        fs::write(&self.path, &json).context("Failed to write session file")?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<AccessToken> {
        self.cache.read().unwrap().access.clone()
    }

    fn refresh_token(&self) -> Option<RefreshToken> {
        self.cache.read().unwrap().refresh.clone()
    }

    fn set_tokens(&self, access: AccessToken, refresh: Option<RefreshToken>) {
        let mut cache = self.cache.write().unwrap();
        cache.access = Some(access);
        cache.refresh = refresh;
        self.persist(&cache);
    }

    fn clear(&self) {
        let mut cache = self.cache.write().unwrap();
        cache.access = None;
        cache.refresh = None;

        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(error = %e, "failed to remove session file");
            }
        }
    }
}
