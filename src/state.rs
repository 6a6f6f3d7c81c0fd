//! Shared engine state.
//!
//! One [`AppState`] per process wires together the resolved configuration,
//! the tenant-scoped cache store, the API client, and the in-memory session.
//! Hosts construct it once at startup and pass it to every service call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ConfigError;
use crate::session::{load_session, SessionContext, TokenProvider};
use crate::store::{keys, CacheStore};
use crate::types::AppConfig;
use crate::util::atomic_write_str;

pub struct AppState {
    pub config: AppConfig,
    pub store: CacheStore,
    pub client: ApiClient,
    pub tokens: Arc<dyn TokenProvider>,
    /// Live session for this process; the persisted copy lives in
    /// `session.json` and is loaded at construction.
    pub session: Mutex<Option<SessionContext>>,
    data_dir: PathBuf,
}

impl AppState {
    /// Load (or create) the config at its default path and wire the engine.
    pub fn init(tokens: Arc<dyn TokenProvider>) -> Result<Self, ConfigError> {
        let config = load_or_create_config(&config_path()?)?;
        Self::new(config, tokens)
    }

    /// Wire the engine from an already-resolved config. A session persisted
    /// by an earlier launch is restored and its cache scope re-activated so
    /// cached data renders before the first hydrate completes.
    pub fn new(config: AppConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, ConfigError> {
        let data_dir = resolve_data_dir(&config)?;
        let store = CacheStore::open(&data_dir)?;

        let origin = config.api_origin();
        let client = ApiClient::new(&origin, Arc::clone(&tokens))
            .map_err(|err| ConfigError::InvalidApiUrl(format!("{origin}: {err}")))?;

        let session = match load_session(&data_dir) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("ignoring unreadable session file: {err}");
                None
            }
        };
        if let Some(session) = &session {
            if let Err(err) = store.activate_scope(session.cache_scope()) {
                log::warn!("could not reactivate cache scope: {err}");
            }
        }

        Ok(Self {
            config,
            store,
            client,
            tokens,
            session: Mutex::new(session),
            data_dir,
        })
    }

    pub fn session(&self) -> Option<SessionContext> {
        self.session.lock().clone()
    }

    pub fn set_session(&self, session: Option<SessionContext>) {
        *self.session.lock() = session;
    }

    /// Tenant id to scope API calls by: the live session's, else the cached
    /// `companyHQId` entry.
    pub fn company_hq_id(&self) -> Option<String> {
        if let Some(session) = self.session.lock().as_ref() {
            if let Some(id) = &session.company_hq_id {
                return Some(id.clone());
            }
        }
        self.store.get(keys::COMPANY_HQ_ID)
    }

    /// Signed-in owner id: the live session's, else the cached entry.
    pub fn owner_id(&self) -> Option<String> {
        if let Some(session) = self.session.lock().as_ref() {
            return Some(session.owner_id.clone());
        }
        self.store.get(keys::OWNER_ID)
    }

    /// Root for all persisted engine state (cache, session).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// The canonical config file path (`~/.ignitebd/config.json`). The config
/// itself cannot relocate this; `dataDir` only redirects cache and session
/// state.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_data_dir()?.join("config.json"))
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".ignitebd"))
}

fn resolve_data_dir(config: &AppConfig) -> Result<PathBuf, ConfigError> {
    match config.data_dir.as_deref() {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir(),
    }
}

/// Read the config file, with serde defaults covering fields older files
/// lack. On first run the defaults are written back so there is a file to
/// edit.
pub fn load_or_create_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        let json = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&json)?);
    }

    let config = AppConfig::default();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    atomic_write_str(path, &serde_json::to_string_pretty(&config)?)?;
    log::info!("created default config at {}", path.display());
    Ok(config)
}
