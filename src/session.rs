//! Sign-in session state and auth-failure routing.
//!
//! The engine never navigates anywhere itself. Auth failures are classified
//! into [`GuardVerdict`]s and the embedding shell decides what to do with
//! the returned [`Route`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, StoreError};
use crate::util::atomic_write_str;

const SESSION_FILE: &str = "session.json";

// =============================================================================
// Token provider
// =============================================================================

/// Source of the bearer token attached to API requests.
///
/// The engine does not own authentication; the embedding shell (Firebase
/// today) does. `None` means "send the request unauthenticated" so that
/// public endpoints keep working before sign-in.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, mainly for tests and scripts.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { token: token.into() })
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Provider for the signed-out state.
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

// =============================================================================
// Session context
// =============================================================================

/// Who is signed in, persisted across launches at `<data_dir>/session.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub owner_id: String,
    #[serde(default, rename = "companyHQId")]
    pub company_hq_id: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(owner_id: impl Into<String>, company_hq_id: Option<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            company_hq_id,
            signed_in_at: Utc::now(),
        }
    }

    /// The tenant scope this session caches under: the CompanyHQ id when
    /// one exists, otherwise the owner id (pre-company-setup accounts).
    pub fn cache_scope(&self) -> &str {
        self.company_hq_id.as_deref().unwrap_or(&self.owner_id)
    }
}

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// Persist the session, creating the data dir with restrictive permissions.
pub fn save_session(data_dir: &Path, session: &SessionContext) -> Result<(), StoreError> {
    std::fs::create_dir_all(data_dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        std::fs::set_permissions(data_dir, perms)?;
    }

    let path = session_path(data_dir);
    let json = serde_json::to_string_pretty(session)?;
    atomic_write_str(&path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)?;
    }

    log::debug!("saved session for owner {}", session.owner_id);
    Ok(())
}

/// Load the persisted session. `Ok(None)` when no one has signed in on
/// this machine.
pub fn load_session(data_dir: &Path) -> Result<Option<SessionContext>, StoreError> {
    let path = session_path(data_dir);
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(&path)?;
    let session = serde_json::from_str(&json)?;
    Ok(Some(session))
}

/// Remove the persisted session. Succeeds if none exists.
pub fn delete_session(data_dir: &Path) -> Result<(), StoreError> {
    let path = session_path(data_dir);
    if path.exists() {
        std::fs::remove_file(&path)?;
        log::debug!("deleted persisted session");
    }
    Ok(())
}

// =============================================================================
// Route guard
// =============================================================================

/// Destinations the engine can ask the shell to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    SignUp,
    ProfileSetup,
    CompanySetup,
    Dashboard,
    ContactList,
    Recovery,
}

impl Route {
    /// Shell-side path for this destination.
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignUp => "/signup",
            Route::ProfileSetup => "/profilesetup",
            Route::CompanySetup => "/company/create-or-choose",
            Route::Dashboard => "/growth-dashboard",
            Route::ContactList => "/contacts",
            Route::Recovery => "/page-not-found",
        }
    }
}

/// What the caller should do about an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Not an auth problem (or a soft one): surface or swallow it locally.
    HandleLocally,
    /// Hard auth failure: the session is unusable, send the user here.
    Redirect(Route),
}

/// Classify an API failure. Only a hard 401 (authenticated request outside
/// the read-path allowlist) forces navigation; soft 401s stay local so
/// cached data keeps rendering.
pub fn guard(err: &ApiError) -> GuardVerdict {
    if err.is_hard_unauthorized() {
        GuardVerdict::Redirect(Route::Recovery)
    } else {
        GuardVerdict::HandleLocally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionContext::new("owner-1", Some("hq-1".to_string()));

        save_session(dir.path(), &session).unwrap();
        let loaded = load_session(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_session_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_delete_session_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        delete_session(dir.path()).unwrap();

        let session = SessionContext::new("owner-1", None);
        save_session(dir.path(), &session).unwrap();
        delete_session(dir.path()).unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());
        delete_session(dir.path()).unwrap();
    }

    #[test]
    fn test_cache_scope_prefers_company_hq() {
        let session = SessionContext::new("owner-1", Some("hq-1".to_string()));
        assert_eq!(session.cache_scope(), "hq-1");

        let session = SessionContext::new("owner-1", None);
        assert_eq!(session.cache_scope(), "owner-1");
    }

    #[test]
    fn test_session_serializes_company_hq_id_key() {
        let session = SessionContext::new("owner-1", Some("hq-1".to_string()));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json.get("companyHQId").unwrap(), "hq-1");
        assert_eq!(json.get("ownerId").unwrap(), "owner-1");
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let session = SessionContext::new("owner-1", None);
        save_session(dir.path(), &session).unwrap();

        let meta = std::fs::metadata(dir.path().join("session.json")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_guard_redirects_only_hard_unauthorized() {
        let hard = ApiError::Unauthorized {
            path: "/api/companyhq/create".to_string(),
            soft: false,
        };
        assert_eq!(guard(&hard), GuardVerdict::Redirect(Route::Recovery));

        let soft = ApiError::Unauthorized {
            path: "/api/owner/hydrate".to_string(),
            soft: true,
        };
        assert_eq!(guard(&soft), GuardVerdict::HandleLocally);

        let other = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(guard(&other), GuardVerdict::HandleLocally);
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Dashboard.path(), "/growth-dashboard");
        assert_eq!(Route::Recovery.path(), "/page-not-found");
        assert_eq!(Route::CompanySetup.path(), "/company/create-or-choose");
    }
}
