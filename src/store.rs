//! Tenant-scoped JSON cache under `<data_dir>/cache/`.
//!
//! Each tenant scope gets its own directory named by a hash of the scope id,
//! with one file per key. Reads never fail: a missing, unreadable, or
//! malformed entry reads as absent, and malformed files are dropped so they
//! cannot wedge the next launch. Writes require an activated scope.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::types::Contact;
use crate::util::atomic_write_str;

/// Cache entry names. One file per key inside the active scope directory.
pub mod keys {
    pub const CONTACTS: &str = "contacts";
    pub const CONTACTS_FETCHED_AT: &str = "contactsFetchedAt";
    pub const OWNER_ID: &str = "ownerId";
    pub const OWNER: &str = "owner";
    pub const COMPANY_HQ_ID: &str = "companyHQId";
    pub const COMPANY_HQ: &str = "companyHQ";
    pub const OWNER_SURVEY: &str = "ownerSurvey";
}

pub struct CacheStore {
    root: PathBuf,
    active: Mutex<Option<PathBuf>>,
}

impl CacheStore {
    /// Open (creating if needed) the cache root under `data_dir`.
    pub fn open(data_dir: &Path) -> std::io::Result<Self> {
        let root = data_dir.join("cache");
        std::fs::create_dir_all(&root)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&root, perms)?;
        }

        Ok(Self {
            root,
            active: Mutex::new(None),
        })
    }

    // =========================================================================
    // Scope lifecycle
    // =========================================================================

    /// Make `scope` the active tenant. Entries written before activation of
    /// a different scope stay in that scope's directory untouched.
    pub fn activate_scope(&self, scope: &str) -> Result<(), StoreError> {
        let dir = self.root.join(scope_dir_name(scope));
        std::fs::create_dir_all(&dir)?;
        log::debug!("cache scope activated: {}", dir.display());
        *self.active.lock() = Some(dir);
        Ok(())
    }

    /// Detach from the current scope. Subsequent reads return absent and
    /// writes fail until a scope is activated again.
    pub fn deactivate(&self) {
        *self.active.lock() = None;
        log::debug!("cache scope deactivated");
    }

    /// Delete every entry stored for `scope`. Succeeds if the scope was
    /// never written to.
    pub fn clear_scope(&self, scope: &str) -> Result<(), StoreError> {
        let dir = self.root.join(scope_dir_name(scope));
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            log::debug!("cache scope cleared: {}", dir.display());
        }
        Ok(())
    }

    fn scope_dir(&self) -> Option<PathBuf> {
        self.active.lock().clone()
    }

    // =========================================================================
    // Entry access
    // =========================================================================

    /// Read an entry. Absent on any failure: no active scope, missing file,
    /// unreadable file, or JSON that no longer matches `T` (in which case
    /// the stale file is removed).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let dir = self.scope_dir()?;
        read_entry(&dir, key)
    }

    /// Write an entry into the active scope.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let dir = self.scope_dir().ok_or(StoreError::NoScope)?;
        write_entry(&dir, key, value)
    }

    /// Delete an entry. Succeeds when the entry (or scope) is absent.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let Some(dir) = self.scope_dir() else {
            return Ok(());
        };
        let path = entry_path(&dir, key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    // =========================================================================
    // Contact list helpers
    // =========================================================================

    /// The cached contact list, empty when nothing has been fetched yet.
    pub fn read_contacts(&self) -> Vec<Contact> {
        self.get(keys::CONTACTS).unwrap_or_default()
    }

    /// Replace the cached contact list with a fresh server result and stamp
    /// the fetch time.
    pub fn write_contacts(&self, contacts: &[Contact]) -> Result<(), StoreError> {
        let dir = self.scope_dir().ok_or(StoreError::NoScope)?;
        write_entry(&dir, keys::CONTACTS, &contacts)?;
        write_entry(&dir, keys::CONTACTS_FETCHED_AT, &Utc::now())
    }

    /// Apply a local mutation to the cached contact list under the store
    /// lock and persist the result. The fetch stamp is left alone: local
    /// edits do not make the cache fresher.
    pub fn update_contacts<F>(&self, mutate: F) -> Result<Vec<Contact>, StoreError>
    where
        F: FnOnce(Vec<Contact>) -> Vec<Contact>,
    {
        let guard = self.active.lock();
        let dir = guard.as_deref().ok_or(StoreError::NoScope)?;
        let current: Vec<Contact> = read_entry(dir, keys::CONTACTS).unwrap_or_default();
        let next = mutate(current);
        write_entry(dir, keys::CONTACTS, &next)?;
        Ok(next)
    }

    /// When the contact list was last replaced from the server.
    pub fn contacts_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.get(keys::CONTACTS_FETCHED_AT)
    }
}

/// Scope directory name: first eight bytes of the SHA-256 of the scope id,
/// hex encoded. Stable across launches, filesystem-safe for any tenant id.
fn scope_dir_name(scope: &str) -> String {
    let digest = Sha256::digest(scope.as_bytes());
    hex::encode(&digest[..8])
}

fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_entry<T: DeserializeOwned>(dir: &Path, key: &str) -> Option<T> {
    let path = entry_path(dir, key);
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            log::warn!("cache read failed for {}: {err}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("dropping malformed cache entry {}: {err}", path.display());
            let _ = std::fs::remove_file(&path);
            None
        }
    }
}

fn write_entry<T: Serialize>(dir: &Path, key: &str, value: &T) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string(value)?;
    atomic_write_str(&entry_path(dir, key), &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str) -> Contact {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "firstName": "Test",
            "lastName": id,
        }))
        .unwrap()
    }

    fn open_store(dir: &Path) -> CacheStore {
        CacheStore::open(dir).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();

        store.put(keys::COMPANY_HQ_ID, &"hq-1").unwrap();
        let value: Option<String> = store.get(keys::COMPANY_HQ_ID);
        assert_eq!(value.as_deref(), Some("hq-1"));
    }

    #[test]
    fn test_reads_require_scope_but_never_fail() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());

        let value: Option<String> = store.get(keys::OWNER_ID);
        assert!(value.is_none());
        assert!(store.read_contacts().is_empty());

        let err = store.put(keys::OWNER_ID, &"o-1").unwrap_err();
        assert!(matches!(err, StoreError::NoScope));
        store.remove(keys::OWNER_ID).unwrap();
    }

    #[test]
    fn test_malformed_entry_reads_absent_and_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();
        store.put(keys::CONTACTS, &vec![contact("c-1")]).unwrap();

        let path = dir
            .path()
            .join("cache")
            .join(scope_dir_name("hq-1"))
            .join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(store.read_contacts().is_empty());
        assert!(!path.exists());
        // The next write starts clean.
        store.write_contacts(&[contact("c-2")]).unwrap();
        assert_eq!(store.read_contacts().len(), 1);
    }

    #[test]
    fn test_scopes_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());

        store.activate_scope("hq-1").unwrap();
        store.write_contacts(&[contact("a")]).unwrap();

        store.activate_scope("hq-2").unwrap();
        assert!(store.read_contacts().is_empty());
        store.write_contacts(&[contact("b"), contact("c")]).unwrap();

        store.activate_scope("hq-1").unwrap();
        let contacts = store.read_contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, "a");
    }

    #[test]
    fn test_clear_scope_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();
        store.put(keys::OWNER_ID, &"o-1").unwrap();

        store.clear_scope("hq-1").unwrap();
        let value: Option<String> = store.get(keys::OWNER_ID);
        assert!(value.is_none());

        // Clearing a scope that was never written to is fine.
        store.clear_scope("hq-9").unwrap();
    }

    #[test]
    fn test_write_contacts_stamps_fetch_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();

        assert!(store.contacts_fetched_at().is_none());
        store.write_contacts(&[contact("a")]).unwrap();
        assert!(store.contacts_fetched_at().is_some());
    }

    #[test]
    fn test_update_contacts_applies_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();
        store.write_contacts(&[contact("a"), contact("b")]).unwrap();

        let updated = store
            .update_contacts(|contacts| {
                contacts.into_iter().filter(|c| c.id != "a").collect()
            })
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(store.read_contacts(), updated);
    }

    #[test]
    fn test_scope_dir_name_is_stable_hex() {
        let name = scope_dir_name("hq-1");
        assert_eq!(name.len(), 16);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(name, scope_dir_name("hq-1"));
        assert_ne!(name, scope_dir_name("hq-2"));
    }

    #[test]
    fn test_remove_deletes_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.activate_scope("hq-1").unwrap();
        store.put(keys::OWNER_ID, &"o-1").unwrap();
        store.put(keys::COMPANY_HQ_ID, &"hq-1").unwrap();

        store.remove(keys::OWNER_ID).unwrap();
        let owner: Option<String> = store.get(keys::OWNER_ID);
        assert!(owner.is_none());
        let hq: Option<String> = store.get(keys::COMPANY_HQ_ID);
        assert_eq!(hq.as_deref(), Some("hq-1"));
        // Removing again is fine.
        store.remove(keys::OWNER_ID).unwrap();
    }
}
