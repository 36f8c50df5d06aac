//! Persisted session store. One JSON record per domain, durable across
//! process restarts, resilient to corrupt or partially-written data: anything
//! that does not parse back into a well-formed record reads as "never logged
//! in." Write failures are logged and swallowed, matching best-effort browser
//! storage semantics.

use super::Domain;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::warn;

/// Raw string storage keyed by record name. Implementations only move bytes;
/// serialization lives in [`SessionStore`].
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Durable backend keeping one JSON file per key under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Volatile backend for tests and embed contexts without durable storage.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Serializing wrapper over a [`StorageBackend`]. `clear` followed by `load`
/// always reads absent; writes are synchronous from the caller's perspective.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Durable store under `dir`, one file per domain.
    #[must_use]
    pub fn on_disk(dir: PathBuf) -> Self {
        Self::new(Arc::new(FileStorage::new(dir)))
    }

    /// Volatile store for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Loads the record for `domain`. Missing or malformed data reads as
    /// `None`, never an error.
    pub fn load<T: DeserializeOwned>(&self, domain: Domain) -> Option<T> {
        let key = domain.storage_key();
        let raw = self.backend.read(key)?;

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Ignoring malformed {key} record: {err}");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, domain: Domain, record: &T) {
        let key = domain.storage_key();
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to encode {key} record: {err}");
                return;
            }
        };

        if let Err(err) = self.backend.write(key, &raw) {
            warn!("Failed to persist {key} record: {err}");
        }
    }

    pub fn clear(&self, domain: Domain) {
        let key = domain.storage_key();
        if let Err(err) = self.backend.remove(key) {
            warn!("Failed to clear {key} record: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AdminSession, CompanySession};
    use std::{env, fs};

    fn company_record() -> CompanySession {
        CompanySession {
            token: "tok-1".to_string(),
            company_id: "acme".to_string(),
            display_name: "Acme Corp".to_string(),
        }
    }

    #[test]
    fn save_load_clear_roundtrip() {
        let store = SessionStore::in_memory();

        assert!(store.load::<CompanySession>(Domain::Company).is_none());

        store.save(Domain::Company, &company_record());
        assert_eq!(
            store.load::<CompanySession>(Domain::Company),
            Some(company_record())
        );

        store.clear(Domain::Company);
        assert!(store.load::<CompanySession>(Domain::Company).is_none());
    }

    #[test]
    fn domains_are_independently_keyed() {
        let store = SessionStore::in_memory();

        store.save(Domain::Company, &company_record());
        assert!(store.load::<AdminSession>(Domain::Admin).is_none());

        store.clear(Domain::Admin);
        assert!(store.load::<CompanySession>(Domain::Company).is_some());
    }

    #[test]
    fn malformed_data_reads_as_absent() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .write(Domain::Company.storage_key(), "{not json")
            .expect("write");

        let store = SessionStore::new(backend);
        assert!(store.load::<CompanySession>(Domain::Company).is_none());
    }

    #[test]
    fn clear_is_a_no_op_when_absent() {
        let store = SessionStore::in_memory();
        store.clear(Domain::Company);
        assert!(store.load::<CompanySession>(Domain::Company).is_none());
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = env::temp_dir().join(format!("pordisto-store-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let store = SessionStore::on_disk(dir.clone());
        store.save(Domain::Company, &company_record());

        // A fresh store over the same directory sees the record.
        let reopened = SessionStore::on_disk(dir.clone());
        assert_eq!(
            reopened.load::<CompanySession>(Domain::Company),
            Some(company_record())
        );

        reopened.clear(Domain::Company);
        assert!(reopened.load::<CompanySession>(Domain::Company).is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
