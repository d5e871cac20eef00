//! Persistence backends for the switch collection.
//!
//! The whole collection is read at startup and written back in full after
//! every mutation. There is no incremental update path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::types::Switch;

/// Key under which the switch collection is stored.
pub const STORAGE_KEY: &str = "deadMansSwitches";

/// Wholesale load/save of the switch collection.
pub trait SwitchRepository: Send + Sync {
    /// Read every stored switch. An empty store yields an empty list.
    fn load_all(&self) -> Result<Vec<Switch>>;

    /// Replace the stored collection.
    fn save_all(&self, switches: &[Switch]) -> Result<()>;
}

/// In-memory repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    switches: Mutex<Vec<Switch>>,
    saves: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated collection.
    pub fn with_switches(switches: Vec<Switch>) -> Self {
        Self {
            switches: Mutex::new(switches),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save_all` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of what is currently stored.
    pub fn stored(&self) -> Vec<Switch> {
        self.switches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SwitchRepository for InMemoryRepository {
    fn load_all(&self) -> Result<Vec<Switch>> {
        Ok(self.stored())
    }

    fn save_all(&self, switches: &[Switch]) -> Result<()> {
        *self.switches.lock().unwrap_or_else(|e| e.into_inner()) = switches.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Key-value JSON file, one key per collection.
///
/// The file holds a JSON object; the switch collection lives under
/// [`STORAGE_KEY`] as an array. Other keys in the file are preserved on write.
/// Writes go to a sibling temp file which is then renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    key: String,
}

impl JsonFileRepository {
    /// Store switches in `path` under the default key.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, STORAGE_KEY)
    }

    /// Store switches in `path` under a custom key.
    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }
}

impl SwitchRepository for JsonFileRepository {
    fn load_all(&self) -> Result<Vec<Switch>> {
        let mut document = self.read_document()?;
        match document.remove(&self.key) {
            Some(value) => {
                let switches: Vec<Switch> = serde_json::from_value(value)?;
                debug!(path = %self.path.display(), count = switches.len(), "Loaded switches");
                Ok(switches)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, switches: &[Switch]) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(self.key.clone(), serde_json::to_value(switches)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&Value::Object(document))?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), count = switches.len(), "Saved switches");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwitchError;
    use crate::types::NewSwitch;

    fn sample(id: &str) -> Switch {
        let new = NewSwitch::new("letter for my sister", 24).with_grace_period(12);
        Switch {
            id: id.to_string(),
            message: new.message,
            check_in_interval: new.check_in_interval,
            last_check_in: None,
            is_active: true,
            expires_at: None,
            plan_name: new.plan_name,
            grace_period: new.grace_period,
            reminders: new.reminders,
            notifications: new.notifications,
            auto_renewal: new.auto_renewal,
            emergency_contacts: new.emergency_contacts,
            custom_actions: new.custom_actions,
        }
    }

    #[test]
    fn test_file_repository_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("store.json"));
        assert!(repo.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("nested").join("store.json"));

        let switches = vec![sample("1"), sample("2")];
        repo.save_all(&switches).unwrap();

        assert_eq!(repo.load_all().unwrap(), switches);
        assert!(!repo.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_file_repository_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"auth-token": "abc"}"#).unwrap();

        let repo = JsonFileRepository::new(&path);
        repo.save_all(&[sample("1")]).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["auth-token"], "abc");
        assert_eq!(raw[STORAGE_KEY].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_file_repository_corrupt_data_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let repo = JsonFileRepository::new(&path);
        assert!(matches!(repo.load_all(), Err(SwitchError::Serialization(_))));
    }

    #[test]
    fn test_in_memory_counts_saves() {
        let repo = InMemoryRepository::new();
        repo.save_all(&[sample("1")]).unwrap();
        repo.save_all(&[]).unwrap();
        assert_eq!(repo.save_count(), 2);
        assert!(repo.stored().is_empty());
    }
}
