//! Protection state persistence
//!
//! The on/off flag is stored as `{"isEnabled": bool}`. A `Guard` reads it
//! once through a `ProtectionSwitch` and writes it back on every toggle.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Persisted protection flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionState {
    #[serde(rename = "isEnabled", default)]
    pub enabled: bool,
}

/// Trait for persisting the protection flag
pub trait ProtectionStateStore: Send + Sync {
    /// Save the flag
    fn save(&self, state: ProtectionState) -> Result<()>;

    /// Load the flag; a store that was never written yields the default (disabled)
    fn load(&self) -> Result<ProtectionState>;
}

/// JSON file-based state store
///
/// Atomic writes via temp file + rename to prevent corruption.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProtectionStateStore for FileStateStore {
    fn save(&self, state: ProtectionState) -> Result<()> {
        let json = serde_json::to_string_pretty(&state)?;
        let tmp_path = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GuardError::State(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        std::fs::write(&tmp_path, json).map_err(|e| {
            GuardError::State(format!(
                "Failed to write state file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            GuardError::State(format!(
                "Failed to rename state file {} → {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            enabled = state.enabled,
            "Protection state saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<ProtectionState> {
        if !self.path.exists() {
            return Ok(ProtectionState::default());
        }

        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            GuardError::State(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let state: ProtectionState = serde_json::from_str(&json).map_err(|e| {
            GuardError::State(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            enabled = state.enabled,
            "Protection state loaded"
        );
        Ok(state)
    }
}

/// In-memory state store for testing
#[derive(Default)]
pub struct MemoryStateStore {
    state: std::sync::RwLock<Option<ProtectionState>>,
}

impl MemoryStateStore {
    /// Store pre-seeded with a flag value
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            state: std::sync::RwLock::new(Some(ProtectionState { enabled })),
        }
    }
}

impl ProtectionStateStore for MemoryStateStore {
    fn save(&self, state: ProtectionState) -> Result<()> {
        let mut slot = self
            .state
            .write()
            .map_err(|e| GuardError::State(format!("Failed to acquire state lock: {}", e)))?;
        *slot = Some(state);
        Ok(())
    }

    fn load(&self) -> Result<ProtectionState> {
        let slot = self
            .state
            .read()
            .map_err(|e| GuardError::State(format!("Failed to acquire state lock: {}", e)))?;
        Ok(slot.unwrap_or_default())
    }
}

/// In-memory cache of the protection flag, backed by a store
///
/// Read from the store once at construction; afterwards only `set` touches
/// the store. The cache is updated before the write, so a failed write
/// leaves the in-memory value authoritative for this process.
pub struct ProtectionSwitch {
    enabled: AtomicBool,
    store: Arc<dyn ProtectionStateStore>,
}

impl ProtectionSwitch {
    /// Load the persisted flag and cache it.
    ///
    /// An unreadable store starts the switch disabled; the next `set`
    /// overwrites whatever is there.
    pub fn load(store: Arc<dyn ProtectionStateStore>) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Protection state unreadable, starting disabled");
            ProtectionState::default()
        });
        tracing::info!(enabled = state.enabled, "Protection state restored");
        Self {
            enabled: AtomicBool::new(state.enabled),
            store,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Update the cache, then persist
    pub fn set(&self, enabled: bool) -> Result<()> {
        self.enabled.store(enabled, Ordering::SeqCst);
        self.store.save(ProtectionState { enabled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl ProtectionStateStore for BrokenStore {
        fn save(&self, _state: ProtectionState) -> Result<()> {
            Err(GuardError::State("disk full".to_string()))
        }

        fn load(&self) -> Result<ProtectionState> {
            Ok(ProtectionState { enabled: true })
        }
    }

    #[test]
    fn test_memory_store_save_load() {
        let store = MemoryStateStore::default();
        assert!(!store.load().unwrap().enabled);

        store.save(ProtectionState { enabled: true }).unwrap();
        assert!(store.load().unwrap().enabled);
    }

    #[test]
    fn test_state_wire_shape() {
        let json = serde_json::to_string(&ProtectionState { enabled: true }).unwrap();
        assert_eq!(json, r#"{"isEnabled":true}"#);

        let parsed: ProtectionState = serde_json::from_str("{}").unwrap();
        assert!(!parsed.enabled);
    }

    #[test]
    fn test_file_store_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStateStore::new(&path);

        store.save(ProtectionState { enabled: true }).unwrap();
        assert!(path.exists());
        assert!(store.load().unwrap().enabled);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("isEnabled"));
    }

    #[test]
    fn test_file_store_load_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("missing.json"));
        assert_eq!(store.load().unwrap(), ProtectionState::default());
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/state.json");
        let store = FileStateStore::new(&path);

        store.save(ProtectionState { enabled: false }).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStateStore::new(&path).load().unwrap_err();
        assert!(matches!(err, GuardError::State(_)));
    }

    #[test]
    fn test_switch_reads_once_and_persists() {
        let store = Arc::new(MemoryStateStore::with_enabled(true));
        let switch = ProtectionSwitch::load(store.clone());
        assert!(switch.is_enabled());

        switch.set(false).unwrap();
        assert!(!switch.is_enabled());
        assert!(!store.load().unwrap().enabled);
    }

    #[test]
    fn test_switch_cache_survives_failed_write() {
        let switch = ProtectionSwitch::load(Arc::new(BrokenStore));
        assert!(switch.is_enabled());

        assert!(switch.set(false).is_err());
        assert!(!switch.is_enabled());
    }

    #[test]
    fn test_corrupt_file_starts_disabled_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "").unwrap();

        let store = Arc::new(FileStateStore::new(&path));
        let switch = ProtectionSwitch::load(store.clone());
        assert!(!switch.is_enabled());

        switch.set(true).unwrap();
        assert!(store.load().unwrap().enabled);
    }
}
