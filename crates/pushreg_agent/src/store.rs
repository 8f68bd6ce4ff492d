//! Local persistence for the agent
//!
//! Two keys matter: the stable device id and the last registration the registry
//! confirmed. Both are best-effort: losing them only forces a fresh
//! acquire-and-register cycle.

use pushreg_common::DeviceType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AgentError;

pub const DEVICE_ID_KEY: &str = "device_id";
pub const REGISTRATION_KEY: &str = "registration";

/// The last registration the registry accepted from this install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRegistration {
    pub user_id: String,
    pub push_address: String,
    pub device_type: DeviceType,
}

/// A small string key-value store that survives app restarts.
pub trait LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, AgentError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), AgentError>;
    fn remove(&mut self, key: &str) -> Result<(), AgentError>;
}

/// Reads the cached registration; an unparsable entry counts as absent.
pub fn load_registration<S: LocalStore + ?Sized>(
    store: &S,
) -> Result<Option<CachedRegistration>, AgentError> {
    let Some(raw) = store.get(REGISTRATION_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(cached) => Ok(Some(cached)),
        Err(e) => {
            debug!("Ignoring unreadable cached registration: {}", e);
            Ok(None)
        }
    }
}

pub fn save_registration<S: LocalStore + ?Sized>(
    store: &mut S,
    registration: &CachedRegistration,
) -> Result<(), AgentError> {
    let raw = serde_json::to_string(registration).map_err(|e| AgentError::Storage(e.to_string()))?;
    store.set(REGISTRATION_KEY, raw)
}

/// In-process store; nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AgentError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AgentError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AgentError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// Every write rewrites the whole file through a temporary sibling and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AgentError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AgentError::Storage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            AgentError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), AgentError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| {
                    AgentError::Storage(format!("Failed to create {}: {}", dir.display(), e))
                })?;
            }
        }

        let contents =
            serde_json::to_string_pretty(values).map_err(|e| AgentError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(|e| {
            AgentError::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AgentError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AgentError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AgentError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), AgentError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}
