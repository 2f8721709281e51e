//! Parameter store backed by the JSON parameter file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ParamError, ParamResult};

/// One template parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
    #[serde(rename = "ParameterKey")]
    pub key: String,
    #[serde(rename = "ParameterValue")]
    pub value: String,
}

impl ParameterEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Deployment parameters with unique keys.
///
/// Entries keep the position in which their key was first seen, so a
/// persisted file keeps its layout across upserts. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    entries: Vec<ParameterEntry>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the parameter file at `path`.
    pub fn load(path: &Path) -> ParamResult<Self> {
        debug!("Reading parameters from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| ParamError::Config {
            path: PathBuf::from(path),
            message: format!("cannot read file: {}", e),
        })?;
        let store = Self::parse(&content, path)?;
        info!("Loaded {} parameters from {:?}", store.len(), path);
        Ok(store)
    }

    /// Parse parameter file content.
    pub fn from_json_str(content: &str) -> ParamResult<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> ParamResult<Self> {
        let raw: Vec<ParameterEntry> =
            serde_json::from_str(content).map_err(|e| ParamError::Config {
                path: PathBuf::from(path),
                message: e.to_string(),
            })?;
        Ok(raw.into_iter().collect())
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> ParamResult<&str> {
        self.get_opt(key)
            .ok_or_else(|| ParamError::KeyNotFound(key.to_string()))
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_opt(key).is_some()
    }

    /// Replace the value of `key` in place, or append a new entry.
    ///
    /// Returns `true` if the store changed.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) if entry.value == value => false,
            Some(entry) => {
                debug!("Replacing parameter {}", key);
                entry.value = value;
                true
            }
            None => {
                debug!("Adding parameter {}", key);
                self.entries.push(ParameterEntry { key, value });
                true
            }
        }
    }

    /// Serialize to the parameter file format.
    pub fn to_json_string(&self) -> ParamResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write the store to `path`.
    pub fn persist(&self, path: &Path) -> ParamResult<()> {
        let content = self.to_json_string()?;
        fs::write(path, content)?;
        info!("Wrote {} parameters to {:?}", self.len(), path);
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ParameterEntry> for ParameterStore {
    /// Later entries for the same key win.
    fn from_iter<I: IntoIterator<Item = ParameterEntry>>(iter: I) -> Self {
        let mut store = Self::new();
        for entry in iter {
            store.upsert(entry.key, entry.value);
        }
        store
    }
}

impl PartialEq for ParameterStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|e| other.get_opt(&e.key) == Some(e.value.as_str()))
    }
}

impl Eq for ParameterStore {}
