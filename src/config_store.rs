//! Named API configurations persisted as one JSON array under a single
//! storage key. Every write replaces the whole list.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::endpoint::{mask_api_key, strip_trailing_slash};
use crate::ProbeError;

pub const CONFIGS_KEY: &str = "apiConfigs";
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_millis(2500);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// User-editable fields of a configuration, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigFields {
    pub name: String,
    pub url: String,
    pub key: String,
    pub model: String,
}

impl ConfigFields {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            key: key.into(),
            model: model.into(),
        }
    }

    fn normalized(&self, fallback_model: &str) -> Result<ConfigFields, ProbeError> {
        let name = self.name.trim();
        let url = strip_trailing_slash(self.url.trim());
        let key = self.key.trim();
        if name.is_empty() || url.is_empty() || key.is_empty() {
            return Err(ProbeError::Validation(
                "Please fill in all required fields.".into(),
            ));
        }
        let model = match self.model.trim() {
            "" => fallback_model.to_string(),
            m => m.to_string(),
        };
        Ok(ConfigFields {
            name: name.to_string(),
            url: url.to_string(),
            key: key.to_string(),
            model,
        })
    }
}

/// Result of toggling the default star on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultChange {
    Set(usize),
    /// The entry was already the default; now nothing is.
    Cleared,
}

pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, ProbeError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ProbeError>;
}

/// One `<key>.json` file per entry inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<user config dir>/toolcall-probe`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolcall-probe"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ProbeError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProbeError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ProbeError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProbeError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct ConfigStore<S: KeyValueStorage> {
    storage: S,
    fallback_model: String,
}

impl<S: KeyValueStorage> ConfigStore<S> {
    /// `fallback_model` fills in entries saved without a model.
    pub fn new(storage: S, fallback_model: impl Into<String>) -> Self {
        Self {
            storage,
            fallback_model: fallback_model.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Missing or unreadable data yields an empty list.
    pub fn load_all(&self) -> Vec<StoredConfig> {
        let raw = match self.storage.get(CONFIGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored configurations");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<StoredConfig>>(&raw) {
            Ok(configs) => {
                tracing::debug!(count = configs.len(), "loaded configurations");
                configs
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored configurations are corrupt, ignoring them");
                Vec::new()
            }
        }
    }

    /// Write failures are logged and swallowed.
    pub fn save_all(&mut self, configs: &[StoredConfig]) {
        let result = serde_json::to_string(configs)
            .map_err(ProbeError::from)
            .and_then(|text| self.storage.set(CONFIGS_KEY, &text));
        match result {
            Ok(()) => tracing::debug!(count = configs.len(), "saved configurations"),
            Err(e) => tracing::warn!(error = %e, "could not save configurations"),
        }
    }

    pub fn get(&self, index: usize) -> Option<StoredConfig> {
        self.load_all().into_iter().nth(index)
    }

    pub fn default_config(&self) -> Option<StoredConfig> {
        self.load_all().into_iter().find(|c| c.is_default)
    }

    /// Edits `index` in place (keeping its default flag) or appends a new,
    /// non-default entry. Returns the index written.
    pub fn upsert(&mut self, index: Option<usize>, fields: &ConfigFields) -> Result<usize, ProbeError> {
        let fields = fields.normalized(&self.fallback_model)?;
        let mut configs = self.load_all();
        let written = match index {
            Some(i) => {
                let entry = configs.get_mut(i).ok_or_else(|| out_of_range(i))?;
                apply_fields(entry, fields);
                i
            }
            None => {
                configs.push(new_entry(fields, false));
                configs.len() - 1
            }
        };
        tracing::info!(
            index = written,
            name = %configs[written].name,
            key = %mask_api_key(&configs[written].key),
            "configuration saved"
        );
        self.save_all(&configs);
        Ok(written)
    }

    /// Like [`upsert`](Self::upsert) but makes the written entry the only default.
    pub fn upsert_default(&mut self, index: Option<usize>, fields: &ConfigFields) -> Result<usize, ProbeError> {
        let fields = fields.normalized(&self.fallback_model)?;
        let mut configs = self.load_all();
        let written = match index {
            Some(i) => {
                let entry = configs.get_mut(i).ok_or_else(|| out_of_range(i))?;
                apply_fields(entry, fields);
                i
            }
            None => {
                configs.push(new_entry(fields, true));
                configs.len() - 1
            }
        };
        for (i, c) in configs.iter_mut().enumerate() {
            c.is_default = i == written;
        }
        tracing::info!(index = written, name = %configs[written].name, "configuration saved as default");
        self.save_all(&configs);
        Ok(written)
    }

    pub fn set_default(&mut self, index: usize) -> Result<DefaultChange, ProbeError> {
        let mut configs = self.load_all();
        let was_default = configs.get(index).ok_or_else(|| out_of_range(index))?.is_default;
        let change = if was_default {
            configs.iter_mut().for_each(|c| c.is_default = false);
            DefaultChange::Cleared
        } else {
            for (i, c) in configs.iter_mut().enumerate() {
                c.is_default = i == index;
            }
            DefaultChange::Set(index)
        };
        tracing::info!(index, ?change, "default configuration toggled");
        self.save_all(&configs);
        Ok(change)
    }

    pub fn remove(&mut self, index: usize) -> Result<StoredConfig, ProbeError> {
        let mut configs = self.load_all();
        if index >= configs.len() {
            return Err(out_of_range(index));
        }
        let removed = configs.remove(index);
        tracing::info!(index, name = %removed.name, "configuration deleted");
        self.save_all(&configs);
        Ok(removed)
    }
}

fn apply_fields(entry: &mut StoredConfig, fields: ConfigFields) {
    entry.name = fields.name;
    entry.url = fields.url;
    entry.key = fields.key;
    entry.model = fields.model;
}

fn new_entry(fields: ConfigFields, is_default: bool) -> StoredConfig {
    StoredConfig {
        name: fields.name,
        url: fields.url,
        key: fields.key,
        model: fields.model,
        is_default,
    }
}

fn out_of_range(index: usize) -> ProbeError {
    ProbeError::Validation(format!("no configuration at index {index}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    /// First activation; a second one inside the window deletes.
    Armed,
    Confirmed,
}

/// Two-activation delete confirmation. The armed state lapses on its own
/// once the window has passed.
#[derive(Debug, Clone)]
pub struct DeleteGuard {
    window: Duration,
    armed: Option<(usize, Instant)>,
}

impl Default for DeleteGuard {
    fn default() -> Self {
        Self::with_window(DELETE_CONFIRM_WINDOW)
    }
}

impl DeleteGuard {
    pub fn with_window(window: Duration) -> Self {
        Self { window, armed: None }
    }

    pub fn activate(&mut self, index: usize, now: Instant) -> DeleteStep {
        if self.armed_index(now) == Some(index) {
            self.armed = None;
            return DeleteStep::Confirmed;
        }
        self.armed = Some((index, now));
        DeleteStep::Armed
    }

    pub fn armed_index(&self, now: Instant) -> Option<usize> {
        self.armed
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.window)
            .map(|(index, _)| index)
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }
}
