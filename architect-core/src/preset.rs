//! Preset store — named portfolio configurations persisted across sessions.
//!
//! The whole ordered list lives in one durable record under [`PRESETS_KEY`].
//! The store keeps an in-memory copy, refreshed from storage when opened, and
//! writes the full list back on every mutation. Mutations hold the store's lock
//! across read-modify-write, so concurrent saves and deletes are serialized and
//! never lose each other's updates.
//!
//! Malformed or unreadable persisted data is treated as "no presets": loading
//! never fails.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{LeverageMode, PortfolioConfig, PortfolioPatch};
use crate::request::{check_finite, parse_tickers, ValidationError};

/// Key of the single durable record holding every preset.
pub const PRESETS_KEY: &str = "my_portfolios";

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("no preset at index {index} ({len} saved)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to encode presets: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write presets: {0}")]
    Io(#[from] io::Error),
}

/// Snapshot of a portfolio configuration as stored in a preset.
///
/// Every field is optional: presets saved before a field existed simply lack
/// it, and loading such a preset leaves that field of the active configuration
/// alone. The aliases accept the camel-case keys of the older record format,
/// where tickers were stored as the raw comma-separated text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(
        default,
        deserialize_with = "deserialize_tickers",
        skip_serializing_if = "Option::is_none"
    )]
    pub tickers: Option<Vec<String>>,
    #[serde(default, alias = "min", skip_serializing_if = "Option::is_none")]
    pub min_weight: Option<f64>,
    #[serde(default, alias = "max", skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,
    #[serde(default, alias = "targetVal", skip_serializing_if = "Option::is_none")]
    pub leverage_target_value: Option<f64>,
    #[serde(default, alias = "targetMode", skip_serializing_if = "Option::is_none")]
    pub leverage_target_mode: Option<LeverageMode>,
}

impl From<&PortfolioConfig> for PresetConfig {
    fn from(config: &PortfolioConfig) -> Self {
        Self {
            tickers: Some(config.tickers.clone()),
            min_weight: Some(config.min_weight),
            max_weight: Some(config.max_weight),
            leverage_target_value: Some(config.leverage_target_value),
            leverage_target_mode: Some(config.leverage_target_mode),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TickerField {
    List(Vec<String>),
    Text(String),
}

fn deserialize_tickers<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TickerField>::deserialize(deserializer)?.map(|field| match field {
        TickerField::List(list) => list,
        TickerField::Text(text) => parse_tickers(&text),
    }))
}

/// A named configuration snapshot. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPreset {
    pub name: String,
    #[serde(flatten)]
    pub config: PresetConfig,
}

impl SavedPreset {
    pub fn new(name: impl Into<String>, config: &PortfolioConfig) -> Self {
        Self {
            name: name.into(),
            config: PresetConfig::from(config),
        }
    }
}

/// The partial update a preset applies to the active configuration.
pub fn apply_preset(preset: &SavedPreset) -> PortfolioPatch {
    let c = &preset.config;
    PortfolioPatch {
        tickers: c.tickers.clone(),
        min_weight: c.min_weight,
        max_weight: c.max_weight,
        leverage_target_value: c.leverage_target_value,
        leverage_target_mode: c.leverage_target_mode,
    }
}

/// Durable storage for the single preset record.
pub trait PresetBackend: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Read the raw record. `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the record.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Stores the record as `<dir>/my_portfolios.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{PRESETS_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresetBackend for FileBackend {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash mid-write never leaves a truncated record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)
    }
}

/// In-process record. Clones share the same backing, so a second store opened
/// on a clone sees what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw record, bypassing any store.
    pub fn set_raw(&self, contents: impl Into<String>) {
        *lock(&self.record) = Some(contents.into());
    }

    pub fn raw(&self) -> Option<String> {
        lock(&self.record).clone()
    }
}

impl PresetBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.raw())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        self.set_raw(contents);
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read every preset from `backend`. Missing, unreadable or malformed data
/// yields an empty list.
pub fn load_presets(backend: &dyn PresetBackend) -> Vec<SavedPreset> {
    let raw = match backend.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(location = %backend.describe(), error = %e, "could not read presets");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(presets) => presets,
        Err(e) => {
            tracing::warn!(
                location = %backend.describe(),
                error = %e,
                "ignoring malformed preset record"
            );
            Vec::new()
        }
    }
}

/// Write-through cache over a [`PresetBackend`].
pub struct PresetStore {
    backend: Box<dyn PresetBackend>,
    presets: Mutex<Vec<SavedPreset>>,
}

impl std::fmt::Debug for PresetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetStore")
            .field("backend", &self.backend.describe())
            .field("presets", &*lock(&self.presets))
            .finish()
    }
}

impl PresetStore {
    /// Open the store and load the persisted presets.
    pub fn open(backend: impl PresetBackend + 'static) -> Self {
        let presets = load_presets(&backend);
        tracing::debug!(location = %backend.describe(), count = presets.len(), "presets loaded");
        Self {
            backend: Box::new(backend),
            presets: Mutex::new(presets),
        }
    }

    /// Re-read durable storage, refresh the in-memory copy and return it.
    pub fn load_all(&self) -> Vec<SavedPreset> {
        let mut guard = lock(&self.presets);
        *guard = load_presets(self.backend.as_ref());
        guard.clone()
    }

    /// Snapshot of the in-memory copy.
    pub fn presets(&self) -> Vec<SavedPreset> {
        lock(&self.presets).clone()
    }

    pub fn get(&self, index: usize) -> Option<SavedPreset> {
        lock(&self.presets).get(index).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.presets).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a preset named `name` and write the list through.
    pub fn save(&self, name: &str, config: &PortfolioConfig) -> Result<SavedPreset, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        check_finite(
            config.min_weight,
            config.max_weight,
            config.leverage_target_value,
        )?;

        let preset = SavedPreset::new(name, config);
        self.mutate(|presets| {
            presets.push(preset.clone());
            Ok(())
        })?;
        tracing::info!(name, "preset saved");
        Ok(preset)
    }

    /// Remove the preset at `index` and write the list through.
    pub fn delete_at(&self, index: usize) -> Result<SavedPreset, PresetError> {
        let removed = self.mutate(|presets| {
            if index >= presets.len() {
                return Err(PresetError::IndexOutOfRange {
                    index,
                    len: presets.len(),
                });
            }
            Ok(presets.remove(index))
        })?;
        tracing::info!(name = %removed.name, index, "preset deleted");
        Ok(removed)
    }

    /// Apply `f` to a copy of the list, persist it, and only then commit it in
    /// memory. A failed write leaves both copies as they were.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<SavedPreset>) -> Result<T, PresetError>,
    ) -> Result<T, PresetError> {
        let mut guard = lock(&self.presets);
        let mut updated = guard.clone();
        let out = f(&mut updated)?;

        let json = serde_json::to_string_pretty(&updated)?;
        self.backend.write(&json)?;

        *guard = updated;
        Ok(out)
    }
}
