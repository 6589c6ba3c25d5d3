//! Publish records
//!
//! A publish record is the flat metadata mapping of one dataset, stored as
//! `<dataset>.gpd` next to the dataset. It is loaded once, changed through
//! its setters, and written by [`PublishRecord::save`], which always replaces
//! the whole file with the complete in-memory state. Keys that are not in
//! memory at save time are gone from the file afterwards.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{ConfigKey, FlatFileError, KeyValues, SEPARATOR};

/// Record file extension
pub const RECORD_EXTENSION: &str = "gpd";

/// Leading character that makes an update copy another key
pub const REFERENCE_SENTINEL: char = ':';

/// Record errors
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    File(#[from] FlatFileError),

    #[error("{path}: missing key '{key}'")]
    MissingKey { path: String, key: String },

    #[error("{path}: referenced key '{key}' not found")]
    MissingReference { path: String, key: String },

    #[error("invalid value for '{0}': values must be single-line")]
    InvalidValue(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

/// In-memory publish record bound to its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    path: PathBuf,
    values: KeyValues,
}

impl PublishRecord {
    pub fn new(path: impl Into<PathBuf>, values: KeyValues) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    /// Load a record; a missing file gives an empty record
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let values = KeyValues::load(path)?;
        debug!(path = %path.display(), keys = values.len(), "loaded record");
        Ok(Self::new(path, values))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record file name without extension
    pub fn stem(&self) -> String {
        record_stem(&self.path)
    }

    pub fn values(&self) -> &KeyValues {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key)
    }

    /// Value of a key the caller cannot do without
    pub fn require(&self, key: ConfigKey) -> Result<&str, RecordError> {
        self.values
            .get(key.as_str())
            .ok_or_else(|| RecordError::MissingKey {
                path: self.path.display().to_string(),
                key: key.as_str().to_string(),
            })
    }

    /// Change one value in memory
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), RecordError> {
        validate_key(key)?;
        let value = value.into();
        validate_value(key, &value)?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Overwrite `key` and save the full record
    pub fn set_param(&mut self, key: &str, value: impl Into<String>) -> Result<(), RecordError> {
        self.set(key, value)?;
        self.save()
    }

    /// Value an update would write: `:other` copies the current value of
    /// `other` from this record, anything else is taken literally.
    pub fn update_value(&self, value_or_ref: &str) -> Result<String, RecordError> {
        match value_or_ref.strip_prefix(REFERENCE_SENTINEL) {
            Some(reference) => self
                .values
                .get(reference)
                .map(str::to_string)
                .ok_or_else(|| RecordError::MissingReference {
                    path: self.path.display().to_string(),
                    key: reference.to_string(),
                }),
            None => Ok(value_or_ref.to_string()),
        }
    }

    /// Apply an update in memory; returns the value written
    pub fn update(&mut self, key: &str, value_or_ref: &str) -> Result<String, RecordError> {
        let value = self.update_value(value_or_ref)?;
        self.set(key, value.clone())?;
        Ok(value)
    }

    /// Update `key` (literal or `:reference`) and save the full record
    pub fn update_param(&mut self, key: &str, value_or_ref: &str) -> Result<String, RecordError> {
        let value = self.update(key, value_or_ref)?;
        self.save()?;
        Ok(value)
    }

    /// Serialized record content
    pub fn render(&self) -> String {
        self.values.serialize()
    }

    /// Replace the record file with the complete current state
    pub fn save(&self) -> Result<(), RecordError> {
        self.values.persist(&self.path)?;
        debug!(path = %self.path.display(), keys = self.values.len(), "saved record");
        Ok(())
    }
}

/// Record path for a dataset: the file name up to its first `.`, plus `.gpd`
pub fn record_path(process_dir: &Path, dataset_file_name: &str) -> PathBuf {
    let base = dataset_file_name
        .split('.')
        .next()
        .unwrap_or(dataset_file_name);
    process_dir.join(format!("{}.{}", base, RECORD_EXTENSION))
}

/// File name of `path` up to its first `.`
pub fn record_stem(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

fn validate_key(key: &str) -> Result<(), RecordError> {
    if key.is_empty() || key.contains(SEPARATOR) || key.contains(&['\n', '\r'][..]) {
        return Err(RecordError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Only the first `=` of a line separates, so values may hold more of them.
fn validate_value(key: &str, value: &str) -> Result<(), RecordError> {
    if value.contains(&['\n', '\r'][..]) {
        return Err(RecordError::InvalidValue(key.to_string()));
    }
    Ok(())
}
