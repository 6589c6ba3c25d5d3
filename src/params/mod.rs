//! Parameter maintenance over existing publish records
//!
//! Works on the `<filter>.gpd` files of a process directory: list one key,
//! set it per record from a prompt, or bulk update it with a literal or a
//! `:reference` to another key of the same record.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ConfigKey, UnknownKey};
use crate::discovery::{record_files, DiscoveryError};
use crate::prompt::{PromptError, Prompter};
use crate::record::PublishRecord;

/// Width the record path is padded to in listings
pub const PATH_COLUMN_WIDTH: usize = 60;

/// Parameter mode errors
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Counts for one bulk run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamReport {
    pub changed: usize,
    pub skipped: usize,
}

/// One `show-param` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    pub path: PathBuf,
    pub value: String,
}

impl ParamValue {
    /// `<path padded to 60> <value>`
    pub fn line(&self) -> String {
        format!(
            "{:<width$} {}",
            self.path.display().to_string(),
            self.value,
            width = PATH_COLUMN_WIDTH
        )
    }
}

/// Where a parameter key stands among the generated keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCheck {
    /// Editable configuration key
    Known(ConfigKey),
    /// Recomputed from the dataset file name on every generate run
    Derived(ConfigKey),
    /// Outside the configuration key set; records may still carry it
    Unknown(UnknownKey),
}

impl KeyCheck {
    pub fn of(key: &str) -> Self {
        match key.parse::<ConfigKey>() {
            Ok(k) if k.is_derived() => KeyCheck::Derived(k),
            Ok(k) => KeyCheck::Known(k),
            Err(e) => KeyCheck::Unknown(e),
        }
    }

    /// Warn about keys a change will not stick to or that generate never writes
    fn warn(&self, changing: bool) {
        match self {
            KeyCheck::Unknown(e) => {
                warn!(error = %e, "Key is not generated; only records that carry it are used")
            }
            KeyCheck::Derived(k) if changing => {
                warn!(key = %k, "Key is derived from the dataset name; the next generate run replaces it")
            }
            _ => {}
        }
    }
}

/// Value of `key` in every selected record
///
/// Records without the key are skipped with a warning.
pub fn show_param(dir: &Path, filter: &str, key: &str) -> Result<Vec<ParamValue>, ParamError> {
    KeyCheck::of(key).warn(false);
    let mut values = Vec::new();
    for path in record_files(dir, filter)? {
        let Some(record) = load(&path) else { continue };
        match record.get(key) {
            Some(value) => values.push(ParamValue {
                value: value.to_string(),
                path,
            }),
            None => warn!(path = %path.display(), key, "Key not found, skipping"),
        }
    }
    Ok(values)
}

/// Prompt for a new value of `key` in every selected record
///
/// The prompt shows the current value; an empty answer keeps it.
pub fn set_param(
    dir: &Path,
    filter: &str,
    key: &str,
    prompter: &mut dyn Prompter,
    debug: bool,
) -> Result<ParamReport, ParamError> {
    KeyCheck::of(key).warn(true);
    let mut report = ParamReport::default();
    for path in record_files(dir, filter)? {
        let Some(mut record) = load(&path) else {
            report.skipped += 1;
            continue;
        };
        info!(path = %path.display(), "Record");

        let current = record.get(key).unwrap_or_default().to_string();
        let answer = prompter.ask(key, &current)?;
        let answer = answer.trim();
        let value = if answer.is_empty() { current.as_str() } else { answer };

        let result = if debug {
            record.set(key, value)
        } else {
            record.set_param(key, value)
        };
        match result {
            Ok(()) => {
                finish(&record, key, debug);
                report.changed += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Update failed");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

/// Set `key` in every selected record to a literal or a `:reference`
///
/// A record lacking the referenced key is skipped with a warning.
pub fn update_param(
    dir: &Path,
    filter: &str,
    key: &str,
    value_or_ref: &str,
    debug: bool,
) -> Result<ParamReport, ParamError> {
    KeyCheck::of(key).warn(true);
    let mut report = ParamReport::default();
    for path in record_files(dir, filter)? {
        let Some(mut record) = load(&path) else {
            report.skipped += 1;
            continue;
        };
        info!(path = %path.display(), "Record");

        let result = if debug {
            record.update(key, value_or_ref)
        } else {
            record.update_param(key, value_or_ref)
        };
        match result {
            Ok(_) => {
                finish(&record, key, debug);
                report.changed += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Update failed");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

fn load(path: &Path) -> Option<PublishRecord> {
    match PublishRecord::load(path) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load record");
            None
        }
    }
}

fn finish(record: &PublishRecord, key: &str, debug: bool) {
    if debug {
        info!(path = %record.path().display(), "Record (not written):\n{}", record.render());
    } else {
        info!(
            path = %record.path().display(),
            "{}={}",
            key,
            record.get(key).unwrap_or_default()
        );
    }
}
