//! Configuration tiers
//!
//! Three tiers feed the resolver, highest precedence first:
//! 1. Record - the dataset's own `.gpd` file
//! 2. Session - `<process-dir>/config.session`
//! 3. Global - `config.default`

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::flat::{FlatFileError, KeyValues};
use super::keys::ConfigKey;

/// Session defaults file name inside the process directory
pub const SESSION_FILE_NAME: &str = "config.session";

/// Global defaults file name
pub const GLOBAL_FILE_NAME: &str = "config.default";

/// Which tier a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Record,
    Session,
    Global,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Record => "record",
            TierKind::Session => "session",
            TierKind::Global => "global",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tier: its kind, where it is stored, and its values
#[derive(Debug, Clone)]
pub struct ConfigTier {
    kind: TierKind,
    path: Option<PathBuf>,
    values: KeyValues,
}

impl ConfigTier {
    /// An empty tier with no backing file
    pub fn empty(kind: TierKind) -> Self {
        Self {
            kind,
            path: None,
            values: KeyValues::new(),
        }
    }

    /// Wrap values that did not come from disk
    pub fn from_values(kind: TierKind, values: KeyValues) -> Self {
        Self {
            kind,
            path: None,
            values,
        }
    }

    /// Load a tier; a missing file gives an empty tier bound to `path`
    pub fn load(kind: TierKind, path: &Path) -> Result<Self, FlatFileError> {
        let values = KeyValues::load(path)?;
        Ok(Self {
            kind,
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// Load the session tier of a process directory
    pub fn load_session(process_dir: &Path) -> Result<Self, FlatFileError> {
        Self::load(TierKind::Session, &session_path(process_dir))
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn values(&self) -> &KeyValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut KeyValues {
        &mut self.values
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key)
    }

    pub fn get_key(&self, key: ConfigKey) -> Option<&str> {
        self.values.get(key.as_str())
    }

    /// Write the tier to an explicit location and bind it there
    pub fn persist_to(&mut self, path: &Path) -> Result<(), FlatFileError> {
        self.values.persist(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

/// `<process-dir>/config.session`
pub fn session_path(process_dir: &Path) -> PathBuf {
    process_dir.join(SESSION_FILE_NAME)
}
