//! Dataset discovery and naming
//!
//! Lists the process directory (non-recursive), filters file names with a
//! glob, maps extensions to catalog store types, and derives the store and
//! coverage names for each dataset.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::warn;
use walkdir::WalkDir;

use crate::record::RECORD_EXTENSION;

/// Default file filter
pub const DEFAULT_FILE_FILTER: &str = "*";

/// Errors for directory listing
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid file filter: {0}")]
    Filter(#[from] globset::Error),

    #[error("failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Raster store type, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    ArcGrid,
    GeoTiff,
}

impl Datatype {
    /// `.asc` is ArcGrid, `.tif`/`.tiff` is GeoTIFF; case is ignored
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "asc" => Some(Datatype::ArcGrid),
            "tif" | "tiff" => Some(Datatype::GeoTiff),
            _ => None,
        }
    }

    /// Store type name understood by the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::ArcGrid => "ArcGrid",
            Datatype::GeoTiff => "GeoTIFF",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raster file accepted for publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    /// Path as found below the process directory
    pub path: PathBuf,
    pub file_name: String,
    pub datatype: Datatype,
}

/// Rules for turning a file name into catalog names
#[derive(Debug, Clone, Default)]
pub struct NameRules {
    /// Substrings removed from the file name
    pub strip_patterns: Vec<String>,
    /// Prefix for coverage store names
    pub store_prefix: String,
    /// Prefix for coverage names
    pub coverage_prefix: String,
}

/// Names derived for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub clean: String,
    pub store: String,
    pub coverage: String,
}

impl NameRules {
    /// File name up to the first `.`, with strip patterns removed,
    /// lowercased, and trimmed of `_`
    pub fn clean_name(&self, file_name: &str) -> String {
        let mut name = file_name.split('.').next().unwrap_or(file_name).to_string();
        for pattern in self.strip_patterns.iter().filter(|p| !p.is_empty()) {
            name = name.replace(pattern.as_str(), "");
        }
        name.to_lowercase().trim_matches('_').to_string()
    }

    pub fn derive(&self, file_name: &str) -> DerivedNames {
        let clean = self.clean_name(file_name);
        DerivedNames {
            store: prefixed(&self.store_prefix, &clean),
            coverage: prefixed(&self.coverage_prefix, &clean),
            clean,
        }
    }
}

fn prefixed(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name).trim_matches('_').to_string()
}

/// Files directly inside `dir` whose names match `filter`, sorted by name
pub fn list_matching(dir: &Path, filter: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let matcher = compile(filter)?;
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Record files selected by `filter` (the `.gpd` extension is appended)
pub fn record_files(dir: &Path, filter: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    list_matching(dir, &format!("{}.{}", filter, RECORD_EXTENSION))
}

/// Raster datasets selected by `filter`
///
/// Unknown extensions and file names with spaces are skipped with a warning.
pub fn discover_datasets(dir: &Path, filter: &str) -> Result<Vec<DatasetFile>, DiscoveryError> {
    let mut datasets = Vec::new();
    for path in list_matching(dir, filter)? {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
                continue;
            }
        };
        let datatype = match Datatype::from_path(&path) {
            Some(datatype) => datatype,
            None => {
                warn!(file = %file_name, "Skipping file with unknown raster type");
                continue;
            }
        };
        if file_name.contains(' ') {
            warn!(file = %file_name, "Spaces found in coverage filename, skipping");
            continue;
        }
        datasets.push(DatasetFile {
            path,
            file_name,
            datatype,
        });
    }
    Ok(datasets)
}

fn compile(filter: &str) -> Result<GlobMatcher, DiscoveryError> {
    let filter = if filter.is_empty() { DEFAULT_FILE_FILTER } else { filter };
    Ok(Glob::new(filter)?.compile_matcher())
}
