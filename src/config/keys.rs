//! The closed set of configuration keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A key of the publish data model.
///
/// Record files may carry other keys; those are kept as opaque strings and
/// never get a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigKey {
    #[serde(rename = "coveragestore.workspace")]
    StoreWorkspace,
    #[serde(rename = "coveragestore.datatype")]
    StoreDatatype,
    #[serde(rename = "coveragestore.filename")]
    StoreFilename,
    #[serde(rename = "coveragestore.name")]
    StoreName,
    #[serde(rename = "coveragestore.description")]
    StoreDescription,
    #[serde(rename = "coverage.coveragestore.name")]
    CoverageStoreName,
    #[serde(rename = "coverage.name")]
    CoverageName,
    #[serde(rename = "coverage.title")]
    CoverageTitle,
    #[serde(rename = "coverage.description")]
    CoverageDescription,
    #[serde(rename = "coverage.abstract")]
    CoverageAbstract,
    #[serde(rename = "coverage.keywords")]
    CoverageKeywords,
    #[serde(rename = "layer.coverage.name")]
    LayerCoverageName,
    #[serde(rename = "layer.style")]
    LayerStyle,
    #[serde(rename = "geoserver.host")]
    CatalogHost,
    #[serde(rename = "geoserver.instance")]
    CatalogInstance,
    #[serde(rename = "geoserver.user")]
    CatalogUser,
    #[serde(rename = "geoserver.coveragerootdir")]
    CoverageRootDir,
}

/// Unknown key name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown configuration key '{0}'")]
pub struct UnknownKey(pub String);

impl ConfigKey {
    /// Every key, in declaration order.
    pub const ALL: [ConfigKey; 17] = [
        ConfigKey::StoreWorkspace,
        ConfigKey::StoreDatatype,
        ConfigKey::StoreFilename,
        ConfigKey::StoreName,
        ConfigKey::StoreDescription,
        ConfigKey::CoverageStoreName,
        ConfigKey::CoverageName,
        ConfigKey::CoverageTitle,
        ConfigKey::CoverageDescription,
        ConfigKey::CoverageAbstract,
        ConfigKey::CoverageKeywords,
        ConfigKey::LayerCoverageName,
        ConfigKey::LayerStyle,
        ConfigKey::CatalogHost,
        ConfigKey::CatalogInstance,
        ConfigKey::CatalogUser,
        ConfigKey::CoverageRootDir,
    ];

    /// Keys of a generated record, in the order they are written.
    pub const RECORD_KEYS: [ConfigKey; 13] = [
        ConfigKey::StoreWorkspace,
        ConfigKey::StoreDatatype,
        ConfigKey::StoreFilename,
        ConfigKey::StoreName,
        ConfigKey::StoreDescription,
        ConfigKey::CoverageStoreName,
        ConfigKey::CoverageName,
        ConfigKey::CoverageTitle,
        ConfigKey::CoverageDescription,
        ConfigKey::CoverageAbstract,
        ConfigKey::CoverageKeywords,
        ConfigKey::LayerCoverageName,
        ConfigKey::LayerStyle,
    ];

    /// Keys written to the session file, in order.
    pub const SESSION_KEYS: [ConfigKey; 8] = [
        ConfigKey::StoreDescription,
        ConfigKey::CoverageDescription,
        ConfigKey::CoverageAbstract,
        ConfigKey::CoverageKeywords,
        ConfigKey::CatalogHost,
        ConfigKey::CatalogInstance,
        ConfigKey::CatalogUser,
        ConfigKey::CoverageRootDir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::StoreWorkspace => "coveragestore.workspace",
            ConfigKey::StoreDatatype => "coveragestore.datatype",
            ConfigKey::StoreFilename => "coveragestore.filename",
            ConfigKey::StoreName => "coveragestore.name",
            ConfigKey::StoreDescription => "coveragestore.description",
            ConfigKey::CoverageStoreName => "coverage.coveragestore.name",
            ConfigKey::CoverageName => "coverage.name",
            ConfigKey::CoverageTitle => "coverage.title",
            ConfigKey::CoverageDescription => "coverage.description",
            ConfigKey::CoverageAbstract => "coverage.abstract",
            ConfigKey::CoverageKeywords => "coverage.keywords",
            ConfigKey::LayerCoverageName => "layer.coverage.name",
            ConfigKey::LayerStyle => "layer.style",
            ConfigKey::CatalogHost => "geoserver.host",
            ConfigKey::CatalogInstance => "geoserver.instance",
            ConfigKey::CatalogUser => "geoserver.user",
            ConfigKey::CoverageRootDir => "geoserver.coveragerootdir",
        }
    }

    /// Derived from the dataset file name; recomputed on every generate run.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            ConfigKey::StoreDatatype
                | ConfigKey::StoreFilename
                | ConfigKey::StoreName
                | ConfigKey::CoverageStoreName
                | ConfigKey::CoverageName
                | ConfigKey::LayerCoverageName
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}
