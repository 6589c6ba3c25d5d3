//! Catalog object descriptions.
//!
//! Each description carries exactly what one REST request needs: the values
//! rendered into the XML body and the names used to address the object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, PublishMode};
use crate::xml;
use crate::LEADING_KEYWORD;

/// Kind of remote catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogObjectKind {
    #[serde(rename = "coveragestore")]
    Store,
    #[serde(rename = "coverage")]
    Coverage,
    #[serde(rename = "layer")]
    Layer,
}

impl CatalogObjectKind {
    /// Name used in run log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogObjectKind::Store => "coveragestore",
            CatalogObjectKind::Coverage => "coverage",
            CatalogObjectKind::Layer => "layer",
        }
    }
}

impl fmt::Display for CatalogObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raster coverage store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDescription {
    /// Workspace the store lives in
    pub workspace: String,
    /// Store name
    pub name: String,
    pub description: String,
    /// Store type, e.g. `GeoTIFF` or `ArcGrid`
    pub datatype: String,
    /// Location of the raster as seen by the catalog (without `file:`)
    pub source_path: String,
}

impl StoreDescription {
    pub fn endpoint(&self, mode: PublishMode) -> Endpoint {
        Endpoint::coverage_store(mode, &self.workspace, &self.name)
    }

    pub fn to_xml(&self) -> String {
        xml::store_xml(self)
    }
}

/// A coverage published from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDescription {
    pub workspace: String,
    /// Owning store name
    pub store: String,
    /// Coverage name, also used as native name
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Full keyword list, leading keyword included
    pub keywords: Vec<String>,
}

impl CoverageDescription {
    /// Build the keyword list from a comma separated string.
    ///
    /// The leading `WCS` keyword always comes first; entries are trimmed and
    /// empty entries dropped.
    pub fn keywords_from_list(list: &str) -> Vec<String> {
        std::iter::once(LEADING_KEYWORD.to_string())
            .chain(
                list.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            )
            .collect()
    }

    pub fn endpoint(&self, mode: PublishMode) -> Endpoint {
        Endpoint::coverage(mode, &self.workspace, &self.store, &self.name)
    }

    pub fn to_xml(&self) -> String {
        xml::coverage_xml(self)
    }
}

/// Layer options applied to the layer the catalog derived from a coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescription {
    pub workspace: String,
    /// Layer name (the coverage name)
    pub name: String,
    pub default_style: String,
}

impl LayerDescription {
    /// Layers are only ever updated.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::layer(&self.workspace, &self.name)
    }

    pub fn to_xml(&self) -> String {
        xml::layer_xml(self)
    }
}
