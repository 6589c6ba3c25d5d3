//! REST addressing for catalog objects.
//!
//! Create requests go to the collection endpoint, update requests to the
//! object endpoint. That addressing is the only difference between the two
//! modes; no existence check is ever made.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RESOURCE_SUFFIX;

/// HTTP method used for a catalog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-wide publish mode.
///
/// Chosen once per run; every store and coverage request in that run uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// POST to collection endpoints
    #[default]
    Create,
    /// PUT to object endpoints
    Update,
}

impl PublishMode {
    /// Pick the mode from the `--update` switch.
    pub fn from_update_flag(update: bool) -> Self {
        if update {
            PublishMode::Update
        } else {
            PublishMode::Create
        }
    }

    pub fn method(&self) -> Method {
        match self {
            PublishMode::Create => Method::Post,
            PublishMode::Update => Method::Put,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishMode::Create => "create",
            PublishMode::Update => "update",
        }
    }
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method plus a REST path relative to the catalog's `/rest` root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
}

impl Endpoint {
    /// `/workspaces/{ws}/coveragestores[/{store}]`
    pub fn coverage_store(mode: PublishMode, workspace: &str, store: &str) -> Self {
        let path = match mode {
            PublishMode::Create => format!("/workspaces/{}/coveragestores", workspace),
            PublishMode::Update => {
                format!("/workspaces/{}/coveragestores/{}", workspace, store)
            }
        };
        Self {
            method: mode.method(),
            path,
        }
    }

    /// `/workspaces/{ws}/coveragestores/{store}/coverages[/{coverage}]`
    pub fn coverage(mode: PublishMode, workspace: &str, store: &str, coverage: &str) -> Self {
        let collection = format!("/workspaces/{}/coveragestores/{}/coverages", workspace, store);
        let path = match mode {
            PublishMode::Create => collection,
            PublishMode::Update => format!("{}/{}", collection, coverage),
        };
        Self {
            method: mode.method(),
            path,
        }
    }

    /// `/layers/{ws}:{layer}`, always an update.
    ///
    /// The catalog creates the layer itself when the coverage is created.
    pub fn layer(workspace: &str, layer: &str) -> Self {
        Self {
            method: Method::Put,
            path: format!("/layers/{}:{}", workspace, layer),
        }
    }

    /// Full URL below `rest_root` (e.g. `http://host/geoserver/rest`).
    pub fn url(&self, rest_root: &str) -> String {
        format!(
            "{}{}{}",
            rest_root.trim_end_matches('/'),
            self.path,
            RESOURCE_SUFFIX
        )
    }
}
