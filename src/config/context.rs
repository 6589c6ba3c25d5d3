//! Run context
//!
//! Everything a publish run needs besides the records themselves: where the
//! records live, the publish mode, the debug switch, and how to reach the
//! catalog. Built once per run and handed to the orchestrator by reference.

use std::path::{Path, PathBuf};

use geopublish_catalog::PublishMode;

use super::keys::ConfigKey;
use super::resolver::ConfigResolver;
use super::tier::GLOBAL_FILE_NAME;

/// Shown instead of secrets in listings
pub const REDACTED: &str = "[REDACTED]";

/// Context errors
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("HOME environment variable not set")]
    HomeNotSet,

    #[error("catalog host is not configured (set {0} in the session or global defaults)")]
    MissingHost(&'static str),
}

/// Connection settings for the catalog service
#[derive(Debug, Clone, Default)]
pub struct CatalogConnection {
    /// Host with optional port and scheme, e.g. `localhost:8080`
    pub host: String,
    /// Instance path, e.g. `/geoserver`
    pub instance: String,
    pub user: String,
    pub password: String,
    /// Prefix the catalog puts in front of record file names
    pub coverage_root_dir: String,
    /// Ignore proxy settings from the environment
    pub no_proxy: bool,
}

impl CatalogConnection {
    /// Read connection settings through the tiers. The password is never
    /// stored and starts out empty.
    pub fn from_resolver(resolver: &ConfigResolver) -> Self {
        Self {
            host: resolver.resolve(ConfigKey::CatalogHost),
            instance: resolver.resolve(ConfigKey::CatalogInstance),
            user: resolver.resolve(ConfigKey::CatalogUser),
            password: String::new(),
            coverage_root_dir: resolver.resolve(ConfigKey::CoverageRootDir),
            no_proxy: false,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_no_proxy(mut self, no_proxy: bool) -> Self {
        self.no_proxy = no_proxy;
        self
    }

    /// Root of the REST API: `<scheme>://<host><instance>/rest`
    ///
    /// A host without a scheme is reached over plain `http://`.
    pub fn rest_root(&self) -> Result<String, ContextError> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ContextError::MissingHost(ConfigKey::CatalogHost.as_str()));
        }
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        let instance = self.instance.trim().trim_end_matches('/');
        let instance = if instance.is_empty() || instance.starts_with('/') {
            instance.to_string()
        } else {
            format!("/{}", instance)
        };
        Ok(format!("{}{}/rest", base, instance))
    }

    /// Password for display
    pub fn redacted_password(&self) -> &str {
        if self.password.is_empty() {
            ""
        } else {
            REDACTED
        }
    }
}

/// Per-run settings shared by the publish phases
#[derive(Debug, Clone)]
pub struct RunContext {
    pub process_dir: PathBuf,
    pub mode: PublishMode,
    /// No writes and no network calls, only echo
    pub debug: bool,
    pub connection: CatalogConnection,
}

impl RunContext {
    pub fn new(process_dir: impl Into<PathBuf>, connection: CatalogConnection) -> Self {
        Self {
            process_dir: process_dir.into(),
            mode: PublishMode::default(),
            debug: false,
            connection,
        }
    }

    pub fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Source location of a dataset as the catalog sees it
    pub fn source_path(&self, record_filename: &str) -> String {
        format!("{}{}", self.connection.coverage_root_dir, record_filename)
    }
}

/// Default global defaults file: `~/.config/geopublish/config.default`
pub fn default_global_config_path() -> Result<PathBuf, ContextError> {
    let home = std::env::var("HOME").map_err(|_| ContextError::HomeNotSet)?;
    Ok(Path::new(&home)
        .join(".config/geopublish")
        .join(GLOBAL_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(host: &str, instance: &str) -> CatalogConnection {
        CatalogConnection {
            host: host.to_string(),
            instance: instance.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rest_root_plain_host() {
        let c = connection("localhost:8080", "/geoserver");
        assert_eq!(c.rest_root().unwrap(), "http://localhost:8080/geoserver/rest");
    }

    #[test]
    fn test_rest_root_keeps_scheme() {
        let c = connection("https://maps.example.org/", "geoserver/");
        assert_eq!(c.rest_root().unwrap(), "https://maps.example.org/geoserver/rest");
    }

    #[test]
    fn test_rest_root_without_instance() {
        let c = connection("maps.example.org", "");
        assert_eq!(c.rest_root().unwrap(), "http://maps.example.org/rest");
    }

    #[test]
    fn test_rest_root_missing_host() {
        let c = connection("  ", "/geoserver");
        let err = c.rest_root().unwrap_err();
        assert!(err.to_string().contains("geoserver.host"));
    }

    #[test]
    fn test_password_redacted() {
        let c = connection("h", "").with_password("hunter2");
        assert_eq!(c.redacted_password(), REDACTED);
        assert_eq!(connection("h", "").redacted_password(), "");
    }

    #[test]
    fn test_source_path_prefixes_root_dir() {
        let mut c = connection("h", "");
        c.coverage_root_dir = "/srv/data/".to_string();
        let ctx = RunContext::new("rasters", c);
        assert_eq!(ctx.source_path("rasters/dem.tif"), "/srv/data/rasters/dem.tif");
    }

    #[test]
    fn test_from_resolver_reads_tiers() {
        use crate::config::{ConfigTier, TierKind};
        let session = ConfigTier::from_values(
            TierKind::Session,
            [("geoserver.host", "localhost"), ("geoserver.user", "admin")]
                .into_iter()
                .collect(),
        );
        let global = ConfigTier::from_values(
            TierKind::Global,
            [("geoserver.instance", "/geoserver"), ("geoserver.user", "nobody")]
                .into_iter()
                .collect(),
        );
        let c = CatalogConnection::from_resolver(&ConfigResolver::new(session, global));
        assert_eq!(c.host, "localhost");
        assert_eq!(c.user, "admin");
        assert_eq!(c.instance, "/geoserver");
        assert!(c.password.is_empty());
    }
}
