//! Publish orchestrator
//!
//! Pushes publish records to the catalog in up to three phases: coverage
//! stores, coverages, layer options. Every record is handled on its own; a
//! record that fails to load, lacks a key, or whose request fails gets a log
//! line and the batch moves on.

mod run_log;

pub use run_log::{RequestOutcome, RunLog, RunLogEntry, RunReport, RUN_REPORT_SCHEMA_ID};

use std::fmt;
use std::path::{Path, PathBuf};

use geopublish_catalog::{
    CatalogObjectKind, CoverageDescription, LayerDescription, StoreDescription,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigKey, RunContext};
use crate::record::{record_stem, PublishRecord, RecordError};
use crate::transport::{CatalogRequest, CatalogTransport};

/// Publish phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublishPhase {
    Stores,
    Coverages,
    LayerOptions,
}

impl PublishPhase {
    /// Build the ordered phase list from the three command line switches
    pub fn selected(stores: bool, coverages: bool, layer_options: bool) -> Vec<PublishPhase> {
        [
            (stores, PublishPhase::Stores),
            (coverages, PublishPhase::Coverages),
            (layer_options, PublishPhase::LayerOptions),
        ]
        .into_iter()
        .filter_map(|(on, phase)| on.then_some(phase))
        .collect()
    }

    pub fn kind(&self) -> CatalogObjectKind {
        match self {
            PublishPhase::Stores => CatalogObjectKind::Store,
            PublishPhase::Coverages => CatalogObjectKind::Coverage,
            PublishPhase::LayerOptions => CatalogObjectKind::Layer,
        }
    }
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPhase::Stores => f.write_str("Publishing stores"),
            PublishPhase::Coverages => f.write_str("Publishing coverages"),
            PublishPhase::LayerOptions => f.write_str("Setting layer options"),
        }
    }
}

/// Drives the publish phases over a set of record files
pub struct Publisher<'a> {
    context: &'a RunContext,
    transport: &'a dyn CatalogTransport,
    log: RunLog,
}

impl<'a> Publisher<'a> {
    pub fn new(context: &'a RunContext, transport: &'a dyn CatalogTransport) -> Self {
        Self {
            context,
            transport,
            log: RunLog::new(),
        }
    }

    /// Run the selected phases in order over the same record list
    pub fn run(&mut self, phases: &[PublishPhase], records: &[PathBuf]) {
        let mut phases = phases.to_vec();
        phases.sort();
        phases.dedup();
        for phase in phases {
            info!(records = records.len(), "{}", phase);
            match phase {
                PublishPhase::Stores => self.publish_stores(records),
                PublishPhase::Coverages => self.publish_coverages(records),
                PublishPhase::LayerOptions => self.set_layer_options(records),
            }
        }
    }

    /// Create or update one coverage store per record
    pub fn publish_stores(&mut self, records: &[PathBuf]) {
        for path in records {
            self.process(path, CatalogObjectKind::Store, |record, context| {
                let store = store_description(record, context)?;
                Ok(Some(CatalogRequest {
                    kind: CatalogObjectKind::Store,
                    endpoint: store.endpoint(context.mode),
                    body: store.to_xml(),
                    name: store.name,
                }))
            });
        }
    }

    /// Create or update one coverage per record
    pub fn publish_coverages(&mut self, records: &[PathBuf]) {
        for path in records {
            self.process(path, CatalogObjectKind::Coverage, |record, context| {
                let coverage = coverage_description(record)?;
                Ok(Some(CatalogRequest {
                    kind: CatalogObjectKind::Coverage,
                    endpoint: coverage.endpoint(context.mode),
                    body: coverage.to_xml(),
                    name: coverage.name,
                }))
            });
        }
    }

    /// Set the default style of the layer derived from each coverage
    ///
    /// Records without a style are skipped with a warning and leave no log
    /// line.
    pub fn set_layer_options(&mut self, records: &[PathBuf]) {
        for path in records {
            self.process(path, CatalogObjectKind::Layer, |record, _| {
                Ok(layer_description(record)?.map(|layer| CatalogRequest {
                    kind: CatalogObjectKind::Layer,
                    endpoint: layer.endpoint(),
                    body: layer.to_xml(),
                    name: layer.name,
                }))
            });
        }
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn into_log(self) -> RunLog {
        self.log
    }

    fn process<F>(&mut self, path: &Path, kind: CatalogObjectKind, build: F)
    where
        F: FnOnce(&PublishRecord, &RunContext) -> Result<Option<CatalogRequest>, RecordError>,
    {
        info!(path = %path.display(), "Processing");

        let record = match PublishRecord::load(path) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load record");
                self.log
                    .push(kind, record_stem(path), RequestOutcome::Failed(e.to_string()));
                return;
            }
        };
        if self.context.debug {
            for (key, value) in record.values().iter() {
                debug!("{} : {}", key, value);
            }
        }

        let request = match build(&record, self.context) {
            Ok(Some(request)) => request,
            Ok(None) => return,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Record is incomplete");
                self.log
                    .push(kind, record.stem(), RequestOutcome::Failed(e.to_string()));
                return;
            }
        };

        let outcome = match self.transport.send(&request) {
            Ok(outcome) => RequestOutcome::from(outcome),
            Err(e) => RequestOutcome::Failed(e.to_string()),
        };
        info!(kind = %kind, name = %request.name, result = %outcome, "Result");
        self.log.push(kind, request.name, outcome);
    }
}

/// Store description for a record
///
/// The source path is the coverage root dir followed by the record's file
/// name.
pub fn store_description(
    record: &PublishRecord,
    context: &RunContext,
) -> Result<StoreDescription, RecordError> {
    Ok(StoreDescription {
        workspace: record.require(ConfigKey::StoreWorkspace)?.to_string(),
        name: record.require(ConfigKey::StoreName)?.to_string(),
        description: record.require(ConfigKey::StoreDescription)?.to_string(),
        datatype: record.require(ConfigKey::StoreDatatype)?.to_string(),
        source_path: context.source_path(record.require(ConfigKey::StoreFilename)?),
    })
}

pub fn coverage_description(record: &PublishRecord) -> Result<CoverageDescription, RecordError> {
    Ok(CoverageDescription {
        workspace: record.require(ConfigKey::StoreWorkspace)?.to_string(),
        store: record.require(ConfigKey::CoverageStoreName)?.to_string(),
        name: record.require(ConfigKey::CoverageName)?.to_string(),
        title: record.require(ConfigKey::CoverageTitle)?.to_string(),
        description: record.require(ConfigKey::CoverageDescription)?.to_string(),
        abstract_text: record.require(ConfigKey::CoverageAbstract)?.to_string(),
        keywords: CoverageDescription::keywords_from_list(
            record.require(ConfigKey::CoverageKeywords)?,
        ),
    })
}

/// Layer description for a record, or `None` when it has no style
pub fn layer_description(record: &PublishRecord) -> Result<Option<LayerDescription>, RecordError> {
    let style = record.require(ConfigKey::LayerStyle)?.trim();
    if style.is_empty() {
        warn!(record = %record.path().display(), "No style information, skipping");
        return Ok(None);
    }
    Ok(Some(LayerDescription {
        workspace: record.require(ConfigKey::StoreWorkspace)?.to_string(),
        name: record.require(ConfigKey::LayerCoverageName)?.to_string(),
        default_style: style.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConnection, KeyValues};
    use crate::transport::MockTransport;
    use geopublish_catalog::{Method, PublishMode};
    use std::fs;
    use tempfile::TempDir;

    const RECORD: &str = "coveragestore.workspace=env
coveragestore.datatype=GeoTIFF
coveragestore.filename=rasters/dem.tif
coveragestore.name=rivm_dem
coveragestore.description=Elevation
coverage.coveragestore.name=rivm_dem
coverage.name=dem
coverage.title=DEM
coverage.description=Heights
coverage.abstract=Heights above sea level
coverage.keywords=elevation, height
layer.coverage.name=dem
layer.style=dem_style
";

    fn context(mode: PublishMode) -> RunContext {
        let connection = CatalogConnection {
            host: "localhost:8080".to_string(),
            instance: "/geoserver".to_string(),
            coverage_root_dir: "/srv/".to_string(),
            ..Default::default()
        };
        RunContext::new("rasters", connection).with_mode(mode)
    }

    fn record(content: &str) -> PublishRecord {
        PublishRecord::new("rasters/dem.gpd", KeyValues::parse(content))
    }

    #[test]
    fn test_phases_selected_in_order() {
        assert_eq!(
            PublishPhase::selected(true, false, true),
            vec![PublishPhase::Stores, PublishPhase::LayerOptions]
        );
        assert!(PublishPhase::selected(false, false, false).is_empty());
    }

    #[test]
    fn test_store_description_source_path() {
        let store = store_description(&record(RECORD), &context(PublishMode::Create)).unwrap();
        assert_eq!(store.source_path, "/srv/rasters/dem.tif");
        assert_eq!(store.name, "rivm_dem");
        assert_eq!(store.datatype, "GeoTIFF");
    }

    #[test]
    fn test_coverage_description_keywords() {
        let coverage = coverage_description(&record(RECORD)).unwrap();
        assert_eq!(coverage.keywords, vec!["WCS", "elevation", "height"]);
        assert_eq!(coverage.store, "rivm_dem");
    }

    #[test]
    fn test_blank_style_skips() {
        let content = RECORD.replace("layer.style=dem_style", "layer.style=   ");
        assert!(layer_description(&record(&content)).unwrap().is_none());
    }

    #[test]
    fn test_missing_key_is_error() {
        let content = RECORD.replace("coverage.title=DEM\n", "");
        let err = coverage_description(&record(&content)).unwrap_err();
        assert!(err.to_string().contains("coverage.title"));
    }

    #[test]
    fn test_update_mode_puts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dem.gpd");
        fs::write(&path, RECORD).unwrap();

        let ctx = context(PublishMode::Update);
        let mock = MockTransport::with_status(200);
        let mut publisher = Publisher::new(&ctx, &mock);
        publisher.run(
            &[PublishPhase::LayerOptions, PublishPhase::Stores],
            &[path],
        );

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].kind, CatalogObjectKind::Store);
        assert_eq!(requests[0].endpoint.method, Method::Put);
        assert_eq!(requests[0].endpoint.path, "/workspaces/env/coveragestores/rivm_dem");
        assert_eq!(requests[1].endpoint.path, "/layers/env:dem");
        assert_eq!(
            publisher.log().lines(),
            vec!["coveragestore rivm_dem 200", "layer dem 200"]
        );
    }
}
