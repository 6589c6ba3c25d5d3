//! Geopublish - raster publish data for GeoServer
//!
//! Generates per-dataset publish data records (`.gpd` files) from a
//! three-tier configuration (record, session, global) and pushes them to a
//! GeoServer catalog as coverage stores, coverages and layer options.

pub mod config;
pub mod discovery;
pub mod generate;
pub mod params;
pub mod prompt;
pub mod publish;
pub mod record;
pub mod transport;

pub use config::{CatalogConnection, ConfigKey, ConfigResolver, ConfigTier, KeyValues, RunContext, TierKind};
pub use discovery::{Datatype, DatasetFile, NameRules};
pub use generate::{GenerateOptions, Generator};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use publish::{PublishPhase, Publisher, RunLog, RunLogEntry, RequestOutcome};
pub use record::{PublishRecord, RecordError};
pub use transport::{CatalogRequest, CatalogTransport, DryRunTransport, HttpTransport, MockTransport};

pub use geopublish_catalog::{CatalogObjectKind, PublishMode};
