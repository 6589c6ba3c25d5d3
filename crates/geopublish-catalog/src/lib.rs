//! Geopublish catalog types
//!
//! Describes the objects pushed to the remote catalog (coverage stores,
//! coverages and layers), the XML bodies sent for them, and the REST
//! endpoints they are addressed at.

pub mod endpoint;
pub mod objects;
pub mod xml;

pub use endpoint::{Endpoint, Method, PublishMode};
pub use objects::{CatalogObjectKind, CoverageDescription, LayerDescription, StoreDescription};

/// Keyword always placed first in a coverage keyword list.
pub const LEADING_KEYWORD: &str = "WCS";

/// Suffix appended to every REST resource path.
pub const RESOURCE_SUFFIX: &str = ".xml";
