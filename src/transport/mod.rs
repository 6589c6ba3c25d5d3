//! Catalog transport
//!
//! Abstracts the REST calls for testability. Provides:
//! - CatalogTransport trait: send one catalog request, report the outcome
//! - HttpTransport: blocking HTTP with Basic authentication
//! - DryRunTransport: echoes what would be sent (debug mode)
//! - MockTransport: in-memory recorder for tests

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use geopublish_catalog::{CatalogObjectKind, Endpoint};
use tracing::{debug, info, warn};

use crate::config::{CatalogConnection, ContextError};

/// Request timeout for catalog calls
pub const REQUEST_TIMEOUT_SECONDS: u64 = 60;

/// XML content type sent with every request
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// One request against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub kind: CatalogObjectKind,
    /// Name of the object the request is about
    pub name: String,
    pub endpoint: Endpoint,
    /// XML body
    pub body: String,
}

/// What the transport reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The catalog answered with this HTTP status
    Status(u16),
    /// Nothing was sent
    DryRun,
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("connection refused: {0}")]
    Refused(String),
}

/// Transport trait for catalog requests
pub trait CatalogTransport {
    /// Send one request. Response bodies are ignored; only the status
    /// matters.
    fn send(&self, request: &CatalogRequest) -> Result<SendOutcome, TransportError>;
}

/// Blocking HTTP transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    rest_root: String,
    user: String,
    password: String,
}

impl HttpTransport {
    /// Create a transport for the given connection
    pub fn new(connection: &CatalogConnection) -> Result<Self, TransportError> {
        let rest_root = connection.rest_root()?;

        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS));
        if connection.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            rest_root,
            user: connection.user.clone(),
            password: connection.password.clone(),
        })
    }

    pub fn rest_root(&self) -> &str {
        &self.rest_root
    }
}

impl CatalogTransport for HttpTransport {
    fn send(&self, request: &CatalogRequest) -> Result<SendOutcome, TransportError> {
        let url = request.endpoint.url(&self.rest_root);
        info!(method = %request.endpoint.method, url = %url, "API request");

        let builder = match request.endpoint.method {
            geopublish_catalog::Method::Post => self.client.post(&url),
            geopublish_catalog::Method::Put => self.client.put(&url),
        };

        let response = builder
            .basic_auth(&self.user, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_XML)
            .body(request.body.clone())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "Catalog rejected request");
        }
        Ok(SendOutcome::Status(status.as_u16()))
    }
}

/// Transport that only echoes requests
#[derive(Debug, Clone)]
pub struct DryRunTransport {
    rest_root: String,
}

impl DryRunTransport {
    pub fn new(rest_root: impl Into<String>) -> Self {
        Self {
            rest_root: rest_root.into(),
        }
    }

    /// Dry run for a connection; an unconfigured host shows as a bare path
    pub fn for_connection(connection: &CatalogConnection) -> Self {
        Self::new(connection.rest_root().unwrap_or_else(|_| "/rest".to_string()))
    }
}

impl CatalogTransport for DryRunTransport {
    fn send(&self, request: &CatalogRequest) -> Result<SendOutcome, TransportError> {
        let url = request.endpoint.url(&self.rest_root);
        info!(method = %request.endpoint.method, url = %url, "API request (dry run)");
        debug!("Config XML:\n{}", request.body);
        Ok(SendOutcome::DryRun)
    }
}

/// In-memory transport for tests
///
/// Records every request; requests for names registered with
/// [`fail_for`](MockTransport::fail_for) fail with a transport error.
pub struct MockTransport {
    status: u16,
    failing: HashSet<String>,
    requests: Mutex<Vec<CatalogRequest>>,
}

impl MockTransport {
    /// Mock answering every request with 201
    pub fn new() -> Self {
        Self::with_status(201)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make requests for `name` fail
    pub fn fail_for(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<CatalogRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogTransport for MockTransport {
    fn send(&self, request: &CatalogRequest) -> Result<SendOutcome, TransportError> {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
        if self.failing.contains(&request.name) {
            return Err(TransportError::Refused(format!(
                "mock refused {}",
                request.name
            )));
        }
        Ok(SendOutcome::Status(self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopublish_catalog::PublishMode;

    fn request(name: &str) -> CatalogRequest {
        CatalogRequest {
            kind: CatalogObjectKind::Store,
            name: name.to_string(),
            endpoint: Endpoint::coverage_store(PublishMode::Create, "env", name),
            body: "<coverageStore/>".to_string(),
        }
    }

    #[test]
    fn test_mock_records_and_fails() {
        let mock = MockTransport::with_status(200).fail_for("bad");
        assert_eq!(mock.send(&request("good")).unwrap(), SendOutcome::Status(200));
        let err = mock.send(&request("bad")).unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_dry_run_sends_nothing() {
        let dry = DryRunTransport::new("http://localhost/geoserver/rest");
        assert_eq!(dry.send(&request("dem")).unwrap(), SendOutcome::DryRun);
    }

    #[test]
    fn test_dry_run_without_host() {
        let dry = DryRunTransport::for_connection(&CatalogConnection::default());
        assert_eq!(dry.send(&request("dem")).unwrap(), SendOutcome::DryRun);
    }

    #[test]
    fn test_http_transport_requires_host() {
        let err = HttpTransport::new(&CatalogConnection::default()).err().unwrap();
        assert!(matches!(err, TransportError::Context(_)));
    }

    #[test]
    fn test_http_transport_rest_root() {
        let connection = CatalogConnection {
            host: "localhost:8080".to_string(),
            instance: "/geoserver".to_string(),
            user: "admin".to_string(),
            password: "secret".to_string(),
            no_proxy: true,
            ..Default::default()
        };
        let transport = HttpTransport::new(&connection).unwrap();
        assert_eq!(transport.rest_root(), "http://localhost:8080/geoserver/rest");
    }
}
