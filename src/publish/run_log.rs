//! Run log
//!
//! One line per processed record and phase: `<kind> <name> <result>`.
//! The log is append-only during the run and only shown at the end.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use geopublish_catalog::{CatalogObjectKind, PublishMode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::transport::SendOutcome;

/// Schema identifier for the persisted run report
pub const RUN_REPORT_SCHEMA_ID: &str = "geopublish/run_report@1";

/// Result recorded for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// HTTP status returned by the catalog
    Status(u16),
    /// Stringified transport or record error
    Failed(String),
    /// Debug mode, nothing sent
    DryRun,
}

impl RequestOutcome {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Status(code) if (200..300).contains(code))
    }
}

impl From<SendOutcome> for RequestOutcome {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Status(code) => RequestOutcome::Status(code),
            SendOutcome::DryRun => RequestOutcome::DryRun,
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestOutcome::Status(code) => write!(f, "{}", code),
            RequestOutcome::Failed(error) => f.write_str(error),
            RequestOutcome::DryRun => f.write_str("dry-run"),
        }
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub kind: CatalogObjectKind,
    pub name: String,
    pub outcome: RequestOutcome,
}

impl fmt::Display for RunLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.name, self.outcome)
    }
}

/// In-memory run log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    entries: Vec<RunLogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: CatalogObjectKind, name: impl Into<String>, outcome: RequestOutcome) {
        self.entries.push(RunLogEntry {
            kind,
            name: name.into(),
            outcome,
        });
    }

    pub fn entries(&self) -> &[RunLogEntry] {
        &self.entries
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: CatalogObjectKind) -> impl Iterator<Item = &RunLogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Rendered lines
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Entries without a 2xx status (dry runs excluded)
    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome != RequestOutcome::DryRun && !e.outcome.is_success())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persisted form of a run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_id: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub mode: PublishMode,
    pub debug: bool,
    pub entries: Vec<RunLogEntry>,
    pub failures: usize,
}

impl RunReport {
    pub fn from_log(log: &RunLog, mode: PublishMode, debug: bool) -> Self {
        Self {
            schema_id: RUN_REPORT_SCHEMA_ID.to_string(),
            run_id: ulid::Ulid::new().to_string(),
            created_at: Utc::now(),
            mode,
            debug,
            entries: log.entries().to_vec(),
            failures: log.failure_count(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Write the report unless it belongs to a debug run
    ///
    /// A debug run only logs the JSON. Returns whether the file was written.
    pub fn save(&self, path: &Path) -> io::Result<bool> {
        if self.debug {
            let json = self.to_json().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            info!(path = %path.display(), "Run report (not written):\n{}", json);
            return Ok(false);
        }
        self.write_to_file(path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_line_format() {
        let mut log = RunLog::new();
        log.push(CatalogObjectKind::Store, "dem", RequestOutcome::Status(201));
        log.push(
            CatalogObjectKind::Coverage,
            "dem",
            RequestOutcome::Failed("connection refused".to_string()),
        );
        log.push(CatalogObjectKind::Layer, "dem", RequestOutcome::DryRun);
        assert_eq!(
            log.lines(),
            vec![
                "coveragestore dem 201",
                "coverage dem connection refused",
                "layer dem dry-run",
            ]
        );
    }

    #[test]
    fn test_failure_count() {
        let mut log = RunLog::new();
        log.push(CatalogObjectKind::Store, "a", RequestOutcome::Status(201));
        log.push(CatalogObjectKind::Store, "b", RequestOutcome::Status(500));
        log.push(CatalogObjectKind::Store, "c", RequestOutcome::Failed("x".to_string()));
        log.push(CatalogObjectKind::Store, "d", RequestOutcome::DryRun);
        assert_eq!(log.failure_count(), 2);
        assert_eq!(log.of_kind(CatalogObjectKind::Store).count(), 4);
    }

    #[test]
    fn test_report_written() {
        let dir = TempDir::new().unwrap();
        let mut log = RunLog::new();
        log.push(CatalogObjectKind::Layer, "dem", RequestOutcome::Status(200));

        let report = RunReport::from_log(&log, PublishMode::Update, false);
        let path = dir.path().join("run.json");
        assert!(report.save(&path).unwrap());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["schema_id"], RUN_REPORT_SCHEMA_ID);
        assert_eq!(json["mode"], "update");
        assert_eq!(json["entries"][0]["kind"], "layer");
        assert_eq!(json["entries"][0]["outcome"]["value"], 200);
        assert_eq!(json["failures"], 0);
    }

    #[test]
    fn test_debug_report_not_written() {
        let dir = TempDir::new().unwrap();
        let mut log = RunLog::new();
        log.push(CatalogObjectKind::Store, "dem", RequestOutcome::DryRun);

        let report = RunReport::from_log(&log, PublishMode::Create, true);
        let path = dir.path().join("run.json");
        assert!(!report.save(&path).unwrap());
        assert!(!path.exists());
    }
}
