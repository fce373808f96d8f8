use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an analysis run.
///
/// Files whose names do not match `<mode>-<concurrency>-<repeat>.<ext>` are
/// filtered out by the loader and never produce one of these.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The results directory could not be listed.
    #[error("Failed to read results directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A result file could not be read.
    #[error("Failed to read result file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A result file's contents are not valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A result file is valid JSON but its top level is not an object.
    #[error("Expected a JSON object in {path}")]
    NotAnObject { path: PathBuf },

    /// A group contains a run that did not report a metric needed for its summary.
    #[error("Missing {field} in a run of group mode={mode} concurrency={concurrency}")]
    MissingMetric {
        mode: String,
        concurrency: u64,
        field: &'static str,
    },

    /// Writing a report failed.
    #[error(transparent)]
    Report(#[from] crate::report::ReportError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
