//! Discovery and parsing of per-run result files.
//!
//! A run file is named `<mode>-<concurrency>-<repeat>.<ext>`. Anything else in
//! the results directory (aggregate tables, charts, helper dumps such as
//! `bh2-agg-0001.json`) is silently left out of the dataset.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::record::{Metric, ResultRecord, RunKey, RunMetrics};

/// Delimiter between the tokens of a run file name.
pub const KEY_DELIMITER: char = '-';

/// Default extension of run result files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Options controlling which files the loader picks up.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// File extension (without the leading dot) of run result files.
    pub extension: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl LoaderOptions {
    /// Create loader options for the given extension. A leading dot is ignored.
    pub fn with_extension(extension: impl AsRef<str>) -> Self {
        Self {
            extension: extension.as_ref().trim_start_matches('.').to_string(),
        }
    }
}

/// Parse a run key out of a file name.
///
/// The stem is everything before the first `.`; it must split on `-` into at
/// least three tokens, the second and third made only of ASCII digits. Tokens
/// after the third are ignored. Returns `None` for files that are not runs.
pub fn parse_run_key(file_name: &str, extension: &str) -> Option<RunKey> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    if !file_name.ends_with(&suffix) {
        return None;
    }

    let stem = file_name.split('.').next().unwrap_or_default();
    let mut tokens = stem.split(KEY_DELIMITER);

    let mode = tokens.next()?;
    let concurrency = parse_index(tokens.next()?)?;
    let repeat = parse_index(tokens.next()?)?;

    Some(RunKey::new(mode, concurrency, repeat))
}

/// Base-10 unsigned integer, digits only.
fn parse_index(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parse the body of a result file into a record.
///
/// Absent, `null` and non-numeric metric fields become `None`. A body that is
/// not valid JSON, or whose top level is not an object, is an error.
pub fn parse_metrics(
    key: RunKey,
    contents: &str,
    path: &Path,
) -> Result<ResultRecord, AnalysisError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|source| AnalysisError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
    let Value::Object(body) = value else {
        return Err(AnalysisError::NotAnObject {
            path: path.to_path_buf(),
        });
    };

    let field = |name: &str| -> Option<Metric> {
        match body.get(name) {
            Some(Value::Number(n)) => Some(Metric::from(n.clone())),
            _ => None,
        }
    };

    let metrics = RunMetrics {
        p50_ms: field("p50_ms"),
        p95_ms: field("p95_ms"),
        p99_ms: field("p99_ms"),
        rps: field("rps"),
        errors: field("errors"),
        count: field("count"),
    };

    Ok(ResultRecord::new(key, metrics))
}

/// List the run files in `dir`, sorted by file name, paired with their keys.
pub fn discover_runs(
    dir: &Path,
    options: &LoaderOptions,
) -> Result<Vec<(RunKey, PathBuf)>, AnalysisError> {
    let read_dir_err = |source| AnalysisError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut runs = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match parse_run_key(file_name, &options.extension) {
            Some(key) => runs.push((key, path)),
            None => debug!(file = %path.display(), "Skipping file that is not a run result"),
        }
    }

    runs.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(runs)
}

/// Load every run result in `dir`.
///
/// Any read or JSON error is fatal; only file-name mismatches are skipped.
pub fn load_results(
    dir: &Path,
    options: &LoaderOptions,
) -> Result<Vec<ResultRecord>, AnalysisError> {
    let runs = discover_runs(dir, options)?;

    let mut records = Vec::with_capacity(runs.len());
    for (key, path) in runs {
        let contents = fs::read_to_string(&path).map_err(|source| AnalysisError::ReadFile {
            path: path.clone(),
            source,
        })?;
        records.push(parse_metrics(key, &contents, &path)?);
    }

    info!(dir = %dir.display(), records = records.len(), "Loaded run results");
    Ok(records)
}
