use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single numeric metric as it appeared in a result file.
///
/// The original JSON number is kept so integers written by the harness
/// (`"errors": 3`) are reported back as integers rather than `3.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metric(Number);

impl Metric {
    /// Build a metric from a float. Returns `None` for NaN or infinite values,
    /// which JSON cannot represent.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self)
    }

    /// The metric as a float, for arithmetic.
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }
}

impl From<u64> for Metric {
    fn from(value: u64) -> Self {
        Self(Number::from(value))
    }
}

impl From<Number> for Metric {
    fn from(value: Number) -> Self {
        Self(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one benchmark run, parsed from `<mode>-<concurrency>-<repeat>.<ext>`.
///
/// Ordering is mode (byte-wise), then concurrency, then repeat, all ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunKey {
    pub mode: String,
    pub concurrency: u64,
    pub repeat: u64,
}

impl RunKey {
    /// Create a new run key.
    pub fn new(mode: impl Into<String>, concurrency: u64, repeat: u64) -> Self {
        Self {
            mode: mode.into(),
            concurrency,
            repeat,
        }
    }

    /// The (mode, concurrency) group this run belongs to.
    pub fn group(&self) -> GroupKey {
        GroupKey {
            mode: self.mode.clone(),
            concurrency: self.concurrency,
        }
    }
}

/// Grouping key shared by all repeats of one (mode, concurrency) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub mode: String,
    pub concurrency: u64,
}

/// Metrics read from the body of a result file.
///
/// Every field is optional; unknown fields such as `latencies_ms` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    #[serde(default)]
    pub p50_ms: Option<Metric>,
    #[serde(default)]
    pub p95_ms: Option<Metric>,
    #[serde(default)]
    pub p99_ms: Option<Metric>,
    #[serde(default)]
    pub rps: Option<Metric>,
    #[serde(default)]
    pub errors: Option<Metric>,
    #[serde(default)]
    pub count: Option<Metric>,
}

/// One parsed benchmark run: the filename key plus the metrics from its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub key: RunKey,
    pub metrics: RunMetrics,
}

impl ResultRecord {
    /// Create a record from its key and metrics.
    pub fn new(key: RunKey, metrics: RunMetrics) -> Self {
        Self { key, metrics }
    }

    pub fn mode(&self) -> &str {
        &self.key.mode
    }

    pub fn concurrency(&self) -> u64 {
        self.key.concurrency
    }

    pub fn repeat(&self) -> u64 {
        self.key.repeat
    }
}

/// Summary of one (mode, concurrency) group.
///
/// Latency and throughput fields are means over the group's runs, `errors` is
/// a sum. A field is `None` only when missing values are skipped and no run in
/// the group reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub mode: String,
    pub concurrency: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub rps: Option<f64>,
    pub errors: Option<f64>,
    /// Number of runs in the group.
    pub runs: usize,
    /// Sample standard deviation of p95 across the group's runs.
    pub p95_std_dev: Option<f64>,
}
