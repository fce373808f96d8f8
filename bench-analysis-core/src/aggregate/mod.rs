//! Per-(mode, concurrency) aggregation of run results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::AnalysisError;
use crate::record::{AggregateRecord, GroupKey, Metric, ResultRecord};

/// How aggregation treats a run that did not report a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// A missing value anywhere in a group fails the whole run.
    #[default]
    Fatal,
    /// Missing values are left out of that field's mean or sum.
    Skip,
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown missing-value policy '{}' (expected 'fatal' or 'skip')",
                other
            )),
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Running sum and count for one metric of one group.
#[derive(Debug, Clone, Default)]
struct FieldAccumulator {
    sum: f64,
    present: usize,
    absent: usize,
}

impl FieldAccumulator {
    fn add(&mut self, value: Option<&Metric>) {
        match value {
            Some(metric) => {
                self.sum += metric.as_f64();
                self.present += 1;
            }
            None => self.absent += 1,
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.present > 0).then(|| self.sum / self.present as f64)
    }

    fn total(&self) -> Option<f64> {
        (self.present > 0).then_some(self.sum)
    }
}

/// Accumulated state for one (mode, concurrency) group.
#[derive(Debug, Clone, Default)]
pub struct GroupAccumulator {
    p50_ms: FieldAccumulator,
    p95_ms: FieldAccumulator,
    p99_ms: FieldAccumulator,
    rps: FieldAccumulator,
    errors: FieldAccumulator,
    p95_samples: Vec<f64>,
    runs: usize,
}

impl GroupAccumulator {
    /// Fold one run into the group.
    pub fn add(&mut self, record: &ResultRecord) {
        let m = &record.metrics;
        self.runs += 1;

        self.p50_ms.add(m.p50_ms.as_ref());
        self.p95_ms.add(m.p95_ms.as_ref());
        self.p99_ms.add(m.p99_ms.as_ref());
        self.rps.add(m.rps.as_ref());
        self.errors.add(m.errors.as_ref());

        if let Some(p95) = &m.p95_ms {
            self.p95_samples.push(p95.as_f64());
        }
    }

    /// The first aggregated field, in column order, that some run of the group lacks.
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("p50_ms", &self.p50_ms),
            ("p95_ms", &self.p95_ms),
            ("p99_ms", &self.p99_ms),
            ("rps", &self.rps),
            ("errors", &self.errors),
        ]
        .into_iter()
        .find(|(_, field)| field.absent > 0)
        .map(|(name, _)| name)
    }

    /// Reduce the group to its summary record.
    pub fn finish(&self, key: GroupKey) -> AggregateRecord {
        let p95_std_dev = if self.p95_samples.len() >= 2 {
            Some(self.p95_samples.iter().std_dev())
        } else {
            None
        };

        AggregateRecord {
            mode: key.mode,
            concurrency: key.concurrency,
            p50_ms: self.p50_ms.mean(),
            p95_ms: self.p95_ms.mean(),
            p99_ms: self.p99_ms.mean(),
            rps: self.rps.mean(),
            errors: self.errors.total(),
            runs: self.runs,
            p95_std_dev,
        }
    }
}

/// Partition records into (mode, concurrency) groups.
///
/// With [`MissingPolicy::Fatal`] the first group (in key order) holding a run
/// without one of the aggregated metrics aborts with [`AnalysisError::MissingMetric`].
pub fn group_records(
    records: &[ResultRecord],
    policy: MissingPolicy,
) -> Result<BTreeMap<GroupKey, GroupAccumulator>, AnalysisError> {
    let mut groups: BTreeMap<GroupKey, GroupAccumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.key.group()).or_default().add(record);
    }

    if policy == MissingPolicy::Fatal {
        for (key, acc) in &groups {
            if let Some(field) = acc.first_missing() {
                return Err(AnalysisError::MissingMetric {
                    mode: key.mode.clone(),
                    concurrency: key.concurrency,
                    field,
                });
            }
        }
    }

    Ok(groups)
}

/// Compute one summary per (mode, concurrency), ascending by group key.
pub fn aggregate(
    records: &[ResultRecord],
    policy: MissingPolicy,
) -> Result<Vec<AggregateRecord>, AnalysisError> {
    let groups = group_records(records, policy)?;
    Ok(groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect())
}
