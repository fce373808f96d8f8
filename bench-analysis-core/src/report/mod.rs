//! Tabular renderings of run results and group summaries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::{AggregateRecord, Metric, ResultRecord};

/// File name of the aggregate table written into the results directory.
pub const AGGREGATE_FILE_NAME: &str = "summary-agg.csv";

/// Header of the detailed per-run table.
pub const DETAILED_HEADER: [&str; 9] = [
    "mode",
    "concurrency",
    "repeat",
    "p50_ms",
    "p95_ms",
    "p99_ms",
    "rps",
    "errors",
    "count",
];

/// Header of the per-group aggregate table.
pub const AGGREGATE_HEADER: [&str; 7] = [
    "mode",
    "concurrency",
    "p50_ms",
    "p95_ms",
    "p99_ms",
    "rps",
    "errors",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes one CSV row per run, sorted by (mode, concurrency, repeat).
#[derive(Debug, Clone, Default)]
pub struct DetailedReporter;

impl DetailedReporter {
    pub fn new() -> Self {
        Self
    }

    /// Write the header and every record to `writer`. Records are not deduplicated.
    pub fn write<W: Write>(&self, writer: W, records: &[ResultRecord]) -> Result<(), ReportError> {
        let mut sorted: Vec<&ResultRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(DETAILED_HEADER)?;

        for record in sorted {
            let m = &record.metrics;
            csv.write_record([
                record.mode().to_string(),
                record.concurrency().to_string(),
                record.repeat().to_string(),
                format_metric(m.p50_ms.as_ref()),
                format_metric(m.p95_ms.as_ref()),
                format_metric(m.p99_ms.as_ref()),
                format_metric(m.rps.as_ref()),
                format_metric(m.errors.as_ref()),
                format_metric(m.count.as_ref()),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }
}

/// Writes one CSV row per (mode, concurrency) group, in the order given.
#[derive(Debug, Clone, Default)]
pub struct AggregateReporter;

impl AggregateReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write>(
        &self,
        writer: W,
        aggregates: &[AggregateRecord],
    ) -> Result<(), ReportError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(AGGREGATE_HEADER)?;

        for agg in aggregates {
            csv.write_record([
                agg.mode.clone(),
                agg.concurrency.to_string(),
                format_mean(agg.p50_ms),
                format_mean(agg.p95_ms),
                format_mean(agg.p99_ms),
                format_mean(agg.rps),
                format_total(agg.errors),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Write `summary-agg.csv` into `dir`, replacing any previous copy.
    pub fn write_file(
        &self,
        dir: &Path,
        aggregates: &[AggregateRecord],
    ) -> Result<PathBuf, ReportError> {
        let path = dir.join(AGGREGATE_FILE_NAME);
        let mut file = BufWriter::new(File::create(&path)?);
        self.write(&mut file, aggregates)?;
        file.flush()?;
        Ok(path)
    }
}

/// A metric as read, or an empty cell when absent.
fn format_metric(value: Option<&Metric>) -> String {
    value.map(Metric::to_string).unwrap_or_default()
}

/// Floating-point rendering that always keeps a fractional part (`6.0`, `10.5`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn format_mean(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

/// Sums of integral counts are written as integers.
fn format_total(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

mod terminal;
pub use terminal::TerminalSummary;
