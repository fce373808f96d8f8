//! Optional rendering of mean p95 latency against concurrency.
//!
//! Rendering is best effort: callers are expected to log and discard any
//! [`ChartError`], never to fail the analysis because of it.

use std::collections::BTreeMap;
#[cfg(feature = "chart")]
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::AggregateRecord;

/// File name of the chart written into the results directory.
pub const CHART_FILE_NAME: &str = "p95_vs_concurrency.png";

/// Errors that can occur while rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// This build or this machine cannot draw charts.
    #[error("Chart rendering unavailable: {0}")]
    Unavailable(String),

    /// The data cannot be placed on the chart's axes.
    #[error("Invalid chart data: {0}")]
    InvalidData(String),

    /// The drawing backend failed.
    #[error("Chart rendering failed: {0}")]
    Render(String),
}

/// Draws the summary chart for a set of group aggregates.
pub trait ChartRenderer {
    /// Render `aggregates` to an image at `path`.
    fn render(&self, aggregates: &[AggregateRecord], path: &Path) -> Result<(), ChartError>;
}

/// One line per mode: `(concurrency, mean p95)` points sorted by concurrency.
pub type Series = BTreeMap<String, Vec<(f64, f64)>>;

/// Build the per-mode p95 series for a log-scaled concurrency axis.
///
/// Groups without a p95 mean are left out. A group with concurrency 0 has no
/// position on a log axis and is rejected.
pub fn p95_series(aggregates: &[AggregateRecord]) -> Result<Series, ChartError> {
    let mut series = Series::new();

    for agg in aggregates {
        let Some(p95) = agg.p95_ms else {
            continue;
        };
        if agg.concurrency == 0 {
            return Err(ChartError::InvalidData(format!(
                "mode {} has concurrency 0, which cannot be shown on a log axis",
                agg.mode
            )));
        }
        series
            .entry(agg.mode.clone())
            .or_default()
            .push((agg.concurrency as f64, p95));
    }

    for points in series.values_mut() {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    Ok(series)
}

/// Renders the p95-vs-concurrency chart as a PNG.
#[derive(Debug, Clone)]
pub struct PngChartRenderer {
    pub width: u32,
    pub height: u32,
    /// TrueType font to label the chart with. Searched for on the system when unset.
    pub font: Option<PathBuf>,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            font: None,
        }
    }
}

impl PngChartRenderer {
    pub fn new(width: u32, height: u32, font: Option<PathBuf>) -> Self {
        Self {
            width,
            height,
            font,
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    #[cfg(feature = "chart")]
    fn render(&self, aggregates: &[AggregateRecord], path: &Path) -> Result<(), ChartError> {
        let series = p95_series(aggregates)?;
        if series.is_empty() {
            return Err(ChartError::InvalidData("no p95 values to plot".to_string()));
        }
        png::ensure_font(self.font.as_deref())?;

        let size = (self.width, self.height);
        catch_silently(|| png::draw(&series, path, size))
    }

    #[cfg(not(feature = "chart"))]
    fn render(&self, _aggregates: &[AggregateRecord], _path: &Path) -> Result<(), ChartError> {
        Err(ChartError::Unavailable(
            "built without the `chart` feature".to_string(),
        ))
    }
}

/// Run `draw`, turning a panic into a render error without printing it.
#[cfg(feature = "chart")]
fn catch_silently<F>(draw: F) -> Result<(), ChartError>
where
    F: FnOnce() -> Result<(), ChartError>,
{
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(draw));
    panic::set_hook(hook);

    result.unwrap_or_else(|_| Err(ChartError::Render("drawing backend panicked".to_string())))
}

#[cfg(feature = "chart")]
mod png;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_aggregate(mode: &str, concurrency: u64, p95: Option<f64>) -> AggregateRecord {
        AggregateRecord {
            mode: mode.to_string(),
            concurrency,
            p50_ms: None,
            p95_ms: p95,
            p99_ms: None,
            rps: None,
            errors: None,
            runs: 1,
            p95_std_dev: None,
        }
    }

    #[test]
    fn test_p95_series_groups_by_mode() {
        let aggregates = vec![
            make_aggregate("b", 16, Some(4.0)),
            make_aggregate("a", 64, Some(9.0)),
            make_aggregate("a", 8, Some(2.0)),
            make_aggregate("a", 32, None),
        ];

        let series = p95_series(&aggregates).unwrap();

        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(series["a"], vec![(8.0, 2.0), (64.0, 9.0)]);
        assert_eq!(series["b"], vec![(16.0, 4.0)]);
    }

    #[test]
    fn test_p95_series_rejects_zero_concurrency() {
        let aggregates = vec![make_aggregate("a", 0, Some(1.0))];
        assert!(matches!(
            p95_series(&aggregates),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[cfg(feature = "chart")]
    #[test]
    fn test_catch_silently_turns_panic_into_error() {
        let result = catch_silently(|| panic!("backend exploded"));
        assert!(matches!(result, Err(ChartError::Render(_))));

        assert!(catch_silently(|| Ok(())).is_ok());
    }

    #[test]
    fn test_renderer_reports_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHART_FILE_NAME);

        let result = PngChartRenderer::default().render(&[], &path);

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
