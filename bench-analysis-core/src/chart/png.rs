use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use tracing::debug;

use super::{ChartError, Series};

/// Font family every label on the chart is drawn with.
const FONT_FAMILY: &str = "sans-serif";

/// Directories searched for a TrueType font, most specific first.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Fonts preferred when several are installed.
const PREFERRED_FONTS: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Arial.ttf",
    "arial.ttf",
];

const MAX_FONT_SEARCH_DEPTH: usize = 4;

static FONT: OnceLock<Result<PathBuf, String>> = OnceLock::new();

/// Register a font for chart labels, once per process.
///
/// The first call decides the font: an `explicit` path passed on a later call
/// is ignored and the already registered font is used instead.
pub(super) fn ensure_font(explicit: Option<&Path>) -> Result<(), ChartError> {
    let registered = FONT.get_or_init(|| {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => find_system_font().ok_or_else(|| "no TrueType font found".to_string())?,
        };
        let bytes = fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
        // The font registry keeps the bytes for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        register_font(FONT_FAMILY, FontStyle::Normal, bytes)
            .map_err(|_| format!("{}: not a usable TrueType font", path.display()))?;
        debug!(font = %path.display(), "Registered chart font");
        Ok(path)
    });

    registered
        .as_ref()
        .map(|_| ())
        .map_err(|e| ChartError::Unavailable(e.clone()))
}

fn find_system_font() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    for dir in FONT_DIRS {
        collect_fonts(Path::new(dir), 0, &mut candidates);
    }

    PREFERRED_FONTS
        .iter()
        .find_map(|name| {
            candidates
                .iter()
                .find(|p| p.file_name().is_some_and(|f| f == *name))
                .cloned()
        })
        .or_else(|| candidates.into_iter().min())
}

fn collect_fonts(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_FONT_SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fonts(&path, depth + 1, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"))
        {
            out.push(path);
        }
    }
}

/// Axis bounds for a log-scaled x axis; a single point is padded by a factor of two.
fn x_bounds(series: &Series) -> (f64, f64) {
    let xs = series.values().flatten().map(|&(x, _)| x);
    let min = xs.clone().fold(f64::INFINITY, f64::min);
    let max = xs.fold(f64::NEG_INFINITY, f64::max);
    if min < max {
        (min, max)
    } else {
        (min / 2.0, max * 2.0)
    }
}

fn y_max(series: &Series) -> f64 {
    let max = series
        .values()
        .flatten()
        .map(|&(_, y)| y)
        .fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

pub(super) fn draw(series: &Series, path: &Path, size: (u32, u32)) -> Result<(), ChartError> {
    draw_inner(series, path, size).map_err(|e| ChartError::Render(e.to_string()))
}

fn draw_inner(series: &Series, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn Error>> {
    let (x_min, x_max) = x_bounds(series);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("p95 latency vs concurrency", (FONT_FAMILY, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_min..x_max).log_scale(), 0.0..y_max(series))?;

    chart
        .configure_mesh()
        .x_desc("concurrency")
        .y_desc("p95_ms")
        .draw()?;

    for (idx, (mode, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let line = color.stroke_width(2);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), line))?
            .label(mode.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
