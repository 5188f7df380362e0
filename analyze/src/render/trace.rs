use std::path::Path;

use plotters::prelude::*;

use super::DEEP_PALETTE;
use crate::config::ensure_parent;
use crate::error::{Result, TopicsError};

/// Line chart of coherence against the number of topics tried.
pub fn save(corpus_name: &str, trace: &[(usize, f64)], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    draw(corpus_name, trace, path).map_err(|e| TopicsError::render(path, e))
}

fn draw(corpus_name: &str, trace: &[(usize, f64)], path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (x_range, y_range) = ranges(trace);

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(corpus_name, ("sans-serif", 22))
        .margin(10)
        .set_all_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Number of topics")
        .y_desc("coherence score")
        .draw()?;

    let color = DEEP_PALETTE[0];
    let points: Vec<(f64, f64)> = trace.iter().map(|(k, s)| (*k as f64, *s)).collect();
    chart.draw_series(LineSeries::new(points.clone(), &color))?;
    chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;

    root.present()?;
    Ok(())
}

/// Axis ranges with a little padding; degenerate traces get a unit span.
pub fn ranges(trace: &[(usize, f64)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let xs = trace.iter().map(|(k, _)| *k as f64);
    let ys = trace.iter().map(|(_, s)| *s).filter(|s| s.is_finite());

    let (x_min, x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let (y_min, y_max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));

    let pad = |lo: f64, hi: f64| -> std::ops::Range<f64> {
        if !lo.is_finite() || !hi.is_finite() {
            0.0..1.0
        } else if hi - lo < f64::EPSILON {
            (lo - 0.5)..(hi + 0.5)
        } else {
            let margin = (hi - lo) * 0.05;
            (lo - margin)..(hi + margin)
        }
    };

    (pad(x_min, x_max), pad(y_min, y_max))
}
