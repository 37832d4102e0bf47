//! SVG line charts of selected group series.

use crate::aggregate::SeriesLine;
use crate::date::{fmt_axis_label, fmt_offset};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;
use time::UtcOffset;

/// Labels and layout for one chart.
#[derive(Clone, Debug)]
pub struct ChartSpec<'a> {
    pub title: &'a str,
    pub y_desc: &'a str,
    pub offset: UtcOffset,
    pub size: (u32, u32),
}

fn bounds(lines: &[SeriesLine]) -> ((i64, i64), (f64, f64)) {
    let mut x = (i64::MAX, i64::MIN);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for (bx, by) in lines.iter().flat_map(|l| l.points.iter()) {
        x = (x.0.min(*bx), x.1.max(*bx));
        if by.is_finite() {
            y = (y.0.min(*by), y.1.max(*by));
        }
    }
    if x.0 > x.1 { x = (0, 3600); }
    if x.0 == x.1 { x = (x.0 - 1800, x.1 + 1800); }
    if !(y.0 <= y.1) { y = (0.0, 1.0); }
    let pad = if y.1 > y.0 { (y.1 - y.0) * 0.05 } else { y.0.abs().max(1e-6) * 0.05 };
    (x, (y.0 - pad, y.1 + pad))
}

/// Render one multi-series line chart, one colour per group key, to an SVG file.
pub fn render_trend_chart(path: &Path, spec: &ChartSpec<'_>, lines: &[SeriesLine]) -> Result<()> {
    let ((x0, x1), (y0, y1)) = bounds(lines);
    let offset = spec.offset;
    let x_desc = format!("time ({})", fmt_offset(offset));

    let root = SVGBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE).with_context(|| format!("draw {}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(80)
        .build_cartesian_2d(x0..x1, y0..y1)
        .with_context(|| format!("layout {}", path.display()))?;

    chart
        .configure_mesh()
        .x_desc(x_desc.as_str())
        .y_desc(spec.y_desc)
        .x_labels(8)
        .x_label_formatter(&|x: &i64| fmt_axis_label(*x, offset))
        .y_label_formatter(&|y: &f64| format!("{:.2e}", y))
        .draw()
        .with_context(|| format!("draw mesh {}", path.display()))?;

    for (i, line) in lines.iter().enumerate() {
        let color = Palette99::pick(i).mix(1.0);
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))
            .with_context(|| format!("draw series {:?}", line.key))?
            .label(line.key.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .with_context(|| format!("draw legend {}", path.display()))?;
    }

    root.present().with_context(|| format!("write {}", path.display()))?;
    tracing::info!("Wrote chart {}", path.display());
    Ok(())
}
