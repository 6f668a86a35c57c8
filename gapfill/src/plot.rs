// gapfill/src/plot.rs

//! Optional diagnostic plot: one scatter panel of the prepared series above
//! one of the filled series, written as a PNG next to the other artifacts.

use plotters::prelude::*;

use gapfill_core::series::Series;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 620;

/// Draws the before/after scatter for one file.
pub fn scatter_before_after(
    path: &std::path::Path,
    before: &Series,
    after: &Series,
) -> anyhow::Result<()> {
    if before.is_empty() || after.is_empty() {
        return anyhow::Ok(());
    }

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let (top, bottom) = root.split_vertically((HEIGHT / 2) as i32);
    draw_panel(&top, before, &BLACK)?;
    draw_panel(&bottom, after, &BLUE)?;
    root.present()?;

    anyhow::Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    series: &Series,
    color: &RGBColor,
) -> anyhow::Result<()> {
    // x axis in seconds relative to the first sample
    let origin = series.samples()[0].timestamp;
    let points: Vec<(f64, f64)> = series
        .samples()
        .iter()
        .map(|sample| {
            let offset = (sample.timestamp - origin)
                .num_nanoseconds()
                .unwrap_or(i64::MAX) as f64
                / 1e9;
            (offset, sample.value)
        })
        .collect();

    let x_max = points.last().map(|&(x, _)| x).unwrap_or(0.0);
    let (y_min, y_max) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)),
    );

    // degenerate ranges would collapse the coordinate system
    let x_range = 0.0..if x_max > 0.0 { x_max } else { 1.0 };
    let y_range = if y_max > y_min {
        y_min..y_max
    } else {
        y_min - 0.5..y_min + 0.5
    };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(x_range, y_range)?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 2, color.filled())),
    )?;

    anyhow::Ok(())
}
