use anyhow::Error;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::{RangedCoordf64, RangedCoordu32};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use surge_metrics::{LatencySeries, SummaryStats};

// 14x7 inches at 300 dpi
const CHART_WIDTH: u32 = 4200;
const CHART_HEIGHT: u32 = 2100;
const BIN_COUNT: usize = 50;

const ORANGE: RGBColor = RGBColor(255, 165, 0);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render the two-panel report: a latency histogram on top and a
/// latency-over-sequence scatter below, with median and p95 reference lines
/// on both. Overwrites `path` if it exists.
pub fn render_chart(
    series: &LatencySeries,
    stats: &SummaryStats,
    path: &Path,
) -> Result<(), Error> {
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let (top, bottom) = root.split_vertically((CHART_HEIGHT / 2) as i32);
    draw_histogram(&top, series, stats)?;
    draw_scatter(&bottom, series, stats)?;
    root.present()?;
    Ok(())
}

fn draw_histogram(area: &Area, series: &LatencySeries, stats: &SummaryStats) -> Result<(), Error> {
    let bins = histogram_bins(series.samples(), stats.min, stats.max, BIN_COUNT);
    let y_top = bins.iter().map(|&(_, _, c)| c).max().unwrap_or(0) as u32 * 11 / 10 + 1;
    let x_pad = ((stats.max - stats.min) * 0.02).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of Response Times (Histogram)", ("sans-serif", 56))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d((stats.min - x_pad)..(stats.max + x_pad), 0u32..y_top)?;
    chart
        .configure_mesh()
        .x_desc("Response Time (ms)")
        .y_desc("Frequency")
        .label_style(("sans-serif", 36))
        .axis_desc_style(("sans-serif", 40))
        .draw()?;

    chart.draw_series(
        bins.iter()
            .map(|&(x0, x1, c)| Rectangle::new([(x0, 0), (x1, c as u32)], BLUE.mix(0.7).filled())),
    )?;

    vline(&mut chart, stats.median, y_top, &RED, format!("Median: {:.2}ms", stats.median))?;
    vline(&mut chart, stats.p95, y_top, &ORANGE, format!("95th %ile: {:.2}ms", stats.p95))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 36))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn draw_scatter(area: &Area, series: &LatencySeries, stats: &SummaryStats) -> Result<(), Error> {
    let n = series.len() as f64;
    let y_top = (stats.max * 1.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Response Times Over Time", ("sans-serif", 56))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..n.max(1.0), 0f64..y_top)?;
    chart
        .configure_mesh()
        .x_desc("Request Number")
        .y_desc("Response Time (ms)")
        .label_style(("sans-serif", 36))
        .axis_desc_style(("sans-serif", 40))
        .draw()?;

    chart.draw_series(
        series
            .samples()
            .iter()
            .enumerate()
            .map(|(i, &v)| Circle::new((i as f64, v), 6, GREEN.mix(0.6).filled())),
    )?;

    hline(&mut chart, stats.median, n, &RED, format!("Median: {:.2}ms", stats.median))?;
    hline(&mut chart, stats.p95, n, &ORANGE, format!("95th %ile: {:.2}ms", stats.p95))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 36))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn vline<'a, 'b>(
    chart: &mut ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordu32>>,
    x: f64,
    y_top: u32,
    color: &'static RGBColor,
    label: String,
) -> Result<(), Error> {
    let style = ShapeStyle::from(color).stroke_width(6);
    chart
        .draw_series(LineSeries::new(vec![(x, 0u32), (x, y_top)], style))?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], style));
    Ok(())
}

fn hline<'a, 'b>(
    chart: &mut ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    y: f64,
    x_max: f64,
    color: &'static RGBColor,
    label: String,
) -> Result<(), Error> {
    let style = ShapeStyle::from(color).stroke_width(6);
    chart
        .draw_series(LineSeries::new(vec![(0.0, y), (x_max, y)], style))?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], style));
    Ok(())
}

/// Fixed-width bins over [min, max]; the max sample lands in the last bin.
/// Returns (bin start, bin end, count) per bin.
fn histogram_bins(samples: &[f64], min: f64, max: f64, bins: usize) -> Vec<(f64, f64, usize)> {
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for &s in samples {
        let idx = (((s - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let x0 = min + i as f64 * width;
            (x0, x0 + width, c)
        })
        .collect()
}
