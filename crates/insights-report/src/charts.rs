//! Chart rendering with plotters.
//!
//! Static charts go to PNG under `<reports>/figures/`; the segment scatter
//! is rendered to SVG and embedded in a standalone HTML page together with
//! a JSON block of the underlying points.

use std::path::{Path, PathBuf};

use insights_analysis::aggregator::{CorrelationMatrix, HourlyMean, WeekdayStats};
use insights_analysis::segmenter::{SegmentLabel, SegmentedUser};
use insights_core::error::{PipelineError, Result};
use insights_core::models::MergedDaily;
use plotters::prelude::*;
use tracing::info;

pub const DAILY_PATTERNS_FILE: &str = "daily_patterns.png";
pub const HOURLY_PATTERNS_FILE: &str = "hourly_patterns.png";
pub const CORRELATIONS_FILE: &str = "correlations.png";
pub const SLEEP_PATTERNS_FILE: &str = "sleep_patterns.png";
pub const USER_SEGMENTS_FILE: &str = "user_segments.html";

const PNG_SIZE: (u32, u32) = (900, 600);

/// Everything the chart set needs, borrowed from the analysis results.
pub struct ChartInputs<'a> {
    pub weekday_patterns: &'a [WeekdayStats],
    pub hourly_steps: &'a [HourlyMean],
    pub correlations: &'a CorrelationMatrix,
    pub merged_daily: &'a [MergedDaily],
    pub segments: &'a [SegmentedUser],
}

fn chart_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Chart(e.to_string())
}

/// Render the full chart set into `figures_dir` and return the paths
/// written, in figure-list order.
pub fn render_all(figures_dir: &Path, inputs: &ChartInputs<'_>) -> Result<Vec<PathBuf>> {
    let paths = vec![
        figures_dir.join(DAILY_PATTERNS_FILE),
        figures_dir.join(HOURLY_PATTERNS_FILE),
        figures_dir.join(USER_SEGMENTS_FILE),
        figures_dir.join(CORRELATIONS_FILE),
        figures_dir.join(SLEEP_PATTERNS_FILE),
    ];

    daily_patterns_chart(&paths[0], inputs.weekday_patterns)?;
    hourly_patterns_chart(&paths[1], inputs.hourly_steps)?;
    user_segments_page(&paths[2], inputs.segments)?;
    correlations_chart(&paths[3], inputs.correlations)?;
    sleep_patterns_chart(&paths[4], inputs.merged_daily)?;

    info!("Rendered {} figures to {}", paths.len(), figures_dir.display());
    Ok(paths)
}

// ── Daily patterns ────────────────────────────────────────────────────────────

/// Bar chart of mean steps per weekday.
pub fn daily_patterns_chart(path: &Path, stats: &[WeekdayStats]) -> Result<()> {
    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max_steps = stats
        .iter()
        .map(|s| s.avg_steps)
        .fold(0.0f64, f64::max)
        .max(1.0);
    let bars = stats.len().max(1) as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Steps by Weekday", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0..bars, 0.0..max_steps * 1.1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(stats.len())
        .x_label_formatter(&|i| {
            stats
                .get(*i as usize)
                .map(|s| s.day.to_string())
                .unwrap_or_default()
        })
        .y_desc("Average steps")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(stats.iter().enumerate().map(|(i, s)| {
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, s.avg_steps)], BLUE.mix(0.6).filled())
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

// ── Hourly patterns ───────────────────────────────────────────────────────────

/// Line chart of mean steps per hour of day.
pub fn hourly_patterns_chart(path: &Path, means: &[HourlyMean]) -> Result<()> {
    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max_avg = means.iter().map(|m| m.avg).fold(0.0f64, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Hourly Activity Patterns", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0..24, 0.0..max_avg * 1.1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Hour of day")
        .y_desc("Average steps")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            means.iter().map(|m| (m.hour as i32, m.avg)),
            &BLUE,
        ))
        .map_err(chart_err)?;
    chart
        .draw_series(
            means
                .iter()
                .map(|m| Circle::new((m.hour as i32, m.avg), 3, BLUE.filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

// ── Correlation heat map ──────────────────────────────────────────────────────

/// Map a correlation in [-1, 1] to a blue-white-red scale. NaN is grey.
fn heat_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let v = value.clamp(-1.0, 1.0);
    if v >= 0.0 {
        let fade = (255.0 * (1.0 - v)) as u8;
        RGBColor(255, fade, fade)
    } else {
        let fade = (255.0 * (1.0 + v)) as u8;
        RGBColor(fade, fade, 255)
    }
}

/// Heat map of the daily-column correlation matrix.
pub fn correlations_chart(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let n = matrix.columns.len() as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Matrix of Activity Metrics", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(120)
        .y_label_area_size(150)
        .build_cartesian_2d(0..n, 0..n)
        .map_err(chart_err)?;

    let label_for = |i: &i32| -> String {
        matrix
            .columns
            .get(*i as usize)
            .map(|c| c.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(matrix.columns.len())
        .y_labels(matrix.columns.len())
        .x_label_formatter(&label_for)
        .y_label_formatter(&label_for)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series((0..n).flat_map(|i| {
            (0..n).map(move |j| (i, j))
        }).map(|(i, j)| {
            let value = matrix.values[i as usize][j as usize];
            Rectangle::new([(i, j), (i + 1, j + 1)], heat_color(value).filled())
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

// ── Sleep patterns ────────────────────────────────────────────────────────────

/// Scatter of sleep duration against total steps, over days with sleep.
pub fn sleep_patterns_chart(path: &Path, merged: &[MergedDaily]) -> Result<()> {
    let points: Vec<(f64, f64)> = merged
        .iter()
        .filter_map(|r| {
            r.sleep
                .as_ref()
                .map(|s| (r.activity.activity.total_steps as f64, s.sleep_duration_hours))
        })
        .collect();

    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max_steps = points.iter().map(|p| p.0).fold(0.0f64, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Sleep Duration vs Daily Steps", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..max_steps * 1.1, 0.0..24.0)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Total steps")
        .y_desc("Hours of sleep")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.mix(0.5).filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

// ── User segments ─────────────────────────────────────────────────────────────

fn segment_color(label: SegmentLabel) -> RGBColor {
    match label {
        SegmentLabel::LowActivity => RGBColor(214, 69, 65),
        SegmentLabel::ModerateActivity => RGBColor(65, 131, 215),
        SegmentLabel::HighActivity => RGBColor(30, 130, 76),
    }
}

/// Standalone HTML page with an SVG scatter of the user segments and a
/// JSON block of the plotted points.
pub fn user_segments_page(path: &Path, segments: &[SegmentedUser]) -> Result<()> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PNG_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let max_steps = segments
            .iter()
            .map(|s| s.metrics.avg_steps)
            .fold(0.0f64, f64::max)
            .max(1.0);
        let max_calories = segments
            .iter()
            .map(|s| s.metrics.avg_calories)
            .fold(0.0f64, f64::max)
            .max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption("User Segments by Activity Patterns", ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..max_steps * 1.1, 0.0..max_calories * 1.1)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc("Average daily steps")
            .y_desc("Average daily calories")
            .draw()
            .map_err(chart_err)?;

        for label in [
            SegmentLabel::LowActivity,
            SegmentLabel::ModerateActivity,
            SegmentLabel::HighActivity,
        ] {
            let color = segment_color(label);
            let members: Vec<&SegmentedUser> =
                segments.iter().filter(|s| s.label == label).collect();
            if members.is_empty() {
                continue;
            }
            chart
                .draw_series(members.iter().map(|s| {
                    Circle::new(
                        (s.metrics.avg_steps, s.metrics.avg_calories),
                        5,
                        color.filled(),
                    )
                }))
                .map_err(chart_err)?
                .label(label.name())
                .legend(move |(x, y)| Circle::new((x + 8, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    let data: Vec<serde_json::Value> = segments
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.metrics.id,
                "avgSteps": s.metrics.avg_steps,
                "avgCalories": s.metrics.avg_calories,
                "avgActiveMinutes": s.metrics.avg_active_minutes,
                "segment": s.label.name(),
            })
        })
        .collect();
    let data = serde_json::to_string_pretty(&data).map_err(chart_err)?;

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>User Segments</title>\n</head>\n<body>\n{svg}\n\
         <script type=\"application/json\" id=\"segment-data\">\n{data}\n</script>\n\
         </body>\n</html>\n"
    );
    std::fs::write(path, html)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
