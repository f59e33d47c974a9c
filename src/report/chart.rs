//! Temperature trend charts rendered as SVG files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use plotters::prelude::*;

use crate::HistorySeries;

// ---

/// Printed when a single-day chart has no readings.
pub const NO_DAY_DATA: &str = "No data available for the specified date.";

/// Printed when the historical chart has no summaries.
pub const NO_HISTORY_DATA: &str = "No data available for historical summary.";

/// Consumer of temperature series.
///
/// Empty series are accepted and produce no artifact.
pub trait ChartSink {
    /// Time vs temperature for one day.
    fn plot_day(&self, date: NaiveDate, series: &[(NaiveDateTime, f64)]) -> Result<()>;

    /// Daily avg/max/min temperatures over all days.
    fn plot_history(&self, series: &HistorySeries) -> Result<()>;
}

/// Writes one SVG file per chart into a directory.
#[derive(Debug, Clone)]
pub struct SvgCharts {
    out_dir: PathBuf,
}

impl SvgCharts {
    // ---
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.out_dir
            .join(format!("temperature-{}.svg", date.format("%Y-%m-%d")))
    }

    pub fn history_path(&self) -> PathBuf {
        self.out_dir.join("temperature-history.svg")
    }

    fn prepare(&self, path: &Path) -> Result<()> {
        // ---
        fs::create_dir_all(&self.out_dir)?;
        tracing::info!("Rendering chart to {}", path.display());
        Ok(())
    }
}

/// Value axis range with a one degree margin on each side.
fn value_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    // ---
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (low - 1.0)..(high + 1.0)
}

impl ChartSink for SvgCharts {
    // ---
    fn plot_day(&self, date: NaiveDate, series: &[(NaiveDateTime, f64)]) -> Result<()> {
        // ---
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Ok(());
        };

        let path = self.day_path(date);
        self.prepare(&path)?;

        let mut start = first.0;
        let mut end = last.0;
        if end <= start {
            start -= Duration::minutes(30);
            end = start + Duration::hours(1);
        }

        let root = SVGBackend::new(&path, (1000, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Temperature Trends on {}", date.format("%Y-%m-%d")),
                ("sans-serif", 24).into_font(),
            )
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(RangedDateTime::from(start..end), value_range(series.iter().map(|p| p.1)))?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Temperature (°C)")
            .x_label_formatter(&|t: &NaiveDateTime| t.format("%H:%M").to_string())
            .draw()?;

        chart.draw_series(LineSeries::new(series.iter().copied(), BLUE))?;
        chart.draw_series(series.iter().map(|p| Circle::new(*p, 3, BLUE.filled())))?;

        root.present()?;
        Ok(())
    }

    fn plot_history(&self, series: &HistorySeries) -> Result<()> {
        // ---
        let (Some(first), Some(last)) = (series.avg.first(), series.avg.last()) else {
            return Ok(());
        };

        let path = self.history_path();
        self.prepare(&path)?;

        let mut start = first.0;
        let mut end = last.0;
        if end <= start {
            start -= Duration::days(1);
            end = start + Duration::days(2);
        }

        let values = series
            .avg
            .iter()
            .chain(&series.max)
            .chain(&series.min)
            .map(|p| p.1);

        let root = SVGBackend::new(&path, (1000, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Historical Daily Temperature Summary",
                ("sans-serif", 24).into_font(),
            )
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, value_range(values))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Temperature (°C)")
            .draw()?;

        for (points, color, label) in [
            (&series.avg, GREEN, "Average Temperature (°C)"),
            (&series.max, RED, "Maximum Temperature (°C)"),
            (&series.min, BLUE, "Minimum Temperature (°C)"),
        ] {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_chart_written() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let charts = SvgCharts::new(dir.path().join("charts"));
        let date = ymd(2024, 6, 1);
        let series = vec![
            (date.and_hms_opt(9, 0, 0).unwrap(), 30.0),
            (date.and_hms_opt(9, 5, 0).unwrap(), 34.0),
            (date.and_hms_opt(9, 10, 0).unwrap(), 32.0),
        ];

        charts.plot_day(date, &series).unwrap();

        let svg = fs::read_to_string(charts.day_path(date)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Temperature Trends on 2024-06-01"));
    }

    #[test]
    fn test_single_point_charts() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let charts = SvgCharts::new(dir.path());
        let date = ymd(2024, 6, 1);

        charts
            .plot_day(date, &[(date.and_hms_opt(12, 0, 0).unwrap(), 30.0)])
            .unwrap();

        let history = HistorySeries {
            avg: vec![(date, 32.0)],
            max: vec![(date, 34.0)],
            min: vec![(date, 30.0)],
        };
        charts.plot_history(&history).unwrap();

        assert!(charts.day_path(date).exists());
        assert!(charts.history_path().exists());
    }

    #[test]
    fn test_empty_series_writes_nothing() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let charts = SvgCharts::new(dir.path().join("out"));

        charts.plot_day(ymd(2024, 6, 1), &[]).unwrap();
        charts.plot_history(&HistorySeries::default()).unwrap();

        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_value_range_margin() {
        assert_eq!(value_range([30.0, 34.0, 32.0].into_iter()), 29.0..35.0);
    }
}
