//! Daily summary aggregation over stored readings.
//!
//! Readings are grouped by the calendar date of `observed_at` in the
//! configured [`Zone`]. For each date the aggregator reports mean, max and min
//! temperature plus a dominant condition, which is the condition of the most
//! recent reading of that day. When two readings share the latest timestamp,
//! the one that comes later in the input wins.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{DailySummary, Reading, Zone};

// ---

/// Builds [`DailySummary`] values and chart series from readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator {
    zone: Zone,
}

/// Avg/max/min temperature series across days, in date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    pub avg: Vec<(NaiveDate, f64)>,
    pub max: Vec<(NaiveDate, f64)>,
    pub min: Vec<(NaiveDate, f64)>,
}

impl HistorySeries {
    pub fn is_empty(&self) -> bool {
        self.avg.is_empty()
    }
}

impl SummaryAggregator {
    // ---
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    /// Summaries for every date present in `readings`, ascending by date.
    ///
    /// With `for_date` set, only that date is summarized and the result holds
    /// at most one element. No readings in scope yields an empty vector.
    pub fn daily_summary(
        &self,
        readings: &[Reading],
        for_date: Option<NaiveDate>,
    ) -> Vec<DailySummary> {
        // ---
        let mut grouped = self.group_by_date(readings);
        if let Some(date) = for_date {
            grouped.retain(|d, _| *d == date);
        }
        summarize_grouped(&grouped)
    }

    /// Group readings by calendar date, preserving input order within a day.
    ///
    /// Readings whose timestamp has no calendar date are dropped.
    pub fn group_by_date(&self, readings: &[Reading]) -> BTreeMap<NaiveDate, Vec<Reading>> {
        // ---
        let mut grouped: BTreeMap<NaiveDate, Vec<Reading>> = BTreeMap::new();
        for reading in readings {
            match self.zone.date_of(reading.observed_at) {
                Some(date) => grouped.entry(date).or_default().push(reading.clone()),
                None => tracing::warn!(
                    "Skipping reading with unrepresentable timestamp {}",
                    reading.observed_at
                ),
            }
        }
        grouped
    }

    /// Time vs temperature series for a single day's readings.
    pub fn day_series(&self, readings: &[Reading]) -> Vec<(NaiveDateTime, f64)> {
        // ---
        readings
            .iter()
            .filter_map(|r| {
                self.zone
                    .local_datetime(r.observed_at)
                    .map(|at| (at, r.temperature))
            })
            .collect()
    }
}

/// Summarize readings already grouped by date.
///
/// Empty groups are skipped. Output follows the map's ascending date order.
pub fn summarize_grouped(grouped: &BTreeMap<NaiveDate, Vec<Reading>>) -> Vec<DailySummary> {
    // ---
    grouped
        .iter()
        .filter_map(|(date, readings)| summarize_day(*date, readings))
        .collect()
}

/// Summarize one day's readings, or `None` if there are none.
pub fn summarize_day(date: NaiveDate, readings: &[Reading]) -> Option<DailySummary> {
    // ---
    let first = readings.first()?;

    let mut sum = 0.0;
    let mut max_temp = first.temperature;
    let mut min_temp = first.temperature;
    let mut latest = first;

    for reading in readings {
        sum += reading.temperature;
        max_temp = max_temp.max(reading.temperature);
        min_temp = min_temp.min(reading.temperature);
        if reading.observed_at >= latest.observed_at {
            latest = reading;
        }
    }

    Some(DailySummary {
        date,
        avg_temp: sum / readings.len() as f64,
        max_temp,
        min_temp,
        dominant_condition: latest.condition.clone(),
        reading_count: readings.len(),
    })
}

/// Split summaries into the three series of the historical trend chart.
pub fn history_series(summaries: &[DailySummary]) -> HistorySeries {
    // ---
    let mut series = HistorySeries::default();
    for s in summaries {
        series.avg.push((s.date, s.avg_temp));
        series.max.push((s.date, s.max_temp));
        series.min.push((s.date, s.min_temp));
    }
    series
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    // 2024-06-01T00:00:00Z
    const JUNE_1: i64 = 1_717_200_000;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;

    fn reading(condition: &str, temperature: f64, observed_at: i64) -> Reading {
        // ---
        Reading {
            condition: condition.to_string(),
            temperature,
            feels_like: temperature + 1.0,
            observed_at,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc_aggregator() -> SummaryAggregator {
        SummaryAggregator::new(Zone::utc())
    }

    #[test]
    fn test_single_day_statistics() {
        // ---
        let readings = vec![
            reading("Clear", 30.0, JUNE_1 + HOUR),
            reading("Haze", 34.0, JUNE_1 + 2 * HOUR),
            reading("Clouds", 32.0, JUNE_1 + 3 * HOUR),
        ];

        let summaries = utc_aggregator().daily_summary(&readings, None);

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.date, ymd(2024, 6, 1));
        assert_eq!(s.avg_temp, 32.0);
        assert_eq!(s.max_temp, 34.0);
        assert_eq!(s.min_temp, 30.0);
        assert_eq!(s.reading_count, 3);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        // ---
        assert!(utc_aggregator().daily_summary(&[], None).is_empty());
        assert!(utc_aggregator()
            .daily_summary(&[], Some(ymd(2024, 6, 1)))
            .is_empty());
    }

    #[test]
    fn test_days_are_ascending() {
        // ---
        let readings = vec![
            reading("Rain", 25.0, JUNE_1 + 2 * DAY),
            reading("Clear", 30.0, JUNE_1),
            reading("Haze", 28.0, JUNE_1 + DAY),
        ];

        let dates: Vec<_> = utc_aggregator()
            .daily_summary(&readings, None)
            .into_iter()
            .map(|s| s.date)
            .collect();

        assert_eq!(dates, vec![ymd(2024, 6, 1), ymd(2024, 6, 2), ymd(2024, 6, 3)]);
    }

    #[test]
    fn test_dominant_condition_is_latest_reading() {
        // ---
        let readings = vec![
            reading("Clear", 30.0, JUNE_1 + 5 * HOUR),
            reading("Rain", 28.0, JUNE_1 + 9 * HOUR),
            reading("Clear", 31.0, JUNE_1 + 7 * HOUR),
        ];

        let summaries = utc_aggregator().daily_summary(&readings, None);
        assert_eq!(summaries[0].dominant_condition, "Rain");
    }

    #[test]
    fn test_dominant_condition_tie_takes_later_input() {
        // ---
        let readings = vec![
            reading("Clear", 30.0, JUNE_1 + HOUR),
            reading("Mist", 30.0, JUNE_1 + HOUR),
        ];

        let summaries = utc_aggregator().daily_summary(&readings, None);
        assert_eq!(summaries[0].dominant_condition, "Mist");
    }

    #[test]
    fn test_for_date_filters_to_one_day() {
        // ---
        let readings = vec![
            reading("Clear", 30.0, JUNE_1),
            reading("Haze", 40.0, JUNE_1 + DAY),
            reading("Haze", 38.0, JUNE_1 + DAY + HOUR),
        ];

        let summaries = utc_aggregator().daily_summary(&readings, Some(ymd(2024, 6, 2)));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].avg_temp, 39.0);

        let none = utc_aggregator().daily_summary(&readings, Some(ymd(2024, 7, 1)));
        assert!(none.is_empty());
    }

    #[test]
    fn test_summary_is_idempotent() {
        // ---
        let readings = vec![
            reading("Clear", 21.5, JUNE_1),
            reading("Clouds", 23.25, JUNE_1 + HOUR),
            reading("Rain", 19.0, JUNE_1 + DAY),
        ];

        let aggregator = utc_aggregator();
        assert_eq!(
            aggregator.daily_summary(&readings, None),
            aggregator.daily_summary(&readings, None)
        );
    }

    #[test]
    fn test_grouping_follows_zone() {
        // ---
        // 20:00Z and 22:00Z on June 1st land on June 2nd at UTC+05:30
        let readings = vec![
            reading("Clear", 30.0, JUNE_1 + 10 * HOUR),
            reading("Clear", 32.0, JUNE_1 + 20 * HOUR),
            reading("Clear", 34.0, JUNE_1 + 22 * HOUR),
        ];

        let ist = SummaryAggregator::new(Zone::from_offset_minutes(330).unwrap());
        let summaries = ist.daily_summary(&readings, None);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].reading_count, 1);
        assert_eq!(summaries[1].date, ymd(2024, 6, 2));
        assert_eq!(summaries[1].avg_temp, 33.0);

        assert_eq!(utc_aggregator().daily_summary(&readings, None).len(), 1);
    }

    #[test]
    fn test_day_series_and_history_series() {
        // ---
        let readings = vec![
            reading("Clear", 30.0, JUNE_1 + HOUR),
            reading("Clear", 33.0, JUNE_1 + DAY),
        ];
        let aggregator = utc_aggregator();

        let series = aggregator.day_series(&readings[..1]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].0, ymd(2024, 6, 1).and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(series[0].1, 30.0);

        let history = history_series(&aggregator.daily_summary(&readings, None));
        assert_eq!(history.avg.len(), 2);
        assert_eq!(history.max[1], (ymd(2024, 6, 2), 33.0));
        assert!(history_series(&[]).is_empty());
    }
}
