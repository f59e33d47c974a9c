//! Orchestration of scheduled polling and reporting.
//!
//! The [`Monitor`] owns the alert tracker and the scheduler. Due tasks run one
//! at a time on the caller's task, so a poll cycle and the daily summary can
//! never overlap and the tracker needs no lock.

use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveTime};

use crate::poll::{run_cycle, CycleOutcome};
use crate::report::{self, ChartSink};
use crate::summary::{history_series, summarize_grouped};
use crate::{
    AlertPolicy, AlertTracker, Clock, DailySummary, Moment, ReadingStore, Scheduler,
    SummaryAggregator, WeatherSource,
};

// ---

/// Recurring work driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Poll,
    DailySummary,
}

/// Long-running poller for one location.
pub struct Monitor<W, S> {
    source: W,
    store: S,
    tracker: AlertTracker,
    policy: AlertPolicy,
    aggregator: SummaryAggregator,
    scheduler: Scheduler<Task>,
}

impl<W, S> Monitor<W, S>
where
    W: WeatherSource,
    S: ReadingStore,
{
    // ---
    pub fn new(source: W, store: S, policy: AlertPolicy, aggregator: SummaryAggregator) -> Self {
        // ---
        Self {
            source,
            store,
            tracker: AlertTracker::new(),
            policy,
            aggregator,
            scheduler: Scheduler::new(),
        }
    }

    /// Register the poll and daily summary jobs relative to `now`.
    pub fn schedule(
        &mut self,
        poll_interval: Duration,
        summary_time: NaiveTime,
        now: Moment,
    ) {
        // ---
        self.scheduler.schedule_every(poll_interval, Task::Poll, now);
        self.scheduler.schedule_at(summary_time, Task::DailySummary, now);
        tracing::info!(
            "Scheduled polling every {} minutes and daily summary at {}",
            poll_interval.num_minutes(),
            summary_time.format("%H:%M")
        );
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run every task due at `now`, in order, and return them.
    pub async fn tick(&mut self, now: Moment) -> Result<Vec<Task>> {
        // ---
        let due = self.scheduler.run_pending(now);
        for task in &due {
            self.handle(*task).await?;
        }
        Ok(due)
    }

    /// Execute one task immediately.
    pub async fn handle(&mut self, task: Task) -> Result<()> {
        // ---
        match task {
            Task::Poll => {
                let outcome =
                    run_cycle(&self.source, &self.store, &mut self.tracker, &self.policy).await?;
                if outcome == CycleOutcome::Skipped {
                    tracing::debug!("Poll cycle skipped");
                }
            }
            Task::DailySummary => {
                let summaries = load_summaries(&self.store, &self.aggregator, None).await?;
                tracing::info!("Daily summary covering {} days", summaries.len());
                report::print_summaries(&summaries);
            }
        }
        Ok(())
    }

    /// Drive the schedule from `clock` until an error occurs.
    ///
    /// The clock is checked once a second.
    pub async fn run<C: Clock>(mut self, clock: C) -> Result<()> {
        // ---
        let mut ticker = tokio::time::interval(StdDuration::from_secs(1));
        loop {
            ticker.tick().await;
            self.tick(clock.now()).await?;
        }
    }
}

/// Summaries for one date, or for every stored date when `for_date` is `None`.
pub async fn load_summaries<S: ReadingStore>(
    store: &S,
    aggregator: &SummaryAggregator,
    for_date: Option<NaiveDate>,
) -> Result<Vec<DailySummary>> {
    // ---
    match for_date {
        Some(date) => {
            let readings = store.query_by_date(date).await?;
            Ok(aggregator.daily_summary(&readings, Some(date)))
        }
        None => {
            let grouped = store.query_all_grouped_by_date().await?;
            Ok(summarize_grouped(&grouped))
        }
    }
}

/// Chart one day's temperatures. Returns `false` if there was nothing to plot.
pub async fn plot_day<S, C>(
    store: &S,
    aggregator: &SummaryAggregator,
    charts: &C,
    date: NaiveDate,
) -> Result<bool>
where
    S: ReadingStore,
    C: ChartSink,
{
    // ---
    let readings = store.query_by_date(date).await?;
    let series = aggregator.day_series(&readings);
    if series.is_empty() {
        return Ok(false);
    }
    charts.plot_day(date, &series)?;
    Ok(true)
}

/// Chart avg/max/min temperature across all stored days. Returns `false` if
/// there was nothing to plot.
pub async fn plot_history<S, C>(store: &S, charts: &C) -> Result<bool>
where
    S: ReadingStore,
    C: ChartSink,
{
    // ---
    let grouped = store.query_all_grouped_by_date().await?;
    let series = history_series(&summarize_grouped(&grouped));
    if series.is_empty() {
        return Ok(false);
    }
    charts.plot_history(&series)?;
    Ok(true)
}
