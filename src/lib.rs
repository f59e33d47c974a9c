//! Weather monitor library.
//!
//! Polls a weather provider on a schedule, stores each reading, raises an
//! alert after a run of consecutive high-temperature readings, and reports
//! daily summaries as console text, SVG charts and a read-only HTTP API.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP): each
//! module is private and this gateway re-exports what callers need, so
//! siblings import from `crate::` rather than from each other's internals.

mod alert;
mod config;
mod models;
mod provider;
mod schedule;
mod store;
mod summary;
mod zone;

pub mod monitor;
pub mod poll;
pub mod report;
pub mod routes;
pub mod schema;

pub use alert::{AlertPolicy, AlertTracker};
pub use config::{load_from_env, load_with, parse_time_of_day, Config, ConfigSnapshot};
pub use models::{AlertDecision, DailySummary, RawWeatherResponse, Reading, Units};
pub use provider::{FetchError, OpenWeatherClient, WeatherSource};
pub use schedule::{Clock, Moment, NextRun, Scheduler, SystemClock};
pub use store::{MemoryReadingStore, ReadingStore, SqliteReadingStore};
pub use summary::{
    history_series, summarize_day, summarize_grouped, HistorySeries, SummaryAggregator,
};
pub use zone::Zone;
