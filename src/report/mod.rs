//! Reporting sinks: console summaries and trend charts.

mod chart;
mod console;

pub use chart::{ChartSink, SvgCharts, NO_DAY_DATA, NO_HISTORY_DATA};
pub use console::{format_summaries, print_summaries, NO_DATA};
