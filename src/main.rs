//! Application entry point for the `weather-monitor` service.
//!
//! This binary orchestrates the full startup sequence, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the SQLite pool and creating the schema if it does not exist
//! - Writing the configuration snapshot
//! - Serving the read-only HTTP API and running the polling schedule
//!
//! # Usage
//! - `weather-monitor [monitor]` – poll, alert and summarize until Ctrl-C
//! - `weather-monitor summary [YYYY-MM-DD]` – print daily summaries
//! - `weather-monitor plot-day YYYY-MM-DD` – chart one day's temperatures
//! - `weather-monitor plot-history` – chart daily avg/max/min temperatures
//!
//! # Environment Variables
//! See [`weather_monitor::load_from_env`] for configuration, plus:
//! - `WEATHER_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `WEATHER_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use weather_monitor::monitor::{self, Monitor};
use weather_monitor::report::{self, SvgCharts, NO_DAY_DATA, NO_HISTORY_DATA};
use weather_monitor::{
    routes, schema, Clock, Config, OpenWeatherClient, SqliteReadingStore, SummaryAggregator,
    SystemClock,
};

// ---

enum Command {
    Monitor,
    Summary(Option<NaiveDate>),
    PlotDay(NaiveDate),
    PlotHistory,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date '{}', expected YYYY-MM-DD: {}", raw, e))
}

fn parse_command(args: &[String]) -> Result<Command> {
    // ---
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["monitor"] => Ok(Command::Monitor),
        ["summary"] => Ok(Command::Summary(None)),
        ["summary", date] => Ok(Command::Summary(Some(parse_date(date)?))),
        ["plot-day", date] => Ok(Command::PlotDay(parse_date(date)?)),
        ["plot-history"] => Ok(Command::PlotHistory),
        other => Err(anyhow!(
            "Unrecognized arguments {:?}; expected monitor | summary [DATE] | plot-day DATE | plot-history",
            other
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let cfg = weather_monitor::load_from_env()?;
    cfg.log_config();

    let store = open_store(&cfg).await?;
    let aggregator = SummaryAggregator::new(cfg.zone);
    let charts = SvgCharts::new(&cfg.chart_dir);

    match command {
        Command::Monitor => run_monitor(cfg, store, aggregator).await,
        Command::Summary(date) => {
            let summaries = monitor::load_summaries(&store, &aggregator, date).await?;
            report::print_summaries(&summaries);
            Ok(())
        }
        Command::PlotDay(date) => {
            if !monitor::plot_day(&store, &aggregator, &charts, date).await? {
                println!("{NO_DAY_DATA}");
            }
            Ok(())
        }
        Command::PlotHistory => {
            if !monitor::plot_history(&store, &charts).await? {
                println!("{NO_HISTORY_DATA}");
            }
            Ok(())
        }
    }
}

// ---

async fn open_store(cfg: &Config) -> Result<SqliteReadingStore> {
    // ---
    tracing::info!("Attempting to open database: {}", cfg.db_url);

    let options = SqliteConnectOptions::from_str(&cfg.db_url)
        .map_err(|e| anyhow!("Invalid DATABASE_URL '{}': {}", cfg.db_url, e))?
        .create_if_missing(true);

    if cfg.is_in_memory_db() && cfg.db_pool_max > 1 {
        tracing::warn!(
            "DATABASE_URL is in-memory; using 1 connection instead of DB_POOL_MAX={}",
            cfg.db_pool_max
        );
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.pool_size())
        .connect_with(options)
        .await
        .map_err(|e| anyhow!("Failed to open database '{}': {}", cfg.db_url, e))?;

    tracing::info!("Successfully opened database");

    schema::create_schema(&pool).await?;
    Ok(SqliteReadingStore::new(pool, cfg.zone))
}

async fn run_monitor(
    cfg: Config,
    store: SqliteReadingStore,
    aggregator: SummaryAggregator,
) -> Result<()> {
    // ---
    cfg.write_snapshot(&cfg.snapshot_path)?;

    let client = OpenWeatherClient::new(&cfg.api_url, &cfg.api_key, &cfg.location, cfg.units)?;

    // Build app from routes gateway (EMBP)
    let app = routes::router(store.clone(), cfg.clone());
    let listener = tokio::net::TcpListener::bind(cfg.http_addr).await?;
    tracing::info!("Listening on {}", cfg.http_addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server stopped: {}", e);
        }
    });

    let clock = SystemClock::new(cfg.zone);
    let mut monitor = Monitor::new(client, store, cfg.alert_policy(), aggregator);
    monitor.schedule(cfg.poll_interval(), cfg.daily_summary_time, clock.now());

    tokio::select! {
        result = monitor.run(clock) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    }
}

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `WEATHER_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `WEATHER_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("WEATHER_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to WEATHER_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("WEATHER_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn,hyper=info,reqwest=info"))
    };

    // Logs go to stderr so summaries on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
