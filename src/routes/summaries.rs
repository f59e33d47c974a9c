//! Summary and per-day reading endpoints.
//!
//! - `GET /summaries` – every stored day, ascending
//! - `GET /summaries/{date}` – one day (`YYYY-MM-DD`), zero or one element
//! - `GET /readings/{date}` – that day's readings by `observed_at`
//!
//! Days without data return an empty array. Malformed dates are rejected
//! with 400.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error};

use crate::monitor::load_summaries;
use crate::{Config, ReadingStore, SummaryAggregator};

// ---

pub fn router<S>() -> Router<(S, Config)>
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    // ---
    Router::new()
        .route("/summaries", get(all_summaries::<S>))
        .route("/summaries/{date}", get(day_summary::<S>))
        .route("/readings/{date}", get(day_readings::<S>))
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

fn parse_date(raw: &str) -> Result<NaiveDate, Response> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid date '{}', expected YYYY-MM-DD: {}", raw, e),
        )
    })
}

fn store_failure(e: anyhow::Error) -> Response {
    error!("Store query failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to query readings".into())
}

async fn all_summaries<S>(State((store, config)): State<(S, Config)>) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    // ---
    debug!("GET /summaries");
    let aggregator = SummaryAggregator::new(config.zone);
    match load_summaries(&store, &aggregator, None).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => store_failure(e),
    }
}

async fn day_summary<S>(
    Path(raw): Path<String>,
    State((store, config)): State<(S, Config)>,
) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    // ---
    debug!("GET /summaries/{}", raw);
    let date = match parse_date(&raw) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let aggregator = SummaryAggregator::new(config.zone);
    match load_summaries(&store, &aggregator, Some(date)).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => store_failure(e),
    }
}

async fn day_readings<S>(
    Path(raw): Path<String>,
    State((store, _config)): State<(S, Config)>,
) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    // ---
    debug!("GET /readings/{}", raw);
    let date = match parse_date(&raw) {
        Ok(date) => date,
        Err(response) => return response,
    };

    match store.query_by_date(date).await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(e) => store_failure(e),
    }
}
