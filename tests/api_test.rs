use anyhow::Result;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sqlx::sqlite::SqlitePoolOptions;

use weather_monitor::{load_with, routes, schema, Reading, ReadingStore, SqliteReadingStore};

#[derive(Debug, Deserialize)]
struct DailySummary {
    date: NaiveDate,
    avg_temp: f64,
    max_temp: f64,
    min_temp: f64,
    dominant_condition: String,
    reading_count: usize,
}

// 2024-06-01T00:00:00Z
const JUNE_1: i64 = 1_717_200_000;
const HOUR: i64 = 3_600;

/// Serve the API over an in-memory SQLite store on an ephemeral port.
async fn spawn_api(readings: &[Reading]) -> Result<String> {
    // ---
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    schema::create_schema(&pool).await?;

    let config = load_with(|name| match name {
        "OPENWEATHER_API_KEY" => Some("test-key".to_string()),
        "TZ_OFFSET_MINUTES" => Some("0".to_string()),
        _ => None,
    })?;
    let store = SqliteReadingStore::new(pool, config.zone);
    for reading in readings {
        store.append(reading).await?;
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = routes::router(store, config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{}", addr))
}

fn reading(condition: &str, temperature: f64, observed_at: i64) -> Reading {
    // ---
    Reading {
        condition: condition.to_string(),
        temperature,
        feels_like: temperature + 2.0,
        observed_at,
    }
}

#[tokio::test]
async fn summaries_endpoint_aggregates_per_day() -> Result<()> {
    // ---
    let base = spawn_api(&[
        reading("Clear", 30.0, JUNE_1 + HOUR),
        reading("Haze", 34.0, JUNE_1 + 2 * HOUR),
        reading("Clouds", 32.0, JUNE_1 + 3 * HOUR),
        reading("Rain", 26.0, JUNE_1 + 26 * HOUR),
    ])
    .await?;

    let client = Client::new();
    let summaries: Vec<DailySummary> = client
        .get(format!("{}/summaries", base))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(summaries.len(), 2, "Expected two days of summaries");

    let first = &summaries[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(first.avg_temp, 32.0);
    assert_eq!(first.max_temp, 34.0);
    assert_eq!(first.min_temp, 30.0);
    assert_eq!(first.dominant_condition, "Clouds");
    assert_eq!(first.reading_count, 3);

    assert_eq!(summaries[1].date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    assert_eq!(summaries[1].dominant_condition, "Rain");

    Ok(())
}

#[tokio::test]
async fn day_endpoints_filter_by_date() -> Result<()> {
    // ---
    let base = spawn_api(&[
        reading("Clear", 30.0, JUNE_1 + HOUR),
        reading("Rain", 26.0, JUNE_1 + 26 * HOUR),
    ])
    .await?;
    let client = Client::new();

    let day: Vec<DailySummary> = client
        .get(format!("{}/summaries/2024-06-02", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].avg_temp, 26.0);

    let readings: Vec<Reading> = client
        .get(format!("{}/readings/2024-06-01", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(readings, vec![reading("Clear", 30.0, JUNE_1 + HOUR)]);

    Ok(())
}

#[tokio::test]
async fn empty_store_and_bad_input() -> Result<()> {
    // ---
    let base = spawn_api(&[]).await?;
    let client = Client::new();

    let summaries: Vec<DailySummary> = client
        .get(format!("{}/summaries", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(summaries.is_empty(), "Empty store should give no summaries");

    let response = client
        .get(format!("{}/summaries/June-first", base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let health = client.get(format!("{}/health", base)).send().await?;
    assert_eq!(health.status(), StatusCode::OK);

    Ok(())
}
