//! Append-only reading persistence.
//!
//! [`ReadingStore`] is the contract the poll cycle, the reports and the HTTP
//! API depend on. [`SqliteReadingStore`] is the durable implementation;
//! [`MemoryReadingStore`] keeps everything in process.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use sqlx::SqlitePool;

use crate::{Reading, Zone};

// ---

/// Storage operations required by the monitor.
pub trait ReadingStore {
    /// Append one reading.
    fn append(&self, reading: &Reading) -> impl Future<Output = Result<()>> + Send;

    /// Readings whose `observed_at` falls on `date`, ascending by `observed_at`.
    fn query_by_date(&self, date: NaiveDate) -> impl Future<Output = Result<Vec<Reading>>> + Send;

    /// All readings keyed by calendar date, each day ascending by `observed_at`.
    fn query_all_grouped_by_date(
        &self,
    ) -> impl Future<Output = Result<BTreeMap<NaiveDate, Vec<Reading>>>> + Send;
}

/// Group already-sorted readings by date in `zone`.
fn group_sorted(zone: Zone, readings: Vec<Reading>) -> BTreeMap<NaiveDate, Vec<Reading>> {
    // ---
    let mut grouped: BTreeMap<NaiveDate, Vec<Reading>> = BTreeMap::new();
    for reading in readings {
        match zone.date_of(reading.observed_at) {
            Some(date) => grouped.entry(date).or_default().push(reading),
            None => tracing::warn!(
                "Skipping stored reading with unrepresentable timestamp {}",
                reading.observed_at
            ),
        }
    }
    grouped
}

/// UTC range to scan for `date`; rows in it still need [`Zone::is_on`].
fn candidate_range(zone: Zone, date: NaiveDate) -> Result<(i64, i64)> {
    zone.candidate_range(date)
        .ok_or_else(|| anyhow!("Date {} is out of range", date))
}

// ---

/// SQLite-backed store over the `weather` table.
#[derive(Debug, Clone)]
pub struct SqliteReadingStore {
    pool: SqlitePool,
    zone: Zone,
}

impl SqliteReadingStore {
    // ---
    /// Wrap a pool whose schema has been created with
    /// [`create_schema`](crate::schema::create_schema).
    pub fn new(pool: SqlitePool, zone: Zone) -> Self {
        Self { pool, zone }
    }
}

impl ReadingStore for SqliteReadingStore {
    // ---
    async fn append(&self, reading: &Reading) -> Result<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO weather (condition, temperature, feels_like, observed_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&reading.condition)
        .bind(reading.temperature)
        .bind(reading.feels_like)
        .bind(reading.observed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to store reading: {}", e))?;

        Ok(())
    }

    async fn query_by_date(&self, date: NaiveDate) -> Result<Vec<Reading>> {
        // ---
        let (start, end) = candidate_range(self.zone, date)?;

        let mut readings = sqlx::query_as::<_, Reading>(
            r#"
            SELECT condition, temperature, feels_like, observed_at
            FROM weather
            WHERE observed_at >= ? AND observed_at < ?
            ORDER BY observed_at, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        readings.retain(|r| self.zone.is_on(r.observed_at, date));

        tracing::debug!("Loaded {} readings for {}", readings.len(), date);
        Ok(readings)
    }

    async fn query_all_grouped_by_date(&self) -> Result<BTreeMap<NaiveDate, Vec<Reading>>> {
        // ---
        let readings = sqlx::query_as::<_, Reading>(
            r#"
            SELECT condition, temperature, feels_like, observed_at
            FROM weather
            ORDER BY observed_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Loaded {} readings for grouping", readings.len());
        Ok(group_sorted(self.zone, readings))
    }
}

// ---

/// In-process store, cheap to clone (clones share the same readings).
#[derive(Debug, Clone, Default)]
pub struct MemoryReadingStore {
    readings: Arc<Mutex<Vec<Reading>>>,
    zone: Zone,
}

impl MemoryReadingStore {
    // ---
    pub fn new(zone: Zone) -> Self {
        Self {
            readings: Arc::default(),
            zone,
        }
    }

    pub fn len(&self) -> usize {
        self.readings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.lock().is_empty()
    }

    /// Snapshot sorted by `observed_at`, insertion order kept for ties.
    fn sorted(&self) -> Vec<Reading> {
        let mut readings = self.readings.lock().clone();
        readings.sort_by_key(|r| r.observed_at);
        readings
    }
}

impl ReadingStore for MemoryReadingStore {
    // ---
    async fn append(&self, reading: &Reading) -> Result<()> {
        self.readings.lock().push(reading.clone());
        Ok(())
    }

    async fn query_by_date(&self, date: NaiveDate) -> Result<Vec<Reading>> {
        // ---
        Ok(self
            .sorted()
            .into_iter()
            .filter(|r| self.zone.is_on(r.observed_at, date))
            .collect())
    }

    async fn query_all_grouped_by_date(&self) -> Result<BTreeMap<NaiveDate, Vec<Reading>>> {
        Ok(group_sorted(self.zone, self.sorted()))
    }
}
