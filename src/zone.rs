//! Calendar handling for reading timestamps.
//!
//! Readings carry a bare unix timestamp. Every date-based operation (summary
//! grouping, per-day queries, the daily summary schedule) goes through a
//! [`Zone`] so they all agree on where one day ends and the next begins.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc,
};

// ---

/// Time zone used to derive calendar dates from `observed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed offset east of UTC.
    Fixed(FixedOffset),
}

impl Zone {
    // ---
    /// UTC, mostly useful for deterministic tests.
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Build a fixed-offset zone from minutes east of UTC.
    ///
    /// Returns `None` when the offset is outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Zone::Fixed)
    }

    /// Wall-clock date and time of a unix timestamp in this zone.
    pub fn local_datetime(&self, unix_secs: i64) -> Option<NaiveDateTime> {
        DateTime::<Utc>::from_timestamp(unix_secs, 0).map(|utc| self.wall_clock(utc))
    }

    /// Wall-clock reading of an absolute instant in this zone.
    pub fn wall_clock(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        // ---
        match self {
            Zone::Local => utc.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        }
    }

    /// Calendar date of a unix timestamp in this zone.
    pub fn date_of(&self, unix_secs: i64) -> Option<NaiveDate> {
        self.local_datetime(unix_secs).map(|dt| dt.date())
    }

    /// Whether `unix_secs` falls on `date` in this zone.
    pub fn is_on(&self, unix_secs: i64, date: NaiveDate) -> bool {
        self.date_of(unix_secs) == Some(date)
    }

    /// Half-open `[start, end)` range of unix seconds that holds every instant
    /// dated `date` in this zone.
    ///
    /// The range is `date` in UTC widened by a day on each side, which covers
    /// any offset up to ±24h without resolving a local midnight. Callers
    /// narrow it with [`Zone::is_on`]. Returns `None` only at the edge of the
    /// representable date range.
    pub fn candidate_range(&self, date: NaiveDate) -> Option<(i64, i64)> {
        // ---
        let start = date.pred_opt()?.and_time(NaiveTime::MIN).and_utc();
        let end = start.checked_add_signed(Duration::days(3))?;
        Some((start.timestamp(), end.timestamp()))
    }
}
