//! Timestamp value object and the server clock that assigns message times.

use std::sync::Mutex;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Drops precision below one microsecond, the resolution Postgres keeps.
    pub fn truncated_to_micros(&self) -> Self {
        Self(self.0.trunc_subsecs(6))
    }

    /// Creates a new timestamp by adding the specified number of microseconds.
    pub fn plus_micros(&self, micros: i64) -> Self {
        Self(self.0 + Duration::microseconds(micros))
    }

    /// RFC 3339 form used on the wire.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

/// Hands out strictly increasing timestamps.
///
/// Values are microsecond-precise, so they survive a `TIMESTAMPTZ` round
/// trip unchanged. Two messages persisted in the same microsecond still get
/// distinct, ordered `created_at` values, so room broadcast order and
/// history order agree.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<Timestamp>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `now`, or one microsecond past the last value handed out if
    /// the wall clock has not moved forward.
    pub fn tick(&self) -> Timestamp {
        let now = Timestamp::now().truncated_to_micros();
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(prev) if now <= prev => prev.plus_micros(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}
