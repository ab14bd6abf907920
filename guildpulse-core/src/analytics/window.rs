//! Report window resolution.
//!
//! Turns a lookback length in days into inclusive day and hour bounds that
//! match the key formats used by the aggregate tables.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Key format of `message_metrics_hourly.hour`.
pub const HOUR_FORMAT: &str = "%Y-%m-%dT%H";
/// Key format of the `day` column in daily aggregates.
pub const DAY_FORMAT: &str = "%Y-%m-%d";
/// Format of timestamps in `thread_index`.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Inclusive day and hour bounds for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuildTimeWindow {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    #[serde(serialize_with = "serialize_hour")]
    pub start_hour: NaiveDateTime,
    #[serde(serialize_with = "serialize_hour")]
    pub end_hour: NaiveDateTime,
}

impl GuildTimeWindow {
    /// Resolve a window of `days` ending at `reference` truncated to the hour.
    ///
    /// `start_day` is `days` calendar days before the reference date and
    /// `start_hour` is `24 * days` hours before the truncated reference.
    pub fn resolve(days: i64, reference: DateTime<Utc>) -> Result<Self> {
        if days <= 0 {
            return Err(Error::InvalidWindow(days));
        }

        let end_hour = truncate_to_hour(reference.naive_utc());
        let end_day = end_hour.date();

        let start_day = Duration::try_days(days)
            .and_then(|span| end_day.checked_sub_signed(span))
            .ok_or(Error::InvalidWindow(days))?;
        let start_hour = days
            .checked_mul(24)
            .and_then(Duration::try_hours)
            .and_then(|span| end_hour.checked_sub_signed(span))
            .ok_or(Error::InvalidWindow(days))?;

        Ok(Self {
            start_day,
            end_day,
            start_hour,
            end_hour,
        })
    }

    /// Resolve a window of `days` ending at the current UTC hour.
    pub fn ending_now(days: i64) -> Result<Self> {
        Self::resolve(days, Utc::now())
    }

    pub fn start_day_key(&self) -> String {
        self.start_day.format(DAY_FORMAT).to_string()
    }

    pub fn end_day_key(&self) -> String {
        self.end_day.format(DAY_FORMAT).to_string()
    }

    pub fn start_hour_key(&self) -> String {
        hour_key(&self.start_hour)
    }

    pub fn end_hour_key(&self) -> String {
        hour_key(&self.end_hour)
    }

    /// First instant of the window as an RFC 3339 UTC string.
    pub fn start_instant(&self) -> String {
        self.start_hour.format(INSTANT_FORMAT).to_string()
    }

    /// Last whole second of the end hour as an RFC 3339 UTC string.
    pub fn end_instant(&self) -> String {
        (self.end_hour + Duration::seconds(3599))
            .format(INSTANT_FORMAT)
            .to_string()
    }
}

/// Drop minutes, seconds, and sub-second precision.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(ts.hour()))
}

/// Format an hour as its aggregate key (`YYYY-MM-DDTHH`).
pub fn hour_key(hour: &NaiveDateTime) -> String {
    hour.format(HOUR_FORMAT).to_string()
}

/// Parse an aggregate hour key; malformed keys yield `None`.
pub fn parse_hour_key(key: &str) -> Option<NaiveDateTime> {
    let (day, hour) = key.split_once('T')?;
    let date = NaiveDate::parse_from_str(day, DAY_FORMAT).ok()?;
    let hour: u32 = hour.parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

fn serialize_hour<S: Serializer>(hour: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hour_key(hour))
}
