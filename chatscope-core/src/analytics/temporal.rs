//! Calendar bucketing of message timestamps.
//!
//! A [`TemporalBucketer`] turns a timestamp into a [`DateBucketKey`] at a
//! requested [`Frequency`]. Keys keep only the calendar fields the frequency
//! needs: `Weekday` and `Hour` deliberately discard the absolute date so that
//! buckets merge across all days ("what hour are people most active"), while
//! `Year`/`Month`/`Week`/`Day` retain full date identity.

use chrono::{Datelike, DateTime, Local, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Calendar granularity for bucketed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Year,
    Month,
    Week,
    Day,
    Weekday,
    Hour,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Year => "year",
            Frequency::Month => "month",
            Frequency::Week => "week",
            Frequency::Day => "day",
            Frequency::Weekday => "weekday",
            Frequency::Hour => "hour",
        }
    }

    /// All frequencies, in coarse-to-fine order.
    pub fn all() -> [Frequency; 6] {
        [
            Frequency::Year,
            Frequency::Month,
            Frequency::Week,
            Frequency::Day,
            Frequency::Weekday,
            Frequency::Hour,
        ]
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timezone used to resolve timestamps into calendar fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketTimezone {
    #[default]
    Utc,
    Local,
}

// Reference date for projecting partial keys onto an instant.
// 2001-01-01 is a Monday, so weekday-only keys land on consecutive days.
const REFERENCE_YEAR: i32 = 2001;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1).unwrap()
}

/// Composite calendar key identifying one bucket.
///
/// Only the fields relevant for the originating [`Frequency`] are present.
/// Ordering is chronological, implemented by projecting the present fields
/// onto a fixed reference instant; it is only meaningful between keys of the
/// same frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateBucketKey {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub week_of_year: Option<u32>,
    pub day: Option<u32>,
    pub weekday: Option<u32>,
    pub hour: Option<u32>,
}

impl DateBucketKey {
    /// Project the present fields onto a concrete instant for comparison.
    fn reference_instant(&self) -> NaiveDateTime {
        let date = match (self.year, self.week_of_year) {
            (Some(year), Some(week)) => {
                NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).unwrap_or_else(reference_date)
            }
            _ => {
                let year = self.year.unwrap_or(REFERENCE_YEAR);
                let month = self.month.unwrap_or(1);
                let day = self.day.unwrap_or(1);
                NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(reference_date)
            }
        };

        let date = match self.weekday {
            Some(weekday) if self.year.is_none() => {
                reference_date() + chrono::Duration::days(i64::from(weekday.saturating_sub(1)))
            }
            _ => date,
        };

        date.and_hms_opt(self.hour.unwrap_or(0), 0, 0)
            .unwrap_or_else(|| reference_date().and_hms_opt(0, 0, 0).unwrap())
    }

    /// Render this key as a label appropriate for the given frequency.
    ///
    /// Fields absent from the key render as an empty string.
    pub fn render(&self, frequency: Frequency) -> String {
        match frequency {
            Frequency::Year => match self.year {
                Some(year) => year.to_string(),
                None => String::new(),
            },
            Frequency::Month => match (self.month, self.year) {
                (Some(month), Some(year)) => format!("{}/{}", month, year),
                _ => String::new(),
            },
            Frequency::Week => match (self.week_of_year, self.year) {
                (Some(week), Some(year)) => format!("{}/{}", week, year),
                _ => String::new(),
            },
            Frequency::Day => match (self.day, self.month, self.year) {
                (Some(day), Some(month), Some(year)) => format!("{}/{}/{}", day, month, year),
                _ => String::new(),
            },
            Frequency::Weekday => match self.weekday {
                Some(weekday) => weekday.to_string(),
                None => String::new(),
            },
            Frequency::Hour => match self.hour {
                Some(hour) => hour.to_string(),
                None => String::new(),
            },
        }
    }

    /// Render an hour bucket as a zero-padded range label: `"00-01"` through
    /// `"23-24"`.
    pub fn render_hour_range(&self) -> String {
        match self.hour {
            Some(hour) => format!("{:02}-{:02}", hour, hour + 1),
            None => String::new(),
        }
    }
}

impl Ord for DateBucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.reference_instant().cmp(&other.reference_instant())
    }
}

impl PartialOrd for DateBucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Converts timestamps into calendar bucket keys under a configured timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalBucketer {
    timezone: BucketTimezone,
}

impl TemporalBucketer {
    pub fn new(timezone: BucketTimezone) -> Self {
        Self { timezone }
    }

    fn local_clock(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        match self.timezone {
            BucketTimezone::Utc => ts.naive_utc(),
            BucketTimezone::Local => ts.with_timezone(&Local).naive_local(),
        }
    }

    /// Compute the bucket key for a timestamp at the given frequency.
    ///
    /// Week buckets use the ISO week number paired with the ISO week-year, so
    /// dates around new year group with the week they belong to. Weekdays are
    /// numbered 1 (Monday) through 7 (Sunday).
    pub fn bucket_key(&self, ts: DateTime<Utc>, frequency: Frequency) -> DateBucketKey {
        let clock = self.local_clock(ts);
        match frequency {
            Frequency::Year => DateBucketKey {
                year: Some(clock.year()),
                ..DateBucketKey::default()
            },
            Frequency::Month => DateBucketKey {
                year: Some(clock.year()),
                month: Some(clock.month()),
                ..DateBucketKey::default()
            },
            Frequency::Week => DateBucketKey {
                year: Some(clock.iso_week().year()),
                week_of_year: Some(clock.iso_week().week()),
                ..DateBucketKey::default()
            },
            Frequency::Day => DateBucketKey {
                year: Some(clock.year()),
                month: Some(clock.month()),
                day: Some(clock.day()),
                ..DateBucketKey::default()
            },
            Frequency::Weekday => DateBucketKey {
                weekday: Some(clock.weekday().number_from_monday()),
                ..DateBucketKey::default()
            },
            Frequency::Hour => DateBucketKey {
                hour: Some(clock.hour()),
                ..DateBucketKey::default()
            },
        }
    }
}
