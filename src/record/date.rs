//! Dates as they cross the wire, as they are stored, and as they are queried.
//!
//! A record's date is a calendar date for the client, but it is persisted as
//! a full local timestamp. Date-range queries therefore compare at day
//! granularity and ignore the stored time of day.

use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::{format_description, time},
};
use time_tz::Tz;

use crate::{Error, timezone::offset_at};

const CALENDAR_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const STORAGE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const STORAGE_FORMAT_SUBSECOND: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

/// Local date-times without an offset, as sent by browsers and `<input type="datetime-local">`.
const LOCAL_DATE_TIME_FORMATS: [&[BorrowedFormatItem<'_>]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
];

/// The last representable millisecond of a day.
const END_OF_DAY: Time = time!(23:59:59.999);

/// Serialize a [Date] as `YYYY-MM-DD`.
pub(crate) fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

// ============================================================================
// WIRE DATES
// ============================================================================

/// A date or date-time as sent by a client.
///
/// Plain dates are local calendar dates, not UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireDate {
    /// A plain `YYYY-MM-DD` date.
    Calendar(Date),
    /// A date and time of day without an offset, taken to be local time.
    Local(PrimitiveDateTime),
    /// An RFC 3339 timestamp with an explicit offset.
    Instant(OffsetDateTime),
}

impl WireDate {
    /// Resolve the date into a local date-time in `timezone`.
    ///
    /// Calendar dates resolve to local midnight.
    pub fn to_local(self, timezone: &Tz) -> PrimitiveDateTime {
        match self {
            WireDate::Calendar(date) => date.midnight(),
            WireDate::Local(date_time) => date_time,
            WireDate::Instant(instant) => {
                let local = instant.to_offset(offset_at(timezone, instant));
                PrimitiveDateTime::new(local.date(), local.time())
            }
        }
    }
}

impl FromStr for WireDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(date) = Date::parse(s, CALENDAR_DATE_FORMAT) {
            return Ok(WireDate::Calendar(date));
        }

        if let Ok(instant) = OffsetDateTime::parse(s, &Rfc3339) {
            return Ok(WireDate::Instant(instant));
        }

        LOCAL_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(s, format).ok())
            .map(WireDate::Local)
            .ok_or_else(|| {
                Error::InvalidDate(format!(
                    "\"{s}\" is not a valid date, expected YYYY-MM-DD or an ISO 8601 date-time"
                ))
            })
    }
}

impl<'de> Deserialize<'de> for WireDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// STORED DATES
// ============================================================================

/// The date of a record, persisted as a local timestamp.
///
/// Serializes as the calendar date only (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordDate(PrimitiveDateTime);

impl RecordDate {
    /// Wrap a local date-time.
    pub fn new(date_time: PrimitiveDateTime) -> Self {
        Self(date_time)
    }

    /// The calendar date.
    pub fn date(&self) -> Date {
        self.0.date()
    }
}

impl From<Date> for RecordDate {
    fn from(date: Date) -> Self {
        Self(date.midnight())
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_date(&self.date(), serializer)
    }
}

impl ToSql for RecordDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = self
            .0
            .format(STORAGE_FORMAT)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for RecordDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, STORAGE_FORMAT)
            .or_else(|_| PrimitiveDateTime::parse(text, STORAGE_FORMAT_SUBSECOND))
            .or_else(|_| Date::parse(text, CALENDAR_DATE_FORMAT).map(Date::midnight))
            .map(RecordDate)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

// ============================================================================
// DATE RANGES
// ============================================================================

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range.
    pub end: Date,
}

impl DateRange {
    /// Create a range covering `start` to `end` inclusive.
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Parse the bounds of a date-range query.
    ///
    /// The start is normalised to the beginning of its day and the end to the
    /// last millisecond of its day, then both are reduced to calendar dates.
    /// Instants are converted to `timezone` before the time is normalised.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if either bound cannot be parsed.
    pub fn parse(start: &str, end: &str, timezone: &Tz) -> Result<Self, Error> {
        let start = start
            .parse::<WireDate>()?
            .to_local(timezone)
            .replace_time(Time::MIDNIGHT);
        let end = end
            .parse::<WireDate>()?
            .to_local(timezone)
            .replace_time(END_OF_DAY);

        Ok(Self::new(start.date(), end.date()))
    }

    /// Whether the range contains no days, i.e. it starts after it ends.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Whether `date` falls on a day within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}
