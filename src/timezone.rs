//! Resolves the configured canonical timezone name into offsets.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// The current UTC offset of the timezone named `canonical_timezone`.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    get_timezone(canonical_timezone).map(|tz| offset_at(tz, OffsetDateTime::now_utc()))
}

/// Today's date in the timezone named `canonical_timezone`.
pub fn get_local_date(canonical_timezone: &str) -> Option<Date> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
}

/// The UTC offset that `timezone` observes at `instant`.
///
/// This differs from [get_local_offset] when `instant` falls on the other
/// side of a daylight saving transition.
pub(crate) fn offset_at(timezone: &Tz, instant: OffsetDateTime) -> UtcOffset {
    timezone.get_offset_utc(&instant).to_utc()
}
