//! Parsing for the ISO-8601 timestamps sent by clients.

use std::borrow::Cow;

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Iso8601},
    macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse an ISO-8601 date-time string into a UTC date-time.
///
/// Accepts a date and time separated by `T` or a single space, with or without
/// fractional seconds. A UTC offset (e.g. `Z` or `+13:00`) is optional; when
/// present the result is converted to UTC. A date on its own is read as
/// midnight of that date.
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if `text` is not in one of the accepted
/// forms, does not describe a real date and time, or falls outside the
/// supported range once converted to UTC.
pub fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime, Error> {
    let normalised = normalise_separator(text);

    if let Ok(date_time) = OffsetDateTime::parse(&normalised, &Iso8601::DEFAULT) {
        return match date_time.checked_to_offset(UtcOffset::UTC) {
            Some(utc) => Ok(PrimitiveDateTime::new(utc.date(), utc.time())),
            None => {
                tracing::debug!("timestamp {text:?} is out of range in UTC");
                Err(Error::InvalidTimestamp(text.to_owned()))
            }
        };
    }

    if let Ok(date_time) = PrimitiveDateTime::parse(&normalised, &Iso8601::DEFAULT) {
        return Ok(date_time);
    }

    Date::parse(&normalised, DATE_FORMAT)
        .map(Date::midnight)
        .map_err(|error| {
            tracing::debug!("could not parse timestamp {text:?}: {error}");
            Error::InvalidTimestamp(text.to_owned())
        })
}

/// Replace a space between the date and time with `T`.
fn normalise_separator(text: &str) -> Cow<'_, str> {
    match text.as_bytes().get(10) {
        Some(b' ') => Cow::Owned(format!("{}T{}", &text[..10], &text[11..])),
        _ => Cow::Borrowed(text),
    }
}
