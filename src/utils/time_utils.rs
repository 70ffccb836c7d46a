//! Timestamp storage format and display-zone conversion.
//!
//! Every persisted timestamp is UTC, serialized as `%Y-%m-%d %H:%M:%S` so
//! that lexicographic order in SQLite equals chronological order. Conversion
//! into a display time zone happens only at read/resample time.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{Error, FeedError, Result};
use crate::settings::DisplayTimeZoneMode;

pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes a UTC instant into the sortable storage form.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format(STORAGE_TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp back into a UTC instant.
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, STORAGE_TIMESTAMP_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Resolves an IANA time-zone name declared on an exchange.
pub fn parse_exchange_tz(name: &str, exchange_id: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| {
        Error::Feed(FeedError::UnknownTimeZone(
            name.to_string(),
            exchange_id.to_string(),
        ))
    })
}

/// Converts a UTC instant into the wall-clock time of the requested display
/// zone. `exchange_tz` is only consulted in `Exchange` mode.
pub fn to_display_time(
    instant: DateTime<Utc>,
    mode: DisplayTimeZoneMode,
    exchange_tz: Option<Tz>,
) -> NaiveDateTime {
    match mode {
        DisplayTimeZoneMode::Utc => instant.naive_utc(),
        DisplayTimeZoneMode::Local => instant.with_timezone(&Local).naive_local(),
        DisplayTimeZoneMode::Exchange => match exchange_tz {
            Some(tz) => instant.with_timezone(&tz).naive_local(),
            None => instant.naive_utc(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    #[test]
    fn storage_format_round_trips() {
        let t = utc(2024, 3, 15, 9, 30, 5);
        assert_eq!(format_utc(t), "2024-03-15 09:30:05");
        assert_eq!(parse_utc("2024-03-15 09:30:05").unwrap(), t);
    }

    #[test]
    fn storage_format_sorts_chronologically() {
        let a = format_utc(utc(2024, 3, 15, 9, 30, 0));
        let b = format_utc(utc(2024, 3, 15, 10, 0, 0));
        let c = format_utc(utc(2024, 12, 1, 0, 0, 0));
        assert!(a < b && b < c);
    }

    #[test]
    fn exchange_mode_converts_through_declared_zone() {
        let t = utc(2024, 6, 1, 14, 30, 0);
        let tz = parse_exchange_tz("America/New_York", "XNYS").unwrap();
        let displayed = to_display_time(t, DisplayTimeZoneMode::Exchange, Some(tz));
        // EDT is UTC-4 in June.
        assert_eq!(
            displayed,
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn utc_mode_is_identity() {
        let t = utc(2024, 6, 1, 14, 30, 0);
        assert_eq!(
            to_display_time(t, DisplayTimeZoneMode::Utc, None),
            t.naive_utc()
        );
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert!(parse_exchange_tz("Mars/Olympus", "XMRS").is_err());
    }
}
