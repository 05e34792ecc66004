//! Date helpers shared by the pricing models.
//!
//! Timestamps are read in whatever offset they already carry. No conversion
//! happens here, so a Saturday in the caller's timezone is a Saturday.

use chrono::{DateTime, Datelike, TimeZone, Weekday};
use rust_decimal::Decimal;

const SECONDS_PER_HOUR: i64 = 3600;

/// Rental length in hours, clamped to zero for inverted or empty windows.
pub fn duration_hours<Tz: TimeZone>(pickup: &DateTime<Tz>, dropoff: &DateTime<Tz>) -> Decimal {
    let seconds = dropoff.clone().signed_duration_since(pickup).num_seconds();
    if seconds <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
}

pub fn is_weekend_day(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

pub fn is_weekend<Tz: TimeZone>(instant: &DateTime<Tz>) -> bool {
    is_weekend_day(instant.weekday())
}

/// True when any calendar day from pickup's date through dropoff's date
/// (inclusive) is a Saturday or Sunday.
pub fn has_weekend_period<Tz: TimeZone>(pickup: &DateTime<Tz>, dropoff: &DateTime<Tz>) -> bool {
    let last = dropoff.date_naive();
    pickup
        .date_naive()
        .iter_days()
        .take_while(|day| *day <= last)
        // any seven consecutive days contain a weekend
        .take(7)
        .any(|day| is_weekend_day(day.weekday()))
}
