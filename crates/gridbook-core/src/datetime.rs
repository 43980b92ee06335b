//! Serial-date conversion.
//!
//! Excel stores dates as day counts. In the 1900 system the count is
//! anchored so that serial 1 is 1900-01-01, with a phantom 1900-02-29 at
//! serial 60 (a Lotus 1-2-3 compatibility artifact): day counts above 60
//! are one higher than the true Gregorian distance. The 1904 system shifts
//! everything by 1462 days (1900-01-01 to 1904-01-01).

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

/// Day offset between the 1900 and 1904 date systems.
pub const DATE1904_OFFSET: i64 = 1462;

/// Largest serial the 1900 system can carry (9999-12-31).
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Anchor for serial arithmetic; serial 1 is one day after this date.
fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).expect("valid anchor date")
}

/// Convert a serial number to a datetime.
///
/// Serial 60 (the phantom 1900-02-29) collapses onto 1900-03-01, the
/// nearest representable day. Returns `None` for serials outside
/// `[0, 2_958_465]`.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    let serial = if date1904 {
        serial + DATE1904_OFFSET as f64
    } else {
        serial
    };
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }

    let days = serial.floor() as i64;
    let frac = serial - serial.floor();
    let adjusted = if days > 60 { days - 1 } else { days };

    let date = anchor().checked_add_signed(Duration::days(adjusted))?;
    let millis = (frac * 86_400_000.0).round() as i64;
    let time = date.and_hms_opt(0, 0, 0)? + Duration::milliseconds(millis);
    Some(time)
}

/// Convert a datetime to a serial number.
///
/// Day counts at or past 1900-03-01 gain one for the phantom day.
pub fn datetime_to_serial(dt: NaiveDateTime, date1904: bool) -> f64 {
    let days = (dt.date() - anchor()).num_days();
    let adjusted = if days >= 60 { days + 1 } else { days };

    let seconds = f64::from(dt.num_seconds_from_midnight());
    let nanos = f64::from(dt.nanosecond()) / 1e9;
    let serial = adjusted as f64 + (seconds + nanos) / 86_400.0;

    if date1904 {
        serial - DATE1904_OFFSET as f64
    } else {
        serial
    }
}

/// Shift a timestamp so its local wall-clock components become UTC
/// components (the inverse of [`utc_to_local`]).
pub fn local_to_utc(dt: NaiveDateTime) -> NaiveDateTime {
    match Local.from_local_datetime(&dt).earliest() {
        Some(local) => local.naive_utc(),
        None => dt,
    }
}

/// Shift a UTC timestamp so its components read as local wall-clock time.
pub fn utc_to_local(dt: NaiveDateTime) -> NaiveDateTime {
    Local.from_utc_datetime(&dt).naive_local()
}
