//! Fixed-width UTC timestamps
//!
//! Every record's time field, and every `utc_time` field, is rendered as
//! `YYYY-MM-DDThh:mm:ss.uuuuuuZ` (27 bytes). The digits are written one by
//! one straight into the record buffer; no intermediate string is built.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::time::SystemTime;

/// Length in bytes of a rendered timestamp.
pub const UTC_TIME_LEN: usize = 27;

const DIGITS: &[u8; 10] = b"0123456789";

/// Append `value` as exactly `width` decimal digits, zero padded on the left.
///
/// Digits above `width` are discarded; callers clamp first.
#[inline]
fn append_zero_padded(buf: &mut Vec<u8>, mut value: u32, width: usize) {
    let start = buf.len();
    buf.resize(start + width, b'0');
    for slot in buf[start..].iter_mut().rev() {
        *slot = DIGITS[(value % 10) as usize];
        value /= 10;
    }
}

/// Append `t`, converted to UTC, in the fixed 27-byte format.
///
/// Sub-microsecond precision is truncated, never rounded. Years outside
/// `0..=9999` are clamped so the field keeps its width. A leap second is
/// written as second `60`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ltsv_logger::core::timestamp::append_utc_time;
///
/// let mut buf = Vec::new();
/// append_utc_time(&mut buf, &Utc.timestamp_opt(0, 0).unwrap());
/// assert_eq!(buf, b"1970-01-01T00:00:00.000000Z");
/// ```
pub fn append_utc_time<Tz: TimeZone>(buf: &mut Vec<u8>, t: &DateTime<Tz>) {
    let t = t.with_timezone(&Utc);
    let year = t.year().clamp(0, 9999) as u32;
    let mut second = t.second();
    let mut nanos = t.nanosecond();
    if nanos >= 1_000_000_000 {
        second += 1;
        nanos -= 1_000_000_000;
    }

    buf.reserve(UTC_TIME_LEN);
    append_zero_padded(buf, year, 4);
    buf.push(b'-');
    append_zero_padded(buf, t.month(), 2);
    buf.push(b'-');
    append_zero_padded(buf, t.day(), 2);
    buf.push(b'T');
    append_zero_padded(buf, t.hour(), 2);
    buf.push(b':');
    append_zero_padded(buf, t.minute(), 2);
    buf.push(b':');
    append_zero_padded(buf, second, 2);
    buf.push(b'.');
    append_zero_padded(buf, nanos / 1_000, 6);
    buf.push(b'Z');
}

/// Append a [`SystemTime`] in the fixed 27-byte format.
pub fn append_system_time(buf: &mut Vec<u8>, t: SystemTime) {
    append_utc_time(buf, &DateTime::<Utc>::from(t));
}

/// Render `t` as an owned string in the fixed 27-byte format.
#[must_use]
pub fn format_utc_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    let mut buf = Vec::with_capacity(UTC_TIME_LEN);
    append_utc_time(&mut buf, t);
    // The formatter only emits ASCII digits and separators.
    String::from_utf8_lossy(&buf).into_owned()
}

/// Append the current time in the fixed 27-byte format.
#[inline]
pub fn append_now(buf: &mut Vec<u8>) {
    append_utc_time(buf, &Utc::now());
}
