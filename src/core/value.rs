//! Values and their LTSV encoding
//!
//! A field value is one of a closed set of scalar kinds. Each kind has a
//! fixed textual rendering:
//!
//! | kind        | rendering                                     |
//! |-------------|-----------------------------------------------|
//! | `Nil`       | `<nil>`                                       |
//! | `Str`       | escaped text                                  |
//! | `Int`/`Uint`| decimal, sign only when negative              |
//! | `F32`/`F64` | shortest round-trip `%g`, `NaN`, `+Inf`, `-Inf` |
//! | `Bool`      | `true` / `false`                              |
//! | `Bytes`     | `0x` followed by two lowercase hex digits per byte |
//! | `Time`      | `YYYY-MM-DDThh:mm:ss.uuuuuuZ` in UTC          |
//! | `Display`   | escaped `Display` output                      |
//! | `Debug`     | escaped `{:?}` output, for anything else      |
//!
//! Encoding never fails: there is no value that cannot be written.

use super::escape::append_escaped;
use super::timestamp::append_utc_time;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write as _;
use std::time::SystemTime;

/// Value of one field.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Nil,
    Str(&'a str),
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(&'a [u8]),
    Time(DateTime<Utc>),
    Display(&'a dyn fmt::Display),
    Debug(&'a dyn fmt::Debug),
}

impl<'a> Value<'a> {
    /// Wrap anything printable with `Display`.
    pub fn display<T: fmt::Display>(value: &'a T) -> Self {
        Value::Display(value)
    }

    /// Wrap anything printable with `Debug`; the catch-all kind.
    pub fn debug<T: fmt::Debug>(value: &'a T) -> Self {
        Value::Debug(value)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Value::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Display(v) => f.debug_tuple("Display").field(&format_args!("{}", v)).finish(),
            Value::Debug(v) => f.debug_tuple("Debug").field(v).finish(),
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(v: $t) -> Self {
                Value::Uint(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Value::Str(v.as_str())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Bytes(v)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Value<'a> {
    fn from(v: &'a [u8; N]) -> Self {
        Value::Bytes(v)
    }
}

impl<'a> From<&'a Vec<u8>> for Value<'a> {
    fn from(v: &'a Vec<u8>) -> Self {
        Value::Bytes(v.as_slice())
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<SystemTime> for Value<'_> {
    fn from(v: SystemTime) -> Self {
        Value::Time(v.into())
    }
}

impl From<()> for Value<'_> {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// A label and its value, the unit a record is made of.
///
/// Labels are written verbatim: they must not contain `:`, tab or
/// newline. Duplicate labels are allowed and kept in order.
#[derive(Debug, Clone, Copy)]
pub struct LV<'a> {
    pub label: &'a str,
    pub value: Value<'a>,
}

impl<'a> LV<'a> {
    pub fn new(label: &'a str, value: impl Into<Value<'a>>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Signature of a value encoder, see [`append_value`].
pub type AppendValueFn = dyn Fn(&mut Vec<u8>, &Value<'_>) + Send + Sync;

/// Append the canonical rendering of `value` to `buf`.
pub fn append_value(buf: &mut Vec<u8>, value: &Value<'_>) {
    match *value {
        Value::Nil => buf.extend_from_slice(b"<nil>"),
        Value::Str(s) => append_escaped(buf, s),
        Value::Int(v) => append_i64(buf, v),
        Value::Uint(v) => append_u64(buf, v),
        Value::F32(v) => append_f32(buf, v),
        Value::F64(v) => append_f64(buf, v),
        Value::Bool(v) => append_bool(buf, v),
        Value::Bytes(v) => append_hex(buf, v),
        Value::Time(ref t) => append_utc_time(buf, t),
        Value::Display(v) => append_display(buf, v),
        Value::Debug(v) => append_debug(buf, v),
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Append `0x` and two lowercase hex digits per byte. Empty input gives `0x`.
pub fn append_hex(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.reserve(2 + bytes.len() * 2);
    buf.extend_from_slice(b"0x");
    for &b in bytes {
        buf.push(HEX_DIGITS[(b >> 4) as usize]);
        buf.push(HEX_DIGITS[(b & 0x0f) as usize]);
    }
}

#[inline]
pub fn append_bool(buf: &mut Vec<u8>, v: bool) {
    buf.extend_from_slice(if v { b"true" } else { b"false" });
}

pub fn append_u64(buf: &mut Vec<u8>, mut v: u64) {
    let mut scratch = [0u8; 20];
    let mut pos = scratch.len();
    loop {
        pos -= 1;
        scratch[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    buf.extend_from_slice(&scratch[pos..]);
}

pub fn append_i64(buf: &mut Vec<u8>, v: i64) {
    if v < 0 {
        buf.push(b'-');
    }
    append_u64(buf, v.unsigned_abs());
}

/// Fixed-size stack buffer for `{:e}` output; the longest `f64` rendering
/// is well under 32 bytes.
struct StackWriter {
    bytes: [u8; 32],
    len: usize,
}

impl fmt::Write for StackWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.bytes.len() {
            return Err(fmt::Error);
        }
        self.bytes[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

pub fn append_f32(buf: &mut Vec<u8>, v: f32) {
    if !v.is_finite() {
        return append_non_finite(buf, v.is_nan(), v.is_sign_negative());
    }
    let mut w = StackWriter { bytes: [0; 32], len: 0 };
    // `{:e}` yields the shortest digits that round-trip at f32 precision.
    if fmt::write(&mut w, format_args!("{:e}", v)).is_err() {
        return append_display(buf, &v);
    }
    append_general(buf, &w.bytes[..w.len]);
}

pub fn append_f64(buf: &mut Vec<u8>, v: f64) {
    if !v.is_finite() {
        return append_non_finite(buf, v.is_nan(), v.is_sign_negative());
    }
    let mut w = StackWriter { bytes: [0; 32], len: 0 };
    if fmt::write(&mut w, format_args!("{:e}", v)).is_err() {
        return append_display(buf, &v);
    }
    append_general(buf, &w.bytes[..w.len]);
}

fn append_non_finite(buf: &mut Vec<u8>, nan: bool, negative: bool) {
    buf.extend_from_slice(match (nan, negative) {
        (true, _) => b"NaN",
        (false, false) => b"+Inf",
        (false, true) => b"-Inf",
    });
}

/// Re-layout Rust's shortest `{:e}` output (`-d.ddde-x`) in general form:
/// plain decimal when the exponent lies in `-4..6`, otherwise
/// `d.ddde±xx` with at least two exponent digits.
fn append_general(buf: &mut Vec<u8>, sci: &[u8]) {
    let (negative, sci) = match sci.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, sci),
    };
    let e_pos = sci.iter().position(|&b| b == b'e').unwrap_or(sci.len());
    let (mantissa, exp_part) = sci.split_at(e_pos);
    let exp = parse_exponent(exp_part.get(1..).unwrap_or_default());

    let mut digits = [0u8; 24];
    let mut nd = 0;
    for &b in mantissa.iter().filter(|b| b.is_ascii_digit()) {
        if nd < digits.len() {
            digits[nd] = b;
            nd += 1;
        }
    }
    let digits = &digits[..nd.max(1)];

    if negative {
        buf.push(b'-');
    }

    if !(-4..6).contains(&exp) {
        buf.push(digits[0]);
        if digits.len() > 1 {
            buf.push(b'.');
            buf.extend_from_slice(&digits[1..]);
        }
        buf.push(b'e');
        buf.push(if exp < 0 { b'-' } else { b'+' });
        let abs = exp.unsigned_abs();
        if abs < 10 {
            buf.push(b'0');
        }
        append_u64(buf, abs as u64);
        return;
    }

    // Position of the decimal point relative to the first digit.
    let dp = exp + 1;
    if dp > 0 {
        let dp = dp as usize;
        for i in 0..dp {
            buf.push(*digits.get(i).unwrap_or(&b'0'));
        }
        if digits.len() > dp {
            buf.push(b'.');
            buf.extend_from_slice(&digits[dp..]);
        }
    } else {
        buf.extend_from_slice(b"0.");
        for _ in 0..(-dp) {
            buf.push(b'0');
        }
        buf.extend_from_slice(digits);
    }
}

fn parse_exponent(bytes: &[u8]) -> i32 {
    let (negative, bytes) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, bytes),
    };
    let magnitude = bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i32, |acc, &b| acc.saturating_mul(10).saturating_add((b - b'0') as i32));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Bridges `fmt` output into a byte buffer, escaping as it goes.
struct EscapingWriter<'b>(&'b mut Vec<u8>);

impl fmt::Write for EscapingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        append_escaped(self.0, s);
        Ok(())
    }
}

/// Append escaped `Display` output without an intermediate `String`.
pub fn append_display(buf: &mut Vec<u8>, v: &dyn fmt::Display) {
    let _ = fmt::write(&mut EscapingWriter(buf), format_args!("{}", v));
}

/// Append escaped `{:?}` output; the fallback for values of any other type.
pub fn append_debug(buf: &mut Vec<u8>, v: &dyn fmt::Debug) {
    let _ = fmt::write(&mut EscapingWriter(buf), format_args!("{:?}", v));
}

/// Append escaped output of pre-built format arguments.
pub fn append_fmt(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    let _ = fmt::write(&mut EscapingWriter(buf), args);
}

/// Append raw format arguments without escaping. Only used for text this
/// crate controls.
pub(crate) fn append_raw_fmt(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    let _ = buf.write_fmt(args);
}
