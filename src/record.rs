//! Fixed 3-byte record holding one reading's value and trend.
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 2 | value | Value with the decimal point removed, two base-255 digits |
//! | 2 | 1 | trend | Character code of the trend, blank when unknown |
//!
//! The point is reinserted before the last digit on decode, so `"120.5"`
//! travels as `1205` and comes back as `"120.5"`. Text comes back unchanged
//! when it has exactly one fractional digit and a value of at least 1.
//! Otherwise the digits are kept but the point moves: `"83"` decodes as
//! `"8.3"`, and a value below 1 loses its leading `"0."` (`"0.5"` decodes as
//! `"5"`).

use crate::base255::{encode_into, ByteReader};
use crate::constants::{MAX_VALUE, RECORD_BYTES, VALUE_BYTES};
use crate::trend::{normalize_code, BLANK};

/// Value text reduced to the integer that goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitized {
    /// Integer as it will be written, high-order digits already dropped
    pub wire: u64,
    /// Whether the written integer equals the sanitized one
    pub in_range: bool,
}

/// Remove the decimal point and read the leading digits.
///
/// Leading whitespace and a `+` sign are skipped and parsing stops at the
/// first non-digit. Returns `None` when no digit is found.
///
/// # Example
/// ```
/// use trendlog::record::sanitize_value;
///
/// assert_eq!(sanitize_value("120.5").unwrap().wire, 1205);
/// assert!(!sanitize_value("6502.5").unwrap().in_range);
/// assert!(sanitize_value("HI").is_none());
/// ```
#[must_use]
pub fn sanitize_value(text: &str) -> Option<Sanitized> {
    let text = text.replacen('.', "", 1);
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);

    let modulus = MAX_VALUE + 1;
    let mut wire = 0u64;
    let mut exact = 0u64;
    let mut digits = 0usize;
    for d in text.chars().map_while(|c| c.to_digit(10)) {
        wire = (wire * 10 + u64::from(d)) % modulus;
        exact = exact.saturating_mul(10).saturating_add(u64::from(d));
        digits += 1;
    }

    (digits > 0).then_some(Sanitized {
        wire,
        in_range: exact <= MAX_VALUE,
    })
}

/// Byte code of a trend character; `None` above U+00FF
#[inline]
#[must_use]
pub fn trend_byte(trend: char) -> Option<u8> {
    u8::try_from(u32::from(normalize_code(trend))).ok()
}

/// Render a decoded integer back to decimal text.
///
/// Single digits get no point, so `5` renders as `"5"` whether it was sent
/// as `"5"` or `"0.5"`.
#[must_use]
pub fn render_value(raw: u64) -> String {
    let mut text = raw.to_string();
    if text.len() > 1 {
        text.insert(text.len() - 1, '.');
    }
    text
}

/// Append a packed record to `out`
#[inline]
pub fn pack(out: &mut Vec<u8>, value: u64, trend: u8) {
    encode_into(out, value, VALUE_BYTES);
    out.push(trend);
}

/// Read one packed record; `None` if fewer than three bytes remain
#[must_use]
pub fn unpack(reader: &mut ByteReader<'_>) -> Option<(String, char)> {
    if reader.remaining() < RECORD_BYTES {
        return None;
    }
    let raw = reader.read(VALUE_BYTES)?;
    let trend = match reader.read_byte()? {
        0 => BLANK,
        b => normalize_code(char::from(b)),
    };
    Some((render_value(raw), trend))
}
