//! Decoding functionality for trendlog blobs.

use chrono::{DateTime, FixedOffset, Utc};
use log::debug;

use crate::base255::ByteReader;
use crate::constants::{DELTA_BYTES, RECORD_BYTES, TIMESTAMP_BYTES};
use crate::error::DecodeError;
use crate::reading::Reading;
use crate::record::unpack;

/// Instant whose UTC calendar fields equal the wall-clock fields of `wire_ms` in `zone`
#[inline]
#[must_use]
pub fn instant_from_wire(wire_ms: i64, zone: FixedOffset) -> Option<DateTime<Utc>> {
    let ms = wire_ms.checked_add(i64::from(zone.local_minus_utc()) * 1000)?;
    DateTime::from_timestamp_millis(ms)
}

/// Decode encoded bytes back to readings
///
/// # Arguments
/// * `buf` - Bytes produced by [`crate::Encoder`]
/// * `zone` - Wall-clock zone the blob was encoded with
///
/// # Returns
/// * `Ok(Vec<Reading>)` - Readings in the order they were encoded
/// * `Err(DecodeError)` - The layout is broken; no partial log is returned
///
/// A delta after the last record is ignored. Blobs written by older clients
/// may carry one.
///
/// # Errors
/// Returns an error if the buffer is shorter than the base timestamp, the
/// payload does not split into whole fields, or a timestamp leaves the
/// representable range.
pub fn decode_bytes(buf: &[u8], zone: FixedOffset) -> Result<Vec<Reading>, DecodeError> {
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    if buf.len() < TIMESTAMP_BYTES {
        return Err(DecodeError::BufferTooShort {
            expected: TIMESTAMP_BYTES,
            actual: buf.len(),
        });
    }
    let payload = buf.len() - TIMESTAMP_BYTES;
    if payload % RECORD_BYTES != 0 {
        return Err(DecodeError::MalformedLayout { payload });
    }

    let mut reader = ByteReader::new(buf);
    let mut ts_ms = reader
        .read(TIMESTAMP_BYTES)
        .and_then(|base| i64::try_from(base).ok())
        .ok_or(DecodeError::TimestampOutOfRange { offset: 0 })?;

    let mut result = Vec::with_capacity(payload / (RECORD_BYTES + DELTA_BYTES) + 1);
    while !reader.is_empty() {
        let offset = reader.position();
        let (value, trend) = unpack(&mut reader).ok_or(DecodeError::MalformedLayout { payload })?;
        let timestamp =
            instant_from_wire(ts_ms, zone).ok_or(DecodeError::TimestampOutOfRange { offset })?;
        result.push(Reading { timestamp, value, trend });

        if reader.is_empty() {
            break;
        }
        let offset = reader.position();
        let delta = reader
            .read(DELTA_BYTES)
            .ok_or(DecodeError::MalformedLayout { payload })?;
        if reader.is_empty() {
            debug!("ignoring trailing delta at byte {offset}");
            break;
        }
        ts_ms = i64::try_from(delta)
            .ok()
            .and_then(|d| ts_ms.checked_add(d))
            .ok_or(DecodeError::TimestampOutOfRange { offset })?;
    }

    Ok(result)
}
