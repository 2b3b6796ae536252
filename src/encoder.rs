//! Encoder for trendlog blobs.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::base255::encode_into;
use crate::constants::{encoded_len, DELTA_BYTES, MAX_DELTA_MS, TIMESTAMP_BYTES};
use crate::error::EncodeError;
use crate::reading::Reading;
use crate::record::{pack, sanitize_value, trend_byte};

/// What to do with a value or gap that does not fit its field.
///
/// Truncation is the default: the bytes stay identical to what older clients
/// share, and [`crate::LogCodec::validate`] reports what would be lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Refuse the reading with a typed error
    Reject,
    /// Drop the high-order digits, as blobs shared by older clients do
    #[default]
    Truncate,
}

/// Wire value of a timestamp: its UTC calendar fields read as wall-clock
/// time in `zone`, in milliseconds since the epoch.
#[inline]
#[must_use]
pub fn wire_timestamp(ts: DateTime<Utc>, zone: FixedOffset) -> i64 {
    ts.timestamp_millis() - i64::from(zone.local_minus_utc()) * 1000
}

/// Incremental encoder for a reading log.
///
/// Readings must be appended oldest first. A failed append leaves the
/// buffer untouched, so the encoder stays usable.
#[derive(Debug, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
    prev_ts: Option<i64>,
    count: usize,
    zone: FixedOffset,
    policy: OverflowPolicy,
}

impl Encoder {
    /// Encoder using UTC wall-clock time and the default overflow policy
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Utc.fix(), OverflowPolicy::default())
    }

    #[must_use]
    pub fn with_settings(zone: FixedOffset, policy: OverflowPolicy) -> Self {
        Self {
            buf: Vec::new(),
            prev_ts: None,
            count: 0,
            zone,
            policy,
        }
    }

    /// Append one reading
    ///
    /// # Errors
    /// Returns an error if:
    /// - The trend character has no single-byte code
    /// - The timestamp is before the epoch or before the previous reading
    /// - Under [`OverflowPolicy::Reject`]: the value is not a number, the
    ///   value exceeds two base-255 digits, or the gap exceeds three
    pub fn append(&mut self, reading: &Reading) -> Result<(), EncodeError> {
        let index = self.count;
        let ts_ms = wire_timestamp(reading.timestamp, self.zone);
        if ts_ms < 0 {
            return Err(EncodeError::TimestampBeforeEpoch { index, ts_ms });
        }

        let trend = trend_byte(reading.trend).ok_or(EncodeError::InvalidTrend {
            index,
            trend: reading.trend,
        })?;

        let value = match (sanitize_value(&reading.value), self.policy) {
            (Some(s), OverflowPolicy::Truncate) => s.wire,
            (Some(s), OverflowPolicy::Reject) if s.in_range => s.wire,
            (Some(_), OverflowPolicy::Reject) => {
                return Err(EncodeError::ValueOutOfRange {
                    index,
                    value: reading.value.clone(),
                });
            }
            (None, OverflowPolicy::Truncate) => 0,
            (None, OverflowPolicy::Reject) => {
                return Err(EncodeError::InvalidValue {
                    index,
                    value: reading.value.clone(),
                });
            }
        };

        match self.prev_ts {
            None => encode_into(&mut self.buf, ts_ms as u64, TIMESTAMP_BYTES),
            Some(prev_ms) => {
                if ts_ms < prev_ms {
                    return Err(EncodeError::OutOfOrder { index, ts_ms, prev_ms });
                }
                let delta_ms = (ts_ms - prev_ms) as u64;
                if delta_ms > MAX_DELTA_MS {
                    if self.policy == OverflowPolicy::Reject {
                        return Err(EncodeError::DeltaOverflow { index, delta_ms });
                    }
                    debug!("reading {index}: truncating {delta_ms} ms gap");
                }
                encode_into(&mut self.buf, delta_ms, DELTA_BYTES);
            }
        }
        pack(&mut self.buf, value, trend);

        self.prev_ts = Some(ts_ms);
        self.count += 1;
        Ok(())
    }

    /// Number of readings encoded so far
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Encoded size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        debug_assert_eq!(self.buf.len(), encoded_len(self.count));
        self.buf.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Consume the encoder, returning the encoded bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
