//! Error types for encoding, decoding and persisting reading logs.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{MAX_DELTA_MS, MAX_VALUE, TIMESTAMP_BYTES};

/// Error returned when a log cannot be encoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Value text has no leading digits to sanitize
    #[error("reading {index}: value '{value}' is not a decimal number")]
    InvalidValue { index: usize, value: String },
    /// Sanitized value needs more than two base-255 digits
    #[error("reading {index}: value '{value}' exceeds the encodable maximum {}", MAX_VALUE)]
    ValueOutOfRange { index: usize, value: String },
    /// Trend character has no single-byte code
    #[error("reading {index}: trend {trend:?} has no single-byte code")]
    InvalidTrend { index: usize, trend: char },
    /// Gap to the previous reading exceeds the three-digit delta field
    #[error("reading {index}: gap of {delta_ms} ms exceeds the maximum of {} ms", MAX_DELTA_MS)]
    DeltaOverflow { index: usize, delta_ms: u64 },
    /// Reading is earlier than the one before it
    #[error("reading {index}: timestamp {ts_ms} is before previous timestamp {prev_ms}")]
    OutOfOrder { index: usize, ts_ms: i64, prev_ms: i64 },
    /// Wire timestamp would be negative
    #[error("reading {index}: timestamp {ts_ms} is before the epoch")]
    TimestampBeforeEpoch { index: usize, ts_ms: i64 },
}

/// Error returned when a blob cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Text is not base64 in either alphabet
    #[error("blob is not valid base64: {0}")]
    InvalidText(#[from] base64::DecodeError),
    /// Buffer cannot hold the base timestamp
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
    /// Bytes after the header do not split into whole fields
    #[error("{payload} bytes after the {}-byte header do not form whole records", TIMESTAMP_BYTES)]
    MalformedLayout { payload: usize },
    /// Accumulated timestamp is outside the representable range
    #[error("timestamp at byte {offset} is out of range")]
    TimestampOutOfRange { offset: usize },
    /// URL carries no blob
    #[error("url has no '{param}' parameter")]
    MissingParameter { param: &'static str },
}

/// Error returned by the persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing file cannot be read or written
    #[error("history storage at {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Backing file holds something other than a history array
    #[error("history storage at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
