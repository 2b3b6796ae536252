//! `trendlog` - Compact, URL-shareable logs of trend-annotated readings
//!
//! Keeps a bounded history of periodic readings (a decimal value plus a
//! one-character trend code) and packs it into a short byte string that
//! travels as a URL query parameter. No server is involved: the receiving
//! side decodes the link on its own.
//!
//! # Features
//! - **Small**: 11 bytes for the first reading, 6 bytes for each one after it
//! - **Bounded history**: 120 readings by default, oldest evicted first
//! - **Compatible encoding**: out-of-range values and gaps are truncated the
//!   way older clients truncate them; a validation pass reports them, and a
//!   rejecting mode turns them into errors
//!
//! # Example
//! ```
//! use chrono::{TimeZone, Utc};
//! use trendlog::{HistoryStore, LogCodec, MemoryStorage, Reading};
//!
//! let store = HistoryStore::open(MemoryStorage::new());
//! let t0 = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
//! store.append(Reading::new(t0, "120.5", 'd')).unwrap();
//! store.append(Reading::new(t0 + chrono::Duration::minutes(1), "11.8", 'x')).unwrap();
//!
//! let codec = LogCodec::new();
//! let blob = codec.encode(&store.read_all()).unwrap();
//! let readings = codec.decode(&blob).unwrap();
//! assert_eq!(readings, store.read_all());
//! ```
//!
//! # Wire Format
//!
//! Every numeric field is a fixed number of base-255 digits, most significant
//! first. A byte never holds 255 in a numeric field.
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 8 | `base_ts` | First timestamp, ms since the epoch |
//! | 8 | 3 | `record_0` | First reading, see below |
//! | 11 + 6i | 3 | `delta_i` | ms since the previous reading (max `255^3 - 1`, ~4.6 h) |
//! | 14 + 6i | 3 | `record_i` | Next reading |
//!
//! A record is the value with its decimal point removed (two digits, max
//! 65024) followed by the trend character code.
//!
//! ## Timestamps
//!
//! The wire timestamp is the reading's UTC calendar time read as wall-clock
//! time in the codec's zone. With the default UTC zone it is the plain Unix
//! time in milliseconds.
//!
//! ## Text form
//!
//! Bytes are written as unpadded URL-safe base64. Decoding also accepts the
//! standard alphabet and padding.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod base255;
mod blob;
mod codec;
mod config;
pub mod constants;
mod decoder;
mod encoder;
mod error;
mod reading;
pub mod record;
mod share;
mod store;
mod trend;

#[cfg(test)]
mod tests;

// Re-export public API
pub use blob::{decode_text, encode_text};
pub use codec::LogCodec;
pub use config::{Config, ConfigError};
pub use decoder::{decode_bytes, instant_from_wire};
pub use encoder::{wire_timestamp, Encoder, OverflowPolicy};
pub use error::{DecodeError, EncodeError, StorageError};
pub use reading::{parse_date, split_entry_value, Reading, StoredEntry};
pub use share::{blob_from_url, share_url};
pub use store::{HistoryStorage, HistoryStore, JsonFileStorage, MemoryStorage, SlotLock};
pub use trend::{Trend, BLANK};
