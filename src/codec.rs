//! Whole-log encode and decode, bytes and text.

use chrono::{FixedOffset, Offset, Utc};
use log::debug;

use crate::blob::{decode_text, encode_text};
use crate::decoder::decode_bytes;
use crate::encoder::{Encoder, OverflowPolicy};
use crate::error::{DecodeError, EncodeError};
use crate::reading::Reading;
use crate::share::{blob_from_url, share_url};

/// Encodes reading logs into blobs and back.
///
/// Holds no state besides its settings, so one value can be shared freely
/// across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCodec {
    zone: FixedOffset,
    policy: OverflowPolicy,
}

impl LogCodec {
    /// Codec with UTC wall-clock time that truncates overflow
    #[must_use]
    pub fn new() -> Self {
        Self {
            zone: Utc.fix(),
            policy: OverflowPolicy::default(),
        }
    }

    /// Wall-clock zone used to turn UTC calendar fields into wire timestamps.
    ///
    /// Both ends of a transfer must agree on it for timestamps to come back
    /// unchanged.
    #[must_use]
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Check that every reading fits its fields, regardless of policy.
    ///
    /// # Errors
    /// Returns the first reading that would be truncated or cannot be encoded.
    pub fn validate(&self, readings: &[Reading]) -> Result<(), EncodeError> {
        let mut enc = Encoder::with_settings(self.zone, OverflowPolicy::Reject);
        readings.iter().try_for_each(|r| enc.append(r))
    }

    /// Encode readings, oldest first, to bytes
    ///
    /// # Errors
    /// See [`Encoder::append`].
    pub fn encode_bytes(&self, readings: &[Reading]) -> Result<Vec<u8>, EncodeError> {
        let mut enc = Encoder::with_settings(self.zone, self.policy);
        for reading in readings {
            enc.append(reading)?;
        }
        debug!("encoded {} readings into {} bytes", enc.count(), enc.size());
        Ok(enc.into_bytes())
    }

    /// Encode readings, oldest first, to URL-safe text
    ///
    /// # Errors
    /// See [`Encoder::append`].
    pub fn encode(&self, readings: &[Reading]) -> Result<String, EncodeError> {
        self.encode_bytes(readings).map(|bytes| encode_text(&bytes))
    }

    /// # Errors
    /// See [`decode_bytes`].
    pub fn decode_bytes(&self, buf: &[u8]) -> Result<Vec<Reading>, DecodeError> {
        decode_bytes(buf, self.zone)
    }

    /// Decode a text blob back to readings
    ///
    /// # Errors
    /// Returns an error if the text is not base64 or the bytes are malformed.
    pub fn decode(&self, text: &str) -> Result<Vec<Reading>, DecodeError> {
        let bytes = decode_text(text)?;
        self.decode_bytes(&bytes)
    }

    /// Encode readings into a dashboard link
    ///
    /// # Errors
    /// See [`Encoder::append`].
    pub fn export_url(&self, origin: &str, readings: &[Reading]) -> Result<String, EncodeError> {
        Ok(share_url(origin, &self.encode(readings)?))
    }

    /// Decode the blob carried by a dashboard link
    ///
    /// # Errors
    /// Returns an error if the link has no blob or the blob is malformed.
    pub fn import_url(&self, url: &str) -> Result<Vec<Reading>, DecodeError> {
        self.decode(&blob_from_url(url)?)
    }
}

impl Default for LogCodec {
    fn default() -> Self {
        Self::new()
    }
}
