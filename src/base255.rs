//! Fixed-width big-endian numerals in a base smaller than the byte range.
//!
//! Every numeric field on the wire is written as exactly `width` digits of
//! base 255, most significant digit first. A digit never takes the value 255,
//! so these fields cannot be read or written with `to_be_bytes`.
//!
//! Values that need more than `width` digits lose their high-order digits.
//! This is what already-shared blobs contain, so the truncation is kept here
//! and range checks live in the encoder.

use crate::constants::BASE;

/// Encode `value` as exactly `width` digits of `base`, most significant first.
///
/// `base` must lie in `2..=256` so that every digit fits in a byte.
/// Digits above the field width are dropped.
///
/// # Example
/// ```
/// use trendlog::base255::encode_base_n;
///
/// assert_eq!(encode_base_n(1205, 2, 255), vec![4, 185]);
/// assert_eq!(encode_base_n(65_025, 2, 255), vec![0, 0]);
/// ```
#[must_use]
pub fn encode_base_n(value: u64, width: usize, base: u64) -> Vec<u8> {
    debug_assert!((2..=256).contains(&base), "base {base} does not fit in a byte");
    let mut digits = vec![0u8; width];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % base) as u8;
        rest /= base;
    }
    digits
}

/// Decode big-endian digits of `base`.
///
/// Returns `None` if the accumulated value does not fit in a `u64`, which can
/// only happen for hostile input (8 digits of base 255 always fit).
#[must_use]
pub fn decode_base_n(digits: &[u8], base: u64) -> Option<u64> {
    digits.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(base)?.checked_add(u64::from(d))
    })
}

/// Append `value` as `width` base-255 digits to `out`
#[inline]
pub fn encode_into(out: &mut Vec<u8>, value: u64, width: usize) {
    let start = out.len();
    out.resize(start + width, 0);
    let mut rest = value;
    for slot in out[start..].iter_mut().rev() {
        *slot = (rest % BASE) as u8;
        rest /= BASE;
    }
}

/// Cursor over an encoded buffer that reads base-255 fields front to back.
///
/// Reading past the end never panics and never consumes: the read reports
/// `None` so callers can tell "no more data" apart from a decoded zero.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read a `width`-digit base-255 field
    #[inline]
    pub fn read(&mut self, width: usize) -> Option<u64> {
        let digits = self.take(width)?;
        decode_base_n(digits, BASE)
    }

    /// Read a single raw byte
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Take the next `len` bytes as a slice
    #[inline]
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    /// Bytes left to read
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current offset from the start of the buffer
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}
