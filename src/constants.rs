//! Field widths, limits and defaults shared by the codec and the store.

/// Radix of every numeric field on the wire. Each byte holds one digit in `0..=254`.
pub const BASE: u64 = 255;

/// Width of the absolute base timestamp that opens a blob
pub const TIMESTAMP_BYTES: usize = 8;

/// Width of the timestamp delta preceding every record after the first
pub const DELTA_BYTES: usize = 3;

/// Width of the sanitized numeric value inside a record
pub const VALUE_BYTES: usize = 2;

/// Packed record size: value digits plus one trend byte
pub const RECORD_BYTES: usize = VALUE_BYTES + 1;

/// Largest sanitized value a record can carry (`255^2 - 1`)
pub const MAX_VALUE: u64 = max_for_width(VALUE_BYTES);

/// Largest gap between consecutive readings, in milliseconds (`255^3 - 1`, ~4.6 hours)
pub const MAX_DELTA_MS: u64 = max_for_width(DELTA_BYTES);

/// Default number of readings kept by the history log
pub const HISTORY_CAPACITY: usize = 120;

/// Name of the persisted slot holding the history
pub const STORAGE_KEY: &str = "value_history";

/// Dashboard that receives exported blobs
pub const DEFAULT_DASHBOARD_ORIGIN: &str = "https://glucoscan.org/dashboard";

/// Query parameter carrying the blob
pub const DATA_PARAM: &str = "data";

/// Largest value representable with `width` base-255 digits
#[inline]
#[must_use]
pub const fn max_for_width(width: usize) -> u64 {
    let mut max = 1u64;
    let mut i = 0;
    while i < width {
        max *= BASE;
        i += 1;
    }
    max - 1
}

/// Encoded byte length of a log with `count` readings
#[inline]
#[must_use]
pub const fn encoded_len(count: usize) -> usize {
    if count == 0 {
        0
    } else {
        TIMESTAMP_BYTES + RECORD_BYTES + (count - 1) * (DELTA_BYTES + RECORD_BYTES)
    }
}
