#![no_main]

use chrono::{DateTime, Duration};
use libfuzzer_sys::fuzz_target;
use trendlog::{LogCodec, Reading};

fuzz_target!(|data: &[u8]| {
    let mut ts = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
    let mut readings = Vec::new();

    // Bytes are interpreted as (gap_minutes: u8, value_hi: u8, value_lo: u8, trend: u8) tuples
    for chunk in data.chunks_exact(4) {
        ts += Duration::minutes(i64::from(chunk[0]));
        let tenths = u16::from_be_bytes([chunk[1], chunk[2]]) % 10_000;
        let value = if tenths < 10 {
            tenths.to_string()
        } else {
            format!("{}.{}", tenths / 10, tenths % 10)
        };
        readings.push(Reading::new(ts, value, char::from(chunk[3])));
    }

    // Property 1: a valid log always encodes
    let codec = LogCodec::new();
    let bytes = codec.encode_bytes(&readings).expect("valid log failed to encode");

    // Property 2: decode reproduces the log
    let decoded = codec.decode_bytes(&bytes).expect("encoded log failed to decode");
    assert_eq!(decoded, readings, "roundtrip mismatch");

    // Property 3: text form carries the same bytes
    let text = codec.encode(&readings).unwrap();
    assert_eq!(codec.decode(&text).unwrap(), readings, "text roundtrip mismatch");
});
