#![no_main]

use libfuzzer_sys::fuzz_target;
use trendlog::LogCodec;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to decode_bytes() - should never panic
    // May return an error for malformed input, but never a partial log
    if let Ok(readings) = LogCodec::new().decode_bytes(data) {
        assert!(data.is_empty() || data.len() >= 8, "short buffer decoded");
        assert!(readings.len() <= data.len() / 6 + 1, "more readings than records");

        // Whatever decodes re-encodes in truncating mode without error
        let codec = LogCodec::new().with_policy(trendlog::OverflowPolicy::Truncate);
        if readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            let _ = codec.encode_bytes(&readings);
        }
    }
});
