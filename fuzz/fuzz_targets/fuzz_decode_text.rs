#![no_main]

use libfuzzer_sys::fuzz_target;
use trendlog::LogCodec;

fuzz_target!(|data: &[u8]| {
    // Arbitrary links and blobs must never panic the decoder
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let codec = LogCodec::new();
    let _ = codec.decode(text);
    let _ = codec.import_url(text);
});
