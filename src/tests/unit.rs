use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};

use crate::base255::{decode_base_n, encode_base_n, ByteReader};
use crate::constants::{encoded_len, MAX_DELTA_MS, MAX_VALUE};
use crate::record::{render_value, sanitize_value, trend_byte};
use crate::{
    blob_from_url, decode_text, parse_date, share_url, split_entry_value, wire_timestamp, Config, DecodeError,
    EncodeError, Encoder, LogCodec, OverflowPolicy, Reading, Trend,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
}

fn rejecting() -> LogCodec {
    LogCodec::new().with_policy(OverflowPolicy::Reject)
}

/// The two-reading log used throughout: 120.5 stable, then 11.8 falling a minute later.
///
/// The second value travels as 118, so it is written here the way it decodes.
fn scenario() -> Vec<Reading> {
    vec![
        Reading::new(t0(), "120.5", 'd'),
        Reading::new(t0() + Duration::milliseconds(60_000), "11.8", 'x'),
    ]
}

const SCENARIO_BYTES: [u8; 17] = [
    0, 0, 1, 168, 216, 92, 103, 60, // base timestamp 1_792_137_600_000
    4, 185, b'd', // 1205, stable
    0, 235, 75, // +60_000 ms
    0, 118, b'x', // 118, falling
];

// ============================================================================
// Base-255 fields
// ============================================================================

#[test]
fn test_base255_digits_most_significant_first() {
    assert_eq!(encode_base_n(0, 2, 255), vec![0, 0]);
    assert_eq!(encode_base_n(254, 2, 255), vec![0, 254]);
    assert_eq!(encode_base_n(255, 2, 255), vec![1, 0]);
    assert_eq!(encode_base_n(1205, 2, 255), vec![4, 185]);
    assert_eq!(encode_base_n(MAX_VALUE, 2, 255), vec![254, 254]);
}

#[test]
fn test_base255_drops_high_digits() {
    assert_eq!(encode_base_n(MAX_VALUE + 1, 2, 255), vec![0, 0]);
    assert_eq!(encode_base_n(MAX_DELTA_MS + 1, 3, 255), vec![0, 0, 0]);
    assert_eq!(encode_base_n(MAX_DELTA_MS + 60_001, 3, 255), encode_base_n(60_000, 3, 255));
}

#[test]
fn test_base255_is_not_base256() {
    let n = 1_000_000u64;
    assert_ne!(encode_base_n(n, 8, 255), n.to_be_bytes().to_vec());
    assert_eq!(encode_base_n(n, 8, 256), n.to_be_bytes().to_vec());
    assert_eq!(decode_base_n(&encode_base_n(n, 8, 255), 255), Some(n));
}

#[test]
fn test_base255_decode_largest_digits() {
    // 255 is not a valid digit but decodes mechanically
    assert_eq!(decode_base_n(&[255; 8], 255), Some(255 * ((255u64.pow(8) - 1) / 254)));
    assert_eq!(decode_base_n(&[255; 9], 255), None);
    assert_eq!(decode_base_n(&[], 255), Some(0));
}

#[test]
fn test_byte_reader_stops_at_end() {
    let mut reader = ByteReader::new(&[1, 2, 3, 4]);
    assert_eq!(reader.read(3), Some(255 * 255 + 2 * 255 + 3));
    assert_eq!(reader.read(3), None);
    // failed reads do not consume
    assert_eq!(reader.remaining(), 1);
    assert_eq!(reader.read_byte(), Some(4));
    assert_eq!(reader.read_byte(), None);
    assert!(reader.is_empty());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_sanitize_value() {
    assert_eq!(sanitize_value("120.5").map(|s| s.wire), Some(1205));
    assert_eq!(sanitize_value("  8.3").map(|s| s.wire), Some(83));
    assert_eq!(sanitize_value("+7").map(|s| s.wire), Some(7));
    assert_eq!(sanitize_value("12.3.4").map(|s| s.wire), Some(123));
    assert_eq!(sanitize_value("95mg").map(|s| s.wire), Some(95));
    assert!(sanitize_value("6502.4").unwrap().in_range);
    assert!(!sanitize_value("6502.5").unwrap().in_range);
    assert_eq!(sanitize_value("6502.5").map(|s| s.wire), Some(0));
    assert!(!sanitize_value("99999999999999999999999").unwrap().in_range);
    assert_eq!(sanitize_value(""), None);
    assert_eq!(sanitize_value("HI"), None);
    assert_eq!(sanitize_value("-4.2"), None);
}

#[test]
fn test_render_value_inserts_point_before_last_digit() {
    assert_eq!(render_value(0), "0");
    assert_eq!(render_value(7), "7");
    assert_eq!(render_value(83), "8.3");
    assert_eq!(render_value(1205), "120.5");
    assert_eq!(render_value(MAX_VALUE), "6502.4");
}

#[test]
fn test_trend_byte() {
    assert_eq!(trend_byte('d'), Some(b'd'));
    assert_eq!(trend_byte('D'), Some(b'd'));
    assert_eq!(trend_byte('\0'), Some(b' '));
    assert_eq!(trend_byte('\u{e9}'), Some(0xe9));
    assert_eq!(trend_byte('\u{2191}'), None);
}

#[test]
fn test_trend_codes() {
    for trend in Trend::ALL {
        assert_eq!(Trend::from_code(trend.code()), Some(trend));
    }
    assert_eq!(Trend::from_code('W'), Some(Trend::RisingSharply));
    assert_eq!(Trend::from_code('\0'), Some(Trend::Blank));
    assert_eq!(Trend::from_code('q'), None);
    assert_eq!(Trend::Stable.phrase(), "stable");
    assert_eq!(Trend::FallingSharply.to_string(), "decreasing sharply");
}

// ============================================================================
// Log encoding
// ============================================================================

#[test]
fn test_scenario_bytes() {
    let codec = LogCodec::new();
    let bytes = codec.encode_bytes(&scenario()).unwrap();
    assert_eq!(bytes, SCENARIO_BYTES);
    assert_eq!(codec.encode(&scenario()).unwrap(), "AAABqNhcZzwEuWQA60sAdng");
}

#[test]
fn test_scenario_roundtrip() {
    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&scenario()).unwrap()).unwrap();
    assert_eq!(decoded, scenario());
    assert_eq!(decoded[1].timestamp - decoded[0].timestamp, Duration::milliseconds(60_000));
    assert_eq!(decoded[0].trend_kind(), Some(Trend::Stable));
    assert_eq!(decoded[1].trend_kind(), Some(Trend::Falling));
}

#[test]
fn test_scenario_with_undotted_value() {
    let typed = vec![
        Reading::new(t0(), "120.5", 'd'),
        Reading::new(t0() + Duration::milliseconds(60_000), "118", 'x'),
    ];
    let codec = LogCodec::new();
    assert_eq!(codec.encode_bytes(&typed).unwrap(), SCENARIO_BYTES);
    let decoded = codec.decode(&codec.encode(&typed).unwrap()).unwrap();
    assert_eq!(decoded[1].value, "11.8");
    assert_eq!(decoded, scenario());
}

#[test]
fn test_empty_log() {
    let codec = LogCodec::new();
    assert_eq!(codec.encode(&[]).unwrap(), "");
    assert!(codec.decode("").unwrap().is_empty());
    assert!(codec.decode("   ").unwrap().is_empty());
}

#[test]
fn test_single_reading_is_eleven_bytes() {
    let bytes = LogCodec::new().encode_bytes(&scenario()[..1]).unwrap();
    assert_eq!(bytes.len(), 11);
    assert_eq!(bytes, SCENARIO_BYTES[..11]);
}

#[test]
fn test_encoder_size_tracks_count() {
    let mut enc = Encoder::new();
    assert_eq!(enc.size(), 0);
    for (i, minutes) in [0, 5, 10, 15].into_iter().enumerate() {
        enc.append(&Reading::new(t0() + Duration::minutes(minutes), "5.5", 'e')).unwrap();
        assert_eq!(enc.count(), i + 1);
        assert_eq!(enc.size(), encoded_len(i + 1));
    }
    assert_eq!(enc.size(), 8 + 3 + 3 * 6);
}

#[test]
fn test_failed_append_leaves_encoder_intact() {
    let mut enc = Encoder::with_settings(Utc.fix(), OverflowPolicy::Reject);
    enc.append(&scenario()[0]).unwrap();
    let before = enc.to_bytes();

    let err = enc.append(&Reading::new(t0(), "HI", 'd')).unwrap_err();
    assert!(matches!(err, EncodeError::InvalidValue { index: 1, .. }));
    assert_eq!(enc.as_bytes(), before.as_slice());

    enc.append(&scenario()[1]).unwrap();
    assert_eq!(enc.into_bytes(), SCENARIO_BYTES);
}

#[test]
fn test_delta_boundary() {
    let max_gap = Duration::milliseconds(MAX_DELTA_MS as i64);
    let at_limit = vec![Reading::new(t0(), "5.0", 'd'), Reading::new(t0() + max_gap, "5.1", 'd')];
    let decoded = LogCodec::new().decode(&LogCodec::new().encode(&at_limit).unwrap()).unwrap();
    assert_eq!(decoded, at_limit);

    let past_limit = vec![
        Reading::new(t0(), "5.0", 'd'),
        Reading::new(t0() + max_gap + Duration::milliseconds(1), "5.1", 'd'),
    ];
    let err = rejecting().encode(&past_limit).unwrap_err();
    assert_eq!(err, EncodeError::DeltaOverflow { index: 1, delta_ms: MAX_DELTA_MS + 1 });

    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&past_limit).unwrap()).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_ne!(decoded[1].timestamp, past_limit[1].timestamp);
    assert_eq!(decoded[1].timestamp, t0());
}

#[test]
fn test_truncated_gap_shifts_every_later_timestamp() {
    let gap = Duration::hours(5);
    let log = vec![
        Reading::new(t0(), "5.0", 'd'),
        Reading::new(t0() + gap, "5.1", 'd'),
        Reading::new(t0() + gap + Duration::minutes(5), "5.2", 'd'),
    ];
    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&log).unwrap()).unwrap();
    let lost = Duration::milliseconds(MAX_DELTA_MS as i64 + 1);
    assert_eq!(decoded[1].timestamp, log[1].timestamp - lost);
    assert_eq!(decoded[2].timestamp, log[2].timestamp - lost);
    assert_eq!(decoded[2].value, "5.2");
}

#[test]
fn test_value_boundary() {
    let codec = rejecting();
    let at_limit = vec![Reading::new(t0(), "6502.4", 'z')];
    assert_eq!(codec.decode(&codec.encode(&at_limit).unwrap()).unwrap(), at_limit);

    let past_limit = vec![Reading::new(t0(), "6502.5", 'z')];
    assert_eq!(
        codec.encode(&past_limit).unwrap_err(),
        EncodeError::ValueOutOfRange { index: 0, value: "6502.5".to_owned() }
    );

    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&past_limit).unwrap()).unwrap();
    assert_eq!(decoded[0].value, "0");
    assert_eq!(decoded[0].trend, 'z');
}

#[test]
fn test_unparseable_value() {
    let log = vec![Reading::new(t0(), "LO", 'd')];
    assert!(matches!(rejecting().encode(&log), Err(EncodeError::InvalidValue { index: 0, .. })));
    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&log).unwrap()).unwrap();
    assert_eq!(decoded[0].value, "0");
}

#[test]
fn test_value_without_fraction_gains_one() {
    let log = vec![Reading::new(t0(), "83", 'd')];
    let codec = LogCodec::new();
    assert_eq!(codec.decode(&codec.encode(&log).unwrap()).unwrap()[0].value, "8.3");
}

#[test]
fn test_value_below_one_loses_leading_zero() {
    // "0.5" and "5" both travel as 5, which decodes as "5"
    let log = vec![
        Reading::new(t0(), "0.5", 'd'),
        Reading::new(t0() + Duration::minutes(1), "0.0", 'd'),
        Reading::new(t0() + Duration::minutes(2), "1.0", 'd'),
    ];
    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&log).unwrap()).unwrap();
    let values: Vec<_> = decoded.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, ["5", "0", "1.0"]);
}

#[test]
fn test_rejects_out_of_order() {
    let log = vec![Reading::new(t0(), "5.0", 'd'), Reading::new(t0() - Duration::seconds(1), "5.1", 'd')];
    for codec in [LogCodec::new(), rejecting()] {
        assert!(matches!(codec.encode(&log), Err(EncodeError::OutOfOrder { index: 1, .. })));
    }
}

#[test]
fn test_equal_timestamps_are_allowed() {
    let log = vec![Reading::new(t0(), "5.0", 'd'), Reading::new(t0(), "5.1", 'e')];
    let codec = LogCodec::new();
    assert_eq!(codec.decode(&codec.encode(&log).unwrap()).unwrap(), log);
}

#[test]
fn test_rejects_timestamp_before_epoch() {
    let log = vec![Reading::new(Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap(), "5.0", 'd')];
    assert!(matches!(
        LogCodec::new().encode(&log),
        Err(EncodeError::TimestampBeforeEpoch { index: 0, .. })
    ));
}

#[test]
fn test_rejects_wide_trend() {
    let log = vec![Reading::new(t0(), "5.0", '\u{2193}')];
    assert_eq!(
        LogCodec::new().encode(&log).unwrap_err(),
        EncodeError::InvalidTrend { index: 0, trend: '\u{2193}' }
    );
}

#[test]
fn test_undefined_trend_roundtrips_mechanically() {
    let log = vec![Reading::new(t0(), "5.0", 'q'), Reading::new(t0() + Duration::minutes(1), "5.0", ' ')];
    let codec = LogCodec::new();
    let decoded = codec.decode(&codec.encode(&log).unwrap()).unwrap();
    assert_eq!(decoded, log);
    assert_eq!(decoded[0].trend_kind(), None);
    assert_eq!(decoded[1].trend_kind(), Some(Trend::Blank));
}

#[test]
fn test_validate_ignores_policy() {
    let log = vec![Reading::new(t0(), "5.0", 'd'), Reading::new(t0() + Duration::hours(6), "5.0", 'd')];
    let codec = LogCodec::new();
    assert_eq!(codec.policy(), OverflowPolicy::Truncate);
    assert!(codec.encode(&log).is_ok());
    assert!(matches!(codec.validate(&log), Err(EncodeError::DeltaOverflow { index: 1, .. })));
    assert!(codec.validate(&scenario()).is_ok());
}

#[test]
fn test_overnight_gap_exports_by_default() {
    let log = vec![
        Reading::new(t0(), "120.5", 'd'),
        Reading::new(t0() + Duration::hours(9), "98.0", 'e'),
        Reading::new(t0() + Duration::hours(9) + Duration::minutes(5), "99.5", 'e'),
    ];
    let codec = LogCodec::new();
    let url = codec.export_url("https://glucoscan.org/dashboard", &log).unwrap();

    let decoded = codec.import_url(&url).unwrap();
    assert_eq!(decoded.len(), 3);
    let values: Vec<_> = decoded.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, ["120.5", "98.0", "99.5"]);
    // the gap after the night comes back 255^3 ms short
    let lost = Duration::milliseconds(MAX_DELTA_MS as i64 + 1);
    assert_eq!(decoded[1].timestamp, log[1].timestamp - lost);
    assert_eq!(decoded[2].timestamp - decoded[1].timestamp, Duration::minutes(5));

    assert!(matches!(
        rejecting().export_url("https://glucoscan.org/dashboard", &log),
        Err(EncodeError::DeltaOverflow { index: 1, delta_ms: 32_400_000 })
    ));
}

// ============================================================================
// Log decoding
// ============================================================================

#[test]
fn test_trailing_delta_is_ignored() {
    let mut bytes = SCENARIO_BYTES.to_vec();
    bytes.extend_from_slice(&[0, 1, 0]);
    let decoded = LogCodec::new().decode_bytes(&bytes).unwrap();
    assert_eq!(decoded, scenario());
}

#[test]
fn test_header_only_is_empty() {
    assert!(LogCodec::new().decode_bytes(&SCENARIO_BYTES[..8]).unwrap().is_empty());
}

#[test]
fn test_short_buffer() {
    assert_eq!(
        LogCodec::new().decode_bytes(&SCENARIO_BYTES[..5]),
        Err(DecodeError::BufferTooShort { expected: 8, actual: 5 })
    );
}

#[test]
fn test_partial_record_is_malformed() {
    for len in [9, 10, 12, 13, 15, 16] {
        assert_eq!(
            LogCodec::new().decode_bytes(&SCENARIO_BYTES[..len]),
            Err(DecodeError::MalformedLayout { payload: len - 8 }),
            "len {len}"
        );
    }
}

#[test]
fn test_invalid_text() {
    assert!(matches!(LogCodec::new().decode("not*base64"), Err(DecodeError::InvalidText(_))));
}

#[test]
fn test_decode_accepts_padding_and_standard_alphabet() {
    let codec = LogCodec::new();
    assert_eq!(codec.decode("AAABqNhcZzwEuWQA60sAdng=").unwrap(), scenario());
    assert_eq!(decode_text("A-_A").unwrap(), decode_text("A+/A").unwrap());
    assert_eq!(decode_text("A /A").unwrap(), decode_text("A+/A").unwrap());
}

#[test]
fn test_zero_trend_byte_decodes_blank() {
    let mut bytes = SCENARIO_BYTES[..11].to_vec();
    bytes[10] = 0;
    assert_eq!(LogCodec::new().decode_bytes(&bytes).unwrap()[0].trend, ' ');
}

// ============================================================================
// Wall-clock zone
// ============================================================================

#[test]
fn test_wire_timestamp_reads_utc_fields_as_local() {
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    assert_eq!(wire_timestamp(t0(), plus_two), t0().timestamp_millis() - 7_200_000);
    assert_eq!(wire_timestamp(t0(), Utc.fix()), t0().timestamp_millis());
}

#[test]
fn test_zone_roundtrip() {
    let codec = LogCodec::new().with_zone(FixedOffset::west_opt(5 * 3600).unwrap());
    assert_eq!(codec.decode(&codec.encode(&scenario()).unwrap()).unwrap(), scenario());
}

#[test]
fn test_zone_mismatch_shifts_timestamps() {
    let blob = LogCodec::new().encode(&scenario()).unwrap();
    let plus_two = LogCodec::new().with_zone(FixedOffset::east_opt(2 * 3600).unwrap());
    let decoded = plus_two.decode(&blob).unwrap();
    assert_eq!(decoded[0].timestamp, t0() + Duration::hours(2));
    assert_eq!(decoded[0].value, "120.5");
}

// ============================================================================
// Readings and entries
// ============================================================================

#[test]
fn test_reading_keeps_millisecond_precision() {
    let taken = t0() + Duration::nanoseconds(1_234_567);
    let r = Reading::new(taken, "5.0", 'd');
    assert_eq!(r.timestamp, t0() + Duration::milliseconds(1));

    let codec = LogCodec::new();
    assert_eq!(codec.decode(&codec.encode(std::slice::from_ref(&r)).unwrap()).unwrap(), vec![r.clone()]);
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(serde_json::from_str::<Reading>(&json).unwrap(), r);
}

#[test]
fn test_split_entry_value() {
    assert_eq!(split_entry_value("120.5 d"), ("120.5", 'd'));
    assert_eq!(split_entry_value("  8.3 X"), ("8.3", 'x'));
    assert_eq!(split_entry_value("8.3"), ("8.3", ' '));
    assert_eq!(split_entry_value("8.3 \0e"), ("8.3", 'e'));
    assert_eq!(split_entry_value("8.3 "), ("8.3", ' '));
}

#[test]
fn test_reading_entry_value_and_describe() {
    let r = Reading::from_entry_value(t0(), "120.5 D");
    assert_eq!(r.value, "120.5");
    assert_eq!(r.trend, 'd');
    assert_eq!(r.entry_value(), "120.5 d");
    assert_eq!(r.describe(), "120.5 stable");
    assert_eq!(Reading::new(t0(), "7.1", ' ').describe(), "7.1");
    assert_eq!(Reading::new(t0(), "7.1", 'w').describe(), "7.1 increasing sharply");
}

#[test]
fn test_reading_serde_shape() {
    let r = Reading::new(t0(), "120.5", 'd');
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json, serde_json::json!({"date": "2026-10-16T08:00:00.000Z", "value": "120.5 d"}));
    let back: Reading = serde_json::from_value(json).unwrap();
    assert_eq!(back, r);
}

#[test]
fn test_parse_legacy_date() {
    let parsed = parse_date("Fri Oct 16 2026 10:00:00 GMT+0200 (Central European Summer Time)").unwrap();
    assert_eq!(parsed, t0());
    assert_eq!(parse_date("2026-10-16T08:00:00Z"), Some(t0()));
    assert_eq!(parse_date("yesterday"), None);

    let legacy: Reading =
        serde_json::from_str(r#"{"date":"Fri Oct 16 2026 10:00:00 GMT+0200 (CEST)","value":"6.1 e"}"#).unwrap();
    assert_eq!(legacy, Reading::new(t0(), "6.1", 'e'));
    assert!(serde_json::from_str::<Reading>(r#"{"date":"soon","value":"6.1 e"}"#).is_err());
}

// ============================================================================
// Share links
// ============================================================================

#[test]
fn test_share_url_roundtrip() {
    let codec = LogCodec::new();
    let url = codec.export_url("https://glucoscan.org/dashboard", &scenario()).unwrap();
    assert_eq!(url, "https://glucoscan.org/dashboard?data=AAABqNhcZzwEuWQA60sAdng");
    assert_eq!(codec.import_url(&url).unwrap(), scenario());
}

#[test]
fn test_blob_from_url() {
    assert_eq!(blob_from_url("https://x.org/d?u=1&data=AbC-_#top").unwrap(), "AbC-_");
    assert_eq!(blob_from_url("https://x.org/d?data=A%2BB%2F%3D").unwrap(), "A+B/=");
    assert_eq!(blob_from_url("AbC").unwrap(), "AbC");
    assert_eq!(
        blob_from_url("https://x.org/d?u=1"),
        Err(DecodeError::MissingParameter { param: "data" })
    );
    assert_eq!(share_url("https://x.org/d?u=1", "Q"), "https://x.org/d?u=1&data=Q");
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults_fill_missing_fields() {
    let cfg: Config = serde_json::from_str(r#"{"capacity": 30, "overflow": "reject"}"#).unwrap();
    assert_eq!(cfg.capacity, 30);
    assert_eq!(cfg.overflow, OverflowPolicy::Reject);
    assert_eq!(cfg.dashboard_origin, "https://glucoscan.org/dashboard");
    assert_eq!(cfg.codec().unwrap().policy(), OverflowPolicy::Reject);
    assert_eq!(Config::default().overflow, OverflowPolicy::Truncate);
}

#[test]
fn test_config_zone() {
    let cfg = Config { utc_offset_minutes: 90, ..Config::default() };
    assert_eq!(cfg.zone().unwrap().local_minus_utc(), 5400);
    let bad = Config { utc_offset_minutes: 24 * 60, ..Config::default() };
    assert!(bad.codec().is_err());
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tlog.json");
    let cfg = Config { capacity: 12, utc_offset_minutes: -300, ..Config::default() };
    cfg.save_to_path(&path).unwrap();
    assert_eq!(Config::load_from_path(&path).unwrap(), cfg);
    assert!(Config::load_from_path(&dir.path().join("missing.json")).is_err());
}
