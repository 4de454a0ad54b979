//! Tests that artifact transcoding is lossless over raw bytes.

use eml_guard_core::{PendingArtifact, decode_content, encode_content};

#[test]
fn codec_round_trip_tests_preserve_every_byte_value() {
    let all_bytes: Vec<u8> = (0..=255_u8).collect();
    for len in [0_usize, 1, 2, 3, 4, 255, 256] {
        let sample: Vec<u8> = all_bytes.iter().cycle().take(len).copied().collect();
        let decoded = decode_content(&encode_content(&sample)).expect("decode should succeed");
        assert_eq!(decoded, sample, "length {len} should round trip");
    }
}

#[test]
fn codec_round_trip_tests_ignore_text_encoding() {
    // Invalid UTF-8 and CRLF line endings must survive unchanged.
    let raw = b"Subject: \xff\xfe test\r\n\r\nbody\x00".to_vec();
    let artifact = PendingArtifact::from_bytes("raw.eml", &raw, 7);
    assert_eq!(artifact.size, raw.len() as u64);
    assert_eq!(artifact.decode_content().expect("decode should succeed"), raw);
}
