//! Tests the persisted JSON shape of pending artifacts.

use eml_guard_core::{CoreError, PendingArtifact};

#[test]
fn artifact_record_tests_use_camel_case_created_at() {
    let artifact = PendingArtifact::from_bytes("report.eml", b"hi", 1_700_000_000_000);
    let json = artifact.to_json().expect("encoding should succeed");
    assert!(json.contains("\"createdAt\":1700000000000"));

    let decoded = PendingArtifact::from_json(&json).expect("decoding should succeed");
    assert_eq!(decoded, artifact);
}

#[test]
fn artifact_record_tests_accept_legacy_timestamp_key() {
    let raw = r#"{"name":"report.eml","content":"aGk=","size":2,"timestamp":42}"#;
    let decoded = PendingArtifact::from_json(raw).expect("legacy record should parse");
    assert_eq!(decoded.created_at_ms, 42);
}

#[test]
fn artifact_record_tests_reject_malformed_records() {
    let missing_content = r#"{"name":"report.eml","size":2,"createdAt":1}"#;
    assert!(matches!(
        PendingArtifact::from_json(missing_content),
        Err(CoreError::Codec(_))
    ));

    let textual_size = r#"{"name":"report.eml","content":"aGk=","size":"2","createdAt":1}"#;
    assert!(matches!(
        PendingArtifact::from_json(textual_size),
        Err(CoreError::Codec(_))
    ));

    let blank_name = r#"{"name":" ","content":"aGk=","size":2,"createdAt":1}"#;
    assert!(matches!(
        PendingArtifact::from_json(blank_name),
        Err(CoreError::InvalidArtifact(_))
    ));
}
