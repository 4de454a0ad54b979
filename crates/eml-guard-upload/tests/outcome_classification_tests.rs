//! Integration tests for submit outcome classification.

mod common;

use std::sync::Arc;

use common::{SAFE_RESULT_BODY, ScriptedTransport};
use eml_guard_analysis_contract::AnalysisOutcome;
use eml_guard_core::PendingArtifact;
use eml_guard_upload::{
    ARTIFACT_DECODE_MESSAGE, AnalysisClient, DEFAULT_ANALYSIS_ENDPOINT, TRANSPORT_FAILURE_MESSAGE,
    UploadError,
};

fn client(transport: Arc<ScriptedTransport>) -> AnalysisClient {
    AnalysisClient::new(DEFAULT_ANALYSIS_ENDPOINT, transport).expect("client should build")
}

#[test]
fn outcome_classification_tests_success_carries_result() {
    let transport = Arc::new(ScriptedTransport::replying(200, SAFE_RESULT_BODY));
    let artifact = PendingArtifact::from_bytes("report.eml", &[b'x'; 2_048], 1);

    let outcome = client(transport.clone()).submit(&artifact);
    let AnalysisOutcome::Success(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(!result.verdict.is_phishing);
    assert_eq!(result.email_data.sender, "cfo@example.test");
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn outcome_classification_tests_failure_status_uses_detail() {
    let transport = Arc::new(ScriptedTransport::replying(
        400,
        r#"{"detail":"unsupported encoding"}"#,
    ));
    let artifact = PendingArtifact::from_bytes("report.eml", b"abc", 1);

    assert_eq!(
        client(transport).submit(&artifact),
        AnalysisOutcome::ServiceError("unsupported encoding".to_string())
    );
}

#[test]
fn outcome_classification_tests_transport_failure_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::failing(UploadError::Timeout));
    let artifact = PendingArtifact::from_bytes("report.eml", b"abc", 1);

    assert_eq!(
        client(transport.clone()).submit(&artifact),
        AnalysisOutcome::TransportError(TRANSPORT_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn outcome_classification_tests_undecodable_artifact_never_reaches_network() {
    let transport = Arc::new(ScriptedTransport::replying(200, SAFE_RESULT_BODY));
    let mut artifact = PendingArtifact::from_bytes("report.eml", b"abc", 1);
    artifact.content = "%%%".to_string();

    assert_eq!(
        client(transport.clone()).submit(&artifact),
        AnalysisOutcome::TransportError(ARTIFACT_DECODE_MESSAGE.to_string())
    );
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn outcome_classification_tests_health_report_is_parsed() {
    let transport = Arc::new(ScriptedTransport::replying(
        200,
        r#"{"gateway":"healthy","services":{"email-parser":"healthy","verdict-service":"unreachable"},"overall_status":"degraded"}"#,
    ));

    let health = client(transport).check_health().expect("health should parse");
    assert!(!health.is_healthy());
    assert_eq!(health.services["verdict-service"], "unreachable");
}

#[test]
fn outcome_classification_tests_health_failure_status_is_reported() {
    let transport = Arc::new(ScriptedTransport::replying(503, "unavailable"));
    assert!(matches!(
        client(transport).check_health(),
        Err(UploadError::Status(503))
    ));
}
