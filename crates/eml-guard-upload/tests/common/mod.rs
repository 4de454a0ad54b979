//! Shared fixtures for upload integration tests.

use std::sync::Mutex;

use eml_guard_upload::{AnalysisTransport, TransportResponse, UploadEnvelope, UploadError};
use url::Url;

/// Canned success body mirroring the gateway response.
#[allow(dead_code)]
pub const SAFE_RESULT_BODY: &str = r#"{
    "status":"success",
    "email_data":{"subject":"Quarterly report","from_address":"cfo@example.test","links_count":2},
    "verdict":{"is_phishing":false,"risk_level":"low","recommendation":"no action needed",
               "phishing_score":null,"confidence":null}
}"#;

/// Transport double that records envelopes and replays one canned answer.
#[allow(dead_code)]
pub struct ScriptedTransport {
    pub answer: Mutex<Option<Result<TransportResponse, UploadError>>>,
    pub sent: Mutex<Vec<UploadEnvelope>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self::with_answer(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn failing(error: UploadError) -> Self {
        Self::with_answer(Err(error))
    }

    fn with_answer(answer: Result<TransportResponse, UploadError>) -> Self {
        Self {
            answer: Mutex::new(Some(answer)),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().expect("sent lock should work").len()
    }

    fn next_answer(&self) -> Result<TransportResponse, UploadError> {
        self.answer
            .lock()
            .expect("answer lock should work")
            .take()
            .unwrap_or_else(|| Err(UploadError::Network("no scripted answer left".to_string())))
    }
}

impl AnalysisTransport for ScriptedTransport {
    fn post_multipart(
        &self,
        _endpoint: &Url,
        envelope: &UploadEnvelope,
    ) -> Result<TransportResponse, UploadError> {
        self.sent
            .lock()
            .expect("sent lock should work")
            .push(envelope.clone());
        self.next_answer()
    }

    fn get(&self, _url: &Url) -> Result<TransportResponse, UploadError> {
        self.next_answer()
    }
}
