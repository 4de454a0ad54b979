//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use eml_guard_app::in_memory_store;
use eml_guard_app::pages::{ResultPage, SourcePage};
use eml_guard_handoff::CrossPageStore;
use eml_guard_upload::{
    AnalysisClient, AnalysisTransport, TransportResponse, UploadEnvelope, UploadError,
};
use url::Url;

/// Transport double replaying one canned answer and recording uploads.
pub struct StubService {
    answer: Mutex<Option<Result<TransportResponse, UploadError>>>,
    pub uploads: Mutex<Vec<UploadEnvelope>>,
}

#[allow(dead_code)]
impl StubService {
    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Some(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }))),
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: UploadError) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Some(Err(error))),
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().expect("uploads lock should work").len()
    }

    pub fn last_upload(&self) -> Option<UploadEnvelope> {
        self.uploads
            .lock()
            .expect("uploads lock should work")
            .last()
            .cloned()
    }
}

impl AnalysisTransport for StubService {
    fn post_multipart(
        &self,
        _endpoint: &Url,
        envelope: &UploadEnvelope,
    ) -> Result<TransportResponse, UploadError> {
        self.uploads
            .lock()
            .expect("uploads lock should work")
            .push(envelope.clone());
        self.answer
            .lock()
            .expect("answer lock should work")
            .take()
            .unwrap_or_else(|| Err(UploadError::Network("stub exhausted".to_string())))
    }

    fn get(&self, _url: &Url) -> Result<TransportResponse, UploadError> {
        Err(UploadError::Network("not scripted".to_string()))
    }
}

/// Source and destination pages of one tab sharing a store.
pub struct Tab {
    pub store: CrossPageStore,
    pub source: SourcePage,
    pub result: ResultPage,
}

pub fn tab(service: Arc<StubService>) -> Tab {
    let store = in_memory_store();
    let client = AnalysisClient::new("http://localhost:5000/analyze-eml", service)
        .expect("client should build");
    Tab {
        source: SourcePage::new(store.clone()),
        result: ResultPage::new(store.clone(), client),
        store,
    }
}

/// Builds a deterministic `.eml` body of exactly `len` bytes.
#[allow(dead_code)]
pub fn eml_bytes(len: usize) -> Vec<u8> {
    let header = b"From: sender@example.test\r\nSubject: test\r\n\r\n";
    let mut bytes = header.to_vec();
    bytes.extend((0..).map(|index: u32| b'a' + (index % 26) as u8).take(len.saturating_sub(header.len())));
    bytes.truncate(len);
    bytes
}
