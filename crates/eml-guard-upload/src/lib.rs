#![warn(missing_docs)]
//! # eml-guard-upload
//!
//! ## Purpose
//! Submits a pending artifact to the remote analysis service and classifies
//! what comes back.
//!
//! ## Responsibilities
//! - Validate the analysis endpoint (absolute `http`/`https` URL).
//! - Rebuild the binary upload from the stored base64 content.
//! - Send one multipart `POST` through an injectable [`AnalysisTransport`].
//! - Map the response to exactly one [`AnalysisOutcome`].
//!
//! ## Data flow
//! [`PendingArtifact`] -> decode -> [`UploadEnvelope`] ->
//! [`AnalysisTransport::post_multipart`] -> [`TransportResponse`] ->
//! [`classify_response`] -> [`AnalysisOutcome`].
//!
//! ## Error model
//! [`AnalysisClient::submit`] never fails: decode and transport problems
//! become [`AnalysisOutcome::TransportError`] with a user-facing message while
//! the underlying [`UploadError`] is logged. One request per call, no
//! retries.
//!
//! ## Security and privacy notes
//! Email bytes are never logged; submissions are identified by file name,
//! size, and content fingerprint.

use std::sync::Arc;
use std::time::Duration;

use eml_guard_analysis_contract::{
    AnalysisContractError, AnalysisOutcome, GENERIC_SERVICE_ERROR, ServiceHealth,
    extract_error_detail, parse_analysis_result, parse_service_health,
};
use eml_guard_core::{EML_MEDIA_TYPE, PendingArtifact, content_fingerprint};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Default analysis endpoint of a locally running gateway.
pub const DEFAULT_ANALYSIS_ENDPOINT: &str = "http://localhost:5000/analyze-eml";

/// Multipart field carrying the email bytes.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Path of the gateway health report, relative to the endpoint origin.
pub const HEALTH_PATH: &str = "/health";

/// Shown when the service could not be reached.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Could not reach the analysis service.";

/// Shown when the service answered with an unreadable body.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "The analysis service returned an unreadable response.";

/// Shown when the stored artifact could not be turned back into bytes.
pub const ARTIFACT_DECODE_MESSAGE: &str = "Error processing file data.";

/// Binary upload rebuilt from a pending artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Multipart field name.
    pub field_name: &'static str,
    /// Original file name.
    pub file_name: String,
    /// Part media type.
    pub media_type: &'static str,
    /// Decoded email bytes.
    pub bytes: Vec<u8>,
}

impl UploadEnvelope {
    /// Decodes `artifact` into an upload envelope.
    ///
    /// # Errors
    /// Returns [`UploadError::Decode`] when the content is not valid base64 or
    /// its length disagrees with the recorded size.
    pub fn from_artifact(artifact: &PendingArtifact) -> Result<Self, UploadError> {
        let bytes = artifact
            .decode_content()
            .map_err(|error| UploadError::Decode(error.to_string()))?;
        Ok(Self {
            field_name: UPLOAD_FIELD_NAME,
            file_name: artifact.name.clone(),
            media_type: EML_MEDIA_TYPE,
            bytes,
        })
    }
}

/// Raw HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by the analysis client.
pub trait AnalysisTransport: Send + Sync {
    /// Sends one multipart `POST` with a single file part.
    fn post_multipart(
        &self,
        endpoint: &Url,
        envelope: &UploadEnvelope,
    ) -> Result<TransportResponse, UploadError>;

    /// Sends one `GET`.
    fn get(&self, url: &Url) -> Result<TransportResponse, UploadError>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a transport. `timeout` of `None` keeps the client default.
    ///
    /// # Errors
    /// Returns [`UploadError::Network`] when the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, UploadError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("eml-guard/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|error| UploadError::Network(format!("http client build failed: {error}")))?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<TransportResponse, UploadError> {
        let status = response.status().as_u16();
        let body = response.text().map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

impl AnalysisTransport for HttpTransport {
    fn post_multipart(
        &self,
        endpoint: &Url,
        envelope: &UploadEnvelope,
    ) -> Result<TransportResponse, UploadError> {
        let part = reqwest::blocking::multipart::Part::bytes(envelope.bytes.clone())
            .file_name(envelope.file_name.clone())
            .mime_str(envelope.media_type)
            .map_err(|error| UploadError::Network(format!("invalid part media type: {error}")))?;
        let form = reqwest::blocking::multipart::Form::new().part(envelope.field_name, part);

        let response = self
            .client
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .map_err(map_reqwest_error)?;
        Self::read(response)
    }

    fn get(&self, url: &Url) -> Result<TransportResponse, UploadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(map_reqwest_error)?;
        Self::read(response)
    }
}

fn map_reqwest_error(error: reqwest::Error) -> UploadError {
    if error.is_timeout() {
        UploadError::Timeout
    } else if error.is_body() || error.is_decode() {
        UploadError::MalformedResponse(error.to_string())
    } else {
        UploadError::Network(error.to_string())
    }
}

/// Analysis client bound to one endpoint.
#[derive(Clone)]
pub struct AnalysisClient {
    endpoint: Url,
    transport: Arc<dyn AnalysisTransport>,
}

impl AnalysisClient {
    /// Creates a client for a validated endpoint.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the endpoint is not an
    /// absolute `http`/`https` URL.
    pub fn new(
        endpoint: impl AsRef<str>,
        transport: Arc<dyn AnalysisTransport>,
    ) -> Result<Self, UploadError> {
        let endpoint = validate_analysis_endpoint(endpoint.as_ref())?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submits `artifact` once and classifies the result.
    pub fn submit(&self, artifact: &PendingArtifact) -> AnalysisOutcome {
        let envelope = match UploadEnvelope::from_artifact(artifact) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(stage = "upload", action = "decode", name = %artifact.name, "{error}");
                return AnalysisOutcome::TransportError(ARTIFACT_DECODE_MESSAGE.to_string());
            }
        };

        info!(
            stage = "upload",
            action = "submit",
            name = %envelope.file_name,
            size = envelope.bytes.len(),
            fingerprint = %content_fingerprint(&envelope.bytes),
            endpoint = %self.endpoint,
            "submitting artifact"
        );

        let outcome = match self.transport.post_multipart(&self.endpoint, &envelope) {
            Ok(response) => classify_response(&response),
            Err(error) => {
                warn!(stage = "upload", action = "send", "{error}");
                AnalysisOutcome::TransportError(transport_message(&error).to_string())
            }
        };

        info!(stage = "upload", action = "outcome", kind = outcome.kind(), "analysis finished");
        outcome
    }

    /// Fetches the gateway health report from `<origin>/health`.
    ///
    /// # Errors
    /// Returns transport errors as-is, [`UploadError::Status`] for non-2xx
    /// answers and [`UploadError::MalformedResponse`] for unreadable bodies.
    pub fn check_health(&self) -> Result<ServiceHealth, UploadError> {
        let url = self
            .endpoint
            .join(HEALTH_PATH)
            .map_err(|error| UploadError::InvalidEndpoint(error.to_string()))?;
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(UploadError::Status(response.status));
        }
        parse_service_health(&response.body)
            .map_err(|error| UploadError::MalformedResponse(error.to_string()))
    }
}

/// Maps an HTTP response to an outcome.
///
/// - non-2xx -> [`AnalysisOutcome::ServiceError`] with the body's `detail`
///   string or [`GENERIC_SERVICE_ERROR`];
/// - 2xx with a non-JSON body -> [`AnalysisOutcome::TransportError`];
/// - 2xx with JSON of the wrong shape -> [`AnalysisOutcome::ServiceError`];
/// - otherwise [`AnalysisOutcome::Success`].
pub fn classify_response(response: &TransportResponse) -> AnalysisOutcome {
    if !response.is_success() {
        let message =
            extract_error_detail(&response.body).unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_string());
        warn!(
            stage = "upload",
            action = "classify",
            status = response.status,
            "service rejected artifact: {message}"
        );
        return AnalysisOutcome::ServiceError(message);
    }

    match parse_analysis_result(&response.body) {
        Ok(result) => AnalysisOutcome::Success(result),
        Err(AnalysisContractError::Decode(error)) => {
            warn!(stage = "upload", action = "classify", "unreadable success body: {error}");
            AnalysisOutcome::TransportError(MALFORMED_RESPONSE_MESSAGE.to_string())
        }
        Err(AnalysisContractError::InvalidContract(detail)) => {
            warn!(stage = "upload", action = "classify", "schema mismatch: {detail}");
            AnalysisOutcome::ServiceError(format!("Unexpected analysis response: {detail}"))
        }
    }
}

fn transport_message(error: &UploadError) -> &'static str {
    match error {
        UploadError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE,
        UploadError::Decode(_) => ARTIFACT_DECODE_MESSAGE,
        _ => TRANSPORT_FAILURE_MESSAGE,
    }
}

/// Validates the analysis endpoint.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] for unparsable URLs, schemes other
/// than `http`/`https`, or URLs without a host.
pub fn validate_analysis_endpoint(endpoint: &str) -> Result<Url, UploadError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid analysis url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UploadError::InvalidEndpoint(format!(
            "analysis endpoint must use http or https, got {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(UploadError::InvalidEndpoint(
            "analysis endpoint has no host".to_string(),
        ));
    }

    Ok(parsed)
}

/// Upload and transport errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Stored artifact could not be decoded.
    #[error("artifact decode failure: {0}")]
    Decode(String),
    /// Request timed out.
    #[error("request timed out")]
    Timeout,
    /// Connection or protocol failure before a response arrived.
    #[error("network failure: {0}")]
    Network(String),
    /// Response body could not be read or parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Non-success HTTP status outside the submit path.
    #[error("unexpected http status {0}")]
    Status(u16),
}
