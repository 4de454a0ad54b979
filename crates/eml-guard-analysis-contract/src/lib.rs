#![warn(missing_docs)]
//! # eml-guard-analysis-contract
//!
//! ## Purpose
//! Defines the analysis service response schema and the classified outcome
//! handed to the result screen.
//!
//! ## Responsibilities
//! - Parse success bodies into [`AnalysisResult`].
//! - Extract the `detail` message from failure bodies.
//! - Parse the service health report.
//!
//! ## Data flow
//! Raw HTTP body -> [`parse_analysis_result`] / [`extract_error_detail`] ->
//! [`AnalysisOutcome`] -> result screen.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON returns [`AnalysisContractError::Decode`]; JSON of the wrong
//! shape returns [`AnalysisContractError::InvalidContract`]. Verdicts are
//! produced by the service only and are never computed client-side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure body carries no usable `detail`.
pub const GENERIC_SERVICE_ERROR: &str = "Error analyzing file";

/// Upper bound of the phishing score scale.
pub const PHISHING_SCORE_MAX: f64 = 100.0;

/// Service verdict for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    /// Whether the service classified the email as phishing.
    pub is_phishing: bool,
    /// Service-provided risk label, shown verbatim.
    pub risk_level: String,
    /// Service-provided recommendation, shown verbatim.
    pub recommendation: String,
    /// Score in `[0, 100]`, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phishing_score: Option<f64>,
    /// Confidence label, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

/// Summary of the parsed email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    /// Sender address. The gateway names this field `from_address`.
    #[serde(alias = "from_address")]
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Number of links found in the body.
    pub links_count: u64,
    /// First characters of the body, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_preview: Option<String>,
}

/// Success body of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Final verdict.
    pub verdict: AnalysisVerdict,
    /// Parsed email summary.
    pub email_data: EmailSummary,
}

/// Classified result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Service answered with a well-formed verdict.
    Success(AnalysisResult),
    /// Service rejected or could not classify the artifact.
    ServiceError(String),
    /// Request never produced a usable response.
    TransportError(String),
}

impl AnalysisOutcome {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::ServiceError(_) => "service_error",
            Self::TransportError(_) => "transport_error",
        }
    }
}

/// Health report of the analysis gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Gateway status.
    pub gateway: String,
    /// Downstream service name -> status.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    /// Aggregate status (`healthy` or `degraded`).
    pub overall_status: String,
}

impl ServiceHealth {
    /// Returns `true` when the aggregate status is `healthy`.
    pub fn is_healthy(&self) -> bool {
        self.overall_status.eq_ignore_ascii_case("healthy")
    }
}

/// Parses a success body into a validated result.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] when the body is not JSON.
/// Returns [`AnalysisContractError::InvalidContract`] when the JSON does not
/// match the result shape or the score is outside `[0, 100]`.
pub fn parse_analysis_result(raw: &str) -> Result<AnalysisResult, AnalysisContractError> {
    let value: Value = serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;
    let parsed: AnalysisResult = serde_json::from_value(value)
        .map_err(|error| AnalysisContractError::InvalidContract(error.to_string()))?;

    if let Some(score) = parsed.verdict.phishing_score
        && !(0.0..=PHISHING_SCORE_MAX).contains(&score)
    {
        return Err(AnalysisContractError::InvalidContract(format!(
            "phishing_score {score} is outside 0-100"
        )));
    }

    Ok(parsed)
}

/// Returns the string `detail` field of a failure body, if present.
///
/// Non-JSON bodies, non-object bodies, and non-string or blank `detail`
/// values yield `None`.
pub fn extract_error_detail(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let detail = value.get("detail")?.as_str()?;
    if detail.trim().is_empty() {
        return None;
    }
    Some(detail.to_string())
}

/// Parses a health report body.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid or mismatched JSON.
pub fn parse_service_health(raw: &str) -> Result<ServiceHealth, AnalysisContractError> {
    serde_json::from_str(raw).map_err(AnalysisContractError::Decode)
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("analysis contract violation: {0}")]
    InvalidContract(String),
}
