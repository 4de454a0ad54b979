#![warn(missing_docs)]
//! # eml-guard-core
//!
//! ## Purpose
//! Defines the pure data model and transcoding rules used across the
//! `eml-guard` workspace.
//!
//! ## Responsibilities
//! - Represent the pending artifact carried across the page handoff.
//! - Apply acceptance rules (extension, size) to a candidate file.
//! - Transcode raw file bytes to a transport-safe base64 string and back.
//!
//! ## Data flow
//! Source page builds a [`CandidateFile`] -> [`validate_file`] ->
//! [`PendingArtifact::from_bytes`] (base64 encode) -> cross-page store.
//! Destination page reads the record back and calls
//! [`PendingArtifact::decode_content`] to rebuild the upload bytes.
//!
//! ## Ownership and lifetimes
//! Artifacts own their encoded content (`String`) so the record can outlive
//! the file handle it was read from.
//!
//! ## Error model
//! Validation failures return [`Rejection`]; codec failures return
//! [`CoreError`].
//!
//! ## Security and privacy notes
//! This crate never logs file bytes. Use [`content_fingerprint`] when an
//! artifact needs to be correlated in logs.
//!
//! ## Example
//! ```rust
//! use eml_guard_core::{CandidateFile, PendingArtifact, validate_file};
//!
//! let file = CandidateFile::new("report.eml", 5);
//! validate_file(Some(&file)).expect("file should be accepted");
//!
//! let artifact = PendingArtifact::from_bytes("report.eml", b"hello", 1_700_000_000_000);
//! assert_eq!(artifact.decode_content().unwrap(), b"hello");
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Required file name extension, compared case-insensitively.
pub const ACCEPTED_EXTENSION: &str = ".eml";

/// Largest accepted file size (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Media type attached to the reconstructed upload payload.
pub const EML_MEDIA_TYPE: &str = "message/rfc822";

/// File metadata the validator inspects. Content is never read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name as chosen by the user (no directory part).
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

impl CandidateFile {
    /// Creates candidate metadata.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Returns `true` when the name ends with `.eml` in any letter case.
    pub fn has_accepted_extension(&self) -> bool {
        self.name.to_lowercase().ends_with(ACCEPTED_EXTENSION)
    }
}

/// Reason a candidate file was refused before entering the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Nothing was selected.
    #[error("no file selected")]
    NoFileSelected,
    /// File name does not end with `.eml`.
    #[error("unsupported extension")]
    UnsupportedExtension,
    /// File exceeds [`MAX_FILE_SIZE_BYTES`].
    #[error("file too large")]
    FileTooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
}

/// Applies acceptance rules in order, stopping at the first failure.
///
/// # Errors
/// Returns the first [`Rejection`] that applies: missing selection, then
/// extension, then size.
pub fn validate_file(file: Option<&CandidateFile>) -> Result<(), Rejection> {
    let file = file.ok_or(Rejection::NoFileSelected)?;

    if !file.has_accepted_extension() {
        return Err(Rejection::UnsupportedExtension);
    }

    if file.size > MAX_FILE_SIZE_BYTES {
        return Err(Rejection::FileTooLarge {
            size: file.size,
            limit: MAX_FILE_SIZE_BYTES,
        });
    }

    Ok(())
}

/// Encodes raw bytes as standard padded base64.
pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a base64 string produced by [`encode_content`].
///
/// # Errors
/// Returns [`CoreError::Decode`] when the input is not valid base64.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, CoreError> {
    STANDARD.decode(encoded).map_err(CoreError::Decode)
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Artifact record persisted across the page navigation.
///
/// Serialized as `{ "name", "content", "size", "createdAt" }`; the legacy
/// `timestamp` key is accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingArtifact {
    /// Original file name, preserved for the upload.
    pub name: String,
    /// Base64-encoded file bytes.
    pub content: String,
    /// Decoded byte length of `content`.
    pub size: u64,
    /// Creation time in Unix epoch milliseconds.
    #[serde(rename = "createdAt", alias = "timestamp")]
    pub created_at_ms: u64,
}

impl PendingArtifact {
    /// Builds an artifact by encoding `bytes`.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8], created_at_ms: u64) -> Self {
        Self {
            name: name.into(),
            content: encode_content(bytes),
            size: bytes.len() as u64,
            created_at_ms,
        }
    }

    /// Decodes `content` back into the original bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Decode`] for invalid base64 and
    /// [`CoreError::SizeMismatch`] when the decoded length differs from
    /// `size`.
    pub fn decode_content(&self) -> Result<Vec<u8>, CoreError> {
        let bytes = decode_content(&self.content)?;
        if bytes.len() as u64 != self.size {
            return Err(CoreError::SizeMismatch {
                declared: self.size,
                actual: bytes.len() as u64,
            });
        }
        Ok(bytes)
    }

    /// Serializes the record to compact JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(CoreError::Codec)
    }

    /// Deserializes and checks a stored record.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] for malformed JSON or missing/mistyped
    /// fields, and [`CoreError::InvalidArtifact`] when the name is blank.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let parsed: Self = serde_json::from_str(raw).map_err(CoreError::Codec)?;
        if parsed.name.trim().is_empty() {
            return Err(CoreError::InvalidArtifact("name is empty".to_string()));
        }
        Ok(parsed)
    }
}

/// Error type for artifact codec and record failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Content is not valid base64.
    #[error("artifact content is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    /// Decoded content length disagrees with the declared size.
    #[error("artifact size mismatch: declared {declared} bytes, decoded {actual}")]
    SizeMismatch {
        /// Size recorded in the artifact.
        declared: u64,
        /// Length actually decoded.
        actual: u64,
    },
    /// Record fields violate artifact invariants.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
    /// JSON encoding/decoding error.
    #[error("artifact codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for validation order and codec edge cases.

    use super::*;

    #[test]
    fn extension_check_ignores_letter_case() {
        assert!(CandidateFile::new("REPORT.EML", 1).has_accepted_extension());
        assert!(CandidateFile::new("report.Eml", 1).has_accepted_extension());
        assert!(!CandidateFile::new("report.eml.txt", 1).has_accepted_extension());
        assert!(!CandidateFile::new("eml", 1).has_accepted_extension());
    }

    #[test]
    fn extension_is_checked_before_size() {
        let file = CandidateFile::new("huge.pdf", MAX_FILE_SIZE_BYTES + 1);
        assert_eq!(
            validate_file(Some(&file)),
            Err(Rejection::UnsupportedExtension)
        );
    }

    #[test]
    fn size_limit_is_inclusive() {
        let at_limit = CandidateFile::new("a.eml", MAX_FILE_SIZE_BYTES);
        assert!(validate_file(Some(&at_limit)).is_ok());

        let over = CandidateFile::new("a.eml", 10_485_761);
        assert!(matches!(
            validate_file(Some(&over)),
            Err(Rejection::FileTooLarge { size: 10_485_761, .. })
        ));
    }

    #[test]
    fn empty_content_encodes_to_empty_string() {
        assert_eq!(encode_content(&[]), "");
        assert_eq!(decode_content("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_non_base64() {
        assert!(matches!(decode_content("not base64!"), Err(CoreError::Decode(_))));
    }

    #[test]
    fn decode_detects_size_mismatch() {
        let mut artifact = PendingArtifact::from_bytes("a.eml", b"abc", 1);
        artifact.size = 4;
        assert!(matches!(
            artifact.decode_content(),
            Err(CoreError::SizeMismatch { declared: 4, actual: 3 })
        ));
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            content_fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
