#![warn(missing_docs)]
//! # eml-guard-app
//!
//! ## Purpose
//! Orchestrates validation, handoff, upload, and UI state for `eml-guard`.
//!
//! ## Responsibilities
//! - Drive the source page: select -> validate -> encode -> store -> navigate.
//! - Drive the destination page: take -> submit -> present, or redirect back
//!   when nothing is pending.
//! - Resolve runtime configuration and install logging for the binary.
//!
//! ## Data flow
//! [`pages::SourcePage::submit`] -> cross-page store -> navigation ->
//! [`pages::ResultPage::load`] -> analysis client -> result screen.
//!
//! ## Ownership and lifetimes
//! Both pages of one tab share a [`eml_guard_handoff::CrossPageStore`]; no
//! other state crosses the navigation.
//!
//! ## Error model
//! Validation and pre-storage failures stay on the source page as form state.
//! Configuration and storage failures are wrapped in [`AppError`].

use std::io::IsTerminal;
use std::sync::Arc;

use eml_guard_handoff::{CrossPageStore, FileSessionStorage, HandoffError, MemorySessionStorage};
use eml_guard_upload::{AnalysisClient, HttpTransport, UploadError};
use thiserror::Error;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod pages;

pub use config::AppConfig;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("EML_GUARD_VERSION");

/// Env var holding a `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "EML_GUARD_LOG";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the stderr log subscriber.
///
/// `EML_GUARD_LOG` wins when set; otherwise `verbosity` selects
/// `warn` (0), `info` (1) or `debug` (2+).
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed by an embedding test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Current time in Unix epoch milliseconds.
pub fn unix_timestamp_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Builds the HTTP analysis client for `config`.
///
/// # Errors
/// Returns [`AppError::Upload`] for an invalid endpoint or HTTP client setup
/// failure.
pub fn build_client(config: &AppConfig) -> Result<AnalysisClient, AppError> {
    let transport = HttpTransport::new(config.http_timeout)?;
    Ok(AnalysisClient::new(&config.endpoint, Arc::new(transport))?)
}

/// Opens the file-backed tab store for the configured session.
///
/// # Errors
/// Returns [`AppError::Handoff`] when the session id is invalid or the store
/// directory cannot be created.
pub fn open_session_store(config: &AppConfig) -> Result<CrossPageStore, AppError> {
    let storage = FileSessionStorage::open(&config.store_dir, &config.session_id)?;
    Ok(CrossPageStore::new(Arc::new(storage)))
}

/// Creates a process-local tab store.
pub fn in_memory_store() -> CrossPageStore {
    CrossPageStore::new(Arc::new(MemorySessionStorage::new()))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
    /// Selected file could not be inspected.
    #[error("file error: {0}")]
    File(String),
    /// Cross-page store error.
    #[error("handoff error: {0}")]
    Handoff(#[from] HandoffError),
    /// Analysis client error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}
