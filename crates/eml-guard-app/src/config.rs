//! Runtime configuration resolved from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use eml_guard_handoff::validate_session_id;
use eml_guard_upload::{DEFAULT_ANALYSIS_ENDPOINT, validate_analysis_endpoint};

use crate::AppError;

/// Env var overriding the analysis endpoint.
pub const ENDPOINT_ENV: &str = "EML_GUARD_ENDPOINT";
/// Env var overriding the tab store directory.
pub const STORE_DIR_ENV: &str = "EML_GUARD_STORE_DIR";
/// Env var selecting the session (tab) id.
pub const SESSION_ENV: &str = "EML_GUARD_SESSION";
/// Env var setting the HTTP timeout in whole seconds.
pub const HTTP_TIMEOUT_ENV: &str = "EML_GUARD_HTTP_TIMEOUT_SECS";

/// Session id used when none is configured.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Analysis endpoint URL.
    pub endpoint: String,
    /// Root directory of file-backed tab stores.
    pub store_dir: PathBuf,
    /// Session (tab) id scoping the pending artifact.
    pub session_id: String,
    /// HTTP timeout; `None` keeps the client default.
    pub http_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ANALYSIS_ENDPOINT.to_string(),
            store_dir: default_store_dir(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            http_timeout: None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or blank keys.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when any provided value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = value(ENDPOINT_ENV) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(dir) = value(STORE_DIR_ENV) {
            config.store_dir = PathBuf::from(dir);
        }
        if let Some(session) = value(SESSION_ENV) {
            config.session_id = session.trim().to_string();
        }
        if let Some(raw) = value(HTTP_TIMEOUT_ENV) {
            config.http_timeout = Some(parse_timeout_secs(&raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for an invalid endpoint or session id.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_analysis_endpoint(&self.endpoint)
            .map_err(|error| AppError::Config(format!("{ENDPOINT_ENV}: {error}")))?;
        validate_session_id(&self.session_id)
            .map_err(|error| AppError::Config(format!("{SESSION_ENV}: {error}")))?;
        Ok(())
    }
}

/// Parses a positive whole number of seconds.
///
/// # Errors
/// Returns [`AppError::Config`] for non-numeric or zero values.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, AppError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{HTTP_TIMEOUT_ENV}: '{raw}' is not a number")))?;
    if secs == 0 {
        return Err(AppError::Config(format!(
            "{HTTP_TIMEOUT_ENV}: timeout must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}

fn default_store_dir() -> PathBuf {
    std::env::temp_dir().join("eml-guard")
}
