//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Request
//! handlers never read process-wide environment variables, which keeps behaviour consistent in
//! multi-threaded runtimes and test harnesses.
//!
//! The `*_from_env_value` helpers take the raw optional string so they can be tested without
//! touching the real environment.

use crate::constants::{
    DEFAULT_FHIR_TIMEOUT_SECS, DEFAULT_PATIENT_LIST_LIMIT, DEFAULT_REST_ADDR,
    MAX_PATIENT_LIST_LIMIT,
};
use crate::error::ConfigError;
use std::time::Duration;

/// Connection settings for an upstream FHIR server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FhirServerConfig {
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl FhirServerConfig {
    /// Create FHIR server settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `base_url` is not an `http://` or `https://` URL.
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "FHIR_BASE_URL",
                message: format!("expected an http(s) URL, got '{base_url}'"),
            });
        }

        Ok(Self {
            base_url: base_url.to_string(),
            access_token: access_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: String,
    fhir_server: Option<FhirServerConfig>,
    patient_list_limit: usize,
    hide_error_details: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `fhir_server` of `None` selects the built-in demo roster.
    pub fn new(
        rest_addr: String,
        fhir_server: Option<FhirServerConfig>,
        patient_list_limit: usize,
        hide_error_details: bool,
    ) -> Result<Self, ConfigError> {
        if rest_addr.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "DORITY_REST_ADDR",
                message: "cannot be empty".into(),
            });
        }
        if !(1..=MAX_PATIENT_LIST_LIMIT).contains(&patient_list_limit) {
            return Err(ConfigError::InvalidValue {
                key: "PATIENT_LIST_LIMIT",
                message: format!("expected 1..={MAX_PATIENT_LIST_LIMIT}, got '{patient_list_limit}'"),
            });
        }

        Ok(Self {
            rest_addr,
            fhir_server,
            patient_list_limit,
            hide_error_details,
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// Call this once from `main`; see the module docs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |key: &str| std::env::var(key).ok();

        let timeout = timeout_from_env_value(var("FHIR_TIMEOUT_SECS"))?;
        let fhir_server = match var("FHIR_BASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(base_url) => Some(FhirServerConfig::new(
                &base_url,
                var("FHIR_ACCESS_TOKEN"),
                timeout,
            )?),
            None => None,
        };

        Self::new(
            var("DORITY_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            fhir_server,
            list_limit_from_env_value(var("PATIENT_LIST_LIMIT"))?,
            flag_from_env_value("DORITY_HIDE_ERROR_DETAILS", var("DORITY_HIDE_ERROR_DETAILS"))?,
        )
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn fhir_server(&self) -> Option<&FhirServerConfig> {
        self.fhir_server.as_ref()
    }

    pub fn patient_list_limit(&self) -> usize {
        self.patient_list_limit
    }

    pub fn hide_error_details(&self) -> bool {
        self.hide_error_details
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the upstream timeout in whole seconds. Blank or absent selects the default.
pub fn timeout_from_env_value(value: Option<String>) -> Result<Duration, ConfigError> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_FHIR_TIMEOUT_SECS));
    };

    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: "FHIR_TIMEOUT_SECS",
            message: format!("expected a positive number of seconds, got '{raw}'"),
        }),
    }
}

/// Parse the roster size limit. Blank or absent selects the default.
pub fn list_limit_from_env_value(value: Option<String>) -> Result<usize, ConfigError> {
    let Some(raw) = non_blank(value) else {
        return Ok(DEFAULT_PATIENT_LIST_LIMIT);
    };

    match raw.parse::<usize>() {
        Ok(n) if (1..=MAX_PATIENT_LIST_LIMIT).contains(&n) => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: "PATIENT_LIST_LIMIT",
            message: format!("expected 1..={MAX_PATIENT_LIST_LIMIT}, got '{raw}'"),
        }),
    }
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`). Blank or absent is `false`.
pub fn flag_from_env_value(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = non_blank(value) else {
        return Ok(false);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected true or false, got '{raw}'"),
        }),
    }
}
