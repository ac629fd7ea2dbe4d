//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Only [`FigmaEnv::from_process`] touches the process environment;
//! services receive a finished [`FigmaConfig`] and never look anything up themselves, which keeps
//! tests free to run with mock credentials side by side.

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, ENV_ACCESS_TOKEN, ENV_API_BASE, ENV_AUTH_SCHEME,
    ENV_FILE_KEY, ENV_TIMEOUT_SECS,
};
use crate::{AccessToken, DesignError, DesignResult, FileKey};
use std::str::FromStr;
use std::time::Duration;

/// How the credential is attached to outbound requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// Personal access token sent in the `X-Figma-Token` header.
    #[default]
    PersonalToken,
    /// OAuth access token sent as `Authorization: Bearer <token>`.
    Bearer,
}

impl FromStr for AuthScheme {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "pat" => Ok(AuthScheme::PersonalToken),
            "bearer" | "oauth" => Ok(AuthScheme::Bearer),
            other => Err(DesignError::Config(format!(
                "unknown auth scheme '{other}' (expected 'token' or 'bearer')"
            ))),
        }
    }
}

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct FigmaConfig {
    api_base: String,
    access_token: AccessToken,
    default_file_key: Option<FileKey>,
    auth_scheme: AuthScheme,
    request_timeout: Duration,
}

impl FigmaConfig {
    /// Create a new `FigmaConfig`.
    ///
    /// # Errors
    /// Returns `DesignError::Config` if `api_base` is not an http(s) URL or the timeout is zero.
    pub fn new(
        api_base: impl Into<String>,
        access_token: AccessToken,
        default_file_key: Option<FileKey>,
        auth_scheme: AuthScheme,
        request_timeout: Duration,
    ) -> DesignResult<Self> {
        let api_base = api_base.into().trim().trim_end_matches('/').to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(DesignError::Config(format!(
                "API base must be an http(s) URL, got '{api_base}'"
            )));
        }
        if request_timeout.is_zero() {
            return Err(DesignError::Config(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base,
            access_token,
            default_file_key,
            auth_scheme,
            request_timeout,
        })
    }

    /// Build a configuration from raw environment values.
    ///
    /// Missing optional values fall back to the defaults in [`crate::constants`].
    pub fn from_env_values(env: FigmaEnv) -> DesignResult<Self> {
        Self::new(
            api_base_from_env_value(env.api_base),
            access_token_from_env_value(env.access_token)?,
            file_key_from_env_value(env.file_key)?,
            auth_scheme_from_env_value(env.auth_scheme)?,
            timeout_from_env_value(env.timeout_secs)?,
        )
    }

    /// Base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn default_file_key(&self) -> Option<&FileKey> {
        self.default_file_key.as_ref()
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Raw configuration values as read from the environment.
#[derive(Clone, Debug, Default)]
pub struct FigmaEnv {
    pub access_token: Option<String>,
    pub file_key: Option<String>,
    pub api_base: Option<String>,
    pub auth_scheme: Option<String>,
    pub timeout_secs: Option<String>,
}

impl FigmaEnv {
    /// Snapshot the relevant process environment variables.
    pub fn from_process() -> Self {
        Self {
            access_token: std::env::var(ENV_ACCESS_TOKEN).ok(),
            file_key: std::env::var(ENV_FILE_KEY).ok(),
            api_base: std::env::var(ENV_API_BASE).ok(),
            auth_scheme: std::env::var(ENV_AUTH_SCHEME).ok(),
            timeout_secs: std::env::var(ENV_TIMEOUT_SECS).ok(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the access token. A missing or blank value is a configuration error.
pub fn access_token_from_env_value(value: Option<String>) -> DesignResult<AccessToken> {
    let value = non_blank(value)
        .ok_or_else(|| DesignError::Config(format!("{ENV_ACCESS_TOKEN} is not set")))?;
    AccessToken::new(value).map_err(|e| DesignError::Config(format!("{ENV_ACCESS_TOKEN}: {e}")))
}

/// Parse the optional default file key.
pub fn file_key_from_env_value(value: Option<String>) -> DesignResult<Option<FileKey>> {
    non_blank(value)
        .map(|v| FileKey::new(v).map_err(|e| DesignError::Config(format!("{ENV_FILE_KEY}: {e}"))))
        .transpose()
}

/// Parse the API base URL. If `value` is `None` or blank, returns the public API base.
pub fn api_base_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Parse the auth scheme. If `value` is `None` or blank, returns the personal-token scheme.
pub fn auth_scheme_from_env_value(value: Option<String>) -> DesignResult<AuthScheme> {
    non_blank(value)
        .map(|v| v.parse::<AuthScheme>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the request timeout in whole seconds.
pub fn timeout_from_env_value(value: Option<String>) -> DesignResult<Duration> {
    let secs = match non_blank(value) {
        Some(v) => v.parse::<u64>().map_err(|_| {
            DesignError::Config(format!(
                "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{v}'"
            ))
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}
