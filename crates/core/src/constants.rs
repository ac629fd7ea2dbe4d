//! Constants used throughout the figproxy core crate.
//!
//! Environment variable names, service defaults and header names live here so the binaries and
//! the client agree on them.

/// Base URL of the public design-file REST API.
pub const DEFAULT_API_BASE: &str = "https://api.figma.com/v1";

/// Timeout applied to every outbound request when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying a personal access token.
pub const FIGMA_TOKEN_HEADER: &str = "X-Figma-Token";

/// User agent sent with outbound requests.
pub const USER_AGENT: &str = concat!("figproxy/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the API credential (required).
pub const ENV_ACCESS_TOKEN: &str = "FIGMA_ACCESS_TOKEN";

/// Environment variable holding the default file key (optional).
pub const ENV_FILE_KEY: &str = "FIGMA_FILE_KEY";

/// Environment variable overriding [`DEFAULT_API_BASE`].
pub const ENV_API_BASE: &str = "FIGMA_API_BASE";

/// Environment variable selecting how the credential is sent (`token` or `bearer`).
pub const ENV_AUTH_SCHEME: &str = "FIGMA_AUTH_SCHEME";

/// Environment variable overriding [`DEFAULT_TIMEOUT_SECS`].
pub const ENV_TIMEOUT_SECS: &str = "FIGMA_TIMEOUT_SECS";
