//! Names and defaults shared across the CLI.

/// Environment variable carrying the API credential.
pub const DEVIN_API_KEY_ENV: &str = "DEVIN_API_KEY";
/// Environment variable overriding the API base URL.
pub const DEVIN_API_URL_ENV: &str = "DEVIN_API_URL";
/// Environment variable overriding the configuration directory.
pub const DEVIN_CONFIG_DIR_ENV: &str = "DEVIN_CLI_CONFIG_DIR";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "devin-cli";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const TOKEN_FILE_NAME: &str = "token";

pub const DEFAULT_API_URL: &str = "https://api.devin.ai/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VALIDATE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Tokens shorter than this are rejected during `auth` setup.
pub const MIN_TOKEN_LEN: usize = 10;
