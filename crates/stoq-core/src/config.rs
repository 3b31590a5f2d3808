//! Configuration module
//!
//! Env-driven configuration for the ingestion client. Endpoint paths are
//! configuration, not contract: the calling convention (GET verify with a
//! token query parameter, POST multipart ingest) is fixed in stoq-client.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_VERIFY_PATH: &str = "/api/v1/login/verify";
const DEFAULT_INGEST_PATH: &str = "/api/v1/inventory";
const DEFAULT_TOKEN_FILE: &str = ".stoq/token";

/// Client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Path of the token verification endpoint.
    pub verify_path: String,
    /// Path of the inventory ingestion endpoint.
    pub ingest_path: String,
    /// Durable location of the session token.
    pub token_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            ingest_path: DEFAULT_INGEST_PATH.to_string(),
            token_path: default_token_path(),
        }
    }
}

impl Config {
    /// Build configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: STOQ_API_URL (or API_URL), STOQ_VERIFY_PATH,
    /// STOQ_INGEST_PATH, STOQ_TOKEN_PATH.
    pub fn from_env() -> Self {
        let api_url = env::var("STOQ_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            verify_path: env::var("STOQ_VERIFY_PATH")
                .unwrap_or_else(|_| DEFAULT_VERIFY_PATH.to_string()),
            ingest_path: env::var("STOQ_INGEST_PATH")
                .unwrap_or_else(|_| DEFAULT_INGEST_PATH.to_string()),
            token_path: env::var("STOQ_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_token_path()),
        }
    }
}

/// Token lives under the home directory when one is known, else the cwd.
fn default_token_path() -> PathBuf {
    match env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_TOKEN_FILE),
        _ => PathBuf::from(DEFAULT_TOKEN_FILE),
    }
}
