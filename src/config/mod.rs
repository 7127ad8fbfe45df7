//! Configuration management for the Parley relay

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use crate::upstream::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::{Error, GeminiClient, Result};

/// Default relay server port
pub const DEFAULT_PORT: u16 = 3000;

/// Parley relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream credential (`GEMINI_API_KEY`). Absence is a server
    /// configuration failure, surfaced at startup and per request.
    pub api_key: Option<SecretString>,

    /// Upstream API configuration
    pub upstream: UpstreamConfig,

    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Model identifier (e.g. "gemini-1.5-flash")
    pub model: String,

    /// API version path segment ("v1" or "v1beta")
    pub api_version: String,

    /// Base URL for the generative-language endpoint
    pub base_url: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI), served as router fallback
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with precedence env > TOML file > default
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .or(fc.api_keys.gemini)
            .map(SecretString::from);

        let upstream = UpstreamConfig {
            model: std::env::var("PARLEY_MODEL")
                .ok()
                .or(fc.upstream.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_version: std::env::var("PARLEY_API_VERSION")
                .ok()
                .or(fc.upstream.api_version)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            base_url: std::env::var("PARLEY_UPSTREAM_URL")
                .ok()
                .or(fc.upstream.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        let server = ServerConfig {
            port: std::env::var("PARLEY_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: std::env::var("PARLEY_STATIC_DIR")
                .ok()
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        Self {
            api_key,
            upstream,
            server,
        }
    }

    /// Require the upstream credential, failing fast before any request is
    /// served
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `GEMINI_API_KEY` is unset.
    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY environment variable is not set".into()))
    }

    /// Build the upstream client, or `None` when no credential is configured
    #[must_use]
    pub fn upstream_client(&self) -> Option<GeminiClient> {
        self.api_key.as_ref().map(|key| {
            GeminiClient::with_base_url(
                key.clone(),
                self.upstream.model.clone(),
                self.upstream.api_version.clone(),
                self.upstream.base_url.clone(),
            )
        })
    }
}
