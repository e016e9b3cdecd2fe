//! Environment-based configuration.
//!
//! All runtime configuration comes from environment variables, optionally
//! seeded from a `.env` file by the binary before this module reads them.

use std::path::PathBuf;

use thiserror::Error;

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Runtime configuration for the backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key for chat generation (required)
    pub groq_api_key: String,

    /// SerpAPI key for Scholar search; the scholar route is disabled when
    /// this is absent
    pub serpapi_key: Option<String>,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Directory PDFs are downloaded into
    pub download_dir: PathBuf,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// `GROQ_API_KEY` is required. `SERPAPI_KEY` is optional. `BIND_ADDR`
    /// defaults to `127.0.0.1:8000` and `DOWNLOAD_DIR` to `~/Downloads`.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingVar` if a required variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let groq_api_key = read_non_empty("GROQ_API_KEY")
            .ok_or(ConfigError::MissingVar("GROQ_API_KEY"))?;
        let serpapi_key = read_non_empty("SERPAPI_KEY");
        let bind_addr = read_non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let download_dir = read_non_empty("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_download_dir);

        Ok(Self {
            groq_api_key,
            serpapi_key,
            bind_addr,
            download_dir,
        })
    }
}

fn read_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `~/Downloads`, falling back to the current directory when HOME is unset.
fn default_download_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("."))
}
