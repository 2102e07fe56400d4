//! Configuration for the PubMed MCP server.
//!
//! Credentials come from three places. [`CredentialSources::resolve`] merges
//! them per field with the precedence CLI > config file > environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for NCBI E-utilities.
    pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// PubMed article page prefix.
    pub const PUBMED_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";

    /// PMC article page prefix.
    pub const PMC_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";

    /// Value of the `tool` parameter NCBI asks every client to send.
    pub const TOOL_NAME: &str = "pubmed-mcp";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests per second allowed without an API key.
    pub const REQUESTS_PER_SECOND: u32 = 3;

    /// Requests per second allowed with an API key.
    pub const REQUESTS_PER_SECOND_WITH_KEY: u32 = 10;

    /// Largest page a search may request without an API key.
    pub const MAX_RESULTS: u32 = 100;

    /// Largest page a search may request with an API key.
    pub const MAX_RESULTS_WITH_KEY: u32 = 200;

    /// Page size when the caller gives no limit.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// PMIDs per esummary request.
    pub const SUMMARY_BATCH_SIZE: usize = 200;

    /// Neighbours requested from elink for similar articles.
    pub const SIMILAR_RETMAX: u32 = 100;

    /// Transient-failure retries per request.
    pub const MAX_RETRIES: u32 = 3;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Environment variable holding the NCBI API key.
pub const ENV_API_KEY: &str = "NCBI_API_KEY";

/// Environment variable holding the contact email.
pub const ENV_EMAIL: &str = "NCBI_EMAIL";

/// NCBI credentials. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// NCBI API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Contact email sent with each request.
    #[serde(default)]
    pub email: Option<String>,
}

impl Credentials {
    /// Build credentials, treating blank strings as unset.
    #[must_use]
    pub fn new(api_key: Option<String>, email: Option<String>) -> Self {
        Self {
            api_key: non_blank(api_key),
            email: non_blank(email),
        }
    }

    /// Read `NCBI_API_KEY` and `NCBI_EMAIL` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var(ENV_API_KEY).ok(), std::env::var(ENV_EMAIL).ok())
    }

    /// True when neither field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.email.is_none()
    }

    /// Fail with `MissingCredentials` when both fields are unset.
    pub fn require(&self) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// On-disk JSON config file: `{"api_key": "...", "email": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// NCBI API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

impl ConfigFile {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Json` if it is not a JSON object of the expected shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load a config file, logging and ignoring any failure.
    #[must_use]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(file) => {
                tracing::debug!(path = %path.display(), "Loaded config file");
                file
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    /// Write the config file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, body).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// View the file contents as credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.email.clone())
    }
}

/// The three places credentials can come from.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    /// `--api-key` / `--email`.
    pub cli: Credentials,
    /// JSON file named by `--config`.
    pub file: Credentials,
    /// `NCBI_API_KEY` / `NCBI_EMAIL`.
    pub env: Credentials,
}

impl CredentialSources {
    /// Merge the sources field by field: CLI wins, then file, then environment.
    #[must_use]
    pub fn resolve(self) -> Credentials {
        let Self { cli, file, env } = self;
        Credentials {
            api_key: cli.api_key.or(file.api_key).or(env.api_key),
            email: cli.email.or(file.email).or(env.email),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// NCBI API key (optional).
    pub api_key: Option<String>,

    /// Contact email (optional).
    pub email: Option<String>,

    /// E-utilities base URL (overridden in tests with a mock server).
    pub eutils_base_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Minimum delay between the starts of two outbound requests.
    pub min_request_interval: Duration,

    /// Upper bound for any single search page.
    pub max_results: u32,

    /// Transient-failure retries per request.
    pub max_retries: u32,
}

impl Config {
    /// Create a configuration from resolved credentials.
    ///
    /// Limits follow the key:
    /// - Without key: 3 req/s, 100 results per search
    /// - With key: 10 req/s, 200 results per search
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        let has_key = credentials.api_key.is_some();
        let per_second = if has_key {
            api::REQUESTS_PER_SECOND_WITH_KEY
        } else {
            api::REQUESTS_PER_SECOND
        };

        Self {
            api_key: credentials.api_key,
            email: credentials.email,
            eutils_base_url: api::EUTILS_BASE_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            min_request_interval: Duration::from_secs(1) / per_second,
            max_results: if has_key {
                api::MAX_RESULTS_WITH_KEY
            } else {
                api::MAX_RESULTS
            },
            max_retries: api::MAX_RETRIES,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: None,
            email: None,
            eutils_base_url: format!("{}/entrez/eutils", base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            min_request_interval: Duration::ZERO, // No delay in tests
            max_results: api::MAX_RESULTS,
            max_retries: 0,
        }
    }

    /// Create configuration from environment variables only.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env())
    }
}
