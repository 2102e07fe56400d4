//! Error types for the PubMed MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors while resolving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Neither an API key nor an email is configured and the caller requires one.
    #[error(
        "No NCBI credentials configured (set --api-key/--email, a config file, or NCBI_API_KEY/NCBI_EMAIL)"
    )]
    MissingCredentials,

    /// Config file could not be read or written.
    #[error("Config file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config file is not valid JSON.
    #[error("Config file {path} is not valid JSON: {source}")]
    Json {
        /// File path
        path: String,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

/// Errors from the HTTP client layer. Every variant is a failed remote call.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by NCBI (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// E-utilities answered 200 but reported an error in the body
    #[error("E-utilities error: {message}")]
    Api {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited {
            retry_after: Duration::from_secs(seconds),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an in-body API error.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// The remote call failed
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// A required argument is missing or malformed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// The remote answered with something that could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The remote answered but had nothing for the request
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not available
    #[error("Resource unavailable: {0}")]
    Unavailable(String),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create an empty result error.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// True for argument errors raised before any remote call.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by NCBI E-utilities. Please wait {retry_after:?} before retrying."
                )
            }
            Self::Client(ClientError::NotFound { resource }) => {
                format!("Not found: {resource}. Please check the PMID is correct.")
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            Self::Unavailable(message) | Self::EmptyResult(message) => message.clone(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
