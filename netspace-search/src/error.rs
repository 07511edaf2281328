//! Error types for the netspace-search crate.
//!
//! Messages are stable and safe to show to users. API keys and tokens never
//! appear in error messages; request URLs are redacted before they are
//! attached to anything user-visible.

use crate::types::{QueryType, Source};

/// Errors that can occur while probing or querying asset search providers.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The source has no API key configured. Raised before any request.
    #[error("{0} credential missing: set {0}.api_key in the configuration file")]
    MissingCredential(Source),

    /// The source does not support the requested query type. Raised before
    /// any request.
    #[error("{provider} does not support {query_type} queries")]
    UnsupportedQueryType {
        /// Source that rejected the query.
        provider: Source,
        /// The query type that was requested.
        query_type: QueryType,
    },

    /// The provider answered with a non-2xx HTTP status.
    #[error("HTTP {status}: {message}")]
    UpstreamHttp {
        /// HTTP status code.
        status: u16,
        /// Short description taken from the response.
        message: String,
    },

    /// The provider reported a logical failure despite HTTP 200.
    #[error("API error: {0}")]
    UpstreamApi(String),

    /// The payload was not the JSON shape the provider documents.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request timed out. Timeouts are reported, never retried.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure (DNS, TLS, refused connection, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Batch-level validation failure. Aborts the batch before any request.
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable configuration for the requested sources. Aborts before any
    /// request.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SearchError {
    /// Returns `true` for HTTP 401/403, i.e. the provider refused the key.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::UpstreamHttp { status: 401 | 403, .. })
    }

    /// Returns `true` if this error aborts a whole batch rather than a
    /// single (target, source) pair.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }

    /// Map a [`reqwest::Error`] raised while sending or reading a request.
    pub(crate) fn from_request(provider: Source, err: reqwest::Error) -> Self {
        // reqwest includes the full URL in its Display output; strip it so
        // query-string credentials cannot leak.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(format!("{provider} request exceeded its deadline"))
        } else if let Some(status) = err.status() {
            Self::UpstreamHttp {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            }
        } else {
            Self::Transport(format!("{provider} request failed: {err}"))
        }
    }
}

/// Convenience type alias for netspace-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
