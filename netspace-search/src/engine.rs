//! Trait definition for pluggable asset search providers.
//!
//! Each provider (FOFA, Hunter, Quake) implements [`SourceAdapter`] to map
//! its own query syntax and response schema onto the canonical
//! [`Asset`](crate::types::Asset) model.

use crate::error::SearchError;
use crate::types::{QueryResultBlock, QueryType, Source};

/// A pluggable asset search provider.
///
/// Implementors handle their own:
///
/// - query-syntax construction and encoding
/// - HTTP request shape (GET parameters, POST body, auth header)
/// - explicit, tagged parsing of the provider's JSON into canonical assets
/// - a cheap credential probe
///
/// All implementations must be `Send + Sync`.
pub trait SourceAdapter: Send + Sync {
    /// Run one search and return exactly one page of results.
    ///
    /// # Errors
    ///
    /// - [`SearchError::UnsupportedQueryType`] / [`SearchError::MissingCredential`]
    ///   before any request is sent
    /// - [`SearchError::UpstreamHttp`] on non-2xx responses
    /// - [`SearchError::UpstreamApi`] when the provider reports a logical failure
    /// - [`SearchError::MalformedResponse`] when the payload has the wrong shape
    /// - [`SearchError::Timeout`] / [`SearchError::Transport`] on network failure
    fn search(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
    ) -> impl std::future::Future<Output = Result<QueryResultBlock, SearchError>> + Send;

    /// Check that the configured credential is accepted, using the
    /// cheapest call the provider offers.
    fn verify_credential(&self) -> impl std::future::Future<Output = Result<(), SearchError>> + Send;

    /// Which [`Source`] this adapter represents.
    fn source(&self) -> Source;

    /// Whether a non-blank credential is configured.
    fn has_credential(&self) -> bool;

    /// Whether this provider accepts `query_type`. Delegates to
    /// [`Source::supports`].
    fn supports(&self, query_type: QueryType) -> bool {
        self.source().supports(query_type)
    }
}
