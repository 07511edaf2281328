//! # netspace-search
//!
//! Multi-source asset reconnaissance: query FOFA, Hunter and Quake for an
//! IP, domain or company, normalise their answers into one [`Asset`]
//! shape, and deduplicate per target.
//!
//! ## Design
//!
//! - One adapter per provider, each owning its query syntax, request shape
//!   and response mapping
//! - Credentials are probed once per [`Session`] before any search
//! - Targets and sources are queried strictly sequentially; a failing pair
//!   never aborts the batch
//! - Progress is reported through a caller-supplied [`ReportSink`]
//!
//! ## Security
//!
//! - API keys never appear in errors, logs or reported request URLs
//! - Search queries are logged only at trace level

pub mod classify;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod probe;
pub mod registry;
pub mod types;

pub use classify::{classify, validate_batch, Batch, TargetKind};
pub use config::{SearchConfig, SourceCredentials};
pub use engine::SourceAdapter;
pub use engines::Adapter;
pub use error::{Result, SearchError};
pub use orchestrator::{
    BatchReport, FailureKind, NullSink, Orchestrator, PageRequest, PairFailure, ReportSink,
    TargetReport, TracingSink,
};
pub use probe::{CredentialStatus, Session};
pub use registry::SourceRegistry;
pub use types::{Asset, Emptiness, QueryResultBlock, QueryType, Source};

/// Probe `sources` and run `batch` against the available ones.
///
/// Convenience wrapper for one-shot use; long-lived callers should keep a
/// [`Session`] so credentials are probed only once.
///
/// # Errors
///
/// [`SearchError::Configuration`] if the configuration is invalid or no
/// requested source is usable. Per-pair failures are not errors; they are
/// in the returned [`BatchReport`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> netspace_search::Result<()> {
/// use netspace_search::{Batch, PageRequest, QueryType, SearchConfig, Source, TracingSink};
///
/// let config = SearchConfig::default();
/// let batch = Batch::new(QueryType::Domain, ["example.com"])?;
/// let report = netspace_search::search(&config, Source::all(), &batch, PageRequest::default(), &TracingSink).await?;
/// for target in &report.targets {
///     println!("{}: {} assets", target.target, target.unique_assets().len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    config: &SearchConfig,
    sources: &[Source],
    batch: &Batch,
    page: PageRequest,
    sink: &dyn ReportSink,
) -> Result<BatchReport> {
    let registry = SourceRegistry::new(config)?;
    let mut session = Session::new(registry, config.strict_probe);
    let available = session.available_sources(sources, sink).await?;
    let orchestrator = Orchestrator::new(session.registry(), sink);
    Ok(orchestrator.run(batch, &available, page).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            probe_timeout_seconds: 0,
            ..Default::default()
        };
        let batch = Batch::new(QueryType::Ip, ["1.1.1.1"]).expect("batch");
        let err = search(&config, Source::all(), &batch, PageRequest::default(), &NullSink)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_without_credentials_is_configuration_error() {
        let batch = Batch::new(QueryType::Domain, ["example.com"]).expect("batch");
        let err = search(
            &SearchConfig::default(),
            &[Source::Hunter],
            &batch,
            PageRequest::default(),
            &NullSink,
        )
        .await
        .unwrap_err();
        assert!(err.is_fatal());
    }
}
