//! Credential viability probing.
//!
//! Each source with a configured key gets one cheap authenticated call.
//! The outcome is classified into available / unavailable with a
//! user-facing reason, and cached for the rest of the [`Session`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::orchestrator::report::ReportSink;
use crate::registry::SourceRegistry;
use crate::types::Source;

/// Reason given when no key is configured.
pub const REASON_NOT_CONFIGURED: &str = "not configured";
/// Reason given when the probe succeeded.
pub const REASON_AVAILABLE: &str = "available";
/// Reason given when the probe timed out.
pub const REASON_TIMEOUT: &str = "network timeout, credential status unknown";
/// Reason given when the probe got a 2xx with a body that could not be parsed.
pub const REASON_UNPARSABLE: &str = "HTTP ok, response unparsable";

/// Probe outcome for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub source: Source,
    /// A non-blank key is present in the configuration.
    pub configured: bool,
    /// The source may be queried.
    pub available: bool,
    pub reason: String,
}

impl CredentialStatus {
    fn not_configured(source: Source) -> Self {
        Self {
            source,
            configured: false,
            available: false,
            reason: REASON_NOT_CONFIGURED.to_string(),
        }
    }
}

/// Classify the result of a credential probe into `(available, reason)`.
///
/// A 2xx answer whose body cannot be parsed counts as available unless
/// `strict` is set.
pub fn classify_probe_outcome(outcome: &Result<(), SearchError>, strict: bool) -> (bool, String) {
    match outcome {
        Ok(()) => (true, REASON_AVAILABLE.to_string()),
        Err(SearchError::MissingCredential(_)) => (false, REASON_NOT_CONFIGURED.to_string()),
        Err(SearchError::Timeout(_)) => (false, REASON_TIMEOUT.to_string()),
        Err(SearchError::UpstreamHttp { status, .. }) if matches!(status, 401 | 403) => {
            (false, format!("invalid credential (HTTP {status})"))
        }
        Err(SearchError::UpstreamHttp { status, message }) => {
            (false, format!("HTTP {status}: {message}"))
        }
        Err(SearchError::MalformedResponse(_)) => (!strict, REASON_UNPARSABLE.to_string()),
        Err(other) => (false, other.to_string()),
    }
}

/// Probe one adapter. No network call is made without a credential.
pub async fn probe_adapter<A: SourceAdapter>(adapter: &A, strict: bool) -> CredentialStatus {
    let source = adapter.source();
    if !adapter.has_credential() {
        return CredentialStatus::not_configured(source);
    }

    tracing::debug!(%source, "probing credential");
    let outcome = adapter.verify_credential().await;
    if let Err(ref e) = outcome {
        tracing::debug!(%source, error = %e, "credential probe failed");
    }
    let (available, reason) = classify_probe_outcome(&outcome, strict);
    CredentialStatus {
        source,
        configured: true,
        available,
        reason,
    }
}

/// Availability for one invocation: probes each source at most once.
#[derive(Debug)]
pub struct Session {
    registry: SourceRegistry,
    strict: bool,
    statuses: BTreeMap<Source, CredentialStatus>,
}

impl Session {
    pub fn new(registry: SourceRegistry, strict: bool) -> Self {
        Self {
            registry,
            strict,
            statuses: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Probe every source in `sources` that has not been probed yet, and
    /// return the statuses for `sources` in the given order.
    pub async fn probe(
        &mut self,
        sources: &[Source],
        sink: &dyn ReportSink,
    ) -> Vec<CredentialStatus> {
        for &source in sources {
            if self.statuses.contains_key(&source) {
                continue;
            }
            let status = probe_adapter(self.registry.adapter(source), self.strict).await;
            sink.credential_checked(&status);
            self.statuses.insert(source, status);
        }
        sources
            .iter()
            .filter_map(|s| self.statuses.get(s).cloned())
            .collect()
    }

    /// The cached status for `source`, if it has been probed.
    pub fn status(&self, source: Source) -> Option<&CredentialStatus> {
        self.statuses.get(&source)
    }

    /// Probe `requested` and return the available subset in requested order.
    ///
    /// # Errors
    ///
    /// [`SearchError::Configuration`] when none of `requested` has a key, or
    /// when every configured source failed its probe.
    pub async fn available_sources(
        &mut self,
        requested: &[Source],
        sink: &dyn ReportSink,
    ) -> Result<Vec<Source>, SearchError> {
        let adapters = || requested.iter().map(|&s| self.registry.adapter(s));
        if !adapters().any(|a| a.has_credential()) {
            let names: Vec<&str> = requested.iter().map(|s| s.name()).collect();
            return Err(SearchError::Configuration(format!(
                "no credential configured for {}; set <source>.api_key in the configuration file",
                names.join(", ")
            )));
        }

        let statuses = self.probe(requested, sink).await;
        let available: Vec<Source> = statuses
            .iter()
            .filter(|s| s.available)
            .map(|s| s.source)
            .collect();

        if available.is_empty() {
            let reasons: Vec<String> = statuses
                .iter()
                .map(|s| format!("{}: {}", s.source, s.reason))
                .collect();
            return Err(SearchError::Configuration(format!(
                "no source is available ({})",
                reasons.join("; ")
            )));
        }
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchConfig, SourceCredentials};
    use crate::orchestrator::report::testing::RecordingSink;

    #[test]
    fn success_is_available() {
        assert_eq!(
            classify_probe_outcome(&Ok(()), false),
            (true, "available".to_string())
        );
    }

    #[test]
    fn timeout_reason() {
        let (available, reason) =
            classify_probe_outcome(&Err(SearchError::Timeout("probe".into())), false);
        assert!(!available);
        assert_eq!(reason, "network timeout, credential status unknown");
    }

    #[test]
    fn rejected_credentials() {
        for status in [401, 403] {
            let err = SearchError::UpstreamHttp {
                status,
                message: "Unauthorized".into(),
            };
            let (available, reason) = classify_probe_outcome(&Err(err), false);
            assert!(!available);
            assert_eq!(reason, format!("invalid credential (HTTP {status})"));
        }
    }

    #[test]
    fn other_http_status() {
        let err = SearchError::UpstreamHttp {
            status: 502,
            message: "Bad Gateway".into(),
        };
        let (available, reason) = classify_probe_outcome(&Err(err), false);
        assert!(!available);
        assert_eq!(reason, "HTTP 502: Bad Gateway");
    }

    #[test]
    fn unparsable_is_provisionally_available() {
        let err = || Err(SearchError::MalformedResponse("html".into()));
        assert_eq!(
            classify_probe_outcome(&err(), false),
            (true, "HTTP ok, response unparsable".to_string())
        );
        assert!(!classify_probe_outcome(&err(), true).0);
    }

    #[test]
    fn api_error_is_unavailable_with_message() {
        let (available, reason) = classify_probe_outcome(
            &Err(SearchError::UpstreamApi("Quake: token expired".into())),
            false,
        );
        assert!(!available);
        assert!(reason.contains("token expired"));
    }

    #[tokio::test]
    async fn unconfigured_sources_are_not_probed() {
        let registry = SourceRegistry::new(&SearchConfig::default()).expect("registry");
        let mut session = Session::new(registry, false);
        let sink = RecordingSink::default();
        let statuses = session.probe(Source::all(), &sink).await;
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| !s.configured && !s.available));
        assert!(statuses.iter().all(|s| s.reason == "not configured"));
        assert_eq!(sink.events().len(), 3);

        // Cached: a second call emits nothing new.
        session.probe(Source::all(), &sink).await;
        assert_eq!(sink.events().len(), 3);
    }

    #[tokio::test]
    async fn no_credentials_is_configuration_error() {
        let registry = SourceRegistry::new(&SearchConfig::default()).expect("registry");
        let mut session = Session::new(registry, false);
        let err = session
            .available_sources(&[Source::Fofa, Source::Hunter], &RecordingSink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
        assert!(err.to_string().contains("fofa, hunter"));
    }

    #[tokio::test]
    async fn unreachable_source_is_unavailable() {
        let config = SearchConfig {
            quake: SourceCredentials::default()
                .with_api_key("token")
                .with_base_url("http://127.0.0.1:1"),
            ..Default::default()
        };
        let registry = SourceRegistry::new(&config).expect("registry");
        let mut session = Session::new(registry, false);
        let err = session
            .available_sources(&[Source::Quake], &RecordingSink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
        let status = session.status(Source::Quake).expect("probed");
        assert!(status.configured);
        assert!(!status.available);
    }
}
