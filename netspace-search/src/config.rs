//! Search configuration: per-source credentials, endpoints and timeouts.
//!
//! [`SearchConfig`] is plain data. Loading it from disk is the
//! application's job; this crate only validates and consumes it.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::Source;

/// Default FOFA API root.
pub const FOFA_DEFAULT_BASE_URL: &str = "https://fofoapi.com/api/v1";
/// Default Hunter API root.
pub const HUNTER_DEFAULT_BASE_URL: &str = "https://hunter.qianxin.com/openApi";
/// Default Quake API root.
pub const QUAKE_DEFAULT_BASE_URL: &str = "https://quake.360.net/api/v3";

/// Credential and endpoint for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCredentials {
    /// API key or token. FOFA configurations traditionally call this `key`.
    #[serde(default, alias = "key")]
    pub api_key: Option<String>,
    /// API root URL override. Mirrors and self-hosted gateways are accepted.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl SourceCredentials {
    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Returns the key if one is configured and non-blank.
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Configuration for probing and querying providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub fofa: SourceCredentials,
    pub hunter: SourceCredentials,
    pub quake: SourceCredentials,
    /// Timeout for bulk search calls, in seconds.
    pub search_timeout_seconds: u64,
    /// Timeout for credential probes, in seconds.
    pub probe_timeout_seconds: u64,
    /// Treat a 2xx-but-unparsable probe response as unavailable instead of
    /// provisionally available.
    pub strict_probe: bool,
    /// Custom User-Agent. If `None`, the crate's default is sent.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fofa: SourceCredentials::default(),
            hunter: SourceCredentials::default(),
            quake: SourceCredentials::default(),
            search_timeout_seconds: 120,
            probe_timeout_seconds: 30,
            strict_probe: false,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Credentials for one source.
    pub fn credentials(&self, source: Source) -> &SourceCredentials {
        source.pick(&self.fofa, &self.hunter, &self.quake)
    }

    /// Mutable credentials for one source.
    pub fn credentials_mut(&mut self, source: Source) -> &mut SourceCredentials {
        source.pick(&mut self.fofa, &mut self.hunter, &mut self.quake)
    }

    /// The API root for `source`: the configured override, or the
    /// provider's public endpoint.
    pub fn base_url(&self, source: Source) -> &str {
        self.credentials(source)
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(source.pick(
                FOFA_DEFAULT_BASE_URL,
                HUNTER_DEFAULT_BASE_URL,
                QUAKE_DEFAULT_BASE_URL,
            ))
    }

    /// Whether a non-blank key is configured for `source`.
    pub fn has_credential(&self, source: Source) -> bool {
        self.credentials(source).key().is_some()
    }

    /// Whether any source at all has a key.
    pub fn any_credential(&self) -> bool {
        Source::all().iter().any(|s| self.has_credential(*s))
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - both timeouts must be greater than 0
    /// - every base URL must be an `http://` or `https://` URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.search_timeout_seconds == 0 {
            return Err(SearchError::Configuration(
                "search_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_seconds == 0 {
            return Err(SearchError::Configuration(
                "probe_timeout_seconds must be greater than 0".into(),
            ));
        }
        for source in Source::all() {
            let base = self.base_url(*source);
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(SearchError::Configuration(format!(
                    "{source}.base_url must start with http:// or https://"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.search_timeout_seconds, 120);
        assert_eq!(config.probe_timeout_seconds, 30);
        assert!(!config.strict_probe);
        assert_eq!(config.base_url(Source::Fofa), FOFA_DEFAULT_BASE_URL);
        assert_eq!(config.base_url(Source::Hunter), HUNTER_DEFAULT_BASE_URL);
        assert_eq!(config.base_url(Source::Quake), QUAKE_DEFAULT_BASE_URL);
        assert!(!config.any_credential());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_search_timeout_rejected() {
        let config = SearchConfig {
            search_timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search_timeout_seconds"));
    }

    #[test]
    fn zero_probe_timeout_rejected() {
        let config = SearchConfig {
            probe_timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probe_timeout_seconds"));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let mut config = SearchConfig::default();
        config.quake.base_url = Some("ftp://quake.example".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quake.base_url"));
    }

    #[test]
    fn blank_base_url_falls_back_to_default() {
        let mut config = SearchConfig::default();
        config.hunter.base_url = Some("  ".into());
        assert_eq!(config.base_url(Source::Hunter), HUNTER_DEFAULT_BASE_URL);
        config.hunter.base_url = Some("http://127.0.0.1:9000/openApi".into());
        assert_eq!(config.base_url(Source::Hunter), "http://127.0.0.1:9000/openApi");
    }

    #[test]
    fn blank_key_is_not_a_credential() {
        let mut config = SearchConfig::default();
        config.hunter.api_key = Some("   ".into());
        assert!(!config.has_credential(Source::Hunter));
        config.hunter.api_key = Some("abc".into());
        assert!(config.has_credential(Source::Hunter));
        assert!(config.any_credential());
    }

    #[test]
    fn fofa_key_alias_deserializes() {
        let creds: SourceCredentials =
            serde_json::from_str(r#"{"key":"k1","base_url":"https://mirror.example/api/v1"}"#)
                .expect("deserialize");
        assert_eq!(creds.key(), Some("k1"));
    }

    #[test]
    fn key_is_trimmed() {
        let creds = SourceCredentials::default().with_api_key("  tok \n");
        assert_eq!(creds.key(), Some("tok"));
    }
}
