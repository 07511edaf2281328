//! Shared HTTP plumbing for provider requests.
//!
//! Provides a configured [`reqwest::Client`], status checking that maps
//! non-2xx responses to [`SearchError::UpstreamHttp`], JSON decoding that
//! maps anything unparsable to [`SearchError::MalformedResponse`], and
//! credential redaction for display URLs.

use std::time::Duration;

use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::Source;

/// User-Agent sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("netspace/", env!("CARGO_PKG_VERSION"));

/// Number of body characters quoted back in error messages.
const SNIPPET_CHARS: usize = 200;

/// Placeholder that replaces credentials in display URLs.
pub const REDACTED: &str = "***";

/// Which of the two fixed request deadlines applies to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Bulk search call.
    Search,
    /// Cheap credential probe.
    Probe,
}

impl Deadline {
    pub fn duration(self, config: &SearchConfig) -> Duration {
        match self {
            Self::Search => Duration::from_secs(config.search_timeout_seconds),
            Self::Probe => Duration::from_secs(config.probe_timeout_seconds),
        }
    }
}

/// Build a [`reqwest::Client`] for provider API calls.
///
/// The per-request timeout is applied by callers through
/// [`reqwest::RequestBuilder::timeout`], so one client serves both search
/// and probe calls.
///
/// # Errors
///
/// Returns [`SearchError::Transport`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Send a request and read its body, mapping transport failures, timeouts
/// and non-2xx statuses.
pub async fn send_for_text(
    source: Source,
    request: reqwest::RequestBuilder,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::from_request(source, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SearchError::from_request(source, e))?;

    if !status.is_success() {
        tracing::debug!(%source, status = status.as_u16(), "provider returned error status");
        return Err(SearchError::UpstreamHttp {
            status: status.as_u16(),
            message: status_message(status, &body),
        });
    }

    tracing::trace!(%source, bytes = body.len(), "provider response received");
    Ok(body)
}

/// Parse a provider body as a JSON object.
///
/// Mirrors and gateways sometimes answer with HTML or plain text; the
/// first characters of the body are quoted to help diagnose that.
pub fn parse_json_object(
    source: Source,
    body: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, SearchError> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(SearchError::MalformedResponse(format!(
            "{source} returned JSON {} instead of an object",
            json_kind(&other)
        ))),
        Err(_) => Err(SearchError::MalformedResponse(format!(
            "{source} returned non-JSON content: {:?}",
            snippet(body)
        ))),
    }
}

/// Build a display URL with the named query parameters redacted.
pub fn redacted_url(base: &str, params: &[(&str, String)], secret_keys: &[&str]) -> Option<String> {
    let display: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| {
            if secret_keys.contains(k) {
                (*k, REDACTED)
            } else {
                (*k, v.as_str())
            }
        })
        .collect();
    Url::parse_with_params(base, &display)
        .ok()
        .map(|u| u.to_string())
}

/// Human-readable name of a JSON value's type, used in error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Render a scalar JSON value as the string the canonical model stores.
///
/// Providers disagree on whether ports and counts are numbers or strings;
/// both collapse to the same text. `null` and absent become `""`.
pub fn value_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Read a provider-reported total, accepting numbers or numeric strings.
pub fn value_count(value: Option<&serde_json::Value>) -> u64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("unexpected status");
    let body = snippet(body);
    if body.trim().is_empty() {
        reason.to_string()
    } else {
        format!("{reason}: {}", body.trim())
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn deadlines_follow_config() {
        let config = SearchConfig::default();
        assert_eq!(Deadline::Search.duration(&config), Duration::from_secs(120));
        assert_eq!(Deadline::Probe.duration(&config), Duration::from_secs(30));
    }

    #[test]
    fn redacted_url_hides_secret_params() {
        let url = redacted_url(
            "https://hunter.example/openApi/search",
            &[("api-key", "secret".into()), ("page", "1".into())],
            &["api-key"],
        )
        .expect("valid url");
        assert!(!url.contains("secret"));
        assert!(url.contains("api-key=***") || url.contains("api-key=%2A%2A%2A"));
        assert!(url.contains("page=1"));
    }

    #[test]
    fn parse_json_object_rejects_html() {
        let err = parse_json_object(Source::Fofa, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)));
        assert!(err.to_string().contains("non-JSON"));
    }

    #[test]
    fn parse_json_object_rejects_arrays() {
        let err = parse_json_object(Source::Quake, "[1,2]").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn value_text_normalises_scalars() {
        assert_eq!(value_text(Some(&json!(443))), "443");
        assert_eq!(value_text(Some(&json!(" a.com "))), "a.com");
        assert_eq!(value_text(Some(&json!(null))), "");
        assert_eq!(value_text(None), "");
    }

    #[test]
    fn value_count_accepts_numeric_strings() {
        assert_eq!(value_count(Some(&json!(42))), 42);
        assert_eq!(value_count(Some(&json!("17"))), 17);
        assert_eq!(value_count(Some(&json!("many"))), 0);
        assert_eq!(value_count(None), 0);
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), SNIPPET_CHARS);
    }
}
