//! Quake adapter.
//!
//! Quake takes a JSON POST with an `X-QuakeToken` header. Results are in
//! `data` (a list of service records), totals in `meta.pagination.total`,
//! and a body `code` other than 0 signals a logical failure.

use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{self, Deadline};
use crate::types::{Asset, QueryResultBlock, QueryType, Source};

/// Header carrying the Quake API token.
pub const TOKEN_HEADER: &str = "X-QuakeToken";

/// Quake search adapter.
#[derive(Debug, Clone)]
pub struct QuakeEngine {
    client: reqwest::Client,
    config: SearchConfig,
}

impl QuakeEngine {
    pub fn new(config: &SearchConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Build the Quake query string. Company queries search `org`.
    pub fn build_query(query: &str, query_type: QueryType) -> String {
        match query_type {
            QueryType::Ip => format!("ip:\"{query}\""),
            QueryType::Company => format!("org:\"{query}\""),
            QueryType::Domain => format!("domain:\"{query}\""),
        }
    }

    /// The `/api/v3` root derived from a configured base URL.
    pub fn v3_root(base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if base.contains("/api/v3") {
            base.to_string()
        } else {
            format!("{base}/api/v3")
        }
    }

    /// JSON body for one page of results.
    pub fn request_body(query_used: &str, page: u32, size: u32) -> Value {
        json!({
            "query": query_used,
            "start": u64::from(page.saturating_sub(1)) * u64::from(size),
            "size": size,
            "latest": true,
            "ignore_cache": false,
        })
    }

    fn token(&self) -> Result<&str, SearchError> {
        self.config
            .quake
            .key()
            .ok_or(SearchError::MissingCredential(Source::Quake))
    }
}

impl SourceAdapter for QuakeEngine {
    async fn search(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
    ) -> Result<QueryResultBlock, SearchError> {
        let token = self.token()?;
        let q = Self::build_query(query, query_type);
        tracing::trace!(query = %q, page, size, "Quake search");

        let url = format!(
            "{}/search/quake_service",
            Self::v3_root(self.config.base_url(Source::Quake))
        );
        let request = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, token)
            .json(&Self::request_body(&q, page, size))
            .timeout(Deadline::Search.duration(&self.config));
        let body = http::send_for_text(Source::Quake, request).await?;

        let mut block = parse_quake_response(&body, query, query_type, page, size, &q)?;
        block.request_url = Some(url);
        Ok(block)
    }

    async fn verify_credential(&self) -> Result<(), SearchError> {
        let token = self.token()?;
        let url = format!(
            "{}/user/info",
            Self::v3_root(self.config.base_url(Source::Quake))
        );
        let request = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, token)
            .timeout(Deadline::Probe.duration(&self.config));
        let body = http::send_for_text(Source::Quake, request).await?;
        let data = http::parse_json_object(Source::Quake, &body)?;
        check_code(&data)
    }

    fn source(&self) -> Source {
        Source::Quake
    }

    fn has_credential(&self) -> bool {
        self.config.has_credential(Source::Quake)
    }
}

/// Quake reports success as `code == 0` in the body.
fn check_code(data: &serde_json::Map<String, Value>) -> Result<(), SearchError> {
    match data.get("code") {
        Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(()),
        Some(Value::String(s)) if s.trim() == "0" => Ok(()),
        _ => {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("unknown error");
            Err(SearchError::UpstreamApi(format!("Quake: {message}")))
        }
    }
}

/// Parse a Quake JSON body into a result block.
pub(crate) fn parse_quake_response(
    body: &str,
    query: &str,
    query_type: QueryType,
    page: u32,
    size: u32,
    query_used: &str,
) -> Result<QueryResultBlock, SearchError> {
    let data = http::parse_json_object(Source::Quake, body)?;
    check_code(&data)?;

    let items = match data.get("data") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            return Err(SearchError::MalformedResponse(format!(
                "Quake data should be an array, got {}",
                http::json_kind(other)
            )))
        }
    };

    let results = items.iter().filter_map(map_item).collect();
    let total_size = http::value_count(
        data.get("meta")
            .and_then(|m| m.get("pagination"))
            .and_then(|p| p.get("total")),
    );

    Ok(QueryResultBlock {
        source: Source::Quake,
        query: query.to_string(),
        query_type,
        page,
        size,
        results,
        total_size,
        query_used: query_used.to_string(),
        tip: None,
        request_url: None,
    })
}

/// Map one service record.
///
/// Domain: `service.http.host`, then `hostname`, then top-level `domain`.
/// Host: `hostname`, then the resolved domain.
fn map_item(item: &Value) -> Option<Asset> {
    let map = item.as_object()?;
    let field = |k: &str| http::value_text(map.get(k));

    let http_service = map
        .get("service")
        .and_then(|s| s.get("http"))
        .filter(|h| h.is_object());
    let http_field = |k: &str| http::value_text(http_service.and_then(|h| h.get(k)));

    let hostname = field("hostname");
    let mut domain = http_field("host");
    if domain.is_empty() {
        domain = hostname.clone();
    }
    if domain.is_empty() {
        domain = field("domain");
    }
    let host = if hostname.is_empty() {
        domain.clone()
    } else {
        hostname
    };

    Some(Asset {
        ip: field("ip"),
        domain,
        host,
        port: field("port"),
        title: http_field("title"),
        company: field("org"),
        raw: item.clone(),
        ..Asset::new(Source::Quake)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<QueryResultBlock, SearchError> {
        parse_quake_response(body, "example.com", QueryType::Domain, 2, 20, "domain:\"example.com\"")
    }

    #[test]
    fn query_syntax_per_type() {
        assert_eq!(QuakeEngine::build_query("1.1.1.1", QueryType::Ip), "ip:\"1.1.1.1\"");
        assert_eq!(QuakeEngine::build_query("ACME", QueryType::Company), "org:\"ACME\"");
        assert_eq!(
            QuakeEngine::build_query("example.com", QueryType::Domain),
            "domain:\"example.com\""
        );
    }

    #[test]
    fn v3_root_resolution() {
        assert_eq!(
            QuakeEngine::v3_root("https://quake.360.net/api/v3/"),
            "https://quake.360.net/api/v3"
        );
        assert_eq!(
            QuakeEngine::v3_root("https://quake.360.net"),
            "https://quake.360.net/api/v3"
        );
    }

    #[test]
    fn request_body_pages_by_offset() {
        let body = QuakeEngine::request_body("ip:\"1.1.1.1\"", 3, 20);
        assert_eq!(body["start"], 40);
        assert_eq!(body["size"], 20);
        assert_eq!(body["latest"], true);
        assert_eq!(body["ignore_cache"], false);
        assert_eq!(QuakeEngine::request_body("q", 1, 100)["start"], 0);
    }

    #[test]
    fn items_map_with_nested_http_host() {
        let body = r#"{"code":0,"message":"Successful.","meta":{"pagination":{"total":57}},
            "data":[
              {"ip":"1.1.1.1","port":443,"hostname":"","org":"Example Org",
               "service":{"http":{"host":"www.example.com","title":"Welcome"}}},
              {"ip":"1.1.1.2","port":22,"hostname":"ssh.example.com","service":{"name":"ssh"}},
              {"ip":"1.1.1.3","port":80,"domain":"legacy.example.com"},
              "garbage"
            ]}"#;
        let block = parse(body).expect("parse");
        assert_eq!(block.total_size, 57);
        assert_eq!(block.results.len(), 3);

        let first = &block.results[0];
        assert_eq!(first.source, "quake");
        assert_eq!(first.domain, "www.example.com");
        assert_eq!(first.host, "www.example.com");
        assert_eq!(first.title, "Welcome");
        assert_eq!(first.company, "Example Org");
        assert_eq!(first.port, "443");

        let second = &block.results[1];
        assert_eq!(second.domain, "ssh.example.com");
        assert_eq!(second.host, "ssh.example.com");
        assert_eq!(second.title, "");

        let third = &block.results[2];
        assert_eq!(third.domain, "legacy.example.com");
        assert_eq!(third.host, "legacy.example.com");
    }

    #[test]
    fn non_zero_code_is_api_error() {
        let err = parse(r#"{"code":"q3005","message":"Insufficient credits"}"#).unwrap_err();
        assert!(matches!(err, SearchError::UpstreamApi(_)));
        assert!(err.to_string().contains("Insufficient credits"));
    }

    #[test]
    fn non_list_data_is_malformed() {
        let err = parse(r#"{"code":0,"data":{"ip":"1.1.1.1"}}"#).unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)));
    }

    #[test]
    fn empty_data_with_total_keeps_total() {
        let block = parse(r#"{"code":0,"data":[],"meta":{"pagination":{"total":50}}}"#)
            .expect("parse");
        assert!(block.results.is_empty());
        assert_eq!(block.total_size, 50);
        assert_eq!(block.page, 2);
    }
}
