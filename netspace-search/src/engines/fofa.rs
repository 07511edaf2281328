//! FOFA adapter.
//!
//! FOFA takes a base64-encoded query (`qbase64`) on a GET endpoint and
//! answers with `results` as a list of rows whose columns follow the
//! requested `fields` order. It has no account-info endpoint, so the
//! credential probe is a minimal search.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{self, Deadline};
use crate::types::{Asset, QueryResultBlock, QueryType, Source};

/// Columns requested from FOFA, in row order.
pub const FIELDS: &str = "host,ip,port,title,domain";

/// Target used by the search-based credential probe.
const PROBE_QUERY: &str = "example.com";

/// FOFA search adapter.
#[derive(Debug, Clone)]
pub struct FofaEngine {
    client: reqwest::Client,
    config: SearchConfig,
}

impl FofaEngine {
    pub fn new(config: &SearchConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Build the FOFA query string. IPs are unquoted; everything else is a
    /// quoted `host` match.
    pub fn build_query(query: &str, query_type: QueryType) -> String {
        match query_type {
            QueryType::Ip => format!("ip={query}"),
            _ => format!("host=\"{query}\""),
        }
    }

    /// Resolve the search endpoint from a configured base URL.
    ///
    /// Accepts a bare host, an `/api/v1` root, or the full
    /// `/api/v1/search/all` path.
    pub fn endpoint(base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if base.ends_with("/api/v1/search/all") {
            base.trim_end_matches('?').to_string()
        } else if base.ends_with("/api/v1") {
            format!("{base}/search/all")
        } else {
            format!("{base}/api/v1/search/all")
        }
    }

    async fn fetch(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
        deadline: Deadline,
    ) -> Result<QueryResultBlock, SearchError> {
        if !Source::Fofa.supports(query_type) {
            return Err(SearchError::UnsupportedQueryType {
                provider: Source::Fofa,
                query_type,
            });
        }
        let key = self
            .config
            .fofa
            .key()
            .ok_or(SearchError::MissingCredential(Source::Fofa))?;

        let q = Self::build_query(query, query_type);
        tracing::trace!(query = %q, page, size, "FOFA search");

        let url = Self::endpoint(self.config.base_url(Source::Fofa));
        let params: Vec<(&str, String)> = vec![
            ("key", key.to_string()),
            ("qbase64", STANDARD.encode(q.as_bytes())),
            ("page", page.to_string()),
            ("size", size.to_string()),
            ("fields", FIELDS.to_string()),
            ("r_type", "json".to_string()),
        ];

        let request = self
            .client
            .get(&url)
            .query(&params)
            .timeout(deadline.duration(&self.config));
        let body = http::send_for_text(Source::Fofa, request).await?;

        let mut block = parse_fofa_response(&body, query, query_type, page, size, &q)?;
        block.request_url = http::redacted_url(&url, &params, &["key"]);
        Ok(block)
    }
}

impl SourceAdapter for FofaEngine {
    async fn search(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
    ) -> Result<QueryResultBlock, SearchError> {
        self.fetch(query, query_type, page, size, Deadline::Search)
            .await
    }

    async fn verify_credential(&self) -> Result<(), SearchError> {
        self.fetch(PROBE_QUERY, QueryType::Domain, 1, 1, Deadline::Probe)
            .await
            .map(|_| ())
    }

    fn source(&self) -> Source {
        Source::Fofa
    }

    fn has_credential(&self) -> bool {
        self.config.has_credential(Source::Fofa)
    }
}

/// Parse a FOFA JSON body into a result block.
///
/// Extracted as a separate function for testability with canned payloads.
pub(crate) fn parse_fofa_response(
    body: &str,
    query: &str,
    query_type: QueryType,
    page: u32,
    size: u32,
    query_used: &str,
) -> Result<QueryResultBlock, SearchError> {
    let data = http::parse_json_object(Source::Fofa, body)?;

    if data.get("error").and_then(Value::as_bool) == Some(true) {
        let message = ["errmsg", "message"]
            .iter()
            .filter_map(|k| data.get(*k).and_then(Value::as_str))
            .find(|m| !m.is_empty())
            .unwrap_or("unknown error");
        return Err(SearchError::UpstreamApi(format!("FOFA: {message}")));
    }

    let rows = match data.get("results") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(rows)) => rows.as_slice(),
        Some(other) => {
            return Err(SearchError::MalformedResponse(format!(
                "FOFA results should be an array, got {}",
                http::json_kind(other)
            )))
        }
    };

    let results: Vec<Asset> = rows.iter().filter_map(map_row).collect();

    let total_size = http::value_count(data.get("size"));
    let query_used = data
        .get("query")
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty())
        .unwrap_or(query_used)
        .to_string();
    let tip = data
        .get("tip")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from);

    if total_size == 0 {
        if let Some(ref tip) = tip {
            tracing::debug!(%tip, query = %query_used, "FOFA returned a hint for an empty result");
        }
    }

    Ok(QueryResultBlock {
        source: Source::Fofa,
        query: query.to_string(),
        query_type,
        page,
        size,
        results,
        total_size,
        query_used,
        tip,
        request_url: None,
    })
}

/// Map one FOFA row. List rows follow [`FIELDS`]; dict rows are read by
/// key; anything else is skipped.
fn map_row(row: &Value) -> Option<Asset> {
    match row {
        Value::Array(cols) => {
            let col = |i: usize| http::value_text(cols.get(i));
            let host = col(0);
            let domain = col(4);
            Some(Asset {
                ip: col(1),
                domain: if domain.is_empty() { host.clone() } else { domain },
                host,
                port: col(2),
                title: col(3),
                raw: row.clone(),
                ..Asset::new(Source::Fofa)
            })
        }
        Value::Object(map) => Some(map_object_row(map, row)),
        _ => None,
    }
}

fn map_object_row(map: &Map<String, Value>, row: &Value) -> Asset {
    let field = |k: &str| http::value_text(map.get(k));
    let host = field("host");
    let domain = field("domain");
    Asset {
        ip: field("ip"),
        domain: if domain.is_empty() { host.clone() } else { domain },
        host,
        port: field("port"),
        title: field("title"),
        raw: row.clone(),
        ..Asset::new(Source::Fofa)
    }
}
