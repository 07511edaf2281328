//! Hunter adapter.
//!
//! Hunter takes a base64url (unpadded) query in `search` and only accepts
//! a page size of 10. Results live in `data.arr`; logical failures are
//! signalled by a body `code` other than 200.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::{self, Deadline};
use crate::types::{Asset, QueryResultBlock, QueryType, Source};

/// The only page size Hunter accepts.
pub const HUNTER_PAGE_SIZE: u32 = 10;

/// Hunter search adapter.
#[derive(Debug, Clone)]
pub struct HunterEngine {
    client: reqwest::Client,
    config: SearchConfig,
}

impl HunterEngine {
    pub fn new(config: &SearchConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Build the Hunter query string.
    pub fn build_query(query: &str, query_type: QueryType) -> String {
        match query_type {
            QueryType::Ip => format!("ip=\"{query}\""),
            QueryType::Company => format!("company=\"{query}\""),
            QueryType::Domain => format!("domain=\"{query}\""),
        }
    }

    /// Encode a query the way Hunter expects: base64url without padding.
    pub fn encode_search(query: &str) -> String {
        URL_SAFE_NO_PAD.encode(query.as_bytes())
    }

    fn base(&self) -> &str {
        self.config
            .base_url(Source::Hunter)
            .trim_end_matches('/')
    }

    fn key(&self) -> Result<&str, SearchError> {
        self.config
            .hunter
            .key()
            .ok_or(SearchError::MissingCredential(Source::Hunter))
    }
}

impl SourceAdapter for HunterEngine {
    async fn search(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
    ) -> Result<QueryResultBlock, SearchError> {
        let key = self.key()?;
        if size != HUNTER_PAGE_SIZE {
            tracing::debug!(requested = size, "Hunter page size forced to 10");
        }
        let size = HUNTER_PAGE_SIZE;

        let q = Self::build_query(query, query_type);
        tracing::trace!(query = %q, page, "Hunter search");

        let url = format!("{}/search", self.base());
        let params: Vec<(&str, String)> = vec![
            ("api-key", key.to_string()),
            ("search", Self::encode_search(&q)),
            ("page", page.to_string()),
            ("page_size", size.to_string()),
        ];

        let request = self
            .client
            .get(&url)
            .query(&params)
            .timeout(Deadline::Search.duration(&self.config));
        let body = http::send_for_text(Source::Hunter, request).await?;

        let mut block = parse_hunter_response(&body, query, query_type, page, &q)?;
        block.request_url = http::redacted_url(&url, &params, &["api-key"]);
        Ok(block)
    }

    async fn verify_credential(&self) -> Result<(), SearchError> {
        let key = self.key()?;
        let url = format!("{}/userInfo", self.base());
        let request = self
            .client
            .get(&url)
            .query(&[("api-key", key)])
            .timeout(Deadline::Probe.duration(&self.config));
        let body = http::send_for_text(Source::Hunter, request).await?;
        let data = http::parse_json_object(Source::Hunter, &body)?;
        check_code(&data).map(|_| ())
    }

    fn source(&self) -> Source {
        Source::Hunter
    }

    fn has_credential(&self) -> bool {
        self.config.has_credential(Source::Hunter)
    }
}

/// Hunter reports success as `code == 200` in the body.
fn check_code(data: &serde_json::Map<String, Value>) -> Result<(), SearchError> {
    if http::value_count(data.get("code")) == 200 {
        return Ok(());
    }
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("unknown error");
    let lower = message.to_lowercase();
    if lower.contains("page_size") || message.contains("页大小") {
        return Err(SearchError::UpstreamApi(format!(
            "Hunter: {message} (Hunter requires page_size to be 10)"
        )));
    }
    Err(SearchError::UpstreamApi(format!("Hunter: {message}")))
}

/// Parse a Hunter JSON body into a result block.
pub(crate) fn parse_hunter_response(
    body: &str,
    query: &str,
    query_type: QueryType,
    page: u32,
    query_used: &str,
) -> Result<QueryResultBlock, SearchError> {
    let data = http::parse_json_object(Source::Hunter, body)?;
    check_code(&data)?;

    let inner = match data.get("data") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(SearchError::MalformedResponse(format!(
                "Hunter data should be an object, got {}",
                http::json_kind(other)
            )))
        }
    };

    let arr = match inner.and_then(|d| d.get("arr")) {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            return Err(SearchError::MalformedResponse(format!(
                "Hunter data.arr should be an array, got {}",
                http::json_kind(other)
            )))
        }
    };

    let results = arr.iter().filter_map(map_item).collect();
    let total_size = http::value_count(inner.and_then(|d| d.get("total")));
    let tip = inner
        .and_then(|d| d.get("syntax_prompt"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from);

    Ok(QueryResultBlock {
        source: Source::Hunter,
        query: query.to_string(),
        query_type,
        page,
        size: HUNTER_PAGE_SIZE,
        results,
        total_size,
        query_used: query_used.to_string(),
        tip,
        request_url: None,
    })
}

fn map_item(item: &Value) -> Option<Asset> {
    let map = item.as_object()?;
    let field = |k: &str| http::value_text(map.get(k));
    let domain = field("domain");
    let url = field("url");
    let host = if !domain.is_empty() {
        domain.clone()
    } else {
        url_authority(&url).map_or_else(|| url.clone(), str::to_string)
    };

    Some(Asset {
        ip: field("ip"),
        domain,
        host,
        port: field("port"),
        title: field("web_title"),
        company: field("company"),
        raw: item.clone(),
        ..Asset::new(Source::Hunter)
    })
}

/// Extract the authority from a `scheme://authority/...` string.
pub fn url_authority(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split('/').next().unwrap_or(rest);
    (!authority.is_empty()).then_some(authority)
}
