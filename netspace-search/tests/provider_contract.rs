//! Provider contract tests.
//!
//! Verify the exact HTTP request each adapter sends and how provider
//! responses and error statuses are mapped, against wiremock servers.

use std::time::Duration;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use netspace_search::engine::SourceAdapter;
use netspace_search::{Adapter, QueryType, SearchConfig, SearchError, Source, SourceCredentials};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(source: Source, base_url: String) -> Adapter {
    let mut config = SearchConfig::default();
    *config.credentials_mut(source) = SourceCredentials::default()
        .with_api_key("test-key")
        .with_base_url(base_url);
    let client = netspace_search::http::build_client(&config).expect("client");
    Adapter::new(source, &config, client)
}

// ────────────────────────────────────────────────────────────────────────────
// FOFA
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fofa_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search/all"))
        .and(query_param("key", "test-key"))
        .and(query_param("qbase64", STANDARD.encode("host=\"example.com\"")))
        .and(query_param("page", "2"))
        .and(query_param("size", "50"))
        .and(query_param("fields", "host,ip,port,title,domain"))
        .and(query_param("r_type", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "size": 1,
            "query": "host=\"example.com\"",
            "results": [["https://www.example.com", "93.184.216.34", "443", "Example", ""]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Fofa, mock_server.uri());
    let block = adapter
        .search("example.com", QueryType::Domain, 2, 50)
        .await
        .expect("search should succeed");

    assert_eq!(block.results.len(), 1);
    assert_eq!(block.results[0].domain, "https://www.example.com");
    let url = block.request_url.expect("request url");
    assert!(!url.contains("test-key"), "credential leaked: {url}");
}

#[tokio::test]
async fn fofa_ip_query_is_unquoted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("qbase64", STANDARD.encode("ip=1.1.1.1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"size": 0, "results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Fofa, mock_server.uri());
    let block = adapter
        .search("1.1.1.1", QueryType::Ip, 1, 100)
        .await
        .expect("search should succeed");
    assert_eq!(block.query_used, "ip=1.1.1.1");
}

#[tokio::test]
async fn fofa_company_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Fofa, mock_server.uri());
    let err = adapter
        .search("ACME", QueryType::Company, 1, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::UnsupportedQueryType { .. }));
}

// ────────────────────────────────────────────────────────────────────────────
// Hunter
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hunter_always_sends_page_size_10() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api-key", "test-key"))
        .and(query_param("search", URL_SAFE_NO_PAD.encode("domain=\"example.com\"")))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "success",
            "data": {"total": 1, "arr": [{"ip": "1.2.3.4", "domain": "www.example.com", "port": 443}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Hunter, mock_server.uri());
    let block = adapter
        .search("example.com", QueryType::Domain, 1, 100)
        .await
        .expect("search should succeed");

    assert_eq!(block.size, 10);
    assert_eq!(block.results[0].port, "443");
}

#[tokio::test]
async fn hunter_company_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("search", URL_SAFE_NO_PAD.encode("company=\"ACME\"")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"total": 0, "arr": null}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Hunter, mock_server.uri());
    let block = adapter
        .search("ACME", QueryType::Company, 1, 10)
        .await
        .expect("search should succeed");
    assert!(block.results.is_empty());
}

#[tokio::test]
async fn hunter_probe_uses_user_info() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userInfo"))
        .and(query_param("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"rest_free_point": 100}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Hunter, mock_server.uri());
    adapter.verify_credential().await.expect("probe should succeed");
}

// ────────────────────────────────────────────────────────────────────────────
// Quake
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn quake_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/search/quake_service"))
        .and(header("X-QuakeToken", "test-key"))
        .and(body_partial_json(json!({
            "query": "ip:\"1.1.1.1\"",
            "start": 20,
            "size": 20,
            "latest": true,
            "ignore_cache": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "Successful.",
            "data": [{"ip": "1.1.1.1", "port": 53, "hostname": "one.one.one.one", "org": "Cloudflare"}],
            "meta": {"pagination": {"total": 21}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Quake, mock_server.uri());
    let block = adapter
        .search("1.1.1.1", QueryType::Ip, 2, 20)
        .await
        .expect("search should succeed");

    assert_eq!(block.total_size, 21);
    assert_eq!(block.results[0].company, "Cloudflare");
    assert_eq!(block.results[0].host, "one.one.one.one");
    let url = block.request_url.expect("request url");
    assert!(url.ends_with("/api/v3/search/quake_service"));
}

#[tokio::test]
async fn quake_probe_checks_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user/info"))
        .and(header("X-QuakeToken", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "u3004",
            "message": "token invalid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Quake, mock_server.uri());
    let err = adapter.verify_credential().await.unwrap_err();
    assert!(matches!(err, SearchError::UpstreamApi(_)));
    assert!(err.to_string().contains("token invalid"));
}

// ────────────────────────────────────────────────────────────────────────────
// Error mapping
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_maps_to_credential_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api-key"))
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Hunter, mock_server.uri());
    let err = adapter
        .search("example.com", QueryType::Domain, 1, 10)
        .await
        .unwrap_err();
    assert!(err.is_credential_rejection());
    assert!(matches!(err, SearchError::UpstreamHttp { status: 401, .. }));
}

#[tokio::test]
async fn html_body_maps_to_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let adapter = adapter_for(Source::Quake, mock_server.uri());
    let err = adapter
        .search("example.com", QueryType::Domain, 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn slow_probe_maps_to_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userInfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = SearchConfig {
        probe_timeout_seconds: 1,
        ..Default::default()
    };
    config.hunter = SourceCredentials::default()
        .with_api_key("test-key")
        .with_base_url(mock_server.uri());
    let client = netspace_search::http::build_client(&config).expect("client");
    let adapter = Adapter::new(Source::Hunter, &config, client);

    let err = adapter.verify_credential().await.unwrap_err();
    assert!(matches!(err, SearchError::Timeout(_)), "got {err:?}");
}
