//! Tests for fetch module

use super::http::extract_records;
use super::*;
use crate::error::Error;
use crate::source::SourceDefinition;
use crate::types::PageRequest;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// VecFetcher Tests
// ============================================================================

#[test]
fn test_vec_fetcher_serves_windows() {
    let fetcher = VecFetcher::new((0..25).collect::<Vec<u32>>());

    let first = tokio_test::block_on(fetcher.fetch(PageRequest::new(10, 0))).unwrap();
    assert_eq!(first, (0..10).collect::<Vec<_>>());

    let last = tokio_test::block_on(fetcher.fetch(PageRequest::new(10, 20))).unwrap();
    assert_eq!(last, vec![20, 21, 22, 23, 24]);

    let past_end = tokio_test::block_on(fetcher.fetch(PageRequest::new(10, 40))).unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_vec_fetcher_records_requests() {
    let fetcher = VecFetcher::new(vec!["a", "b", "c"]);
    assert_eq!(fetcher.len(), 3);

    fetcher.fetch(PageRequest::new(2, 0)).await.unwrap();
    fetcher.fetch(PageRequest::new(2, 2)).await.unwrap();

    assert_eq!(
        fetcher.requests().await,
        vec![PageRequest::new(2, 0), PageRequest::new(2, 2)]
    );
    assert_eq!(fetcher.request_count().await, 2);
}

#[tokio::test]
async fn test_vec_fetcher_fails_once_at_offset() {
    let fetcher = VecFetcher::new((0..6).collect::<Vec<u8>>()).with_failure_at(3);

    assert_eq!(fetcher.fetch(PageRequest::new(3, 0)).await.unwrap().len(), 3);

    let err = fetcher.fetch(PageRequest::new(3, 3)).await.unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));

    let retried = fetcher.fetch(PageRequest::new(3, 3)).await.unwrap();
    assert_eq!(retried, vec![3, 4, 5]);
}

// ============================================================================
// FnFetcher Tests
// ============================================================================

#[tokio::test]
async fn test_fn_fetcher_forwards_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let fetcher = fetch_fn(move |req: PageRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Error>((req.offset..req.end()).collect::<Vec<usize>>()) }
    });

    let page = fetcher.fetch(PageRequest::new(3, 7)).await.unwrap();
    assert_eq!(page, vec![7, 8, 9]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fn_fetcher_propagates_error() {
    let fetcher = fetch_fn(|_req: PageRequest| async {
        Err::<Vec<String>, _>(Error::fetch("backend offline"))
    });

    let err = fetcher.fetch(PageRequest::new(10, 0)).await.unwrap_err();
    assert_eq!(err.to_string(), "Fetch failed: backend offline");
}

#[tokio::test]
async fn test_fn_fetcher_accepts_anyhow_errors() {
    fn parse_row(raw: &str) -> anyhow::Result<Vec<u32>> {
        raw.split(',')
            .map(|cell| cell.trim().parse::<u32>().map_err(anyhow::Error::from))
            .collect()
    }

    let fetcher = fetch_fn(|req: PageRequest| async move {
        let raw = if req.offset == 0 { "1, 2, 3" } else { "4, x" };
        Ok::<_, Error>(parse_row(raw)?)
    });

    let page = fetcher.fetch(PageRequest::new(3, 0)).await.unwrap();
    assert_eq!(page, vec![1, 2, 3]);

    let err = fetcher.fetch(PageRequest::new(3, 3)).await.unwrap_err();
    assert!(matches!(err, Error::Anyhow(_)));
    assert_eq!(err.to_string(), "invalid digit found in string");
}

#[tokio::test]
async fn test_arc_fetcher_delegates() {
    let inner = Arc::new(VecFetcher::new(vec![1, 2, 3]));
    let shared: Arc<dyn PageFetcher<i32>> = inner.clone();

    let page = shared.fetch(PageRequest::new(2, 1)).await.unwrap();
    assert_eq!(page, vec![2, 3]);
    assert_eq!(inner.request_count().await, 1);
}

// ============================================================================
// Record Extraction Tests
// ============================================================================

#[test]
fn test_extract_records_root_array() {
    let body = json!([{"id": 1}, {"id": 2}]);
    assert_eq!(extract_records(&body, "").unwrap().len(), 2);
}

#[test]
fn test_extract_records_nested_path() {
    let body = json!({"data": {"items": [{"id": 1}]}});
    assert_eq!(extract_records(&body, "data.items").unwrap().len(), 1);
    assert_eq!(extract_records(&body, "$.data.items").unwrap().len(), 1);
}

#[test]
fn test_extract_records_null_is_empty_page() {
    let body = json!({"data": null});
    assert!(extract_records(&body, "data").unwrap().is_empty());
}

#[test]
fn test_extract_records_errors() {
    let body = json!({"data": {"count": 3}});

    let err = extract_records(&body, "data.items").unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));

    let err = extract_records(&body, "data.count").unwrap_err();
    assert!(err.to_string().contains("expected an array, found number"));

    let err = extract_records(&body, "data.count.value").unwrap_err();
    assert!(err.to_string().contains("cannot descend into 'value'"));
}

// ============================================================================
// HttpFetcher Tests
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
}

#[tokio::test]
async fn test_http_fetcher_sends_paging_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 21, "name": "Alice"},
            {"id": 22, "name": "Bob"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&format!("{}/api/users", mock_server.uri())).unwrap();
    let users: Vec<User> = fetcher.fetch(PageRequest::new(10, 20)).await.unwrap();

    assert_eq!(
        users,
        vec![
            User {
                id: 21,
                name: "Alice".to_string()
            },
            User {
                id: 22,
                name: "Bob".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_http_fetcher_from_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/items"))
        .and(query_param("skip", "0"))
        .and(query_param("take", "5"))
        .and(query_param("sort", "asc"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"items": [{"id": 1}, {"id": 2}]}})),
        )
        .mount(&mock_server)
        .await;

    let mut def = SourceDefinition::new("items", mock_server.uri());
    def.path = "/v1/items".to_string();
    def.offset_param = "skip".to_string();
    def.limit_param = "take".to_string();
    def.records_path = "data.items".to_string();
    def.params.insert("sort".to_string(), "asc".to_string());
    def.headers
        .insert("Authorization".to_string(), "Bearer secret".to_string());

    let fetcher = HttpFetcher::from_source(&def).unwrap();
    let records = fetcher.fetch_values(PageRequest::new(5, 0)).await.unwrap();

    assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2})]);
}

#[tokio::test]
async fn test_http_fetcher_maps_status_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&mock_server.uri()).unwrap();
    let err = fetcher
        .fetch_values(PageRequest::new(10, 0))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, ref body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_fetcher_rejects_undecodable_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "not-a-number"}])))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&mock_server.uri()).unwrap();
    let result: crate::Result<Vec<User>> = fetcher.fetch(PageRequest::new(10, 0)).await;

    assert!(matches!(result, Err(Error::JsonParse(_))));
}

#[test]
fn test_http_fetcher_rejects_invalid_url() {
    let err = HttpFetcher::new("not a url").unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}
