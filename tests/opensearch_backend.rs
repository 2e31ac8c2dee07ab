//! Exercises the REST mapping of `OpenSearchBackend` against a stub engine.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bookshelf::backend::{SearchBackend, WriteResult};
use bookshelf::{ensure_index, EngineError, IndexSchema, MultiMatchQuery, OpenSearchBackend, Provisioned};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Requests seen by the stub, as (description, body)
type Log = Arc<Mutex<Vec<(String, Value)>>>;

async fn info() -> Json<Value> {
    Json(json!({"name": "node-1", "cluster_name": "stub-cluster", "version": {"number": "2.11.0"}}))
}

async fn head_index(Path(index): Path<String>) -> StatusCode {
    if index == "existing" {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn create_index(
    State(log): State<Log>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if index == "racing" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"type": "resource_already_exists_exception"}, "status": 400})),
        );
    }
    log.lock().unwrap().push((format!("create {index}"), body));
    (StatusCode::OK, Json(json!({"acknowledged": true, "index": index})))
}

async fn put_doc(
    State(log): State<Log>,
    Path((index, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let refresh = params.get("refresh").cloned().unwrap_or_default();
    log.lock()
        .unwrap()
        .push((format!("index {index}/{id} refresh={refresh}"), body));
    Json(json!({"_index": index, "_id": id, "_version": 1, "result": "created"}))
}

async fn get_doc(Path((index, id)): Path<(String, String)>) -> impl IntoResponse {
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"_index": index, "_id": id, "found": false})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "_index": index,
            "_id": id,
            "found": true,
            "_source": {"title": "Dune", "author": "Herbert", "year": 1965, "tags": []}
        })),
    )
}

async fn search(State(log): State<Log>, Path(index): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
    if index == "broken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"type": "parsing_exception"}, "status": 400})),
        );
    }
    log.lock().unwrap().push((format!("search {index}"), body));
    (
        StatusCode::OK,
        Json(json!({
            "took": 2,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "hits": [
                    {"_index": index, "_id": "a", "_score": 2.4, "_source": {"title": "Dune", "author": "Herbert"}},
                    {"_index": index, "_id": "b", "_score": 1.2, "_source": {"title": "Other", "author": "Dune"}}
                ]
            }
        })),
    )
}

async fn stub_engine() -> (OpenSearchBackend, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/", get(info))
        .route("/:index", get(head_index).put(create_index))
        .route("/:index/_doc/:id", get(get_doc).put(put_doc))
        .route("/:index/_search", post(search))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = OpenSearchBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    (backend, log)
}

#[tokio::test]
async fn test_cluster_info() {
    let (backend, _) = stub_engine().await;
    let info = backend.cluster_info().await.unwrap();
    assert_eq!(info.cluster_name.as_deref(), Some("stub-cluster"));
}

#[tokio::test]
async fn test_provision_creates_missing_index() {
    let (backend, log) = stub_engine().await;

    let outcome = ensure_index(&backend, "books", &IndexSchema::books()).await.unwrap();
    assert_eq!(outcome, Provisioned::Created);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, "create books");
    assert_eq!(log[0].1, IndexSchema::books().to_body());
}

#[tokio::test]
async fn test_provision_skips_existing_index() {
    let (backend, log) = stub_engine().await;

    let outcome = ensure_index(&backend, "existing", &IndexSchema::books()).await.unwrap();
    assert_eq!(outcome, Provisioned::AlreadyExists);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_index_race_is_success() {
    let (backend, _) = stub_engine().await;
    backend
        .create_index("racing", &IndexSchema::books())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_index_document_requests_refresh() {
    let (backend, log) = stub_engine().await;
    let source = json!({"title": "Dune", "author": "Herbert", "year": null, "tags": []});

    let result = backend
        .index_document("books", "a b", &source)
        .await
        .unwrap();
    assert_eq!(result, WriteResult::Created);

    let log = log.lock().unwrap();
    assert_eq!(log[0].0, "index books/a b refresh=true");
    assert_eq!(log[0].1, source);
}

#[tokio::test]
async fn test_get_document() {
    let (backend, _) = stub_engine().await;

    let found = backend.get_document("books", "X").await.unwrap().unwrap();
    assert_eq!(found.id, "X");
    assert_eq!(found.source["title"], "Dune");

    assert!(backend.get_document("books", "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_sends_multi_match() {
    let (backend, log) = stub_engine().await;

    let hits = backend
        .search("books", &MultiMatchQuery::books("dune", 2))
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[0].score, Some(2.4));

    let log = log.lock().unwrap();
    assert_eq!(log[0].0, "search books");
    assert_eq!(
        log[0].1,
        json!({"size": 2, "query": {"multi_match": {"query": "dune", "fields": ["title^2", "author"]}}})
    );
}

#[tokio::test]
async fn test_engine_error_status() {
    let (backend, _) = stub_engine().await;

    let err = backend
        .search("broken", &MultiMatchQuery::books("dune", 5))
        .await
        .unwrap_err();
    let EngineError::Status { status, body } = err else {
        panic!("expected status error, got {err:?}");
    };
    assert_eq!(status, 400);
    assert!(body.contains("parsing_exception"), "{body}");
}

#[tokio::test]
async fn test_truncated_error_body_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort")
            .await
            .unwrap();
    });

    let backend = OpenSearchBackend::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = backend.cluster_info().await.unwrap_err();
    let EngineError::Status { status, body } = err else {
        panic!("expected status error, got {err:?}");
    };
    assert_eq!(status, 500);
    assert!(body.starts_with("<unreadable body:"), "{body}");
}

#[tokio::test]
async fn test_unreachable_engine() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = OpenSearchBackend::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = backend.cluster_info().await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
}
