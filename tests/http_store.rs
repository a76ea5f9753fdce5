//! Integration tests for the HTTP store against a local fixture server.
//!
//! Each test starts an axum router on an ephemeral port and points an
//! `HttpStore` at it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use opengin_explorer::config::{ApiConfig, Config};
use opengin_explorer::context::Context;
use opengin_explorer::error::AppError;
use opengin_explorer::models::{Entity, MetadataEntry};
use opengin_explorer::services::{
    flatten, DetailView, EntityDetailOrchestrator, SlotErrorKind, SlotStatus, TreeError,
};
use opengin_explorer::store::backends::http::HttpStore;
use opengin_explorer::store::EntityStore;
use opengin_explorer::wire::encode;

type Posted = Arc<Mutex<Vec<(String, Value)>>>;

async fn counts() -> Json<Value> {
    Json(json!({
        "total_count": 4,
        "major_counts": {"Person": 3, "Organisation": 1},
        "minor_counts": {"Person": {"citizen": 3}}
    }))
}

async fn entities(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let echo = format!(
        "{}|{}|{}|{}",
        query.get("major").map(String::as_str).unwrap_or_default(),
        query.get("minor").map(String::as_str).unwrap_or_default(),
        query.get("offset").map(String::as_str).unwrap_or_default(),
        query.get("limit").map(String::as_str).unwrap_or_default(),
    );
    Json(json!({
        "pair": {"major": query.get("major"), "minor": query.get("minor")},
        "count": 1,
        "total": 3,
        "items": [{"id": echo, "name": encode("Ada"), "created": "2020-01-01T00:00:00Z"}]
    }))
}

async fn metadata(Path(id): Path<String>) -> Result<String, StatusCode> {
    if id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    // Written by hand so key order is not sorted by the JSON map
    Ok(format!(
        r#"{{"zeta":{},"alpha":{},"plain":"text","entity":{}}}"#,
        Value::String(encode("z")),
        Value::String(encode("a")),
        Value::String(id),
    ))
}

async fn save_metadata(
    State(posted): State<Posted>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    posted.lock().unwrap().push((id, body));
    StatusCode::CREATED
}

async fn relations(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "broken" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    if id == "nothing" {
        return Ok(Json(Value::Null));
    }
    Ok(Json(json!([
        {"body": [
            {"id": "r1", "name": encode("Minister"), "kind": {"major": "Organisation", "minor": "minister"}},
            {"id": "r2", "terminated": "2022-05-01T00:00:00Z"}
        ]},
        {"body": []},
        {"body": [{"id": "r3", "direction": "OUTGOING"}]}
    ])))
}

async fn category_tree(Path(id): Path<String>) -> String {
    if id == "garbled" {
        return "<html>not json</html>".to_string();
    }
    if let Some(depth) = id.strip_prefix("chain-").and_then(|d| d.parse().ok()) {
        return chain_json(depth);
    }
    json!([
        {
            "entityId": id,
            "name": encode("Root"),
            "startTime": "2019-01-01T00:00:00Z",
            "children": [
                {"relatedEntityId": "child", "name": "Child", "attributes": [{"entityId": "attr"}]}
            ]
        }
    ])
    .to_string()
}

/// A single root with `depth` nodes nested through `children`.
fn chain_json(depth: usize) -> String {
    let mut json = String::from("[");
    for i in 0..depth {
        json.push_str(&format!(r#"{{"entityId":"n{}","children":["#, i));
    }
    json.push_str(&"]}".repeat(depth));
    json.push(']');
    json
}

async fn spawn_server() -> (SocketAddr, Posted) {
    let posted: Posted = Arc::default();
    let app = Router::new()
        .route("/counts", get(counts))
        .route("/entities", get(entities))
        .route("/entities/:id/metadata", get(metadata).post(save_metadata))
        .route("/entities/:id/relations", get(relations))
        .route("/entities/:id/categories/tree", get(category_tree))
        .with_state(Arc::clone(&posted));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, posted)
}

fn store_for(base_url: String) -> HttpStore {
    HttpStore::new(&ApiConfig {
        base_url,
        timeout_secs: 5,
        counts_path: "counts".to_string(),
    })
    .unwrap()
}

async fn fixture() -> (HttpStore, Posted) {
    let (addr, posted) = spawn_server().await;
    (store_for(format!("http://{}", addr)), posted)
}

#[tokio::test]
async fn test_fetch_counts() {
    let (store, _) = fixture().await;
    let counts = store.fetch_counts().await.unwrap();
    assert_eq!(counts.total_count, 4);
    assert_eq!(counts.major_counts["Person"], 3);
    assert_eq!(counts.minor_counts["Person"]["citizen"], 3);
}

#[tokio::test]
async fn test_fetch_entities_encodes_query() {
    let (store, _) = fixture().await;
    let page = store
        .fetch_entities("Person", "cabinet member", 50, 25)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.pair.minor, "cabinet member");
    assert_eq!(page.items[0].id, "Person|cabinet member|50|25");
    assert_eq!(page.items[0].name.text(), "Ada");
}

#[tokio::test]
async fn test_fetch_metadata_keeps_server_order() {
    let (store, _) = fixture().await;
    let map = store.fetch_metadata("e 1/x").await.unwrap();

    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "plain", "entity"]);
    assert_eq!(map.get("zeta").unwrap().text(), "z");
    assert_eq!(map.get("plain").unwrap().text(), "text");
    // The id travelled as a single path segment
    assert_eq!(map.get("entity").unwrap().text(), "e 1/x");
}

#[tokio::test]
async fn test_save_metadata_posts_single_key_objects() {
    let (store, posted) = fixture().await;
    let entries = vec![MetadataEntry::new("a", "1"), MetadataEntry::new("b", "2")];
    store.save_metadata("e1", &entries).await.unwrap();

    let posted = posted.lock().unwrap().clone();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, "e1");
    assert_eq!(posted[0].1, json!([{"a": "1"}, {"b": "2"}]));
}

#[tokio::test]
async fn test_fetch_relations_flattens_in_order() {
    let (store, _) = fixture().await;
    let relations = flatten(store.fetch_relations("e1").await.unwrap());

    let ids: Vec<&str> = relations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
    assert_eq!(relations[0].name.text(), "Minister");
    assert_eq!(relations[0].kind.to_string(), "Organisation - minister");
    assert_eq!(relations[2].direction.as_deref(), Some("OUTGOING"));
}

#[tokio::test]
async fn test_fetch_category_tree() {
    let (store, _) = fixture().await;
    let roots = store.fetch_category_tree("org").await.unwrap();

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id(), Some("org"));
    assert_eq!(roots[0].name.text(), "Root");
    let child = &roots[0].children[0];
    assert_eq!(child.id(), Some("child"));
    assert_eq!(child.attributes[0].id(), Some("attr"));
}

#[tokio::test]
async fn test_null_body_reads_as_empty() {
    let (store, _) = fixture().await;
    let relations = flatten(store.fetch_relations("nothing").await.unwrap());
    assert!(relations.is_empty());
}

#[tokio::test]
async fn test_deep_tree_parses_past_json_nesting_limit() {
    let (store, _) = fixture().await;
    let roots = store.fetch_category_tree("chain-1000").await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id(), Some("n0"));
}

async fn show_tree(id: &str) -> DetailView {
    let (addr, _) = spawn_server().await;
    let mut config = Config::default();
    config.api.base_url = format!("http://{}", addr);
    let ctx = Context::from_config(config).unwrap();

    let orchestrator = EntityDetailOrchestrator::new(&ctx);
    orchestrator.select(Entity::with_id(id)).await.settled().await;
    orchestrator.view().await
}

#[tokio::test]
async fn test_tree_within_default_depth_bound_is_ready() {
    for depth in [63, 64] {
        let view = show_tree(&format!("chain-{}", depth)).await;
        let categories = view.categories.data().unwrap();
        assert_eq!(categories.rows.len(), depth);
        assert_eq!(categories.rows.last().unwrap().depth, depth - 1);
    }
}

#[tokio::test]
async fn test_tree_beyond_depth_bound_is_structural() {
    for depth in [65, 1000] {
        let view = show_tree(&format!("chain-{}", depth)).await;
        assert_eq!(view.categories.status(), SlotStatus::Error);
        let error = view.categories.error().unwrap();
        assert_eq!(error.kind, SlotErrorKind::Structural);
        let expected = TreeError::TooDeep {
            max_depth: 64,
            node: "n64".to_string(),
        };
        assert!(error.message.contains(&expected.to_string()));
    }
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (store, _) = fixture().await;

    let err = store.fetch_relations("broken").await.unwrap_err();
    assert!(err.is_network());
    assert!(matches!(err, AppError::Status { status: 500, .. }));

    let err = store.fetch_metadata("missing").await.unwrap_err();
    assert!(matches!(err, AppError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_undecodable_body_is_payload_error() {
    let (store, _) = fixture().await;
    let err = store.fetch_category_tree("garbled").await.unwrap_err();
    assert!(err.is_network());
    assert!(matches!(err, AppError::Payload { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = store_for(format!("http://{}", addr));
    let err = store.fetch_counts().await.unwrap_err();
    assert!(err.is_network());
    assert!(matches!(err, AppError::Transport { .. }));
}

#[test]
fn test_invalid_base_url() {
    let result = HttpStore::new(&ApiConfig {
        base_url: "not a url".to_string(),
        ..ApiConfig::default()
    });
    assert!(matches!(result, Err(AppError::InvalidBaseUrl(_))));
}
