//! Integration tests for stretto-sync API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Session note and repertoire creation (201, 400, 409)
//! - Practice-log upsert, plain insert and the aggregated day view
//! - Store-then-mirror sync (200, 202, skipped mirror)
//! - Reconcile-only sync (200, 404)

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use stretto_common::db::{MemoryNoteStore, NoteStore};
use stretto_sync::notion::{ContentBlock, DocumentApi, FakeDocumentApi, FakeOp};
use stretto_sync::{build_router, AppState};
use tower::util::ServiceExt; // for `oneshot` method

struct Harness {
    store: Arc<MemoryNoteStore>,
    documents: Arc<FakeDocumentApi>,
    app: axum::Router,
}

/// Test helper: app with in-memory store and document API
fn setup() -> Harness {
    let store = Arc::new(MemoryNoteStore::new());
    let documents = Arc::new(FakeDocumentApi::new());
    let state = AppState::new(
        store.clone() as Arc<dyn NoteStore>,
        Some(documents.clone() as Arc<dyn DocumentApi>),
    );
    Harness {
        store,
        documents,
        app: build_router(state),
    }
}

/// Test helper: app with mirroring disabled
fn setup_without_documents() -> (Arc<MemoryNoteStore>, axum::Router) {
    let store = Arc::new(MemoryNoteStore::new());
    let state = AppState::new(store.clone() as Arc<dyn NoteStore>, None);
    (store, build_router(state))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

/// Test helper: send a request and return status plus JSON body
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

fn practice_log(note_id: &str, time: &str) -> Value {
    json!({
        "note_id": note_id,
        "piece_id": "chop_op18",
        "date": "2025-06-24",
        "time": time,
        "duration_minutes": 30,
        "composer": "Chopin",
        "entries": [{
            "focus": { "section": "Intro", "measures": "m.1-8" },
            "content": format!("Session {}", note_id),
            "tags": ["tempo", "pedal"],
            "teacher_questions": ["How much rubato?"]
        }]
    })
}

fn session_note() -> Value {
    json!({
        "rep_id": "chop_op18",
        "timestamp": "2025-06-24T10:00:00.000Z",
        "duration": 30,
        "raw_content": "Worked the opening fanfare",
        "entries": [{ "content": "Why does the left hand rush?", "type": "question" }]
    })
}

fn repertoire() -> Value {
    json!({
        "rep_id": "chop_op18",
        "name": "Grande Valse Brillante in E-flat major, Op. 18",
        "display_name": "Chopin Op. 18"
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let h = setup();
    let (status, body) = send(&h.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "stretto-sync");
}

// =============================================================================
// Session notes and repertoire
// =============================================================================

#[tokio::test]
async fn test_create_note() {
    let h = setup();
    let (status, body) = send(&h.app, post_json("/notes", &session_note())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert!(body["id"].as_str().is_some());

    let notes = h.store.notes();
    assert_eq!(notes.len(), 1);
    let document = &notes[0].2;
    assert_eq!(document["exercise_ids"], json!([]));
    assert!(document["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_create_note_accepts_string_wrapped_body() {
    let h = setup();
    let wrapped = Value::String(session_note().to_string());
    let (status, _) = send(&h.app, post_json("/notes", &wrapped)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_note_validation_failure() {
    let h = setup();
    let mut note = session_note();
    note["duration"] = json!(0);
    note["entries"][0]["type"] = json!("rant");

    let (status, body) = send(&h.app, post_json("/notes", &note)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"duration"));
    assert!(fields.contains(&"entries.0.type"));
    assert!(h.store.notes().is_empty());
}

#[tokio::test]
async fn test_create_note_store_failure() {
    let h = setup();
    h.store.set_failure(Some("connection refused"));

    let (status, body) = send(&h.app, post_json("/notes", &session_note())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create note");
}

#[tokio::test]
async fn test_create_repertoire_and_conflict() {
    let h = setup();

    let (status, body) = send(&h.app, post_json("/repertoire", &repertoire())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rep_id"], "chop_op18");

    let stored = h.store.find_repertoire("chop_op18").await.unwrap().unwrap();
    assert_eq!(stored["importance"], "active");
    assert_eq!(stored["status"], "learning");

    let (status, body) = send(&h.app, post_json("/repertoire", &repertoire())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Repertoire with rep_id 'chop_op18' already exists");
}

// =============================================================================
// Practice logs
// =============================================================================

#[tokio::test]
async fn test_invalid_json_rejected() {
    let h = setup();
    let (status, body) = send(&h.app, post_raw("/practice-logs", "{\"piece_id\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON in request body");
}

#[tokio::test]
async fn test_upsert_practice_log() {
    let h = setup();

    let (status, body) = send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note processed in store");
    assert_eq!(body["store"], json!({ "note_id": "a", "matched": 0, "upserted": 1 }));
    assert_eq!(body["note"]["piece_id"], "chop_op18");

    let (_, body) = send(&h.app, post_json("/practice-logs", &practice_log("a", "10:15"))).await;
    assert_eq!(body["store"], json!({ "note_id": "a", "matched": 1, "upserted": 0 }));
    assert_eq!(h.store.logs().len(), 1);
}

#[tokio::test]
async fn test_upsert_requires_note_id() {
    let h = setup();
    let mut log = practice_log("a", "10:00");
    log.as_object_mut().unwrap().remove("note_id");

    let (status, body) = send(&h.app, post_json("/practice-logs", &log)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "note_id");
}

#[tokio::test]
async fn test_upsert_store_failure() {
    let h = setup();
    h.store.set_failure(Some("unreachable"));

    let (status, body) = send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Store operation failed");
    assert!(body["detail"].as_str().unwrap().contains("unreachable"));
}

#[tokio::test]
async fn test_save_practice_note_keeps_duplicates() {
    let h = setup();

    for _ in 0..2 {
        let (status, body) = send(&h.app, post_json("/practice-notes", &practice_log("a", "10:00"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Practice note saved");
    }
    assert_eq!(h.store.logs().len(), 2);

    let (status, body) = send(&h.app, get("/practice-logs/chop_op18/2025-06-24")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_practice_day_view() {
    let h = setup();
    send(&h.app, post_json("/practice-logs", &practice_log("b", "14:30"))).await;
    send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;

    let (status, body) = send(&h.app, get("/practice-logs/chop_op18/2025-06-24")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["notes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["note_id"].as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    let (status, body) = send(&h.app, get("/practice-logs/chop_op18/2025-07-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], json!([]));

    let (status, _) = send(&h.app, get("/practice-logs/chop_op18/June-24")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Store-then-mirror
// =============================================================================

#[tokio::test]
async fn test_sync_creates_page_and_section() {
    let h = setup();

    let (status, body) = send(&h.app, post_json("/practice-logs/sync", &practice_log("a", "10:00"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note stored and mirrored");
    assert_eq!(body["mirror"]["status"], "succeeded");
    assert_eq!(body["mirror"]["page_created"], true);

    let page = h.documents.page_id("chop_op18").expect("page created");
    let props = h.documents.page_properties(&page).unwrap();
    assert_eq!(props["Composer"]["select"]["name"], "Chopin");

    let tree = h.documents.tree(&page);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].plain_text(), "2025-06-24");
}

#[tokio::test]
async fn test_sync_generates_note_id() {
    let h = setup();
    let mut log = practice_log("a", "10:00");
    log.as_object_mut().unwrap().remove("note_id");

    let (status, body) = send(&h.app, post_json("/practice-logs/sync", &log)).await;

    assert_eq!(status, StatusCode::OK);
    let note_id = body["note_id"].as_str().unwrap();
    assert!(!note_id.is_empty());
    assert_eq!(h.store.logs()[0].record.note_id, note_id);
}

#[tokio::test]
async fn test_sync_mirror_failure_is_partial_success() {
    let h = setup();
    h.documents.fail(FakeOp::FindPage);

    let (status, body) = send(&h.app, post_json("/practice-logs/sync", &practice_log("a", "10:00"))).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["note_id"], "a");
    assert_eq!(body["mirror"]["status"], "failed");
    assert!(body["mirror"]["error"].as_str().unwrap().contains("FindPage"));
    assert_eq!(h.store.logs().len(), 1);
}

#[tokio::test]
async fn test_sync_store_failure_skips_mirror() {
    let h = setup();
    h.store.set_failure(Some("down"));

    let (status, _) = send(&h.app, post_json("/practice-logs/sync", &practice_log("a", "10:00"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(h.documents.calls().is_empty());
}

#[tokio::test]
async fn test_sync_without_document_api_is_skipped() {
    let (store, app) = setup_without_documents();

    let (status, body) = send(&app, post_json("/practice-logs/sync", &practice_log("a", "10:00"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mirror"]["status"], "skipped");
    assert_eq!(store.logs().len(), 1);
}

#[tokio::test]
async fn test_invalid_log_rejected_before_remote_calls() {
    let h = setup();
    let cases = [
        json!({ "note_id": "a", "date": "2025-06-24", "entries": [{ "content": "x" }] }),
        json!({ "note_id": "a", "piece_id": "chop_op18", "date": "2025-06-24" }),
        json!({ "note_id": "a", "piece_id": "chop_op18", "date": "2025-06-24", "entries": "x" }),
        json!({ "note_id": "a", "piece_id": "chop_op18", "date": "2025-06-24", "entries": [] }),
    ];

    for payload in cases {
        let (status, body) = send(&h.app, post_json("/practice-logs/sync", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["error"], "Validation failed");
    }
    assert!(h.store.logs().is_empty());
    assert!(h.documents.calls().is_empty());
}

// =============================================================================
// Reconcile-only
// =============================================================================

#[tokio::test]
async fn test_reconcile_two_notes_replaces_prior_section() {
    let h = setup();
    let page = h.documents.add_page("chop_op18");
    h.documents.seed_children(
        &page,
        &[
            ContentBlock::paragraph("Practice journal"),
            ContentBlock::toggle("2025-06-24", vec![ContentBlock::paragraph("stale")]),
        ],
    );
    send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;
    send(&h.app, post_json("/practice-logs", &practice_log("b", "14:30"))).await;

    let (status, body) = send(&h.app, post_raw("/sync/chop_op18/2025-06-24", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_id"], page.as_str());
    assert_eq!(body["notes"], 2);
    assert_eq!(body["evicted"], 1);
    assert_eq!(body["evict_failures"], 0);

    let tree = h.documents.tree(&page);
    let sections: Vec<&ContentBlock> = tree
        .iter()
        .filter(|b| b.kind() == "toggle" && b.plain_text() == "2025-06-24")
        .collect();
    assert_eq!(sections.len(), 1);

    let children = sections[0].children();
    let headers = children.iter().filter(|b| b.kind() == "heading_3").count();
    assert_eq!(headers, 2);
    assert!(children.iter().all(|b| b.plain_text() != "stale"));
    assert!(children.iter().any(|b| b.plain_text() == "Session a"));
    assert!(children.iter().any(|b| b.plain_text() == "Session b"));
}

#[tokio::test]
async fn test_reconcile_without_page_is_not_found() {
    let h = setup();
    send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;

    let (status, body) = send(&h.app, post_raw("/sync/chop_op18/2025-06-24", "")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("chop_op18"));
    assert!(h.documents.page_id("chop_op18").is_none());
}

#[tokio::test]
async fn test_reconcile_remote_failure() {
    let h = setup();
    h.documents.add_page("chop_op18");
    h.documents.fail(FakeOp::ListChildren);
    send(&h.app, post_json("/practice-logs", &practice_log("a", "10:00"))).await;

    let (status, body) = send(&h.app, post_raw("/sync/chop_op18/2025-06-24", "")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Sync failed");
}

#[tokio::test]
async fn test_reconcile_without_document_api() {
    let (_, app) = setup_without_documents();
    let (status, body) = send(&app, post_raw("/sync/chop_op18/2025-06-24", "")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Remote document API not configured");
}

#[tokio::test]
async fn test_reconcile_bad_date_rejected_without_document_api() {
    let (_, app) = setup_without_documents();
    let (status, body) = send(&app, post_raw("/sync/chop_op18/June-24", "")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid date 'June-24'"));
}

#[test]
fn test_fakes_available_through_test_util() {
    assert!(cfg!(feature = "test-util"));
}

