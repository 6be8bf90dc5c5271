//! HTTP API integration tests
//!
//! Drive the router end to end with oneshot requests: status codes, error
//! envelopes, and the worker-facing callback contract.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use facewatch_co::build_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use helpers::{create_test_db, insert_media_raw, test_state};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_module_identity() {
    let (_tmp, pool) = create_test_db().await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["module"], json!("facewatch-co"));
}

#[tokio::test]
async fn media_lookup_returns_full_record_or_404() {
    let (_tmp, pool) = create_test_db().await;
    let id = insert_media_raw(
        &pool,
        "media/a.jpg",
        "photo",
        "queued",
        None,
        "2026-01-01T00:00:00.000Z",
        "2026-01-01T00:00:00.000Z",
    )
    .await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/media/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["type"], json!("photo"));
    assert_eq!(body["status"], json!("queued"));

    let response = app.oneshot(get("/api/media/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn enqueue_pushes_wire_contract_message() {
    let (_tmp, pool) = create_test_db().await;
    let id = insert_media_raw(
        &pool,
        "media/clip.mp4",
        "video",
        "queued",
        None,
        "2026-01-01T00:00:00.000Z",
        "2026-01-01T00:00:00.000Z",
    )
    .await;
    let (state, queue) = test_state(pool);
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/media/{}/enqueue", id),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"queued": true}));

    let messages = queue.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "face");
    let wire: Value = serde_json::from_str(&messages[0].1).unwrap();
    assert_eq!(wire["type"], json!("video"));
    assert_eq!(wire["media_id"], json!(id));
}

#[tokio::test]
async fn callback_validation_error_names_field_path() {
    let (_tmp, pool) = create_test_db().await;
    let id = insert_media_raw(
        &pool,
        "media/clip.mp4",
        "video",
        "queued",
        None,
        "2026-01-01T00:00:00.000Z",
        "2026-01-01T00:00:00.000Z",
    )
    .await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let payload = json!({
        "status": "processed",
        "fps": 30.0,
        "frame_skip": 0,
        "hits": [{
            "frame_index": 0,
            "timestamp_s": 0.0,
            "match": {
                "person_id": 1,
                "bbox": {"top": 1, "right": 2, "bottom": 3}
            }
        }]
    });
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/media/{}/processed", id),
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["field"], json!("hits.0.match.bbox.left"));
}

#[tokio::test]
async fn successful_callback_returns_ok_and_media() {
    let (_tmp, pool) = create_test_db().await;
    let id = insert_media_raw(
        &pool,
        "media/a.jpg",
        "photo",
        "queued",
        None,
        "2026-01-01T00:00:00.000Z",
        "2026-01-01T00:00:00.000Z",
    )
    .await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let payload = json!({
        "status": "processed",
        "detections": [{"person_id": 1, "distance": 0.25}]
    });
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/media/{}/processed", id),
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["media"]["status"], json!("processed"));
    assert_eq!(body["media"]["meta"]["detections"], payload["detections"]);
}

#[tokio::test]
async fn person_detections_404_for_unknown_person() {
    let (_tmp, pool) = create_test_db().await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app
        .oneshot(get("/api/people/77/detections"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn people_listing_includes_combined_totals() {
    let (_tmp, pool) = create_test_db().await;
    let person = facewatch_co::db::people::insert_person(&pool, "Alice", None)
        .await
        .unwrap();
    insert_media_raw(
        &pool,
        "media/one.jpg",
        "photo",
        "processed",
        Some(&format!(r#"{{"detections":[{{"person_id":{}}}]}}"#, person.id)),
        "2026-01-02T00:00:00.000Z",
        "2026-01-02T00:00:00.000Z",
    )
    .await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app.oneshot(get("/api/people")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["data"][0]["name"], json!("Alice"));
    assert_eq!(body["data"][0]["total_detections"], json!(1));
}

#[tokio::test]
async fn rename_rejects_empty_name_and_applies_valid_one() {
    let (_tmp, pool) = create_test_db().await;
    let person = facewatch_co::db::people::insert_person(&pool, "Alice", None)
        .await
        .unwrap();
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/people/{}/name", person.id),
            &json!({"name": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/people/{}/name", person.id),
            &json!({"name": "Alice Smith"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["person"]["name"], json!("Alice Smith"));
}

#[tokio::test]
async fn annotations_drop_unresolvable_people_and_normalize() {
    let (_tmp, pool) = create_test_db().await;
    let person = facewatch_co::db::people::insert_person(&pool, "Alice", None)
        .await
        .unwrap();

    let meta = format!(
        r#"{{
            "width": 640,
            "height": 480,
            "detections": [
                {{"person_id": {}, "distance": 0.4, "bbox": {{"left": 0, "top": 0, "right": 640, "bottom": 480}}}},
                {{"person_id": 999, "distance": 0.2}},
                {{"name": "stranger"}}
            ]
        }}"#,
        person.id
    );
    let id = insert_media_raw(
        &pool,
        "media/a.jpg",
        "photo",
        "processed",
        Some(&meta),
        "2026-01-01T00:00:00.000Z",
        "2026-01-01T00:00:00.000Z",
    )
    .await;
    let (state, _queue) = test_state(pool);
    let app = build_router(state);

    let response = app
        .oneshot(get(&format!("/api/media/{}/annotations", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // Unresolvable person ids (999) and id-less detections are dropped
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["person_id"], json!(person.id));
    assert_eq!(items[0]["label"], json!("Alice"));
    assert_eq!(items[0]["unit"], json!("percent"));
    assert_eq!(items[0]["bbox"]["right"], json!(100.0));
    assert_eq!(items[0]["bbox"]["bottom"], json!(100.0));
}
