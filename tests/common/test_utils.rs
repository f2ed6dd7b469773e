use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use grounded_sam_gateway::{
    scoring::{Scorer, ScoringPool},
    server::{AppState, router},
};
use serde_json::Value;
use std::sync::Arc;

/// A 1x1 transparent PNG, base64 encoded
pub const ONE_PIXEL_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub const TEST_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Build the router around an initialized pool
pub async fn create_test_app(scorer: Arc<dyn Scorer>) -> Router {
    let pool = ScoringPool::new(scorer, 2, None);
    pool.initialize().await.expect("mock scorer init failed");
    router(AppState { pool: Arc::new(pool) }, TEST_BODY_LIMIT)
}

/// Build the router without loading models
pub fn create_uninitialized_app(scorer: Arc<dyn Scorer>) -> Router {
    let pool = ScoringPool::new(scorer, 1, None);
    router(AppState { pool: Arc::new(pool) }, TEST_BODY_LIMIT)
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
