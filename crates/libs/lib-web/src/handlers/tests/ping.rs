//! `/ping`, `/health` and fallback behavior.

use super::*;
use serde_json::json;

#[tokio::test]
async fn ping_is_alive_and_stateless() {
    let app = test_app(Behavior::RateLimited);

    for _ in 0..3 {
        let (status, body) = app.get("/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "alive" }));
    }

    assert_eq!(app.model.started(), 0);
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
async fn health_reports_sessions_and_keepalive() {
    let app = test_app(Behavior::Echo);
    app.get("/ask?q=hi&id=u1").await;
    app.get("/ask?q=hi&id=u2").await;
    app.state.keepalive.record_failure();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "fake-model");
    assert_eq!(body["sessions"], 2);
    assert_eq!(body["keepalive"]["failures"], 1);
    assert_eq!(body["keepalive"]["consecutive_failures"], 1);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = test_app(Behavior::Echo);

    let (status, body) = app.get("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}
