//! # Handler Tests
//!
//! Drive the full router (middleware included) with a fake model.

mod ping;

use crate::server::{create_router, AppState};
use crate::test_support::{Behavior, CountingModel};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::Config;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Router plus the pieces tests inspect afterwards.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub model: Arc<CountingModel>,
}

pub fn test_app(behavior: Behavior) -> TestApp {
    let model = Arc::new(CountingModel::new(behavior));
    let state = AppState::new(&Config::default(), model.clone());
    TestApp {
        router: create_router(state.clone(), &[]),
        state,
        model,
    }
}

impl TestApp {
    /// Send `GET uri` and return status and JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }
}
