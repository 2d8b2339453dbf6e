//! Shared test harness for E2E integration tests.
//!
//! Runs the real HTTP router, advisor core and Gemini client against a
//! `wiremock` stand-in for the `generateContent` endpoint. Classifier, chat
//! and recommendation calls are told apart by their request bodies.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ic_advisor::GeminiClient;
use ic_advisor::config::GeminiConfig;
use ic_api::routes::build_router;
use ic_api::state::AppState;

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Scenario A: AC + ceiling fan room, valid answer.
pub const SCENARIO_A: &str =
    r#"{"reason":"hot","AC_MODE":"COOL","AC_TEMPERATURE":23,"CEILING_FAN":3,"RECHECK_AT":15}"#;

/// Scenario B: same room, set point out of range.
pub const SCENARIO_B: &str =
    r#"{"reason":"hot","AC_MODE":"COOL","AC_TEMPERATURE":35,"CEILING_FAN":3,"RECHECK_AT":15}"#;

/// End-to-end test harness: API router + advisor wired to a mock Gemini.
pub struct TestHarness {
    /// Application state (shared store and environment).
    pub state: AppState,
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
    /// Mock Gemini API.
    pub gemini: MockServer,
}

impl TestHarness {
    /// Harness with no environment submitted.
    pub async fn empty() -> Self {
        let gemini = MockServer::start().await;
        let state = AppState::new(model_for(&gemini));
        Self::from_parts(state, gemini)
    }

    /// Harness seeded with the sample room (ceiling fan, window, door).
    pub async fn with_sample_data() -> Self {
        let gemini = MockServer::start().await;
        let state = AppState::with_sample_data(model_for(&gemini));
        Self::from_parts(state, gemini)
    }

    fn from_parts(state: AppState, gemini: MockServer) -> Self {
        let router = build_router(state.clone());
        Self {
            state,
            router,
            gemini,
        }
    }

    // ── Gemini mocks ────────────────────────────────────────────

    /// Answer classification calls with `token`.
    pub async fn mock_classifier(&self, token: &str) {
        self.mount_text("intent classifier", token, None).await;
    }

    /// Answer chat persona calls with `reply`.
    pub async fn mock_chat(&self, reply: &str) {
        self.mount_text("friendly and knowledgeable", reply, None).await;
    }

    /// Answer the next `times` structured recommendation calls with `reply`.
    pub async fn mock_recommendation(&self, reply: &str, times: u64) {
        self.mount_text("responseSchema", reply, Some(times)).await;
    }

    /// Fail every call whose body contains `marker` with HTTP `status`.
    pub async fn mock_failure(&self, marker: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(status).set_body_string("backend unavailable"))
            .mount(&self.gemini)
            .await;
    }

    async fn mount_text(&self, marker: &str, text: &str, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(text)));
        let mock = match times {
            Some(n) => mock.up_to_n_times(n),
            None => mock,
        };
        mock.mount(&self.gemini).await;
    }

    /// Bodies of every request Gemini received, in order.
    pub async fn gemini_requests(&self) -> Vec<Value> {
        self.gemini
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    // ── HTTP helpers ────────────────────────────────────────────

    /// Send a GET request and return (status, JSON body).
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read_json(response).await
    }

    /// Send a POST request with a JSON body and return (status, JSON body).
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        read_json(response).await
    }

    /// Submit a room with the given appliance list for an on-demand recommendation.
    pub async fn recommend(&self, appliances: &[&str]) -> (StatusCode, Value) {
        self.post(
            "/api/v1/recommendations",
            json!({
                "user": {"name": "user1", "age": 21, "health_issues": ["asthma"]},
                "room": {"room_name": "Hall", "appliances": appliances, "occupancy": 2},
                "indoor": {"activityData": {"data": {"temperature": 35.79, "humidity": 77.59, "co2": 2000}}},
            }),
        )
        .await
    }

    pub async fn chat(&self, message: &str) -> (StatusCode, Value) {
        self.post("/api/v1/chat", json!({ "message": message })).await
    }

    pub async fn latest(&self) -> Value {
        let (status, body) = self.get("/api/v1/recommendations/latest").await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

/// Helper: build a generateContent response body.
pub fn gemini_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn model_for(server: &MockServer) -> Arc<GeminiClient> {
    let client = GeminiClient::new(GeminiConfig {
        api_base: server.uri(),
        api_key: "test-key".into(),
        timeout_secs: 5,
        ..GeminiConfig::default()
    })
    .unwrap();
    Arc::new(client)
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}
