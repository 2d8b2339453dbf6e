//! E2E tests for store freshness as seen through the API.

mod helpers;

use axum::http::StatusCode;

use helpers::{SCENARIO_A, TestHarness};

/// empty → never succeeded → fresh → stale → fresh.
#[tokio::test]
async fn e2e_freshness_transitions() {
    let h = TestHarness::with_sample_data().await;
    let fan = r#"{"reason":"humid","CEILING_FAN":4,"WINDOW":"OPEN","DOOR":"CLOSED","RECHECK_AT":15}"#;

    // Mocks are matched in mount order; each limited one is used up in turn.
    h.mock_recommendation("no json here", 1).await;
    h.mock_recommendation(fan, 1).await;
    h.mock_recommendation("{\"reason\": \"truncated\"", 1).await;
    h.mock_recommendation(fan, 1).await;

    let (_, health) = h.get("/health").await;
    assert_eq!(health["freshness"], "empty");

    h.state.advisor.run_cycle().await;
    let (_, health) = h.get("/health").await;
    assert_eq!(health["freshness"], "never_succeeded");
    assert!(h.latest().await["error"].as_str().unwrap().starts_with("parse failure"));

    h.state.advisor.run_cycle().await;
    let (_, health) = h.get("/health").await;
    assert_eq!(health["freshness"], "fresh");
    let good = h.latest().await;

    h.state.advisor.run_cycle().await;
    let (_, health) = h.get("/health").await;
    assert_eq!(health["freshness"], "stale");
    let stale = h.latest().await;
    assert_eq!(stale["latest_recommendation"], good["latest_recommendation"]);
    assert_eq!(stale["last_updated"], good["last_updated"]);

    h.state.advisor.run_cycle().await;
    let (_, health) = h.get("/health").await;
    assert_eq!(health["freshness"], "fresh");
    assert!(h.latest().await["error"].is_null());
}

/// Readers get a response while an on-demand cycle waits on the model.
#[tokio::test]
async fn e2e_reads_proceed_during_slow_cycle() {
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, ResponseTemplate};

    let h = TestHarness::empty().await;
    Mock::given(method("POST"))
        .and(body_string_contains("responseSchema"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(helpers::gemini_response(SCENARIO_A))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&h.gemini)
        .await;

    let pending = {
        let router = h.router.clone();
        tokio::spawn(async move {
            use axum::body::Body;
            use axum::http::Request;
            use tower::ServiceExt;

            let body = serde_json::json!({"user": {}, "room": {"appliances": ["AC", "CEILING_FAN"]}});
            router
                .oneshot(
                    Request::post("/api/v1/recommendations")
                        .header("content-type", "application/json")
                        .body(Body::from(serde_json::to_vec(&body).unwrap()))
                        .unwrap(),
                )
                .await
                .unwrap()
                .status()
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let during = h.latest().await;
    assert_eq!(during["status"], "generating");
    assert!(during["latest_recommendation"].is_null());

    assert_eq!(pending.await.unwrap(), StatusCode::OK);
    let after = h.latest().await;
    assert_eq!(after["status"], "idle");
    assert_eq!(after["latest_recommendation"]["CEILING_FAN"], 3);
}
