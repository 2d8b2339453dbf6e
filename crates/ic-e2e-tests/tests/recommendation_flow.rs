//! E2E tests for on-demand and refresh-driven recommendations.

mod helpers;

use axum::http::StatusCode;

use helpers::{SCENARIO_A, SCENARIO_B, TestHarness};
use ic_advisor::CycleOutcome;

/// Scenario A: AC + ceiling fan room, valid answer updates the store.
#[tokio::test]
async fn e2e_valid_recommendation_updates_store() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(SCENARIO_A, 1).await;

    let (status, body) = h.recommend(&["AC", "Ceiling Fan"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let rec = &body["recommendation"];
    assert_eq!(rec["AC_MODE"], "COOL");
    assert_eq!(rec["AC_TEMPERATURE"], 23);
    assert_eq!(rec["CEILING_FAN"], 3);
    assert_eq!(rec["RECHECK_AT"], 15);
    assert!(rec.get("WINDOW").is_none());

    let latest = h.latest().await;
    assert_eq!(latest["latest_recommendation"]["id"], rec["id"]);
    assert!(latest["error"].is_null());
    assert_eq!(latest["status"], "idle");
}

/// The request sent to Gemini carries a schema limited to present appliances.
#[tokio::test]
async fn e2e_schema_follows_capabilities() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(SCENARIO_A, 1).await;

    h.recommend(&["AC", "CEILING_FAN"]).await;

    let requests = h.gemini_requests().await;
    assert_eq!(requests.len(), 1);
    let schema = &requests[0]["generationConfig"]["responseSchema"];
    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        required,
        ["reason", "AC_MODE", "AC_TEMPERATURE", "CEILING_FAN", "RECHECK_AT"]
    );

    let prompt = requests[0]["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("`AC_TEMPERATURE`"));
    assert!(!prompt.contains("`WINDOW`"));
    assert!(prompt.contains("asthma"));
}

/// Prose around the JSON object does not change the result.
#[tokio::test]
async fn e2e_prose_wrapped_answer_is_accepted() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(&format!("Sure! Here it is:\n```json\n{SCENARIO_A}\n```"), 1)
        .await;

    let (status, body) = h.recommend(&["AC", "CEILING_FAN"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"]["AC_TEMPERATURE"], 23);
}

/// Scenario B: out-of-range set point keeps the prior recommendation.
#[tokio::test]
async fn e2e_invalid_answer_keeps_previous_recommendation() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(SCENARIO_A, 1).await;
    h.mock_recommendation(SCENARIO_B, 1).await;

    let (status, first) = h.recommend(&["AC", "CEILING_FAN"]).await;
    assert_eq!(status, StatusCode::OK);
    let before = h.latest().await;

    let (status, body) = h.recommend(&["AC", "CEILING_FAN"]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("validation failure"));
    assert!(error.contains("AC_TEMPERATURE"));

    let after = h.latest().await;
    assert_eq!(after["latest_recommendation"]["id"], first["recommendation"]["id"]);
    assert_eq!(after["last_updated"], before["last_updated"]);
    assert!(after["error"].as_str().unwrap().contains("AC_TEMPERATURE"));
}

/// An unknown enum value is rejected.
#[tokio::test]
async fn e2e_unknown_variant_is_rejected() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(&SCENARIO_A.replace("COOL", "TURBO"), 1).await;

    let (status, body) = h.recommend(&["AC", "CEILING_FAN"]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("AC_MODE"));
}

/// A Gemini outage is a transport failure with no stored result.
#[tokio::test]
async fn e2e_upstream_outage_is_transport_failure() {
    let h = TestHarness::empty().await;
    h.mock_failure("responseSchema", 503).await;

    let (status, body) = h.recommend(&["AC"]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("transport failure"));

    let latest = h.latest().await;
    assert!(latest["latest_recommendation"].is_null());
    assert!(latest["error"].as_str().unwrap().contains("503"));
}

/// The refresh cycle evaluates the environment submitted through the API.
#[tokio::test]
async fn e2e_refresh_cycle_uses_submitted_environment() {
    let h = TestHarness::empty().await;
    h.mock_recommendation(SCENARIO_A, 2).await;

    let (status, _) = h.get("/api/v1/environment").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(matches!(h.state.advisor.run_cycle().await, CycleOutcome::Skipped));

    h.recommend(&["AC", "CEILING_FAN"]).await;
    let (status, env) = h.get("/api/v1/environment").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(env["capabilities"]["AC"], true);

    let first = h.latest().await;
    assert!(matches!(h.state.advisor.run_cycle().await, CycleOutcome::Updated(_)));
    let second = h.latest().await;
    assert_ne!(
        second["latest_recommendation"]["id"],
        first["latest_recommendation"]["id"]
    );
    assert_eq!(h.gemini_requests().await.len(), 2);
}

/// Sample room: no AC fields requested or returned.
#[tokio::test]
async fn e2e_sample_room_without_ac() {
    let h = TestHarness::with_sample_data().await;
    h.mock_recommendation(
        r#"{"reason":"humid","CEILING_FAN":5,"WINDOW":"CLOSED","DOOR":"OPEN","RECHECK_AT":30}"#,
        1,
    )
    .await;

    let CycleOutcome::Updated(rec) = h.state.advisor.run_cycle().await else {
        panic!("expected a refreshed recommendation");
    };
    assert!(rec.recommendation.settings.ac_mode.is_none());

    let schema = &h.gemini_requests().await[0]["generationConfig"]["responseSchema"];
    assert!(schema["properties"].get("AC_MODE").is_none());
    assert!(schema["properties"].get("DOOR").is_some());
}
