//! Shared application state for the Axum server.

use std::sync::Arc;

use serde_json::json;

use ic_advisor::{
    Advisor, GenerativeModel, IntentRouter, RecommendationClient, RecommendationStore, RoomContext,
    SharedEnvironment,
};
use ic_protocol::{
    ApplianceKind, ApplianceSet, EnvironmentSnapshot, IndoorReadings, OutdoorReadings,
    QuestionnaireAnswer, RoomInfo, UserProfile,
};

/// Shared application state, cheap to clone for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Refresh/on-demand cycles over the shared store and environment.
    pub advisor: Advisor,
    /// Chat classification and dispatch.
    pub router: IntentRouter,
}

impl AppState {
    /// Create state with no environment submitted yet.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self::with_environment(model, SharedEnvironment::new())
    }

    /// Create state seeded with the sample room for development / tests.
    pub fn with_sample_data(model: Arc<dyn GenerativeModel>) -> Self {
        Self::with_environment(model, SharedEnvironment::with(sample_context()))
    }

    fn with_environment(model: Arc<dyn GenerativeModel>, environment: SharedEnvironment) -> Self {
        let advisor = Advisor::new(
            RecommendationClient::new(model.clone()),
            RecommendationStore::new(),
            environment,
        );
        let router = IntentRouter::new(model, advisor.clone());
        Self { advisor, router }
    }
}

/// A hot, humid hall with a ceiling fan, one window and one door.
pub fn sample_context() -> RoomContext {
    let questionnaire = [
        ("How comfortable do you currently feel in your environment?", json!(1)),
        ("How would you rate the air quality around you?", json!(1)),
        ("How satisfied are you with the current temperature and humidity?", json!(1)),
    ]
    .into_iter()
    .map(|(question, answer)| QuestionnaireAnswer {
        question: question.to_string(),
        answer,
    })
    .collect();

    RoomContext {
        environment: EnvironmentSnapshot {
            room: RoomInfo {
                room_name: Some("Hall".into()),
                length: Some(20.0),
                width: Some(20.0),
                height: Some(20.0),
                occupancy: Some(2),
                num_doors: Some(1),
                num_windows: Some(1),
            },
            user: UserProfile {
                username: Some("user1".into()),
                age: Some(21),
                gender: Some("Male".into()),
                ethnicity: Some("Indian".into()),
                email: Some("user1@gmail.com".into()),
                health_issues: vec!["asthma".into()],
                questionnaire,
            },
            indoor: Some(IndoorReadings {
                temperature: Some(35.79),
                humidity: Some(77.59),
                pressure: Some(0.0),
                pm1: Some(25.0),
                pm2_5: Some(40.0),
                pm10: Some(40.0),
                co: Some(0.0),
                voc: Some(4.623),
                co2: Some(2000.0),
                timestamp: Some("2025-10-27 18:41:27".into()),
            }),
            outdoor: Some(OutdoorReadings {
                pm10: Some(46.3),
                pm2_5: Some(45.2),
                carbon_monoxide: Some(38.0),
                dust: Some(2.0),
                temperature_2m: Some(21.0),
                relative_humidity_2m: Some(66.0),
                wind_speed_10m: Some(9.5),
                wind_direction_10m: Some(99.0),
                wind_gusts_10m: Some(23.8),
                rain: Some(0.0),
                precipitation: Some(0.0),
                is_day: Some(1),
                timestamp: Some("2025-10-28 12:32:00".into()),
            }),
        },
        capabilities: ApplianceSet::new()
            .with(ApplianceKind::CeilingFan)
            .with(ApplianceKind::Window)
            .with(ApplianceKind::Door),
    }
}
