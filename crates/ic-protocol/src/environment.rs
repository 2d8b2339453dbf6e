use serde::{Deserialize, Serialize};

/// Room geometry and occupancy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    /// Length in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Width in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Number of people in the room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_doors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_windows: Option<u32>,
}

/// One answer from the comfort questionnaire.
///
/// Answers are either a 1–5 rating or free text, so they stay untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireAnswer {
    pub question: String,
    pub answer: serde_json::Value,
}

/// Occupant profile used for health-aware recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Known conditions (e.g. "asthma").
    #[serde(default)]
    pub health_issues: Vec<String>,
    /// Most recent comfort questionnaire answers.
    #[serde(default)]
    pub questionnaire: Vec<QuestionnaireAnswer>,
}

/// Indoor sensor node readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndoorReadings {
    /// Degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm2_5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    /// Parts per million.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    /// Sensor timestamp as reported by the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Outdoor weather and air quality readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutdoorReadings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm2_5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_monoxide: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gusts_10m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    /// 1 during daylight, 0 at night.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Everything one recommendation cycle looks at.
///
/// Indoor and outdoor readings are optional; the prompt omits their
/// sections when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    #[serde(default)]
    pub room: RoomInfo,
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indoor: Option<IndoorReadings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outdoor: Option<OutdoorReadings>,
}
