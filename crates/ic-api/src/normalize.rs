//! Raw document normalization.
//!
//! Inbound requests carry the user, room and sensor documents as stored by
//! the upstream backend. These helpers map them onto the typed snapshot.
//! Absent or partial documents give empty values, never errors.

use serde::Deserialize;
use serde_json::{Map, Value};

use ic_advisor::RoomContext;
use ic_protocol::{
    ApplianceKind, ApplianceSet, EnvironmentSnapshot, IndoorReadings, OutdoorReadings,
    QuestionnaireAnswer, RoomInfo, UserProfile,
};

/// Body of `POST /api/v1/recommendations`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub user: Value,
    pub room: Value,
    #[serde(default)]
    pub indoor: Option<Value>,
    #[serde(default)]
    pub outdoor: Option<Value>,
    /// Passed through by the backend; not used for generation.
    #[serde(default)]
    pub meta: Option<Value>,
}

impl RecommendationRequest {
    /// Normalize every document into one room context.
    pub fn into_context(self) -> RoomContext {
        RoomContext {
            environment: EnvironmentSnapshot {
                room: room_info(&self.room),
                user: user_profile(&self.user),
                indoor: self.indoor.as_ref().and_then(indoor_readings),
                outdoor: self.outdoor.as_ref().and_then(outdoor_readings),
            },
            capabilities: appliances(&self.room),
        }
    }
}

/// Non-empty JSON object, or `None`.
fn document(raw: &Value) -> Option<&Map<String, Value>> {
    raw.as_object().filter(|o| !o.is_empty())
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn count(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    match obj.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

/// First letter upper-case, the rest lower-case.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// User document: `name`, `age`, `gender`, `ethnicity`, `email`,
/// `health_issues`, `questionnaire`.
pub fn user_profile(raw: &Value) -> UserProfile {
    let Some(user) = document(raw) else {
        return UserProfile::default();
    };

    let health_issues = user
        .get("health_issues")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let questionnaire = user
        .get("questionnaire")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| QuestionnaireAnswer::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default();

    UserProfile {
        username: text(user, "name"),
        age: count(user, "age"),
        gender: text(user, "gender").map(|g| capitalize(&g)),
        ethnicity: text(user, "ethnicity").map(|e| capitalize(&e)),
        email: text(user, "email"),
        health_issues,
        questionnaire,
    }
}

/// Room document: `room_name`, `room_length`/`room_width`/`room_height`,
/// `occupancy`, `doors`, `windows`.
pub fn room_info(raw: &Value) -> RoomInfo {
    let Some(room) = document(raw) else {
        return RoomInfo::default();
    };
    RoomInfo {
        room_name: text(room, "room_name"),
        length: number(room, "room_length"),
        width: number(room, "room_width"),
        height: number(room, "room_height"),
        occupancy: count(room, "occupancy"),
        num_doors: Some(count(room, "doors").unwrap_or(0)),
        num_windows: Some(count(room, "windows").unwrap_or(0)),
    }
}

/// Appliances named in the room's `appliances` list. Unknown names are
/// ignored; a missing list means no appliances.
pub fn appliances(raw_room: &Value) -> ApplianceSet {
    raw_room
        .get("appliances")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(ApplianceKind::from_key)
                .collect()
        })
        .unwrap_or_default()
}

/// Indoor node document, nested under `activityData.data` or flat.
pub fn indoor_readings(raw: &Value) -> Option<IndoorReadings> {
    let doc = document(raw)?;
    let activity = doc.get("activityData").and_then(Value::as_object).unwrap_or(doc);
    let data = activity.get("data").and_then(Value::as_object).unwrap_or(activity);

    Some(IndoorReadings {
        temperature: number(data, "temperature"),
        humidity: number(data, "humidity"),
        pressure: number(data, "pressure"),
        pm1: number(data, "pm1"),
        pm2_5: number(data, "pm2_5"),
        pm10: number(data, "pm10"),
        co: number(data, "co"),
        voc: number(data, "voc"),
        co2: number(data, "co2"),
        timestamp: text(doc, "timestamp"),
    })
}

/// Outdoor document: air and temperature under `activityData`, wind, rain
/// and daylight under `metaData`.
pub fn outdoor_readings(raw: &Value) -> Option<OutdoorReadings> {
    let doc = document(raw)?;
    let activity = doc.get("activityData").and_then(Value::as_object).unwrap_or(doc);
    let empty = Map::new();
    let meta = doc.get("metaData").and_then(Value::as_object).unwrap_or(&empty);

    Some(OutdoorReadings {
        pm10: number(activity, "pm10"),
        pm2_5: number(activity, "pm2_5"),
        carbon_monoxide: number(activity, "carbon_monoxide"),
        dust: number(activity, "dust"),
        temperature_2m: number(activity, "temperature_2m"),
        relative_humidity_2m: number(activity, "relative_humidity_2m"),
        wind_speed_10m: number(meta, "wind_speed_10m"),
        wind_direction_10m: number(meta, "wind_direction_10m"),
        wind_gusts_10m: number(meta, "wind_gusts_10m"),
        rain: number(meta, "rain"),
        precipitation: number(meta, "precipitation"),
        is_day: count(meta, "is_day").and_then(|n| u8::try_from(n).ok()),
        timestamp: text(doc, "timestamp"),
    })
}
