//! Prompt composer for recommendation requests.
//!
//! Pure function of its inputs. The constraint lines walk the appliance set
//! through [`schema::appliance_fields`], the same table `build_schema` uses,
//! and the example output walks the contract itself.

use std::fmt::Display;

use ic_protocol::{
    ApplianceSet, EnvironmentSnapshot, IndoorReadings, OutdoorReadings, RoomInfo, UserProfile,
};

use crate::schema::{self, FieldDescriptor, FieldKind, RecommendationContract};

const ROLE: &str = "\
You are an advanced Indoor Environmental Comfort & Air Quality AI Assistant.
Your goal is to provide personalized appliance recommendations that optimize
comfort, air quality, and energy efficiency based on indoor and outdoor
conditions, user feedback, and room configuration.";

const GOALS: &str = "\
### GOAL
Analyze all the data above and recommend appliance settings that:
1. Improve thermal comfort (temperature and humidity balance, air movement).
2. Maintain healthy indoor air quality (minimize CO2, VOC, PM2.5 and PM10).
3. Respect the user's health conditions (e.g. asthma: avoid dust and VOC exposure).
4. Respond to outdoor conditions (e.g. keep windows closed when outdoor air is poor).
5. Optimize energy use without compromising comfort.";

/// Render the full recommendation prompt.
pub fn compose(
    environment: &EnvironmentSnapshot,
    capabilities: &ApplianceSet,
    contract: &RecommendationContract,
) -> String {
    let mut sections = vec![ROLE.to_string()];

    if let Some(room) = room_section(&environment.room, capabilities) {
        sections.push(room);
    }
    if let Some(user) = user_section(&environment.user) {
        sections.push(user);
    }
    if let Some(indoor) = environment.indoor.as_ref().and_then(indoor_section) {
        sections.push(indoor);
    }
    if let Some(outdoor) = environment.outdoor.as_ref().and_then(outdoor_section) {
        sections.push(outdoor);
    }

    sections.push(GOALS.to_string());
    sections.push(constraints_section(capabilities));
    sections.push(format!(
        "### OUTPUT FORMAT\nReturn only a valid JSON object with exactly these keys:\n{}",
        example_output(contract)
    ));

    sections.join("\n\n---\n\n")
}

/// Constraint line for one field, e.g. ``- `CEILING_FAN`: integer between 0 and 5 (ceiling fan speed step)``.
///
/// Free-text fields carry no constraint and return `None`.
pub fn constraint_line(field: &FieldDescriptor) -> Option<String> {
    let rule = match field.kind {
        FieldKind::Text => return None,
        FieldKind::Integer { min, max: Some(max) } => format!("integer between {min} and {max}"),
        FieldKind::Integer { min, max: None } => format!("integer of at least {min}"),
        FieldKind::Choice(allowed) => {
            let quoted: Vec<String> = allowed.iter().map(|v| format!("'{v}'")).collect();
            format!("one of {}", quoted.join(", "))
        }
    };
    Some(format!("- `{}`: {rule} ({})", field.name, field.description))
}

fn constraints_section(capabilities: &ApplianceSet) -> String {
    let mut lines = vec![
        "### CONSTRAINTS".to_string(),
        "Stay strictly within these valid ranges and allowed values:".to_string(),
    ];
    for kind in capabilities.iter() {
        lines.extend(schema::appliance_fields(kind).iter().filter_map(constraint_line));
    }
    lines.extend(constraint_line(&schema::RECHECK_AT));
    lines.push("Do not include settings for any appliance not listed above.".to_string());
    lines.join("\n")
}

/// Example JSON object whose keys are exactly the contract's, in order.
pub fn example_output(contract: &RecommendationContract) -> String {
    let lines: Vec<String> = contract
        .fields()
        .iter()
        .map(|f| format!("  \"{}\": {}", f.name, f.example))
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn push_line<T: Display>(lines: &mut Vec<String>, label: &str, value: Option<T>) {
    if let Some(value) = value {
        lines.push(format!("- {label}: {value}"));
    }
}

fn titled(title: &str, lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(format!("### {title}\n{}", lines.join("\n")))
    }
}

fn room_section(room: &RoomInfo, capabilities: &ApplianceSet) -> Option<String> {
    let mut lines = Vec::new();
    push_line(&mut lines, "Name", room.room_name.as_deref());
    if let (Some(l), Some(w), Some(h)) = (room.length, room.width, room.height) {
        lines.push(format!(
            "- Dimensions (Length x Width x Height): {l}m x {w}m x {h}m"
        ));
    }
    push_line(&mut lines, "Occupancy", room.occupancy);
    push_line(&mut lines, "Number of Doors", room.num_doors);
    push_line(&mut lines, "Number of Windows", room.num_windows);

    let available: Vec<&str> = capabilities.iter().map(|k| k.as_str()).collect();
    if available.is_empty() {
        lines.push("- Available Appliances: none".to_string());
    } else {
        lines.push(format!("- Available Appliances: {}", available.join(", ")));
    }
    titled("ROOM INFORMATION", lines)
}

fn user_section(user: &UserProfile) -> Option<String> {
    let mut lines = Vec::new();
    push_line(&mut lines, "Name", user.username.as_deref());
    push_line(&mut lines, "Age", user.age);
    push_line(&mut lines, "Gender", user.gender.as_deref().filter(|g| !g.is_empty()));
    push_line(
        &mut lines,
        "Ethnicity",
        user.ethnicity.as_deref().filter(|e| !e.is_empty()),
    );
    if !user.health_issues.is_empty() {
        lines.push(format!("- Health Issues: {}", user.health_issues.join(", ")));
    }
    if !user.questionnaire.is_empty() {
        lines.push("\nRecent Comfort Feedback:".to_string());
        for entry in &user.questionnaire {
            let answer = match &entry.answer {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("- Q: {} A: {answer}", entry.question));
        }
    }
    titled("USER INFORMATION", lines)
}

fn indoor_section(indoor: &IndoorReadings) -> Option<String> {
    let mut lines = Vec::new();
    push_line(&mut lines, "Temperature (°C)", indoor.temperature);
    push_line(&mut lines, "Humidity (%)", indoor.humidity);
    push_line(&mut lines, "Pressure", indoor.pressure);
    push_line(&mut lines, "PM1", indoor.pm1);
    push_line(&mut lines, "PM2.5", indoor.pm2_5);
    push_line(&mut lines, "PM10", indoor.pm10);
    push_line(&mut lines, "CO", indoor.co);
    push_line(&mut lines, "VOC", indoor.voc);
    push_line(&mut lines, "CO2 (ppm)", indoor.co2);
    push_line(&mut lines, "Measured at", indoor.timestamp.as_deref());
    titled("INDOOR ENVIRONMENT AND POLLUTANT DATA", lines)
}

fn outdoor_section(outdoor: &OutdoorReadings) -> Option<String> {
    let mut lines = Vec::new();
    push_line(&mut lines, "Temperature (°C)", outdoor.temperature_2m);
    push_line(&mut lines, "Relative Humidity (%)", outdoor.relative_humidity_2m);
    push_line(&mut lines, "PM2.5", outdoor.pm2_5);
    push_line(&mut lines, "PM10", outdoor.pm10);
    push_line(&mut lines, "Carbon Monoxide", outdoor.carbon_monoxide);
    push_line(&mut lines, "Dust", outdoor.dust);
    push_line(&mut lines, "Wind Speed (km/h)", outdoor.wind_speed_10m);
    push_line(&mut lines, "Wind Direction (°)", outdoor.wind_direction_10m);
    push_line(&mut lines, "Wind Gusts (km/h)", outdoor.wind_gusts_10m);
    push_line(&mut lines, "Rain (mm)", outdoor.rain);
    push_line(&mut lines, "Precipitation (mm)", outdoor.precipitation);
    push_line(
        &mut lines,
        "Daylight",
        outdoor.is_day.map(|d| if d == 1 { "yes" } else { "no" }),
    );
    push_line(&mut lines, "Measured at", outdoor.timestamp.as_deref());
    titled("OUTDOOR ENVIRONMENT AND POLLUTANT DATA", lines)
}
