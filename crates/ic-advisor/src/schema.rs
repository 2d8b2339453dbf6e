//! Schema builder: the per-room structured-output contract.
//!
//! The contract is an ordered list of field descriptors built from the
//! room's appliance set. It is rendered three ways from the same list, so
//! the three can never disagree:
//! - a Gemini `responseSchema` ([`RecommendationContract::to_response_schema`]),
//! - the constraint and example sections of the prompt (see `prompt`),
//! - strict validation of the parsed answer ([`RecommendationContract::validate`]).

use ic_protocol::{AcMode, ApplianceKind, ApplianceSet, OpeningState, Recommendation, SwitchState};
use serde_json::{Map, Value, json};

use crate::error::ValidationError;

/// Type and bounds of one contract field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unconstrained string.
    Text,
    /// Integer within `min..=max` (`max = None` means unbounded above).
    Integer { min: i64, max: Option<i64> },
    /// String restricted to a fixed value set.
    Choice(&'static [&'static str]),
}

/// One field the model must emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Appended to the prompt's constraint line and the schema description.
    pub description: &'static str,
    /// JSON literal shown in the prompt's example output.
    pub example: &'static str,
}

pub const REASON: FieldDescriptor = FieldDescriptor {
    name: "reason",
    kind: FieldKind::Text,
    description: "brief explanation of why each setting was chosen",
    example: "\"Brief explanation of why each setting was chosen.\"",
};

pub const RECHECK_AT: FieldDescriptor = FieldDescriptor {
    name: "RECHECK_AT",
    kind: FieldKind::Integer { min: 1, max: None },
    description: "minutes until the environment should be re-evaluated",
    example: "15",
};

const AC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "AC_MODE",
        kind: FieldKind::Choice(AcMode::VARIANTS),
        description: "air conditioner mode",
        example: "\"COOL\"",
    },
    FieldDescriptor {
        name: "AC_TEMPERATURE",
        kind: FieldKind::Integer {
            min: 16,
            max: Some(30),
        },
        description: "air conditioner set point in °C",
        example: "23",
    },
];

const CEILING_FAN_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    name: "CEILING_FAN",
    kind: FieldKind::Integer {
        min: 0,
        max: Some(5),
    },
    description: "ceiling fan speed step",
    example: "3",
}];

const WINDOW_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    name: "WINDOW",
    kind: FieldKind::Choice(OpeningState::VARIANTS),
    description: "window position",
    example: "\"CLOSED\"",
}];

const DOOR_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    name: "DOOR",
    kind: FieldKind::Choice(OpeningState::VARIANTS),
    description: "door position",
    example: "\"CLOSED\"",
}];

const EXHAUST_FAN_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    name: "EXHAUST_FAN",
    kind: FieldKind::Choice(SwitchState::VARIANTS),
    description: "exhaust fan switch",
    example: "\"ON\"",
}];

/// Contract fields contributed by one appliance.
pub fn appliance_fields(kind: ApplianceKind) -> &'static [FieldDescriptor] {
    match kind {
        ApplianceKind::Ac => AC_FIELDS,
        ApplianceKind::CeilingFan => CEILING_FAN_FIELDS,
        ApplianceKind::Window => WINDOW_FIELDS,
        ApplianceKind::Door => DOOR_FIELDS,
        ApplianceKind::ExhaustFan => EXHAUST_FAN_FIELDS,
    }
}

/// Ordered field set for one recommendation request.
///
/// Always `reason` first and `RECHECK_AT` last, with the fields of each
/// present appliance in canonical appliance order between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationContract {
    fields: Vec<FieldDescriptor>,
}

/// Build the contract for a room's appliance set.
///
/// Deterministic and infallible: the same set always yields the same
/// fields in the same order.
pub fn build_schema(capabilities: &ApplianceSet) -> RecommendationContract {
    let mut fields = vec![REASON];
    for kind in capabilities.iter() {
        fields.extend_from_slice(appliance_fields(kind));
    }
    fields.push(RECHECK_AT);
    RecommendationContract { fields }
}

impl RecommendationContract {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a Gemini `responseSchema` (OpenAPI subset).
    pub fn to_response_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let property = match field.kind {
                FieldKind::Text => json!({
                    "type": "STRING",
                    "description": field.description,
                }),
                FieldKind::Integer { min, max } => {
                    let mut p = json!({
                        "type": "INTEGER",
                        "description": field.description,
                        "minimum": min,
                    });
                    if let Some(max) = max {
                        p["maximum"] = json!(max);
                    }
                    p
                }
                FieldKind::Choice(allowed) => json!({
                    "type": "STRING",
                    "format": "enum",
                    "enum": allowed,
                    "description": field.description,
                }),
            };
            properties.insert(field.name.to_string(), property);
        }

        let names = self.field_names();
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": names,
            "propertyOrdering": names,
        })
    }

    /// Check a parsed model answer against the contract.
    ///
    /// Every contract field must be present with the right type, integers
    /// within bounds, choices within their value set. Keys the contract does
    /// not name are dropped, so settings for absent appliances never reach
    /// the result.
    pub fn validate(&self, value: &Value) -> Result<Recommendation, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let mut accepted = Map::new();
        for field in &self.fields {
            let raw = match object.get(field.name) {
                None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField {
                        field: field.name.to_string(),
                    });
                }
                Some(raw) => raw,
            };
            check_field(field, raw)?;
            accepted.insert(field.name.to_string(), raw.clone());
        }

        for key in object.keys().filter(|k| !self.contains(k)) {
            tracing::debug!(field = %key, "dropping field outside the contract");
        }

        serde_json::from_value(Value::Object(accepted)).map_err(|e| ValidationError::WrongType {
            field: "response".into(),
            expected: "a contract-conforming object",
            found: e.to_string(),
        })
    }
}

fn check_field(field: &FieldDescriptor, raw: &Value) -> Result<(), ValidationError> {
    match field.kind {
        FieldKind::Text => {
            if raw.is_string() {
                Ok(())
            } else {
                Err(wrong_type(field, "a string", raw))
            }
        }
        FieldKind::Integer { min, max } => {
            let value = raw
                .as_i64()
                .ok_or_else(|| wrong_type(field, "an integer", raw))?;
            let too_high = max.is_some_and(|max| value > max);
            if value < min || too_high {
                return Err(ValidationError::OutOfRange {
                    field: field.name.to_string(),
                    value,
                    min,
                    max,
                });
            }
            Ok(())
        }
        FieldKind::Choice(allowed) => {
            let value = raw
                .as_str()
                .ok_or_else(|| wrong_type(field, "a string", raw))?;
            if allowed.contains(&value) {
                Ok(())
            } else {
                Err(ValidationError::UnknownVariant {
                    field: field.name.to_string(),
                    value: value.to_string(),
                    allowed,
                })
            }
        }
    }
}

fn wrong_type(field: &FieldDescriptor, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::WrongType {
        field: field.name.to_string(),
        expected,
        found: found.to_string(),
    }
}
