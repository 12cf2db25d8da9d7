//! Declarative shapes for flow inputs and outputs.
//!
//! A [`Schema`] is plain data. The same definition validates candidate
//! values, renders the JSON Schema handed to the generative service, and
//! renders the field list appended to prompts.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::String,
            description,
        }
    }

    pub const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::Number,
            description,
        }
    }

    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldType::Boolean,
            description,
        }
    }
}

/// An object shape: every declared field is required.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// First field that failed a schema check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Check `candidate` and return its declared fields. Undeclared keys are
    /// dropped; declared ones are returned untouched.
    pub fn check(&self, candidate: &Value) -> Result<Map<String, Value>, Violation> {
        let object = candidate.as_object().ok_or_else(|| Violation {
            field: self.name.to_string(),
            reason: format!("expected object, got {}", type_name(candidate)),
        })?;

        let mut validated = Map::with_capacity(self.fields.len());
        for field in self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) => {
                    return Err(Violation {
                        field: field.name.to_string(),
                        reason: "required field is missing".to_string(),
                    });
                }
                Some(value) if !field.kind.matches(value) => {
                    return Err(Violation {
                        field: field.name.to_string(),
                        reason: format!(
                            "expected {}, got {}",
                            field.kind.as_str(),
                            type_name(value)
                        ),
                    });
                }
                Some(value) => {
                    validated.insert(field.name.to_string(), value.clone());
                }
            }
        }

        Ok(validated)
    }

    /// Validate a caller-supplied value.
    pub fn validate_input(&self, candidate: &Value) -> Result<Map<String, Value>, FlowError> {
        self.check(candidate)
            .map_err(|violation| FlowError::validation(violation.field, violation.reason))
    }

    /// Validate a value produced by the generative service.
    pub fn validate_output(&self, candidate: &Value) -> Result<Map<String, Value>, FlowError> {
        self.check(candidate)
            .map_err(|violation| FlowError::mismatch(violation.field, violation.reason))
    }

    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    json!({
                        "type": field.kind.as_str(),
                        "description": field.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|field| field.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Human-readable field list, one `- name (type): description` line per
    /// field.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|field| {
                format!(
                    "- {} ({}): {}",
                    field.name,
                    field.kind.as_str(),
                    field.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Schema = Schema::new(
        "Sample",
        &[
            FieldSpec::string("home", "Home side."),
            FieldSpec::string("away", "Away side."),
        ],
    );

    #[test]
    fn accepts_conforming_object_and_strips_extras() {
        let validated = SAMPLE
            .check(&json!({"home": "A", "away": "", "venue": "X"}))
            .unwrap();
        assert_eq!(validated.len(), 2);
        assert_eq!(validated["away"], "");
        assert!(!validated.contains_key("venue"));
    }

    #[test]
    fn names_missing_field() {
        let violation = SAMPLE.check(&json!({"home": "A"})).unwrap_err();
        assert_eq!(violation.field, "away");
    }

    #[test]
    fn null_counts_as_missing() {
        let violation = SAMPLE.check(&json!({"home": null, "away": "B"})).unwrap_err();
        assert_eq!(violation.field, "home");
        assert!(violation.reason.contains("missing"));
    }

    #[test]
    fn names_wrongly_typed_field() {
        let violation = SAMPLE.check(&json!({"home": "A", "away": 3})).unwrap_err();
        assert_eq!(violation.field, "away");
        assert_eq!(violation.reason, "expected string, got number");
    }

    #[test]
    fn non_object_is_reported_against_schema_name() {
        let violation = SAMPLE.check(&json!(["A", "B"])).unwrap_err();
        assert_eq!(violation.field, "Sample");
    }

    #[test]
    fn input_and_output_map_to_different_errors() {
        assert!(SAMPLE.validate_input(&json!({})).unwrap_err().is_validation());
        assert!(SAMPLE
            .validate_output(&json!({}))
            .unwrap_err()
            .is_schema_mismatch());
    }

    #[test]
    fn json_schema_lists_every_field_as_required() {
        let rendered = SAMPLE.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["home", "away"]));
        assert_eq!(rendered["properties"]["home"]["type"], "string");
        assert_eq!(rendered["additionalProperties"], false);
    }

    #[test]
    fn checks_number_and_boolean_fields() {
        const ODDS: Schema = Schema::new(
            "Odds",
            &[
                FieldSpec::number("price", "Decimal odds."),
                FieldSpec::boolean("live", "In-play market."),
            ],
        );

        assert!(ODDS.check(&json!({"price": 1.85, "live": false})).is_ok());
        let violation = ODDS.check(&json!({"price": "1.85", "live": true})).unwrap_err();
        assert_eq!(violation.reason, "expected number, got string");
        let violation = ODDS.check(&json!({"price": 2, "live": "no"})).unwrap_err();
        assert_eq!(violation.field, "live");
        assert_eq!(violation.reason, "expected boolean, got string");

        let rendered = ODDS.to_json_schema();
        assert_eq!(rendered["properties"]["price"]["type"], "number");
        assert_eq!(rendered["properties"]["live"]["type"], "boolean");
        assert_eq!(ODDS.describe().lines().nth(1), Some("- live (boolean): In-play market."));
    }

    #[test]
    fn describe_renders_one_line_per_field() {
        assert_eq!(
            SAMPLE.describe(),
            "- home (string): Home side.\n- away (string): Away side."
        );
    }
}
