//! Input-schema derivation from a resolved template.
//!
//! Consumes only `ResolvedTemplate.placeholders` and emits a JSON Schema
//! (draft-07) object: one property per placeholder, a `required` list,
//! and `additionalProperties: false`. Every declared placeholder surfaces
//! in the schema and nothing else does.

use serde_json::{json, Map, Value};

use crate::document::PlaceholderType;
use crate::error::{ErrorCategory, ResolveError};
use crate::resolver::ResolvedTemplate;

/// Marker value for placeholders injected by a later rendering stage.
/// Those stay in `properties` but never enter the `required` list.
const RENDERER_INJECTED: &str = "renderer";

/// Derive the input schema for a resolved template.
pub fn derive_input_schema(resolved: &ResolvedTemplate) -> Result<Value, ResolveError> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, spec) in &resolved.placeholders {
        let spec = spec.as_object().ok_or_else(|| {
            ResolveError::new(
                ErrorCategory::InvalidPlaceholder,
                format!("placeholder '{}' must be a mapping", name),
            )
        })?;

        let declared = spec
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ResolveError::new(
                    ErrorCategory::MissingType,
                    format!("placeholder '{}' is missing required 'type' field", name),
                )
            })?;

        let parsed = PlaceholderType::parse(declared).ok_or_else(|| {
            ResolveError::new(
                ErrorCategory::InvalidType,
                format!("placeholder '{}' has invalid type '{}'", name, declared),
            )
        })?;

        let mut property = Map::new();
        property.insert("type".to_string(), Value::String(declared.to_string()));

        if parsed == PlaceholderType::Array {
            match spec.get("items").and_then(Value::as_str) {
                Some("string") => {
                    property.insert("items".to_string(), json!({"type": "string"}));
                }
                Some(other) => {
                    return Err(ResolveError::new(
                        ErrorCategory::InvalidType,
                        format!(
                            "placeholder '{}' array items must currently be 'string', got '{}'",
                            name, other
                        ),
                    ));
                }
                None => {
                    return Err(ResolveError::new(
                        ErrorCategory::MissingItems,
                        format!("placeholder '{}' of type 'array' must declare 'items'", name),
                    ));
                }
            }
        }

        if let Some(format) = spec.get("format") {
            property.insert("format".to_string(), format.clone());
        }
        if let Some(description) = spec.get("description") {
            property.insert("description".to_string(), description.clone());
        }
        if let Some(default) = spec.get("default") {
            if !parsed.matches(default) {
                return Err(ResolveError::new(
                    ErrorCategory::InvalidType,
                    format!(
                        "default value for '{}' does not match declared type '{}'",
                        name, declared
                    ),
                ));
            }
            property.insert("default".to_string(), default.clone());
        }

        let is_required = spec.get("required") == Some(&Value::Bool(true));
        let injected = spec.get("injectedBy").and_then(Value::as_str) == Some(RENDERER_INJECTED);
        if is_required && !injected {
            required.push(Value::String(name.clone()));
        }

        properties.insert(name.clone(), Value::Object(property));
    }

    Ok(json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Template Input Schema (derived)",
        "description": "Auto-derived from the resolved template's placeholders",
        "type": "object",
        "properties": Value::Object(properties),
        "required": Value::Array(required),
        "additionalProperties": false
    }))
}
