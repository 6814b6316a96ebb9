//! Pre-validation of a single document, run immediately after load and
//! before the document is trusted by the chain builder.
//!
//! Checks run in a fixed order; the first violation wins.

use serde_json::{Map, Value};

use crate::document::{PlaceholderType, ALLOWED_FIELDS, LEGACY_PARENT_KEYS};
use crate::error::{ErrorCategory, ResolveError};

/// Validate one loaded document.
pub fn pre_validate(document: &Map<String, Value>, reference: &str) -> Result<(), ResolveError> {
    // 1. Legacy parent-reference spellings are rejected outright.
    for key in LEGACY_PARENT_KEYS {
        if document.contains_key(*key) {
            return Err(ResolveError::with_ref(
                ErrorCategory::UnsupportedInheritanceKey,
                format!(
                    "unsupported inheritance key '{}': use 'extends' with a string value",
                    key
                ),
                reference,
            ));
        }
    }

    // 2. `extends`, if present, must be a non-empty string.
    if let Some(extends) = document.get("extends") {
        match extends {
            Value::String(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(ResolveError::with_ref(
                    ErrorCategory::InvalidExtendsFormat,
                    "'extends' must be a non-empty string",
                    reference,
                ));
            }
        }
    }

    // 3. Single top-level allowlist.
    for key in document.keys() {
        if !ALLOWED_FIELDS.contains(&key.as_str()) {
            return Err(ResolveError::with_ref(
                ErrorCategory::UnknownField,
                format!("unknown top-level field '{}'", key),
                reference,
            ));
        }
    }

    // Content fields, when present and non-null, must be mappings.
    for field in ["metadata", "template"] {
        match document.get(field) {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(ResolveError::invalid_template(
                    reference,
                    format!("'{}' must be a mapping", field),
                ));
            }
        }
    }

    // 4. Placeholder declarations.
    match document.get("placeholders") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Object(placeholders)) => {
            for (name, spec) in placeholders {
                validate_placeholder(name, spec, reference)?;
            }
            Ok(())
        }
        Some(_) => Err(ResolveError::with_ref(
            ErrorCategory::InvalidPlaceholders,
            "'placeholders' must be a mapping",
            reference,
        )),
    }
}

fn validate_placeholder(name: &str, spec: &Value, reference: &str) -> Result<(), ResolveError> {
    let spec = match spec {
        Value::Object(map) => map,
        _ => {
            return Err(ResolveError::with_ref(
                ErrorCategory::InvalidPlaceholder,
                format!("placeholder '{}' must be a mapping", name),
                reference,
            ));
        }
    };

    let declared = match spec.get("type") {
        Some(Value::String(t)) => t.as_str(),
        Some(_) | None => {
            // A non-string `type` is as unusable as a missing one only when
            // absent; a present non-string is an invalid type declaration.
            if spec.contains_key("type") {
                return Err(ResolveError::with_ref(
                    ErrorCategory::InvalidType,
                    format!("placeholder '{}' has a non-string 'type'", name),
                    reference,
                ));
            }
            return Err(ResolveError::with_ref(
                ErrorCategory::MissingType,
                format!("placeholder '{}' is missing required 'type' field", name),
                reference,
            ));
        }
    };

    let parsed = PlaceholderType::parse(declared).ok_or_else(|| {
        ResolveError::with_ref(
            ErrorCategory::InvalidType,
            format!("placeholder '{}' has invalid type '{}'", name, declared),
            reference,
        )
    })?;

    if parsed == PlaceholderType::Array && spec.get("items").map_or(true, Value::is_null) {
        return Err(ResolveError::with_ref(
            ErrorCategory::MissingItems,
            format!("placeholder '{}' of type 'array' must declare 'items'", name),
            reference,
        ));
    }

    Ok(())
}
