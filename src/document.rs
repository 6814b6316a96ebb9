//! Document shape: allowed fields, placeholder types, section directives.
//!
//! Loosely-shaped YAML content is classified into closed enums here, once,
//! at the validation/merge boundary. Merge logic matches on the enums and
//! never probes for magic keys itself.

use serde_json::{Map, Value};

/// Top-level keys a document may carry. The single allowlist is the only
/// boundary-enforcement mechanism.
pub const ALLOWED_FIELDS: &[&str] = &["metadata", "placeholders", "template", "extends"];

/// Content fields of a resolved template (ALLOWED_FIELDS minus `extends`).
pub const CONTENT_FIELDS: &[&str] = &["metadata", "placeholders", "template"];

/// Legacy parent-reference spellings. Rejected outright; `extends` as a
/// non-empty string is the only supported form.
pub const LEGACY_PARENT_KEYS: &[&str] = &["inherits", "parentRef"];

/// The fixed placeholder type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    String,
    Array,
    Number,
    Boolean,
    Object,
}

impl PlaceholderType {
    /// Parse a declared type name. Returns `None` for anything outside
    /// the enumeration.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// Whether a concrete value matches this declared type.
    /// `null` is accepted for any type.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

/// How a section value participates in the merge.
///
/// A mapping with `override: true` or `remove: true` is a control value;
/// everything else is plain content. If a mapping carries both tags,
/// `override` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionDirective<'a> {
    /// Replace the accumulated section with this control's payload.
    Override(&'a Map<String, Value>),
    /// Delete the accumulated section (idempotent if absent).
    Remove,
    /// Plain content: inserted when new, otherwise the ancestor wins.
    Content(&'a Value),
}

/// Classify a section value exactly once.
pub fn classify_section(value: &Value) -> SectionDirective<'_> {
    if let Value::Object(map) = value {
        if map.get("override") == Some(&Value::Bool(true)) {
            return SectionDirective::Override(map);
        }
        if map.get("remove") == Some(&Value::Bool(true)) {
            return SectionDirective::Remove;
        }
    }
    SectionDirective::Content(value)
}
