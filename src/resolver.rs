//! Resolver orchestration and post-merge validation.
//!
//! Phases: build the chain (child-to-parent), reverse it to base-first,
//! fold it with the merge engine, run the defensive post-merge checks,
//! then type the accumulator. The first violation in any phase aborts the
//! call; no partial result ever escapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::chain::build_chain;
use crate::document::CONTENT_FIELDS;
use crate::error::{ErrorCategory, ResolveError};
use crate::merge::merge_chain;

/// A fully flattened template: exactly metadata, placeholders and
/// template sections, with no inheritance metadata remaining. Terminal
/// and immutable; it has no further relation to its source documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTemplate {
    pub metadata: Map<String, Value>,
    pub placeholders: Map<String, Value>,
    pub template: Map<String, Value>,
}

impl ResolvedTemplate {
    /// Placeholder names in declaration order.
    pub fn placeholder_names(&self) -> Vec<&str> {
        self.placeholders.keys().map(String::as_str).collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Resolve a template reference to a flattened template.
///
/// Deterministic: repeated calls on the same reference produce
/// structurally identical output, including field-insertion order.
pub fn resolve(reference: &str, base_dir: &Path) -> Result<ResolvedTemplate, ResolveError> {
    let mut chain = build_chain(reference, base_dir)?;

    // Base-first: reverse of the traversal order.
    chain.reverse();

    let accumulator = merge_chain(&chain)?;
    post_merge_validate(&accumulator)?;
    into_resolved(accumulator)
}

/// Defensive closing boundary over the raw accumulator. Both checks are
/// structurally unreachable given the merge engine, and stay anyway.
fn post_merge_validate(accumulator: &Map<String, Value>) -> Result<(), ResolveError> {
    for key in accumulator.keys() {
        if !CONTENT_FIELDS.contains(&key.as_str()) {
            return Err(ResolveError::new(
                ErrorCategory::NonContentField,
                format!("resolved template carries non-content field '{}'", key),
            ));
        }
    }

    if let Some(placeholders) = accumulator.get("placeholders").and_then(Value::as_object) {
        let mut seen = HashSet::new();
        for name in placeholders.keys() {
            if !seen.insert(name) {
                return Err(ResolveError::new(
                    ErrorCategory::DuplicatePlaceholders,
                    format!("resolved template contains duplicate placeholder '{}'", name),
                ));
            }
        }
    }

    Ok(())
}

fn into_resolved(accumulator: Map<String, Value>) -> Result<ResolvedTemplate, ResolveError> {
    serde_json::from_value(Value::Object(accumulator)).map_err(ResolveError::unknown)
}
