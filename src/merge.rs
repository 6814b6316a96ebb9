//! The merge engine: folds a base-first chain into one accumulator.
//!
//! Base-first ordering is what makes the semantics well-defined: each step
//! sees the fully-merged ancestor state before folding in a more specific
//! document.
//!
//! Merge rules per document:
//! - metadata: shallow overlay, the later document wins outright
//! - placeholders: insert when new; otherwise exact type match, monotonic
//!   `required`, shallow overlay of remaining fields
//! - sections: only explicit `override: true` replaces inherited content;
//!   `remove: true` deletes; plain content never displaces an ancestor

use serde_json::{Map, Value};

use crate::chain::ChainEntry;
use crate::document::{classify_section, SectionDirective};
use crate::error::{ErrorCategory, ResolveError};

/// Fold a base-first chain into a raw accumulator object with exactly
/// `{metadata, placeholders, template}`. The caller (the resolver) runs
/// post-merge validation over this value before typing it.
pub fn merge_chain(base_first: &[ChainEntry]) -> Result<Map<String, Value>, ResolveError> {
    let mut metadata = Map::new();
    let mut placeholders = Map::new();
    let mut template = Map::new();

    for entry in base_first {
        if let Some(incoming) = content_map(&entry.document, "metadata") {
            merge_metadata(&mut metadata, incoming);
        }
        if let Some(incoming) = content_map(&entry.document, "placeholders") {
            merge_placeholders(&mut placeholders, incoming, &entry.reference)?;
        }
        if let Some(incoming) = content_map(&entry.document, "template") {
            merge_sections(&mut template, incoming);
        }
    }

    let mut accumulator = Map::new();
    accumulator.insert("metadata".to_string(), Value::Object(metadata));
    accumulator.insert("placeholders".to_string(), Value::Object(placeholders));
    accumulator.insert("template".to_string(), Value::Object(template));
    Ok(accumulator)
}

/// A document's content field as a mapping; absent and null read as empty.
fn content_map<'a>(document: &'a Map<String, Value>, field: &str) -> Option<&'a Map<String, Value>> {
    document.get(field).and_then(Value::as_object)
}

/// Shallow overlay: on key collision the later document wins outright,
/// no compatibility rule.
fn merge_metadata(accumulated: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        accumulated.insert(key.clone(), value.clone());
    }
}

fn merge_placeholders(
    accumulated: &mut Map<String, Value>,
    incoming: &Map<String, Value>,
    reference: &str,
) -> Result<(), ResolveError> {
    for (name, spec) in incoming {
        // Pre-validation guarantees every spec is a mapping with a string
        // type; a direct caller bypassing it still gets a typed error.
        let child = spec.as_object().ok_or_else(|| {
            ResolveError::with_ref(
                ErrorCategory::InvalidPlaceholder,
                format!("placeholder '{}' must be a mapping", name),
                reference,
            )
        })?;

        let parent = match accumulated.get(name).and_then(Value::as_object) {
            Some(parent) => parent,
            None => {
                accumulated.insert(name.clone(), spec.clone());
                continue;
            }
        };

        let parent_type = parent.get("type").and_then(Value::as_str).unwrap_or_default();
        let child_type = child.get("type").and_then(Value::as_str).unwrap_or_default();
        if parent_type != child_type {
            return Err(ResolveError::with_ref(
                ErrorCategory::TypeConflict,
                format!(
                    "type conflict for placeholder '{}': ancestor declares '{}', descendant declares '{}'",
                    name, parent_type, child_type
                ),
                reference,
            ));
        }

        let parent_required = parent.get("required") == Some(&Value::Bool(true));
        if parent_required && child.get("required") == Some(&Value::Bool(false)) {
            return Err(ResolveError::with_ref(
                ErrorCategory::ConstraintWeakening,
                format!(
                    "cannot weaken constraint for placeholder '{}': ancestor requires it, descendant marks it optional",
                    name
                ),
                reference,
            ));
        }

        let mut merged = parent.clone();
        for (key, value) in child {
            merged.insert(key.clone(), value.clone());
        }

        // `required` resolves to this document's explicit boolean if given,
        // else the inherited value.
        match child.get("required") {
            Some(Value::Bool(_)) | None => {}
            Some(_) => match parent.get("required") {
                Some(inherited) => {
                    merged.insert("required".to_string(), inherited.clone());
                }
                None => {
                    merged.remove("required");
                }
            },
        }

        accumulated.insert(name.clone(), Value::Object(merged));
    }
    Ok(())
}

fn merge_sections(accumulated: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (name, value) in incoming {
        match classify_section(value) {
            SectionDirective::Override(control) => {
                let replacement = match control.get("text") {
                    Some(text) => text.clone(),
                    None => {
                        let mut payload = control.clone();
                        payload.remove("override");
                        if payload.is_empty() {
                            // Nothing left after stripping the tag; keep the
                            // raw control value.
                            value.clone()
                        } else {
                            Value::Object(payload)
                        }
                    }
                };
                accumulated.insert(name.clone(), replacement);
            }
            SectionDirective::Remove => {
                // Idempotent when the section was never defined.
                accumulated.remove(name);
            }
            SectionDirective::Content(content) => {
                if !accumulated.contains_key(name) {
                    accumulated.insert(name.clone(), content.clone());
                }
                // Existing section without an explicit override: the
                // ancestor's content stands.
            }
        }
    }
}
