//! Document loading: reference resolution, YAML parsing, shape check.
//!
//! YAML is converted to an order-preserving `serde_json::Value` so the
//! rest of the pipeline works over one representation. Mapping order from
//! the source file is kept; it is part of the determinism contract.

use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ResolveError;

/// Lexically normalize a path: fold `.` and `..` without touching the
/// filesystem. Used both for loading and for the chain's seen-set, so a
/// template reached via different spellings dedupes to one location.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at an absolute root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // Relative paths keep leading `..` components.
                _ => out.push(component.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a reference against a base directory to a normalized absolute
/// location. Absolute references are used as-is.
pub fn resolve_reference(reference: &str, base_dir: &Path) -> PathBuf {
    let raw = Path::new(reference);
    if raw.is_absolute() {
        normalize_path(raw)
    } else {
        normalize_path(&base_dir.join(raw))
    }
}

/// Load and parse one template document.
///
/// Returns the parsed document (root mapping) and its absolute location;
/// relative `extends` in this document resolve against that location's
/// directory, not the caller's base.
pub fn load_document(
    reference: &str,
    base_dir: &Path,
) -> Result<(serde_json::Map<String, Value>, PathBuf), ResolveError> {
    let abs_path = resolve_reference(reference, base_dir);

    if !abs_path.is_file() {
        return Err(ResolveError::template_not_found(reference));
    }

    let contents =
        fs::read_to_string(&abs_path).map_err(|e| ResolveError::load_error(reference, e))?;

    let yaml: serde_yaml::Value = serde_yaml::from_str(&contents)
        .map_err(|e| ResolveError::load_error(reference, format!("YAML parse error: {}", e)))?;

    let value = yaml_to_json(yaml, reference)?;

    match value {
        Value::Object(map) => Ok((map, abs_path)),
        _ => Err(ResolveError::invalid_template(
            reference,
            "root must be a mapping",
        )),
    }
}

/// Convert a YAML value to a JSON value, preserving mapping order.
///
/// Scalar mapping keys are stringified the way YAML-consuming tooling
/// conventionally does; structured keys are rejected.
fn yaml_to_json(yaml: serde_yaml::Value, reference: &str) -> Result<Value, ResolveError> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                // NaN and infinities have no JSON representation.
                match n.as_f64().and_then(serde_json::Number::from_f64) {
                    Some(f) => Value::Number(f),
                    None => {
                        return Err(ResolveError::load_error(
                            reference,
                            format!("number '{}' cannot be represented", n),
                        ))
                    }
                }
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Array(
            seq.into_iter()
                .map(|v| yaml_to_json(v, reference))
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    _ => {
                        return Err(ResolveError::load_error(
                            reference,
                            "mapping keys must be scalars",
                        ))
                    }
                };
                map.insert(key, yaml_to_json(value, reference)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value, reference)?,
    })
}
