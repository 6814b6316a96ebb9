//! Inheritance chain construction.
//!
//! Follows `extends` references from the root document to the base,
//! loading and pre-validating each document. Cycles are detected by a
//! seen-set of normalized absolute locations, at the point of re-load,
//! regardless of cycle length.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;
use crate::loader::{load_document, resolve_reference};
use crate::validate::pre_validate;

/// One loaded, validated link of the inheritance chain.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    /// The reference this document was requested by.
    pub reference: String,
    /// Normalized absolute location of the document.
    pub abs_path: PathBuf,
    /// The parsed document (root mapping).
    pub document: Map<String, Value>,
}

/// Build the inheritance chain for a root reference.
///
/// Returns documents in child-to-parent order: the root reference first,
/// the base of the chain last. Each ancestor reference is only known
/// after its child is loaded, so traversal is strictly sequential.
pub fn build_chain(reference: &str, base_dir: &Path) -> Result<Vec<ChainEntry>, ResolveError> {
    let mut chain = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut current_ref = reference.to_string();
    let mut current_base = base_dir.to_path_buf();

    loop {
        let normalized = resolve_reference(&current_ref, &current_base);
        if !seen.insert(normalized) {
            return Err(ResolveError::circular_inheritance(&current_ref));
        }

        let (document, abs_path) = load_document(&current_ref, &current_base)?;
        pre_validate(&document, &current_ref)?;

        let parent = document.get("extends").and_then(Value::as_str).map(String::from);

        // Relative parents resolve against this document's directory,
        // not the original caller's base.
        let parent_base = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| current_base.clone());

        chain.push(ChainEntry {
            reference: current_ref,
            abs_path,
            document,
        });

        match parent {
            Some(parent_ref) => {
                current_ref = parent_ref;
                current_base = parent_base;
            }
            None => return Ok(chain),
        }
    }
}
