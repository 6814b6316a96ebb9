//! Template registry tooling: discovery and manifest generation.
//!
//! Records every template under a registry root with its raw-byte digest
//! and peeked parent reference, so downstream packaging can tell when a
//! registry drifted from its manifest. Glue around the resolver, not part
//! of the core contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Schema version for registry manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier.
pub const SCHEMA_ID: &str = "templar/registry_manifest@1";

/// Errors from registry tooling.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error on '{path}': {detail}")]
    Io { path: String, detail: String },

    #[error("parse error in '{path}': {detail}")]
    Parse { path: String, detail: String },

    #[error("manifest entry '{path}' is missing from the registry")]
    MissingEntry { path: String },

    #[error("digest mismatch for '{path}': manifest has {expected}, registry has {actual}")]
    DigestMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("registry file '{path}' is not tracked by the manifest")]
    UntrackedFile { path: String },
}

/// A single template entry in the registry manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the registry root, forward slashes.
    pub path: String,

    /// Size of the raw file in bytes.
    pub size: u64,

    /// SHA-256 of the raw file bytes.
    pub sha256: String,

    /// The template's parent reference, if it declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// Registry manifest (registry_manifest.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryManifest {
    /// Schema version.
    pub schema_version: u32,

    /// Schema identifier.
    pub schema_id: String,

    /// When the manifest was generated.
    pub created_at: DateTime<Utc>,

    /// Entries in discovery order.
    pub entries: Vec<ManifestEntry>,
}

impl RegistryManifest {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json().map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Load from file.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_json(&json).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Find an entry by relative path.
    pub fn find_entry(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

/// Discover template files (`.yaml`/`.yml`) under a registry root, in a
/// deterministic walk order.
pub fn discover_templates(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            matches!(
                e.path().extension().and_then(|ext| ext.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .map(|e| e.into_path())
        .collect()
}

/// Generate a manifest for every template under the registry root.
pub fn generate_manifest(root: &Path) -> Result<RegistryManifest, ManifestError> {
    let mut entries = Vec::new();

    for abs_path in discover_templates(root) {
        let rel_path = relative_path(root, &abs_path);
        let bytes = fs::read(&abs_path).map_err(|e| ManifestError::Io {
            path: rel_path.clone(),
            detail: e.to_string(),
        })?;

        entries.push(ManifestEntry {
            path: rel_path.clone(),
            size: bytes.len() as u64,
            sha256: digest(&bytes),
            extends: peek_extends(&bytes, &rel_path)?,
        });
    }

    Ok(RegistryManifest {
        schema_version: SCHEMA_VERSION,
        schema_id: SCHEMA_ID.to_string(),
        created_at: Utc::now(),
        entries,
    })
}

/// Verify a manifest against the registry on disk. Fails on the first
/// missing entry, digest mismatch, or untracked template file.
pub fn verify_manifest(root: &Path, manifest: &RegistryManifest) -> Result<(), ManifestError> {
    for entry in &manifest.entries {
        let abs_path = root.join(&entry.path);
        if !abs_path.is_file() {
            return Err(ManifestError::MissingEntry {
                path: entry.path.clone(),
            });
        }
        let bytes = fs::read(&abs_path).map_err(|e| ManifestError::Io {
            path: entry.path.clone(),
            detail: e.to_string(),
        })?;
        let actual = digest(&bytes);
        if actual != entry.sha256 {
            return Err(ManifestError::DigestMismatch {
                path: entry.path.clone(),
                expected: entry.sha256.clone(),
                actual,
            });
        }
    }

    for abs_path in discover_templates(root) {
        let rel_path = relative_path(root, &abs_path);
        if manifest.find_entry(&rel_path).is_none() {
            return Err(ManifestError::UntrackedFile { path: rel_path });
        }
    }

    Ok(())
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn relative_path(root: &Path, abs_path: &Path) -> String {
    abs_path
        .strip_prefix(root)
        .unwrap_or(abs_path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Read a template's `extends` reference without resolving it. Only the
/// string form counts; anything else is left to the resolver to reject.
fn peek_extends(bytes: &[u8], rel_path: &str) -> Result<Option<String>, ManifestError> {
    let contents = std::str::from_utf8(bytes).map_err(|e| ManifestError::Parse {
        path: rel_path.to_string(),
        detail: e.to_string(),
    })?;
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| ManifestError::Parse {
            path: rel_path.to_string(),
            detail: e.to_string(),
        })?;

    Ok(yaml
        .as_mapping()
        .and_then(|m| m.get("extends"))
        .and_then(serde_yaml::Value::as_str)
        .map(String::from))
}
