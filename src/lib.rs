//! Templar - single-parent template inheritance resolver
//!
//! This crate resolves chains of declarative YAML template documents
//! connected by `extends` into one flattened template with no inheritance
//! metadata, and derives the input schema a resolved template implies.

pub mod chain;
pub mod document;
pub mod error;
pub mod loader;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod validate;

pub use chain::{build_chain, ChainEntry};
pub use error::{ErrorCategory, ResolveError};
pub use registry::{generate_manifest, verify_manifest, RegistryManifest};
pub use resolver::{resolve, ResolvedTemplate};
pub use schema::derive_input_schema;
