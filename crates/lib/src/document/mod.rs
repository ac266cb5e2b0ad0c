//! Input documents: resource definitions and install specifications.
//!
//! Both are JSON. The resource-definition document declares resource types
//! (their config ports and input ports); the install specification lists the
//! instances to install, in order. [`build`] turns the pair into the module
//! sequence and resource store a [`crate::session::Session`] works on.
//!
//! # Submodules
//!
//! - [`rdef`] - Resource-definition document
//! - [`spec`] - Install-specification document
//! - [`build`] - Validation and construction of modules

pub mod build;
pub mod rdef;
pub mod spec;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use build::build;
pub use rdef::{ConfigPortDef, InputPortDef, PortKind, ResourceDefinition, ResourceDefinitions};
pub use spec::{InstallSpec, ResourceInstance};

/// Errors from reading and validating input documents.
#[derive(Debug, Error)]
pub enum DocumentError {
  /// Failed to read a document from disk.
  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A document is not valid JSON for its schema.
  #[error("failed to parse {what}: {source}")]
  Parse {
    what: String,
    #[source]
    source: serde_json::Error,
  },

  /// The resource-definition document has an unknown version.
  #[error("unsupported resource definition version '{0}'")]
  UnsupportedVersion(String),

  /// The documents parse but are inconsistent.
  #[error("{0}")]
  Invalid(String),
}

impl DocumentError {
  /// Whether the failure came from the environment rather than the documents.
  pub fn is_system(&self) -> bool {
    matches!(self, DocumentError::Read { .. })
  }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
  let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_json(&content, &path.display().to_string())
}

fn parse_json<T: DeserializeOwned>(content: &str, what: &str) -> Result<T, DocumentError> {
  serde_json::from_str(content).map_err(|source| DocumentError::Parse {
    what: what.to_string(),
    source,
  })
}

/// Names end up in `name:type` and `name=value` lines.
fn check_name(kind: &str, name: &str, owner: &str) -> Result<(), DocumentError> {
  if name.is_empty() || name.contains(['=', ':', '\n', '\r']) {
    return Err(DocumentError::Invalid(format!(
      "{} name '{}' in '{}' must be non-empty and must not contain '=', ':' or line breaks",
      kind, name, owner
    )));
  }
  Ok(())
}
