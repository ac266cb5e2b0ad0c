//! Install-specification document.
//!
//! A JSON list of resource instances in install order:
//!
//! ```json
//! [
//!   {"id": "pg", "key": "postgres", "config_port": {"host": "db.local"}},
//!   {"id": "app", "key": "webapp", "config_port": {"mode": "prod"},
//!    "input_ports": {"db": {"key": "postgres", "id": "pg"}}}
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DocumentError, load_json, parse_json};
use crate::module::ResourceRef;

/// Top-level install specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallSpec {
  pub instances: Vec<ResourceInstance>,
}

/// One resource instance to install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
  pub id: String,
  pub key: String,
  /// Initial config values by port name.
  #[serde(default)]
  pub config_port: Map<String, Value>,
  /// Requested port bindings by port name; resolved only when bound.
  #[serde(default)]
  pub input_ports: BTreeMap<String, ResourceRef>,
}

impl InstallSpec {
  pub fn load(path: &Path) -> Result<Self, DocumentError> {
    load_json(path)
  }

  pub fn parse(content: &str) -> Result<Self, DocumentError> {
    parse_json(content, "install specification")
  }

  pub fn len(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }
}
