//! Resource-definition document.
//!
//! # Example
//!
//! ```json
//! {
//!   "resource_def_version": "1.0",
//!   "resource_definitions": [
//!     {
//!       "key": "webapp",
//!       "config_port": [
//!         {"name": "port", "type": "int", "default": 8080},
//!         {"name": "mode", "type": "enum", "choices": ["dev", "prod"]},
//!         {"name": "db_host", "type": "string", "source": {"port": "db", "property": "host"}}
//!       ],
//!       "input_ports": [{"name": "db", "key": "postgres"}]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DocumentError, check_name, load_json, parse_json};
use crate::consts::RESOURCE_DEF_VERSION;
use crate::module::{PortSource, PortType, PortValue};

/// Top-level resource-definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinitions {
  pub resource_def_version: String,
  pub resource_definitions: Vec<ResourceDefinition>,
}

/// Definition of one resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
  pub key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(default)]
  pub config_port: Vec<ConfigPortDef>,
  #[serde(default)]
  pub input_ports: Vec<InputPortDef>,
}

/// Declared kind of a config port in a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
  String,
  Int,
  Bool,
  Enum,
}

/// Declaration of one config port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigPortDef {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: PortKind,
  /// Allowed values for `enum` ports.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub choices: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fixed_value: Option<Value>,
  #[serde(default = "default_required")]
  pub required: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<PortSource>,
}

fn default_required() -> bool {
  true
}

/// Declaration of one input (connection) port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPortDef {
  pub name: String,
  /// Resource key accepted by this port, if constrained.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,
}

impl ResourceDefinitions {
  /// Load and version-check a resource-definition file.
  pub fn load(path: &Path) -> Result<Self, DocumentError> {
    let defs: Self = load_json(path)?;
    defs.check_version()?;
    Ok(defs)
  }

  /// Parse and version-check a resource-definition document.
  pub fn parse(content: &str) -> Result<Self, DocumentError> {
    let defs: Self = parse_json(content, "resource definitions")?;
    defs.check_version()?;
    Ok(defs)
  }

  fn check_version(&self) -> Result<(), DocumentError> {
    if self.resource_def_version != RESOURCE_DEF_VERSION {
      return Err(DocumentError::UnsupportedVersion(self.resource_def_version.clone()));
    }
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<&ResourceDefinition> {
    self.resource_definitions.iter().find(|d| d.key == key)
  }
}

impl ConfigPortDef {
  /// The port type this declaration describes.
  pub fn port_type(&self, owner: &str) -> Result<PortType, DocumentError> {
    check_name("config port", &self.name, owner)?;
    match self.kind {
      PortKind::String => Ok(PortType::String),
      PortKind::Int => Ok(PortType::Int),
      PortKind::Bool => Ok(PortType::Bool),
      PortKind::Enum if self.choices.is_empty() => Err(DocumentError::Invalid(format!(
        "enum config port '{}' in '{}' declares no choices",
        self.name, owner
      ))),
      PortKind::Enum => {
        self.check_choices(owner)?;
        Ok(PortType::Enum(self.choices.clone()))
      }
    }
  }

  /// Choices are rendered as `enum(a|b)` on one line.
  fn check_choices(&self, owner: &str) -> Result<(), DocumentError> {
    for (i, choice) in self.choices.iter().enumerate() {
      let problem = if choice.is_empty() {
        Some("an empty choice".to_string())
      } else if choice.contains(['|', '(', ')', '\n', '\r']) {
        Some(format!("choice '{}' containing a reserved character", choice.escape_default()))
      } else if self.choices[..i].contains(choice) {
        Some(format!("choice '{}' twice", choice))
      } else {
        None
      };
      if let Some(problem) = problem {
        return Err(DocumentError::Invalid(format!(
          "enum config port '{}' in '{}' declares {}",
          self.name, owner, problem
        )));
      }
    }
    Ok(())
  }

  /// Convert a JSON value from a definition or instance to this port's type.
  pub fn typed_value(&self, port_type: &PortType, value: &Value, what: &str, owner: &str) -> Result<PortValue, DocumentError> {
    port_type.from_json(value).map_err(|reason| {
      DocumentError::Invalid(format!(
        "{} for config port '{}' in '{}': {}",
        what, self.name, owner, reason
      ))
    })
  }
}
