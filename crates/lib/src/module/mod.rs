//! Installable modules and their ports.
//!
//! A [`Module`] is one installable unit: an instance from the install
//! specification, typed by its resource definition. It carries two kinds of
//! ports:
//!
//! - [`ConfigPort`]: a named, typed configuration slot. The type is fixed once
//!   the module is built; the value may be reassigned until the install script
//!   is written.
//! - [`Port`]: a named connection endpoint bound to a resource `(key, id)` in
//!   the [`crate::resource::ResourceStore`].
//!
//! # Submodules
//!
//! - [`types`] - Port types and typed values

mod types;

pub use types::*;

use serde::{Deserialize, Serialize};

/// Reference to a resource by `(key, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
  pub key: String,
  pub id: String,
}

impl ResourceRef {
  pub fn new(key: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      id: id.into(),
    }
  }
}

impl std::fmt::Display for ResourceRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.key, self.id)
  }
}

/// Where an unset config port takes its value from.
///
/// `port` names an input port of the same module; `property` names a config
/// property on the resource bound (or staged) on that port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSource {
  pub port: String,
  pub property: String,
}

/// A named, typed configuration slot on a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPort {
  pub name: String,
  pub port_type: PortType,
  /// Unset required ports fail the install script write.
  pub required: bool,
  /// Pinned value; any other value is rejected.
  pub fixed_value: Option<PortValue>,
  pub source: Option<PortSource>,
  pub value: Option<PortValue>,
}

impl ConfigPort {
  pub fn new(name: impl Into<String>, port_type: PortType) -> Self {
    Self {
      name: name.into(),
      port_type,
      required: true,
      fixed_value: None,
      source: None,
      value: None,
    }
  }

  pub fn with_value(mut self, value: PortValue) -> Self {
    self.value = Some(value);
    self
  }

  pub fn optional(mut self) -> Self {
    self.required = false;
    self
  }

  pub fn is_set(&self) -> bool {
    self.value.is_some()
  }

  /// Check a candidate value against the declared type and any fixed value.
  pub fn validate(&self, value: &PortValue) -> Result<(), String> {
    if !self.port_type.accepts(value) {
      return Err(format!("expected {}, got '{}'", self.port_type, value));
    }
    match &self.fixed_value {
      Some(fixed) if fixed != value => Err(format!("value is fixed to '{}'", fixed)),
      _ => Ok(()),
    }
  }
}

/// A named connection endpoint on a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
  pub name: String,
  /// Resource key this port accepts, if constrained.
  pub key: Option<String>,
  /// Binding requested by the install specification, not yet resolved.
  pub staged: Option<ResourceRef>,
  /// Binding confirmed against the resource store.
  pub bound: Option<ResourceRef>,
}

impl Port {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      key: None,
      staged: None,
      bound: None,
    }
  }

  /// The binding to use for lookups: confirmed first, then staged.
  pub fn target(&self) -> Option<&ResourceRef> {
    self.bound.as_ref().or(self.staged.as_ref())
  }
}

/// An installable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
  /// Instance id, stable for the life of the session.
  pub id: String,
  /// Resource key of the definition this module instantiates.
  pub key: String,
  pub config_ports: Vec<ConfigPort>,
  pub ports: Vec<Port>,
}

impl Module {
  pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      key: key.into(),
      config_ports: Vec::new(),
      ports: Vec::new(),
    }
  }

  /// The `(key, id)` under which this module is registered as a resource.
  pub fn resource_ref(&self) -> ResourceRef {
    ResourceRef::new(&self.key, &self.id)
  }

  pub fn config_port(&self, name: &str) -> Option<&ConfigPort> {
    self.config_ports.iter().find(|p| p.name == name)
  }

  pub fn port(&self, name: &str) -> Option<&Port> {
    self.ports.iter().find(|p| p.name == name)
  }

  pub fn port_mut(&mut self, name: &str) -> Option<&mut Port> {
    self.ports.iter_mut().find(|p| p.name == name)
  }

  /// Current config values as a JSON object, in declaration order.
  ///
  /// Unset ports are omitted.
  pub fn config_values(&self) -> serde_json::Map<String, serde_json::Value> {
    self
      .config_ports
      .iter()
      .filter_map(|p| p.value.as_ref().map(|v| (p.name.clone(), v.to_json())))
      .collect()
  }
}
